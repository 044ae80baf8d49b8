use eipio_models::ConnectionConfig;
use eipio_stack::{
    ConnectionPriority, ConnectionType, EPath, ForwardOpenParams, NetworkConnectionParams,
};
use rand::Rng;

/// Assembly object class.
const ASSEMBLY_CLASS: u16 = 0x04;

/// Vendor id reported as the connection originator.
const ORIGINATOR_VENDOR_ID: u16 = 0x0456;
/// Serial number reported as the connection originator.
const ORIGINATOR_SERIAL: u32 = 0x0001_0001;
/// Transport class 3 trigger: client, cyclic.
const TRANSPORT_TRIGGER: u8 = 0xA3;
const PRIORITY_TIME_TICK: u8 = 0x07;
const TIMEOUT_TICKS: u8 = 0x05;

/// Connection path over the configured assemblies: optional config assembly
/// first, then output, then input.
pub fn build_connection_path(config: &ConnectionConfig) -> Vec<u8> {
    let mut path = Vec::new();
    if let Some(config_assembly) = &config.config_assembly {
        path.extend(EPath::instance(ASSEMBLY_CLASS, config_assembly.instance).pack_padded());
    }
    path.extend(EPath::instance(ASSEMBLY_CLASS, config.output_assembly.instance).pack_padded());
    path.extend(EPath::instance(ASSEMBLY_CLASS, config.input_assembly.instance).pack_padded());
    path
}

/// Build the full ForwardOpen parameter set for a device connection.
///
/// Pure apart from the connection serial number, drawn uniformly from the
/// nonzero u16 range. The target-to-originator direction always requests
/// multicast delivery; the multicast flag only affects the originator-to-
/// target direction.
pub fn build_forward_open(config: &ConnectionConfig) -> ForwardOpenParams {
    let o2t_type = if config.multicast {
        ConnectionType::Multicast
    } else {
        ConnectionType::PointToPoint
    };

    ForwardOpenParams {
        priority_time_tick: PRIORITY_TIME_TICK,
        timeout_ticks: TIMEOUT_TICKS,
        connection_serial: rand::thread_rng().gen_range(1..=u16::MAX),
        originator_vendor_id: ORIGINATOR_VENDOR_ID,
        originator_serial: ORIGINATOR_SERIAL,
        o2t_rpi_us: config.rpi_us,
        t2o_rpi_us: config.rpi_us,
        o2t: NetworkConnectionParams::fixed(
            o2t_type,
            ConnectionPriority::High,
            config.output_assembly.size_bytes,
        ),
        t2o: NetworkConnectionParams::fixed(
            ConnectionType::Multicast,
            ConnectionPriority::Scheduled,
            config.input_assembly.size_bytes,
        ),
        transport_trigger: TRANSPORT_TRIGGER,
        connection_path: build_connection_path(config),
        large: config.large_forward_open,
    }
}
