/// Connection type bits of the network connection parameters word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionType {
    Null = 0,
    Multicast = 1,
    PointToPoint = 2,
}

/// Priority bits of the network connection parameters word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPriority {
    Low = 0,
    High = 1,
    Scheduled = 2,
    Urgent = 3,
}

/// One direction's network connection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConnectionParams {
    pub connection_type: ConnectionType,
    pub priority: ConnectionPriority,
    pub variable_size: bool,
    pub size_bytes: u16,
}

impl NetworkConnectionParams {
    pub fn fixed(
        connection_type: ConnectionType,
        priority: ConnectionPriority,
        size_bytes: u16,
    ) -> Self {
        Self {
            connection_type,
            priority,
            variable_size: false,
            size_bytes,
        }
    }

    /// Encode as the wire word. Standard ForwardOpen uses the 16-bit layout
    /// (size in bits 0..=8), large ForwardOpen the 32-bit layout (size in
    /// bits 0..=15).
    pub fn encode(&self, large: bool) -> u32 {
        let type_bits = self.connection_type as u32;
        let priority_bits = self.priority as u32;
        let variable = self.variable_size as u32;
        if large {
            (self.size_bytes as u32)
                | (variable << 25)
                | (priority_bits << 26)
                | (type_bits << 29)
        } else {
            ((self.size_bytes as u32) & 0x01FF)
                | (variable << 9)
                | (priority_bits << 10)
                | (type_bits << 13)
        }
    }
}

/// Everything a stack needs to issue a ForwardOpen for one cyclic
/// connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardOpenParams {
    pub priority_time_tick: u8,
    pub timeout_ticks: u8,
    pub connection_serial: u16,
    pub originator_vendor_id: u16,
    pub originator_serial: u32,
    /// Requested packet interval, originator to target, microseconds.
    pub o2t_rpi_us: u32,
    /// Requested packet interval, target to originator, microseconds.
    pub t2o_rpi_us: u32,
    pub o2t: NetworkConnectionParams,
    pub t2o: NetworkConnectionParams,
    pub transport_trigger: u8,
    /// Packed padded path over the assemblies this connection binds.
    pub connection_path: Vec<u8>,
    /// Use the large ForwardOpen frame with 32-bit parameter words.
    pub large: bool,
}

impl ForwardOpenParams {
    /// Path length in 16-bit words, as carried in the request.
    pub fn path_words(&self) -> u8 {
        (self.connection_path.len() / 2) as u8
    }
}
