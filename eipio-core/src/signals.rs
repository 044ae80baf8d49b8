use crate::{
    codec,
    error::{CoreError, CoreResult},
    text,
};
use eipio_models::{SignalDirection, SignalMapping, SignalValue};
use std::{
    collections::HashMap,
    sync::Mutex,
};
use tracing::debug;

/// Serialized renditions of a mapping table. Both round-trip losslessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingFormat {
    Json,
    Text,
}

#[derive(Default)]
struct DeviceSignals {
    mappings: Vec<SignalMapping>,
    outputs: HashMap<String, f64>,
    inputs: HashMap<String, f64>,
    last_input: Vec<u8>,
    last_output: Vec<u8>,
}

/// Per-device signal tables with cached engineering values.
///
/// Every public operation takes the single internal lock for the duration of
/// the map access and returns copies; independent devices never share state.
#[derive(Default)]
pub struct SignalService {
    devices: Mutex<HashMap<String, DeviceSignals>>,
}

impl SignalService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the device's table. Value caches are reset to zero for
    /// exactly the names now present; entries of removed signals are
    /// discarded.
    pub fn apply_mappings(&self, device_name: &str, mappings: Vec<SignalMapping>) {
        let mut devices = self.devices.lock().unwrap();
        let device = devices.entry(device_name.to_string()).or_default();
        device.inputs.clear();
        device.outputs.clear();
        for mapping in &mappings {
            match mapping.direction {
                SignalDirection::Output => device.outputs.insert(mapping.name.clone(), 0.0),
                SignalDirection::Input => device.inputs.insert(mapping.name.clone(), 0.0),
            };
        }
        debug!(
            device = device_name,
            count = mappings.len(),
            "signal mappings applied"
        );
        device.mappings = mappings;
    }

    /// Current table, empty when none has been applied.
    pub fn mappings(&self, device_name: &str) -> Vec<SignalMapping> {
        let devices = self.devices.lock().unwrap();
        devices
            .get(device_name)
            .map(|d| d.mappings.clone())
            .unwrap_or_default()
    }

    /// One `SignalValue` per mapping, engineering value taken from the
    /// direction's cache, raw value derived from it.
    pub fn snapshot(&self, device_name: &str) -> Vec<SignalValue> {
        let devices = self.devices.lock().unwrap();
        let Some(device) = devices.get(device_name) else {
            return Vec::new();
        };
        device
            .mappings
            .iter()
            .map(|mapping| {
                let cache = match mapping.direction {
                    SignalDirection::Output => &device.outputs,
                    SignalDirection::Input => &device.inputs,
                };
                let engineering = cache.get(&mapping.name).copied().unwrap_or(0.0);
                SignalValue::from_engineering(mapping.clone(), engineering)
            })
            .collect()
    }

    /// Update the cached engineering value of an output signal. Fails
    /// without mutating anything when the name is unknown or not an output.
    pub fn set_output_value(
        &self,
        device_name: &str,
        signal_name: &str,
        engineering_value: f64,
    ) -> CoreResult<()> {
        let mut devices = self.devices.lock().unwrap();
        let device = devices
            .get_mut(device_name)
            .ok_or_else(|| CoreError::NotFound(format!("No signals for device {device_name}")))?;
        let is_output = device.mappings.iter().any(|m| {
            m.name == signal_name && m.direction == SignalDirection::Output
        });
        if !is_output {
            return Err(CoreError::NotFound(format!(
                "No output signal {signal_name} on device {device_name}"
            )));
        }
        device
            .outputs
            .insert(signal_name.to_string(), engineering_value);
        Ok(())
    }

    /// Decode every input-direction mapping out of `data` and retain the
    /// buffer as the last-input snapshot.
    pub fn consume_input_bytes(&self, device_name: &str, data: &[u8]) {
        let mut devices = self.devices.lock().unwrap();
        let device = devices.entry(device_name.to_string()).or_default();
        for mapping in &device.mappings {
            if mapping.direction == SignalDirection::Input {
                device
                    .inputs
                    .insert(mapping.name.clone(), codec::decode_value(mapping, data));
            }
        }
        device.last_input = data.to_vec();
    }

    /// Encode every output-direction mapping into `buffer`, growing it as
    /// needed, and retain the result as the last-output snapshot.
    pub fn fill_output_bytes(&self, device_name: &str, buffer: &mut Vec<u8>) {
        let mut devices = self.devices.lock().unwrap();
        let device = devices.entry(device_name.to_string()).or_default();
        for mapping in &device.mappings {
            if mapping.direction == SignalDirection::Output {
                let engineering = device.outputs.get(&mapping.name).copied().unwrap_or(0.0);
                codec::encode_value(mapping, engineering, buffer);
            }
        }
        device.last_output = buffer.clone();
    }

    /// Raw-buffer snapshots retained by the last consume/fill, for
    /// inspection surfaces.
    pub fn last_buffers(&self, device_name: &str) -> (Vec<u8>, Vec<u8>) {
        let devices = self.devices.lock().unwrap();
        devices
            .get(device_name)
            .map(|d| (d.last_input.clone(), d.last_output.clone()))
            .unwrap_or_default()
    }

    /// Serialize the device's table. An unknown device exports an empty
    /// table.
    pub fn export_mappings(&self, device_name: &str, format: MappingFormat) -> CoreResult<String> {
        let mappings = self.mappings(device_name);
        match format {
            MappingFormat::Json => serde_json::to_string_pretty(&mappings)
                .map_err(|e| CoreError::Parse(e.to_string())),
            MappingFormat::Text => Ok(text::export_mappings(&mappings)),
        }
    }

    /// Parse a serialized table. Parsing is all-or-nothing: a malformed
    /// payload yields an error and no table; nothing is applied here.
    pub fn import_mappings(
        &self,
        payload: &str,
        format: MappingFormat,
    ) -> CoreResult<Vec<SignalMapping>> {
        if payload.trim().is_empty() {
            return Ok(Vec::new());
        }
        match format {
            MappingFormat::Json => serde_json::from_str(payload).map_err(|e| {
                CoreError::Parse(format!("Failed to parse mapping payload: {e}"))
            }),
            MappingFormat::Text => text::import_mappings(payload),
        }
    }
}
