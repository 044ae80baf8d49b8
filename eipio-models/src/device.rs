use crate::{signal::SignalMapping, ValidationError};
use serde::{Deserialize, Serialize};

/// One assembly instance on the target device: a fixed-size byte buffer
/// addressed by its instance id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyConfig {
    pub instance: u16,
    pub size_bytes: u16,
}

impl AssemblyConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.instance == 0 {
            return Err(ValidationError::new(
                "Assembly instance must be greater than zero",
            ));
        }
        if self.size_bytes == 0 {
            return Err(ValidationError::new(
                "Assembly size must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Cyclic connection configuration for a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    pub output_assembly: AssemblyConfig,
    pub input_assembly: AssemblyConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_assembly: Option<AssemblyConfig>,
    /// Requested packet interval in microseconds, applied to both directions.
    #[serde(default = "default_rpi_us")]
    pub rpi_us: u32,
    #[serde(default)]
    pub multicast: bool,
    #[serde(default)]
    pub large_forward_open: bool,
}

fn default_rpi_us() -> u32 {
    100_000
}

impl ConnectionConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.output_assembly
            .validate()
            .map_err(|e| ValidationError::new(format!("Output: {e}")))?;
        self.input_assembly
            .validate()
            .map_err(|e| ValidationError::new(format!("Input: {e}")))?;
        if let Some(config) = &self.config_assembly {
            config
                .validate()
                .map_err(|e| ValidationError::new(format!("Config: {e}")))?;
        }
        if self.rpi_us == 0 {
            return Err(ValidationError::new("RPI must be greater than zero"));
        }
        Ok(())
    }
}

/// A configured field device as supplied by the device registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub name: String,
    pub ip_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eds_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionConfig>,
    #[serde(default)]
    pub signals: Vec<SignalMapping>,
}

fn default_port() -> u16 {
    44818
}

fn default_timeout_ms() -> u32 {
    1000
}

impl Device {
    /// Minimal device with defaults for everything but the address.
    pub fn new(name: impl Into<String>, ip_address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ip_address: ip_address.into(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
            template_ref: None,
            eds_file: None,
            connection: None,
            signals: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::new("Device name is required"));
        }
        if self.ip_address.is_empty() {
            return Err(ValidationError::new("IP address is required"));
        }
        if self.port == 0 {
            return Err(ValidationError::new("Port must be greater than zero"));
        }
        if self.timeout_ms == 0 {
            return Err(ValidationError::new("Timeout must be greater than zero"));
        }
        if let Some(connection) = &self.connection {
            connection.validate()?;
        }
        Ok(())
    }
}
