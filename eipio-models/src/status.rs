use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Live status of one device connection. Created zeroed the first time a
/// connection is requested for the device name and mutated in place for the
/// life of the process; a closed connection stays around as disconnected so
/// it can be reopened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub device_name: String,
    pub connected: bool,
    pub opening: bool,
    pub last_error: String,
    pub packets_sent: u64,
    pub packets_received: u64,
    pub last_sequence: u64,
    #[serde(rename = "lastUpdateMs", with = "chrono::serde::ts_milliseconds")]
    pub last_update: DateTime<Utc>,
}

impl ConnectionStatus {
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            connected: false,
            opening: false,
            last_error: String::new(),
            packets_sent: 0,
            packets_received: 0,
            last_sequence: 0,
            last_update: Utc::now(),
        }
    }
}
