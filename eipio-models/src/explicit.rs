use serde::{Deserialize, Serialize};

/// A one-shot unconnected request routed to a CIP object on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplicitRequest {
    pub service_code: u8,
    pub class_id: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_id: Option<u16>,
    #[serde(default)]
    pub payload: Vec<u8>,
}

/// The routed reply: general status, extended status words and the raw
/// response payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplicitResponse {
    pub general_status: u8,
    #[serde(default)]
    pub additional_status: Vec<u16>,
    #[serde(default)]
    pub response_data: Vec<u8>,
}

impl ExplicitResponse {
    pub fn is_success(&self) -> bool {
        self.general_status == 0
    }
}

/// Identity object contents read back from a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub device_type: u16,
    pub product_code: u16,
    pub revision_major: u8,
    pub revision_minor: u8,
    pub status_word: u16,
    pub serial_number: u32,
    pub product_name: String,
}
