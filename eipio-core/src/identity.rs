use crate::{
    error::{CoreError, CoreResult},
    messaging::ExplicitMessaging,
};
use async_trait::async_trait;
use eipio_models::{Device, DeviceIdentity, ExplicitRequest};
use eipio_stack::services;
use std::sync::Arc;
use tracing::instrument;

const IDENTITY_CLASS: u16 = 0x01;
const IDENTITY_INSTANCE: u16 = 1;

/// Reads the Identity object back from a device.
#[async_trait]
pub trait IdentityReader: Send + Sync {
    async fn read_identity(&self, device: &Device) -> CoreResult<DeviceIdentity>;
}

/// Issues a Get_Attributes_All against Identity instance 1 and decodes the
/// fixed attribute block.
pub struct EipIdentityReader {
    messaging: Arc<dyn ExplicitMessaging>,
}

impl EipIdentityReader {
    pub fn new(messaging: Arc<dyn ExplicitMessaging>) -> Self {
        Self { messaging }
    }
}

#[async_trait]
impl IdentityReader for EipIdentityReader {
    #[instrument(level = "debug", skip_all, fields(device = %device.name))]
    async fn read_identity(&self, device: &Device) -> CoreResult<DeviceIdentity> {
        let request = ExplicitRequest {
            service_code: services::GET_ATTRIBUTES_ALL,
            class_id: IDENTITY_CLASS,
            instance_id: Some(IDENTITY_INSTANCE),
            attribute_id: None,
            payload: Vec::new(),
        };
        let response = self.messaging.send(device, &request).await?;
        if !response.is_success() {
            return Err(CoreError::Transport(format!(
                "Identity read failed with CIP status 0x{:02X}",
                response.general_status
            )));
        }
        parse_identity(&response.response_data)
    }
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

/// Decode the Get_Attributes_All reply of the Identity object: seven fixed
/// fields followed by the product name as a SHORT_STRING.
pub fn parse_identity(data: &[u8]) -> CoreResult<DeviceIdentity> {
    // Fixed fields through the serial number, plus the name length byte.
    if data.len() < 15 {
        return Err(CoreError::Parse(format!(
            "Identity response too short: {} bytes",
            data.len()
        )));
    }
    let name_len = data[14] as usize;
    let name_bytes = data
        .get(15..15 + name_len)
        .ok_or_else(|| CoreError::Parse("Identity product name truncated".to_string()))?;
    Ok(DeviceIdentity {
        vendor_id: read_u16(data, 0),
        device_type: read_u16(data, 2),
        product_code: read_u16(data, 4),
        revision_major: data[6],
        revision_minor: data[7],
        status_word: read_u16(data, 8),
        serial_number: u32::from_le_bytes([data[10], data[11], data[12], data[13]]),
        product_name: String::from_utf8_lossy(name_bytes).into_owned(),
    })
}
