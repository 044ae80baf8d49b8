use crate::error::{CoreError, CoreResult};
use async_trait::async_trait;
use eipio_models::{Device, ExplicitRequest, ExplicitResponse};
use eipio_stack::{EPath, ProtocolStack};
use std::{sync::Arc, time::Duration};
use tracing::{debug, instrument};

/// One-shot explicit messaging to a device, independent of any cyclic
/// connection.
#[async_trait]
pub trait ExplicitMessaging: Send + Sync {
    async fn send(
        &self,
        device: &Device,
        request: &ExplicitRequest,
    ) -> CoreResult<ExplicitResponse>;
}

/// Routes each request over a fresh session scoped to the call. A nonzero
/// general status in the reply is data, not an error; only transport
/// failures map to `CoreError`.
pub struct EipExplicitMessaging {
    stack: Arc<dyn ProtocolStack>,
}

impl EipExplicitMessaging {
    pub fn new(stack: Arc<dyn ProtocolStack>) -> Self {
        Self { stack }
    }
}

fn request_path(request: &ExplicitRequest) -> EPath {
    match (request.instance_id, request.attribute_id) {
        (Some(instance), Some(attribute)) => {
            EPath::attribute(request.class_id, instance, attribute)
        }
        (Some(instance), None) => EPath::instance(request.class_id, instance),
        _ => EPath::class(request.class_id),
    }
}

#[async_trait]
impl ExplicitMessaging for EipExplicitMessaging {
    #[instrument(level = "debug", skip_all, fields(device = %device.name, service = request.service_code))]
    async fn send(
        &self,
        device: &Device,
        request: &ExplicitRequest,
    ) -> CoreResult<ExplicitResponse> {
        let timeout = Duration::from_millis(device.timeout_ms as u64);
        let session = self
            .stack
            .open_session(&device.ip_address, device.port, timeout)
            .await?;
        let response = self
            .stack
            .message_router()
            .send_request(
                session,
                request.service_code,
                request_path(request),
                &request.payload,
            )
            .await?;
        debug!(
            status = response.general_status,
            bytes = response.response_data.len(),
            "explicit response"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_depth_follows_the_request() {
        let mut request = ExplicitRequest {
            service_code: 0x0E,
            class_id: 0x01,
            instance_id: None,
            attribute_id: None,
            payload: Vec::new(),
        };
        assert_eq!(request_path(&request), EPath::class(0x01));

        request.instance_id = Some(1);
        assert_eq!(request_path(&request), EPath::instance(0x01, 1));

        request.attribute_id = Some(7);
        assert_eq!(request_path(&request), EPath::attribute(0x01, 1, 7));
    }

    #[test]
    fn attribute_without_instance_falls_back_to_class() {
        let request = ExplicitRequest {
            service_code: 0x0E,
            class_id: 0x04,
            instance_id: None,
            attribute_id: Some(3),
            payload: Vec::new(),
        };
        assert_eq!(request_path(&request), EPath::class(0x04));
    }
}
