pub mod device;
pub mod explicit;
pub mod signal;
pub mod status;

use thiserror::Error;

pub use device::{AssemblyConfig, ConnectionConfig, Device};
pub use explicit::{DeviceIdentity, ExplicitRequest, ExplicitResponse};
pub use signal::{SignalDirection, SignalEnumOption, SignalMapping, SignalType, SignalValue};
pub use status::ConnectionStatus;

/// A model-level validation failure. Carries the human-readable reason that
/// callers surface verbatim (repository rejections, pre-open checks).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
