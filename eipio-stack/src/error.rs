use std::time::Duration;
use thiserror::Error;

pub type StackResult<T> = Result<T, StackError>;

/// Failures reported by a protocol-stack implementation. The lifecycle layer
/// captures these as opaque text into the connection status.
#[derive(Error, Debug)]
pub enum StackError {
    #[error("Session error: {0}")]
    Session(String),
    #[error("ForwardOpen failed: {0}")]
    ForwardOpen(String),
    #[error("ForwardClose failed: {0}")]
    ForwardClose(String),
    #[error("Request error: {0}")]
    Request(String),
    #[error("Request timed out after {} ms", .0.as_millis())]
    Timeout(Duration),
}
