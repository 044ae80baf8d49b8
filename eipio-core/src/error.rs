use eipio_stack::StackError;
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// Error taxonomy of the I/O core.
///
/// `Configuration` is rejected before any network action and never retried
/// automatically. `Transport` leaves the connection disconnected but
/// reopenable. Short decode buffers are never an error; they yield zero.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<StackError> for CoreError {
    fn from(e: StackError) -> Self {
        CoreError::Transport(e.to_string())
    }
}
