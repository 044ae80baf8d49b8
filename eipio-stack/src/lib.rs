pub mod epath;
pub mod error;
pub mod params;
pub mod traits;

pub use epath::EPath;
pub use error::{StackError, StackResult};
pub use params::{
    ConnectionPriority, ConnectionType, ForwardOpenParams, NetworkConnectionParams,
};
pub use traits::{
    CloseHandler, ConnectionManager, IoConnection, MessageRouter, ProtocolStack, ReceiveHandler,
    SendHandler, SessionHandle,
};

/// Common CIP service codes used by the one-shot helpers.
pub mod services {
    pub const GET_ATTRIBUTES_ALL: u8 = 0x01;
    pub const GET_ATTRIBUTE_SINGLE: u8 = 0x0E;
    pub const SET_ATTRIBUTE_SINGLE: u8 = 0x10;
}
