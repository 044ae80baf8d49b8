use crate::{epath::EPath, error::StackResult, params::ForwardOpenParams};
use async_trait::async_trait;
use bytes::Bytes;
use eipio_models::ExplicitResponse;
use std::{fmt::Debug, sync::Arc, time::Duration};

/// Called with the raw payload of every received cyclic packet. May be
/// invoked from a transport-owned thread.
pub type ReceiveHandler = Arc<dyn Fn(Bytes) + Send + Sync>;

/// Called to fill the buffer of every outgoing cyclic packet. The handler
/// owns the final size of the buffer. May be invoked from a transport-owned
/// thread.
pub type SendHandler = Arc<dyn Fn(&mut Vec<u8>) + Send + Sync>;

/// Called once when the target or the transport closes the connection.
pub type CloseHandler = Arc<dyn Fn() + Send + Sync>;

/// An established, timed session to one device.
pub trait SessionHandle: Send + Sync + Debug {
    fn host(&self) -> &str;
    fn port(&self) -> u16;
}

/// A live cyclic connection returned by a ForwardOpen.
pub trait IoConnection: Send + Sync {
    fn set_receive_handler(&self, handler: ReceiveHandler);
    fn set_send_handler(&self, handler: SendHandler);
    fn set_close_handler(&self, handler: CloseHandler);
}

/// Owner of cyclic connections on a session: opens and closes them and
/// drives their keep-alive/retransmission when serviced.
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn forward_open(
        &self,
        session: Arc<dyn SessionHandle>,
        params: ForwardOpenParams,
    ) -> StackResult<Arc<dyn IoConnection>>;

    async fn forward_close(
        &self,
        session: Arc<dyn SessionHandle>,
        connection: Arc<dyn IoConnection>,
    ) -> StackResult<()>;

    /// Service all open connections for at most `budget`. Must be called
    /// periodically for cyclic traffic to flow.
    async fn service(&self, budget: Duration);
}

/// One-shot request/response routing over a session.
#[async_trait]
pub trait MessageRouter: Send + Sync {
    async fn send_request(
        &self,
        session: Arc<dyn SessionHandle>,
        service_code: u8,
        path: EPath,
        payload: &[u8],
    ) -> StackResult<ExplicitResponse>;
}

/// Entry point into a protocol-stack implementation. Framing, handshakes and
/// checksums live entirely behind this trait.
#[async_trait]
pub trait ProtocolStack: Send + Sync {
    async fn open_session(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> StackResult<Arc<dyn SessionHandle>>;

    fn connection_manager(&self) -> Arc<dyn ConnectionManager>;

    fn message_router(&self) -> Arc<dyn MessageRouter>;
}
