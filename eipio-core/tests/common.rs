#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use eipio_models::{
    AssemblyConfig, ConnectionConfig, Device, ExplicitResponse, SignalDirection, SignalMapping,
    SignalType,
};
use eipio_stack::{
    CloseHandler, ConnectionManager, EPath, ForwardOpenParams, IoConnection, MessageRouter,
    ProtocolStack, ReceiveHandler, SendHandler, SessionHandle, StackError, StackResult,
};
use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex, Once,
    },
    time::Duration,
};
use tracing::Level;

/// Global one-time tracing initialization guard for integration tests.
static INIT_TRACING: Once = Once::new();

/// Initialize a compact `tracing` subscriber so lifecycle transitions are
/// visible when a test fails.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_target(false)
            .without_time()
            .try_init();
    });
}

#[derive(Debug)]
pub struct MockSession {
    pub host: String,
    pub port: u16,
}

impl SessionHandle for MockSession {
    fn host(&self) -> &str {
        &self.host
    }

    fn port(&self) -> u16 {
        self.port
    }
}

/// A cyclic connection that records the handlers the core attaches so tests
/// can fire them as if the transport had.
#[derive(Default)]
pub struct MockConnection {
    receive: Mutex<Option<ReceiveHandler>>,
    send: Mutex<Option<SendHandler>>,
    close: Mutex<Option<CloseHandler>>,
}

impl MockConnection {
    pub fn fire_receive(&self, data: Bytes) {
        let handler = self.receive.lock().unwrap().clone();
        if let Some(handler) = handler {
            handler(data);
        }
    }

    /// Invoke the send handler on an empty buffer and return what it built.
    pub fn fire_send(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        let handler = self.send.lock().unwrap().clone();
        if let Some(handler) = handler {
            handler(&mut buffer);
        }
        buffer
    }

    pub fn fire_close(&self) {
        let handler = self.close.lock().unwrap().clone();
        if let Some(handler) = handler {
            handler();
        }
    }

    pub fn has_handlers(&self) -> bool {
        self.receive.lock().unwrap().is_some()
            && self.send.lock().unwrap().is_some()
            && self.close.lock().unwrap().is_some()
    }
}

impl IoConnection for MockConnection {
    fn set_receive_handler(&self, handler: ReceiveHandler) {
        *self.receive.lock().unwrap() = Some(handler);
    }

    fn set_send_handler(&self, handler: SendHandler) {
        *self.send.lock().unwrap() = Some(handler);
    }

    fn set_close_handler(&self, handler: CloseHandler) {
        *self.close.lock().unwrap() = Some(handler);
    }
}

#[derive(Default)]
pub struct MockState {
    pub sessions_opened: AtomicUsize,
    pub forward_opens: AtomicUsize,
    pub forward_closes: AtomicUsize,
    pub service_calls: AtomicUsize,
    pub fail_session: AtomicBool,
    pub fail_forward_open: AtomicBool,
    pub fail_forward_close: AtomicBool,
    pub open_params: Mutex<Vec<ForwardOpenParams>>,
    pub connections: Mutex<Vec<Arc<MockConnection>>>,
    pub explicit_requests: Mutex<Vec<(u8, EPath, Vec<u8>)>>,
    pub explicit_response: Mutex<ExplicitResponse>,
}

/// An in-memory protocol stack double. The same object serves as session
/// opener, connection manager and message router; every interaction is
/// recorded on [`MockState`].
#[derive(Clone, Default)]
pub struct MockStack {
    pub state: Arc<MockState>,
}

impl MockStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// The connection created by the n-th ForwardOpen.
    pub fn connection(&self, index: usize) -> Arc<MockConnection> {
        Arc::clone(&self.state.connections.lock().unwrap()[index])
    }

    pub fn set_explicit_response(&self, response: ExplicitResponse) {
        *self.state.explicit_response.lock().unwrap() = response;
    }
}

#[async_trait]
impl ProtocolStack for MockStack {
    async fn open_session(
        &self,
        host: &str,
        port: u16,
        _timeout: Duration,
    ) -> StackResult<Arc<dyn SessionHandle>> {
        if self.state.fail_session.load(Ordering::SeqCst) {
            return Err(StackError::Session(format!("no route to {host}")));
        }
        self.state.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockSession {
            host: host.to_string(),
            port,
        }))
    }

    fn connection_manager(&self) -> Arc<dyn ConnectionManager> {
        Arc::new(self.clone())
    }

    fn message_router(&self) -> Arc<dyn MessageRouter> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl ConnectionManager for MockStack {
    async fn forward_open(
        &self,
        _session: Arc<dyn SessionHandle>,
        params: ForwardOpenParams,
    ) -> StackResult<Arc<dyn IoConnection>> {
        if self.state.fail_forward_open.load(Ordering::SeqCst) {
            return Err(StackError::ForwardOpen("target rejected the open".into()));
        }
        self.state.forward_opens.fetch_add(1, Ordering::SeqCst);
        self.state.open_params.lock().unwrap().push(params);
        let connection = Arc::new(MockConnection::default());
        self.state
            .connections
            .lock()
            .unwrap()
            .push(Arc::clone(&connection));
        Ok(connection)
    }

    async fn forward_close(
        &self,
        _session: Arc<dyn SessionHandle>,
        _connection: Arc<dyn IoConnection>,
    ) -> StackResult<()> {
        self.state.forward_closes.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_forward_close.load(Ordering::SeqCst) {
            return Err(StackError::ForwardClose("close refused".into()));
        }
        Ok(())
    }

    async fn service(&self, _budget: Duration) {
        self.state.service_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageRouter for MockStack {
    async fn send_request(
        &self,
        _session: Arc<dyn SessionHandle>,
        service_code: u8,
        path: EPath,
        payload: &[u8],
    ) -> StackResult<ExplicitResponse> {
        self.state
            .explicit_requests
            .lock()
            .unwrap()
            .push((service_code, path, payload.to_vec()));
        Ok(self.state.explicit_response.lock().unwrap().clone())
    }
}

/// A device with a 4-byte output and 8-byte input assembly pair.
pub fn test_device(name: &str) -> Device {
    let mut device = Device::new(name, "192.168.1.20");
    device.connection = Some(ConnectionConfig {
        output_assembly: AssemblyConfig {
            instance: 0x96,
            size_bytes: 4,
        },
        input_assembly: AssemblyConfig {
            instance: 0x64,
            size_bytes: 8,
        },
        config_assembly: None,
        rpi_us: 10_000,
        multicast: false,
        large_forward_open: false,
    });
    device
}

pub fn mapping(
    name: &str,
    direction: SignalDirection,
    signal_type: SignalType,
    byte_offset: u16,
) -> SignalMapping {
    SignalMapping {
        name: name.to_string(),
        direction,
        signal_type,
        byte_offset,
        bit_offset: None,
        scale: 1.0,
        engineering_offset: 0.0,
        units: String::new(),
        enums: Vec::new(),
    }
}
