use crate::{
    builder,
    error::{CoreError, CoreResult},
    signals::SignalService,
};
use bytes::Bytes;
use chrono::Utc;
use eipio_models::{ConnectionStatus, Device};
use eipio_stack::{ConnectionManager, IoConnection, ProtocolStack, SessionHandle};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Tick of the background servicing loop.
const SERVICE_INTERVAL: Duration = Duration::from_millis(50);
/// Time budget handed to each connection manager per tick.
const SERVICE_BUDGET: Duration = Duration::from_millis(1);

struct ConnectionEntry {
    device: Device,
    status: ConnectionStatus,
    session: Option<Arc<dyn SessionHandle>>,
    manager: Option<Arc<dyn ConnectionManager>>,
    connection: Option<Arc<dyn IoConnection>>,
}

impl ConnectionEntry {
    fn new(device: Device) -> Self {
        let status = ConnectionStatus::new(device.name.clone());
        Self {
            device,
            status,
            session: None,
            manager: None,
            connection: None,
        }
    }

    fn touch(&mut self) {
        self.status.last_update = Utc::now();
    }

    fn mark_error(&mut self, message: impl Into<String>) {
        self.status.connected = false;
        self.status.opening = false;
        self.status.last_error = message.into();
        self.touch();
    }
}

struct SupervisorInner {
    stack: Arc<dyn ProtocolStack>,
    signals: Arc<SignalService>,
    entries: Mutex<HashMap<String, ConnectionEntry>>,
}

/// Per-device cyclic connection lifecycle.
///
/// One entry per device name that has ever been opened; entries persist as
/// disconnected after a close so the connection can be reopened. All entry
/// state sits behind one lock that is never held across an await; transport
/// callbacks take the same lock, so callbacks and API calls interleave but
/// never run concurrently on the same entry.
pub struct ConnectionSupervisor {
    inner: Arc<SupervisorInner>,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionSupervisor {
    /// Create the supervisor and spawn its servicing loop. Must be called
    /// from within a tokio runtime.
    pub fn new(stack: Arc<dyn ProtocolStack>, signals: Arc<SignalService>) -> Self {
        let inner = Arc::new(SupervisorInner {
            stack,
            signals,
            entries: Mutex::new(HashMap::new()),
        });
        let cancel = CancellationToken::new();
        let worker = tokio::spawn(Self::service_loop(Arc::clone(&inner), cancel.child_token()));
        Self {
            inner,
            cancel,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Drives keep-alive/retransmission of every live connection, whether or
    /// not any caller is polling. Each tick snapshots the manager handles
    /// under the lock, stamps every entry, then services outside the lock.
    async fn service_loop(inner: Arc<SupervisorInner>, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(SERVICE_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let managers: Vec<Arc<dyn ConnectionManager>> = {
                let mut entries = inner.entries.lock().unwrap();
                let now = Utc::now();
                entries
                    .values_mut()
                    .filter_map(|entry| {
                        entry.status.last_update = now;
                        entry.manager.clone()
                    })
                    .collect()
            };

            for manager in managers {
                manager.service(SERVICE_BUDGET).await;
            }
        }
        debug!("connection servicing loop stopped");
    }

    /// Open the cyclic connection for a device.
    ///
    /// Idempotent: an entry already connected or opening reports success
    /// without a second transport call. The opening flag is set in the same
    /// locked section that admits the attempt, so at most one open is in
    /// flight per device.
    #[instrument(level = "info", skip_all, fields(device = %device.name))]
    pub async fn open(&self, device: &Device) -> CoreResult<()> {
        let Some(config) = device.connection.clone() else {
            return Err(CoreError::Configuration(
                "Device has no connection configuration".to_string(),
            ));
        };
        config
            .validate()
            .map_err(|e| CoreError::Configuration(e.0))?;

        {
            let mut entries = self.inner.entries.lock().unwrap();
            let entry = entries
                .entry(device.name.clone())
                .or_insert_with(|| ConnectionEntry::new(device.clone()));
            entry.device = device.clone();
            entry.status.device_name = device.name.clone();
            if entry.status.connected || entry.status.opening {
                return Ok(());
            }
            entry.status.opening = true;
            entry.status.last_error.clear();
            entry.touch();
        }

        match self.try_open(device, &config).await {
            Ok((session, manager, connection)) => {
                let mut entries = self.inner.entries.lock().unwrap();
                if let Some(entry) = entries.get_mut(&device.name) {
                    entry.session = Some(session);
                    entry.manager = Some(manager);
                    entry.connection = Some(connection);
                    entry.status.connected = true;
                    entry.status.opening = false;
                    entry.status.last_error.clear();
                    entry.touch();
                }
                info!("connection opened");
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                let mut entries = self.inner.entries.lock().unwrap();
                if let Some(entry) = entries.get_mut(&device.name) {
                    entry.mark_error(&message);
                }
                warn!(error = %message, "connection open failed");
                Err(e)
            }
        }
    }

    async fn try_open(
        &self,
        device: &Device,
        config: &eipio_models::ConnectionConfig,
    ) -> CoreResult<(
        Arc<dyn SessionHandle>,
        Arc<dyn ConnectionManager>,
        Arc<dyn IoConnection>,
    )> {
        let timeout = Duration::from_millis(device.timeout_ms as u64);
        let session = self
            .inner
            .stack
            .open_session(&device.ip_address, device.port, timeout)
            .await?;
        let manager = self.inner.stack.connection_manager();
        let params = builder::build_forward_open(config);
        let connection = manager.forward_open(Arc::clone(&session), params).await?;

        self.attach_handlers(&device.name, connection.as_ref());
        Ok((session, manager, connection))
    }

    /// Wire the transport callbacks: counters on the entry, raw buffers
    /// through the signal service in both directions.
    fn attach_handlers(&self, device_name: &str, connection: &dyn IoConnection) {
        let weak = Arc::downgrade(&self.inner);
        let name = device_name.to_string();
        connection.set_receive_handler(Arc::new(move |data: Bytes| {
            let Some(inner) = weak.upgrade() else { return };
            {
                let mut entries = inner.entries.lock().unwrap();
                let Some(entry) = entries.get_mut(&name) else {
                    return;
                };
                entry.status.packets_received += 1;
                if !data.is_empty() {
                    entry.status.last_sequence += 1;
                }
                entry.touch();
            }
            if !data.is_empty() {
                inner.signals.consume_input_bytes(&name, &data);
            }
        }));

        let weak = Arc::downgrade(&self.inner);
        let name = device_name.to_string();
        connection.set_send_handler(Arc::new(move |buffer: &mut Vec<u8>| {
            let Some(inner) = weak.upgrade() else { return };
            let output_size = {
                let mut entries = inner.entries.lock().unwrap();
                let Some(entry) = entries.get_mut(&name) else {
                    return;
                };
                entry.status.packets_sent += 1;
                entry.touch();
                entry
                    .device
                    .connection
                    .as_ref()
                    .map(|c| c.output_assembly.size_bytes as usize)
                    .unwrap_or(0)
            };
            inner.signals.fill_output_bytes(&name, buffer);
            // The transport expects a buffer sized exactly to the output
            // assembly, zero-filled where no signal wrote.
            buffer.resize(output_size, 0);
        }));

        let weak = Arc::downgrade(&self.inner);
        let name = device_name.to_string();
        connection.set_close_handler(Arc::new(move || {
            let Some(inner) = weak.upgrade() else { return };
            let mut entries = inner.entries.lock().unwrap();
            if let Some(entry) = entries.get_mut(&name) {
                entry.mark_error("Connection closed by target");
            }
        }));
    }

    /// Close a device's connection. The flags and the live connection handle
    /// are cleared even when the graceful close itself fails; unknown names
    /// fail without creating an entry.
    #[instrument(level = "info", skip_all, fields(device = device_name))]
    pub async fn close(&self, device_name: &str) -> CoreResult<()> {
        let handles = {
            let mut entries = self.inner.entries.lock().unwrap();
            let entry = entries
                .get_mut(device_name)
                .ok_or_else(|| CoreError::NotFound("No such connection".to_string()))?;
            let handles = match (&entry.manager, &entry.session, entry.connection.take()) {
                (Some(manager), Some(session), Some(connection)) => {
                    Some((Arc::clone(manager), Arc::clone(session), connection))
                }
                _ => None,
            };
            entry.status.connected = false;
            entry.status.opening = false;
            entry.touch();
            handles
        };

        if let Some((manager, session, connection)) = handles {
            if let Err(e) = manager.forward_close(session, connection).await {
                warn!(error = %e, "graceful close failed");
            }
        }
        info!("connection closed");
        Ok(())
    }

    /// Snapshot of one device's status.
    pub fn status(&self, device_name: &str) -> Option<ConnectionStatus> {
        let entries = self.inner.entries.lock().unwrap();
        entries.get(device_name).map(|entry| entry.status.clone())
    }

    /// Snapshot of every known entry's status, unordered.
    pub fn list_statuses(&self) -> Vec<ConnectionStatus> {
        let entries = self.inner.entries.lock().unwrap();
        entries.values().map(|entry| entry.status.clone()).collect()
    }

    /// Stop the servicing loop and wait for it to exit. No callback from the
    /// loop runs after this returns.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let worker = self.worker.lock().unwrap().take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                warn!(error = %e, "servicing loop join failed");
            }
        }
    }
}

impl Drop for ConnectionSupervisor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
