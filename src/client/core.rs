//! Core client: handshake state machine and device registry.
//!
//! [`Client`] drives the connection lifecycle
//! (`Disconnected → Connecting → Handshaking → Ready`), owns the device
//! registry, and fans unsolicited notifications out to subscribers.
//!
//! # Inbound Routing
//!
//! One background task per connection reads frames from the transport and
//! feeds each decoded element to the correlation layer. A message whose
//! identifier matches a pending request resolves that caller; everything
//! else is unsolicited and routed here:
//!
//! | Message | Effect |
//! |---------|--------|
//! | `DeviceAdded` | Registry insert/replace + device-added event |
//! | `DeviceRemoved` | Registry delete (absent index is a no-op) + event |
//! | `ScanningFinished` | Scanning-finished event |
//! | `Log` | Log event |
//! | anything else | Dropped with a diagnostic counter |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::error::Result;
use crate::protocol::{DEFAULT_ID, DeviceInfo, LogLevel, Message, PROTOCOL_MESSAGE_VERSION, codec};
use crate::transport::Connector;

use super::device::ClientDevice;
use super::events::{EventEmitter, HandlerId, LogEntry};
use super::session::{Session, SessionState};

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a client.
pub(crate) struct ClientInner {
    /// Client name, shown by the server in connection status displays.
    name: String,
    /// Shared sending core; device handles hold weak references to it.
    session: Arc<Session>,
    /// Currently known devices keyed by server-assigned index.
    devices: Mutex<FxHashMap<u32, ClientDevice>>,
    /// Name reported by the server during the handshake.
    server_name: Mutex<Option<String>>,
    /// Fired for each device registered from `DeviceList`/`DeviceAdded`.
    device_added: EventEmitter<ClientDevice>,
    /// Fired with the removed handle on `DeviceRemoved`.
    device_removed: EventEmitter<ClientDevice>,
    /// Fired on `ScanningFinished`.
    scanning_finished: EventEmitter<()>,
    /// Fired for each server `Log` line.
    log: EventEmitter<LogEntry>,
}

// ============================================================================
// Client
// ============================================================================

/// A client connection to a device-control server.
///
/// Cheap to clone; clones share the same session.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use intiface_client::{Client, Result, WebsocketConnector};
///
/// # async fn example() -> Result<()> {
/// let client = Client::new("Example Client");
/// client.on_device_added(|device| {
///     println!("device found: {}", device.name());
/// });
///
/// let connector = Arc::new(WebsocketConnector::new("ws://127.0.0.1:12345")?);
/// client.connect(connector).await?;
/// client.start_scanning().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    /// Shared inner state.
    inner: Arc<ClientInner>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("name", &self.inner.name)
            .field("state", &self.inner.session.state())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Client - Constructor
// ============================================================================

impl Client {
    /// Creates a disconnected client with a display name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                name: name.into(),
                session: Arc::new(Session::new()),
                devices: Mutex::new(FxHashMap::default()),
                server_name: Mutex::new(None),
                device_added: EventEmitter::new(),
                device_removed: EventEmitter::new(),
                scanning_finished: EventEmitter::new(),
                log: EventEmitter::new(),
            }),
        }
    }
}

// ============================================================================
// Client - Connection Lifecycle
// ============================================================================

impl Client {
    /// Connects to a server through the given transport.
    ///
    /// Opens the transport, identifies the client, enumerates already
    /// connected devices (firing one device-added event per entry, in
    /// list order), and moves to `Ready`.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Connector`] if the transport fails to open or a
    ///   connection already exists; the state stays `Disconnected`.
    /// - The handshake failure (typically [`crate::Error::Handshake`] or
    ///   [`crate::Error::Message`]) if the server rejects identification
    ///   or replies out of protocol; the transport is closed and the
    ///   state reverts to `Disconnected`.
    pub async fn connect(&self, connector: Arc<dyn Connector>) -> Result<()> {
        self.inner.session.begin_connect()?;

        let frames = match connector.connect().await {
            Ok(frames) => frames,
            Err(e) => {
                self.inner.session.set_state(SessionState::Disconnected);
                return Err(e);
            }
        };

        self.inner.session.install_connector(connector);
        tokio::spawn(ClientInner::run_read_loop(Arc::clone(&self.inner), frames));
        self.inner.session.set_state(SessionState::Handshaking);

        match self.handshake().await {
            Ok(()) => {
                self.inner.session.set_state(SessionState::Ready);
                info!(client = %self.inner.name, "session ready");
                Ok(())
            }
            Err(e) => {
                if let Some(connector) = self.inner.session.take_connector() {
                    let _ = connector.close().await;
                }
                self.inner.session.correlation().fail_all();
                self.inner.session.set_state(SessionState::Disconnected);
                Err(e)
            }
        }
    }

    /// Identifies with the server and enumerates its devices.
    async fn handshake(&self) -> Result<()> {
        let reply = self
            .inner
            .session
            .send_expect_reply(
                Message::RequestServerInfo {
                    client_name: self.inner.name.clone(),
                    message_version: PROTOCOL_MESSAGE_VERSION,
                    id: DEFAULT_ID,
                },
                "ServerInfo",
            )
            .await?;
        if let Message::ServerInfo { server_name, .. } = reply {
            info!(server = %server_name, "identified with server");
            *self.inner.server_name.lock() = Some(server_name);
        }

        let reply = self
            .inner
            .session
            .send_expect_reply(Message::RequestDeviceList { id: 0 }, "DeviceList")
            .await?;
        if let Message::DeviceList { devices, .. } = reply {
            for info in devices {
                self.inner.register_device(info);
            }
        }
        Ok(())
    }

    /// Disconnects from the server.
    ///
    /// A no-op when already disconnected. Outstanding requests are failed
    /// with [`crate::Error::ConnectionClosed`].
    pub async fn disconnect(&self) -> Result<()> {
        let Some(connector) = self.inner.session.take_connector() else {
            return Ok(());
        };
        self.inner.session.set_state(SessionState::Disconnected);
        self.inner.session.correlation().fail_all();
        connector.close().await
    }
}

// ============================================================================
// Client - Server Operations
// ============================================================================

impl Client {
    /// Asks the server to start scanning for devices.
    ///
    /// Returns once the server acknowledges; found devices arrive as
    /// device-added events.
    pub async fn start_scanning(&self) -> Result<()> {
        self.inner
            .session
            .send_expect_ok(Message::StartScanning { id: 0 })
            .await
    }

    /// Asks the server to stop scanning for devices.
    pub async fn stop_scanning(&self) -> Result<()> {
        self.inner
            .session
            .send_expect_ok(Message::StopScanning { id: 0 })
            .await
    }

    /// Subscribes to server log lines at `level` or higher.
    ///
    /// Send [`LogLevel::Off`] to cancel a prior subscription.
    pub async fn request_log(&self, level: LogLevel) -> Result<()> {
        self.inner
            .session
            .send_expect_ok(Message::RequestLog {
                log_level: level.as_str().to_string(),
                id: 0,
            })
            .await
    }

    /// Sends a keepalive ping.
    pub async fn ping(&self) -> Result<()> {
        self.inner.session.send_expect_ok(Message::Ping { id: 0 }).await
    }

    /// Stops all activity on every device the server knows about.
    pub async fn stop_all_devices(&self) -> Result<()> {
        self.inner
            .session
            .send_expect_ok(Message::StopAllDevices { id: 0 })
            .await
    }
}

// ============================================================================
// Client - Subscriptions
// ============================================================================

impl Client {
    /// Subscribes to device-added events.
    pub fn on_device_added(
        &self,
        handler: impl Fn(&ClientDevice) + Send + Sync + 'static,
    ) -> HandlerId {
        self.inner.device_added.subscribe(handler)
    }

    /// Removes a device-added handler.
    pub fn remove_device_added_handler(&self, id: HandlerId) -> bool {
        self.inner.device_added.unsubscribe(id)
    }

    /// Subscribes to device-removed events.
    pub fn on_device_removed(
        &self,
        handler: impl Fn(&ClientDevice) + Send + Sync + 'static,
    ) -> HandlerId {
        self.inner.device_removed.subscribe(handler)
    }

    /// Removes a device-removed handler.
    pub fn remove_device_removed_handler(&self, id: HandlerId) -> bool {
        self.inner.device_removed.unsubscribe(id)
    }

    /// Subscribes to scanning-finished events.
    pub fn on_scanning_finished(&self, handler: impl Fn() + Send + Sync + 'static) -> HandlerId {
        self.inner.scanning_finished.subscribe(move |()| handler())
    }

    /// Removes a scanning-finished handler.
    pub fn remove_scanning_finished_handler(&self, id: HandlerId) -> bool {
        self.inner.scanning_finished.unsubscribe(id)
    }

    /// Subscribes to server log lines (see [`Client::request_log`]).
    pub fn on_log(&self, handler: impl Fn(&LogEntry) + Send + Sync + 'static) -> HandlerId {
        self.inner.log.subscribe(handler)
    }

    /// Removes a log handler.
    pub fn remove_log_handler(&self, id: HandlerId) -> bool {
        self.inner.log.unsubscribe(id)
    }
}

// ============================================================================
// Client - Accessors
// ============================================================================

impl Client {
    /// Returns the client name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.session.state()
    }

    /// Returns `true` while a transport is installed.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.session.is_connected()
    }

    /// Returns the server name reported during the handshake.
    #[must_use]
    pub fn server_name(&self) -> Option<String> {
        self.inner.server_name.lock().clone()
    }

    /// Returns a snapshot of the currently known devices, ordered by
    /// device index.
    #[must_use]
    pub fn devices(&self) -> Vec<ClientDevice> {
        let mut devices: Vec<_> = self.inner.devices.lock().values().cloned().collect();
        devices.sort_by_key(ClientDevice::index);
        devices
    }

    /// Looks up a device by server-assigned index.
    #[must_use]
    pub fn device(&self, index: u32) -> Option<ClientDevice> {
        self.inner.devices.lock().get(&index).cloned()
    }

    /// Sets the reply timeout applied to every request; `None` (the
    /// default) waits indefinitely.
    pub fn set_request_timeout(&self, timeout: Option<Duration>) {
        self.inner.session.set_request_timeout(timeout);
    }

    /// Returns the number of outstanding requests.
    #[must_use]
    pub fn pending_request_count(&self) -> usize {
        self.inner.session.pending_count()
    }

    /// Returns how many replies arrived too late (or unmatched) to be
    /// delivered anywhere.
    #[must_use]
    pub fn stray_reply_count(&self) -> u64 {
        self.inner.session.stray_count()
    }
}

// ============================================================================
// ClientInner - Inbound Path
// ============================================================================

impl ClientInner {
    /// Reads frames from the transport until it closes.
    ///
    /// The only background task of a connection. Decode failures are
    /// isolated per frame element and reported here.
    async fn run_read_loop(inner: Arc<ClientInner>, mut frames: mpsc::UnboundedReceiver<String>) {
        while let Some(frame) = frames.recv().await {
            match codec::decode_frame(&frame) {
                Ok(elements) => {
                    for element in elements {
                        match element {
                            Ok(message) => inner.dispatch(message),
                            Err(e) => warn!(error = %e, "dropping undecodable frame element"),
                        }
                    }
                }
                Err(e) => warn!(error = %e, "dropping undecodable frame"),
            }
        }
        inner.on_transport_closed();
    }

    /// Routes one inbound message: replies to their pending slot,
    /// notifications to the registry and subscribers.
    fn dispatch(&self, message: Message) {
        let Some(message) = self.session.correlation().resolve(message) else {
            return;
        };

        match message {
            Message::DeviceAdded {
                device_name,
                device_index,
                device_messages,
                ..
            } => {
                debug!(name = %device_name, index = device_index, "device added");
                self.register_device(DeviceInfo::new(device_name, device_index, device_messages));
            }
            Message::DeviceRemoved { device_index, .. } => {
                debug!(index = device_index, "device removed");
                self.remove_device(device_index);
            }
            Message::ScanningFinished { .. } => {
                debug!("scanning finished");
                self.scanning_finished.emit(&());
            }
            Message::Log {
                log_level,
                log_message,
                ..
            } => {
                self.log.emit(&LogEntry {
                    level: log_level,
                    message: log_message,
                });
            }
            other => {
                self.session.correlation().record_stray();
                debug!(name = other.name(), id = other.id(), "dropping unmatched message");
            }
        }
    }

    /// Inserts (or replaces) a device and fires the device-added event.
    ///
    /// Every `DeviceList`/`DeviceAdded` entry is authoritative: the
    /// server may reuse an index after removal.
    fn register_device(&self, info: DeviceInfo) {
        let device = ClientDevice::new(info, Arc::downgrade(&self.session));
        self.devices.lock().insert(device.index(), device.clone());
        self.device_added.emit(&device);
    }

    /// Deletes a device by index and fires the device-removed event.
    fn remove_device(&self, index: u32) {
        let removed = self.devices.lock().remove(&index);
        match removed {
            Some(device) => self.device_removed.emit(&device),
            None => trace!(index, "redundant device removal"),
        }
    }

    /// Tears the session down after the transport goes away.
    fn on_transport_closed(&self) {
        self.session.take_connector();
        self.session.set_state(SessionState::Disconnected);
        self.session.correlation().fail_all();
        debug!("transport closed");
    }
}

// ============================================================================
// Tests
// ============================================================================
