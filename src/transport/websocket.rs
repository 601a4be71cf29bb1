//! WebSocket transport.
//!
//! [`WebsocketConnector`] connects to a server's WebSocket endpoint and
//! runs one socket task per connection, pumping outbound frames from a
//! channel and forwarding inbound text frames to the client's read loop.
//! Non-text frames (binary, ping, pong) are ignored.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error};
use url::Url;

use crate::error::{Error, Result};

use super::Connector;

// ============================================================================
// WebsocketConnector
// ============================================================================

/// Connects to a server over a WebSocket.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use intiface_client::{Client, Result, WebsocketConnector};
///
/// # async fn example() -> Result<()> {
/// let connector = Arc::new(WebsocketConnector::new("ws://127.0.0.1:12345")?);
/// let client = Client::new("Example Client");
/// client.connect(connector).await?;
/// # Ok(())
/// # }
/// ```
pub struct WebsocketConnector {
    /// Server endpoint.
    url: Url,
    /// Outbound frame channel into the socket task, present while open.
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
}

impl fmt::Debug for WebsocketConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebsocketConnector")
            .field("url", &self.url.as_str())
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl WebsocketConnector {
    /// Creates a connector for a `ws://` or `wss://` address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connector`] if the address does not parse or uses
    /// another scheme.
    pub fn new(address: impl AsRef<str>) -> Result<Self> {
        let address = address.as_ref();
        let url = Url::parse(address)
            .map_err(|e| Error::connector(format!("invalid address {address}: {e}")))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::connector(format!(
                "unsupported scheme {}: expected ws or wss",
                url.scheme()
            )));
        }
        Ok(Self {
            url,
            outbound: Mutex::new(None),
        })
    }

    /// Returns the server endpoint.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait::async_trait]
impl Connector for WebsocketConnector {
    async fn connect(&self) -> Result<mpsc::UnboundedReceiver<String>> {
        if self.is_connected() {
            return Err(Error::connector("already connected"));
        }

        let (stream, _response) = connect_async(self.url.as_str())
            .await
            .map_err(|e| Error::connector(format!("failed to connect to {}: {e}", self.url)))?;
        debug!(url = %self.url, "WebSocket connection established");

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        *self.outbound.lock() = Some(outbound_tx);

        tokio::spawn(run_socket(stream, outbound_rx, inbound_tx));

        Ok(inbound_rx)
    }

    async fn send(&self, frame: String) -> Result<()> {
        let tx = self
            .outbound
            .lock()
            .clone()
            .ok_or_else(|| Error::connector("not connected"))?;
        tx.send(frame).map_err(|_| Error::ConnectionClosed)
    }

    async fn close(&self) -> Result<()> {
        // Dropping the sender makes the socket task send a close frame
        // and exit, which in turn closes the inbound channel.
        self.outbound.lock().take();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.outbound
            .lock()
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }
}

// ============================================================================
// Socket Task
// ============================================================================

/// Pumps the socket until either side goes away.
async fn run_socket(
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    mut outbound: mpsc::UnboundedReceiver<String>,
    inbound: mpsc::UnboundedSender<String>,
) {
    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            frame = outbound.recv() => {
                match frame {
                    Some(text) => {
                        if let Err(e) = sink.send(WsMessage::Text(text.into())).await {
                            error!(error = %e, "WebSocket send failed");
                            break;
                        }
                    }
                    None => {
                        // Local close.
                        let _ = sink.close().await;
                        break;
                    }
                }
            }

            incoming = source.next() => {
                match incoming {
                    Some(Ok(WsMessage::Text(text))) => {
                        if inbound.send(text.to_string()).is_err() {
                            break;
                        }
                    }

                    Some(Ok(WsMessage::Close(_))) => {
                        debug!("WebSocket closed by remote");
                        break;
                    }

                    Some(Err(e)) => {
                        error!(error = %e, "WebSocket error");
                        break;
                    }

                    None => {
                        debug!("WebSocket stream ended");
                        break;
                    }

                    // Ignore Binary, Ping, Pong.
                    _ => {}
                }
            }
        }
    }

    debug!("socket task terminated");
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_scheme() {
        assert!(WebsocketConnector::new("ws://127.0.0.1:12345").is_ok());
        assert!(WebsocketConnector::new("wss://example.com/session").is_ok());

        let err = WebsocketConnector::new("http://127.0.0.1:12345").expect_err("bad scheme");
        assert!(err.is_connector_error());

        let err = WebsocketConnector::new("not a url").expect_err("bad url");
        assert!(err.is_connector_error());
    }

    #[test]
    fn test_starts_disconnected() {
        let connector = WebsocketConnector::new("ws://127.0.0.1:12345").expect("valid");
        assert!(!connector.is_connected());
    }

    #[tokio::test]
    async fn test_send_while_disconnected_fails() {
        let connector = WebsocketConnector::new("ws://127.0.0.1:12345").expect("valid");
        let err = connector
            .send("[]".to_string())
            .await
            .expect_err("not connected");
        assert!(err.is_connector_error());
    }

    #[tokio::test]
    async fn test_connect_refused_yields_connector_error() {
        // Port 1 on localhost should refuse.
        let connector = WebsocketConnector::new("ws://127.0.0.1:1").expect("valid");
        let err = connector.connect().await.expect_err("refused");
        assert!(err.is_connector_error());
        assert!(!connector.is_connected());
    }

    #[tokio::test]
    async fn test_frames_roundtrip_through_echo_server() {
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();

        // Minimal echo server: accepts one connection and echoes text.
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let ws = tokio_tungstenite::accept_async(stream).await.expect("upgrade");
            let (mut sink, mut source) = ws.split();
            while let Some(Ok(message)) = source.next().await {
                if let WsMessage::Text(text) = message
                    && sink.send(WsMessage::Text(text)).await.is_err()
                {
                    break;
                }
            }
        });

        let connector =
            WebsocketConnector::new(format!("ws://127.0.0.1:{port}")).expect("valid");
        let mut frames = connector.connect().await.expect("connect");
        assert!(connector.is_connected());

        connector
            .send(r#"[{"Ok":{"Id":1}}]"#.to_string())
            .await
            .expect("send");
        let echoed = frames.recv().await.expect("echo");
        assert_eq!(echoed, r#"[{"Ok":{"Id":1}}]"#);

        connector.close().await.expect("close");
        assert!(frames.recv().await.is_none());
        assert!(!connector.is_connected());
    }
}
