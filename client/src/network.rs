use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use shared::{ClientFrame, Envelope, ServerFrame};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Disconnected,
    Connected,
    Errored,
}

/// Owns at most one socket at a time. The caller's event loop is the only
/// reader and writer, so there are no background tasks to race.
pub struct Connection {
    server_url: String,
    identity: Option<String>,
    liveness: Liveness,
    socket: Option<WsStream>,
}

impl Connection {
    pub fn new(server_url: &str) -> Self {
        Self {
            server_url: server_url.to_string(),
            identity: None,
            liveness: Liveness::Disconnected,
            socket: None,
        }
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness
    }

    pub fn is_connected(&self) -> bool {
        self.liveness == Liveness::Connected
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// One socket per name, percent-encoded into the connect URL query. An
    /// empty name only tears the current socket down; a new name replaces
    /// it. There is no automatic reconnect: a dropped socket stays down
    /// until the next call here.
    pub async fn connect(&mut self, identity: &str) -> Result<(), Box<dyn std::error::Error>> {
        if identity.is_empty() {
            self.close().await;
            self.identity = None;
            return Ok(());
        }
        if self.is_connected() && self.identity.as_deref() == Some(identity) {
            debug!("Already connected as {}", identity);
            return Ok(());
        }
        self.close().await;

        let url = self.connect_url(identity);
        info!("Connecting to {}", url);
        let (socket, _) = connect_async(url.as_str()).await?;
        self.socket = Some(socket);
        self.identity = Some(identity.to_string());
        self.liveness = Liveness::Connected;
        info!("Connected as {}", identity);
        Ok(())
    }

    /// Next decoded frame off the wire. Malformed text is logged and skipped,
    /// the stream keeps going. Returns `None` once the socket is gone, and
    /// keeps returning `None` until a fresh connect.
    pub async fn next_frame(&mut self) -> Option<Envelope<ServerFrame>> {
        loop {
            let socket = self.socket.as_mut()?;
            match socket.next().await {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<Envelope<ServerFrame>>(&text) {
                        Ok(envelope) => return Some(envelope),
                        Err(e) => warn!("Dropping malformed frame: {}", e),
                    }
                }
                Some(Ok(Message::Close(_))) => {
                    info!("Server closed the connection");
                    self.drop_socket(Liveness::Disconnected);
                    return None;
                }
                Some(Ok(_)) => {
                    // ping/pong and binary noise
                }
                Some(Err(e)) => {
                    error!("Transport error: {}", e);
                    self.drop_socket(Liveness::Errored);
                    return None;
                }
                None => {
                    info!("Connection ended");
                    self.drop_socket(Liveness::Disconnected);
                    return None;
                }
            }
        }
    }

    /// Stamps the envelope and sends it. Quietly does nothing while
    /// disconnected.
    pub async fn send(&mut self, frame: ClientFrame) {
        let socket = match self.socket.as_mut() {
            Some(socket) if self.liveness == Liveness::Connected => socket,
            _ => {
                debug!("Not connected, dropping an outbound frame");
                return;
            }
        };
        let envelope = Envelope::now(frame);
        let payload = match serde_json::to_string(&envelope) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Could not encode an outbound frame: {}", e);
                return;
            }
        };
        if let Err(e) = socket.send(Message::text(payload)).await {
            error!("Send failed: {}", e);
            self.drop_socket(Liveness::Errored);
        }
    }

    pub async fn close(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            let _ = socket.close(None).await;
            info!("Connection closed");
        }
        self.liveness = Liveness::Disconnected;
    }

    fn connect_url(&self, identity: &str) -> String {
        format!(
            "{}?username={}",
            self.server_url,
            utf8_percent_encode(identity, NON_ALPHANUMERIC)
        )
    }

    fn drop_socket(&mut self, liveness: Liveness) {
        self.socket = None;
        self.liveness = liveness;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_connection_is_disconnected() {
        let connection = Connection::new("ws://127.0.0.1:8080/ws");
        assert_eq!(connection.liveness(), Liveness::Disconnected);
        assert!(!connection.is_connected());
        assert_eq!(connection.identity(), None);
    }

    #[test]
    fn test_connect_with_empty_name_is_a_no_op() {
        let mut connection = Connection::new("ws://127.0.0.1:8080/ws");
        tokio_test::block_on(connection.connect("")).unwrap();
        assert_eq!(connection.liveness(), Liveness::Disconnected);
        assert_eq!(connection.identity(), None);
    }

    #[test]
    fn test_identity_is_percent_encoded_into_the_url() {
        let connection = Connection::new("ws://127.0.0.1:8080/ws");
        assert_eq!(
            connection.connect_url("alice"),
            "ws://127.0.0.1:8080/ws?username=alice"
        );
        assert_eq!(
            connection.connect_url("al ice"),
            "ws://127.0.0.1:8080/ws?username=al%20ice"
        );
        assert_eq!(
            connection.connect_url("a&b=c?"),
            "ws://127.0.0.1:8080/ws?username=a%26b%3Dc%3F"
        );
    }

    #[test]
    fn test_send_while_disconnected_is_a_no_op() {
        let mut connection = Connection::new("ws://127.0.0.1:8080/ws");
        tokio_test::block_on(connection.send(ClientFrame::LeaveGame));
        assert_eq!(connection.liveness(), Liveness::Disconnected);
    }

    #[test]
    fn test_next_frame_without_a_socket_is_none() {
        let mut connection = Connection::new("ws://127.0.0.1:8080/ws");
        assert!(tokio_test::block_on(connection.next_frame()).is_none());
    }
}
