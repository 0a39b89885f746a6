use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as Msg};

use super::*;
use crate::api::{HitboxClient, RequestOptions};
use crate::query::QueryParams;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

const OUTGOING_QUEUE: usize = 64;

/// A live chat socket. Dropping the handle closes the socket.
pub(crate) struct ChatConnection {
    outgoing_tx: mpsc::Sender<String>,
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl ChatConnection {
    fn spawn(ws: WsStream, listeners: Listeners) -> Self {
        let (outgoing_tx, outgoing_rx) = mpsc::channel::<String>(OUTGOING_QUEUE);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let task = tokio::spawn(Self::run_loop(ws, listeners, outgoing_rx, shutdown_rx));
        Self {
            outgoing_tx,
            shutdown_tx,
            task,
        }
    }

    fn is_open(&self) -> bool {
        !self.task.is_finished()
    }

    async fn send(&self, text: String) -> Result<(), HitboxError> {
        self.outgoing_tx
            .send(text)
            .await
            .map_err(|_| HitboxError::NotConnected)
    }

    async fn close(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.task.await;
    }

    async fn run_loop<S>(
        mut ws: S,
        listeners: Listeners,
        mut outgoing_rx: mpsc::Receiver<String>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) where
        S: Stream<Item = Result<Msg, WsError>> + Sink<Msg, Error = WsError> + Unpin,
    {
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Chat socket shutdown requested");
                    let _ = ws.close().await;
                    return;
                }
                Some(text) = outgoing_rx.recv() => {
                    if let Err(e) = ws.send(Msg::Text(text.into())).await {
                        tracing::warn!(error = %e, "Chat send failed, closing socket");
                        return;
                    }
                }
                frame = ws.next() => {
                    match frame {
                        Some(Ok(Msg::Text(text))) => {
                            if text.as_str() == HEARTBEAT {
                                tracing::trace!("Chat heartbeat received");
                                let reply = Msg::Text(HEARTBEAT.to_string().into());
                                if let Err(e) = ws.send(reply).await {
                                    tracing::warn!(
                                        error = %e,
                                        "Chat heartbeat reply failed, closing socket"
                                    );
                                    return;
                                }
                            } else {
                                listeners.broadcast(&ChatMessage::new(text.as_str()));
                            }
                        }
                        Some(Ok(Msg::Ping(data))) => {
                            if let Err(e) = ws.send(Msg::Pong(data)).await {
                                tracing::warn!(error = %e, "Chat pong failed, closing socket");
                                return;
                            }
                        }
                        Some(Ok(Msg::Close(_))) | None => {
                            tracing::warn!("Chat socket closed by server");
                            return;
                        }
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Chat socket error");
                            return;
                        }
                        Some(Ok(_)) => {}
                    }
                }
            }
        }
    }
}

impl HitboxClient {
    /// Register a listener for every inbound chat frame.
    ///
    /// Listeners survive reconnects and may be registered before connecting.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ChatMessage) + Send + Sync + 'static,
    {
        self.listeners.add(Arc::new(listener))
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Resolve the WebSocket URL for chat: list servers, pick one with the
    /// configured strategy, and run the socket.io handshake against it.
    pub async fn chat_websocket_url(
        &self,
        options: &RequestOptions,
    ) -> Result<String, HitboxError> {
        let servers = self.chat_servers(options).await?;
        let server = select_server(&servers, self.config.chat_server_selection)?;
        let session = self.chat_session(server, options).await?;
        Ok(websocket_url(server, &session))
    }

    async fn chat_session(
        &self,
        server: &ChatServer,
        options: &RequestOptions,
    ) -> Result<String, HitboxError> {
        let resp = self
            .get_raw(&handshake_url(server), &QueryParams::new(), options)
            .await?;
        if !resp.is_success() {
            return Err(HitboxError::Remote {
                status: resp.status,
                body: serde_json::Value::String(resp.body),
            });
        }
        parse_handshake_session(&resp.body)
    }

    /// Open the chat socket, replacing any existing connection.
    ///
    /// Returns the WebSocket URL that was connected to.
    pub async fn chat_connect(&self, options: &RequestOptions) -> Result<String, HitboxError> {
        let url = self.chat_websocket_url(options).await?;
        tracing::info!(ws_url = %url, "Connecting to Hitbox chat");
        let (ws, _) = connect_async(url.as_str()).await?;
        let conn = ChatConnection::spawn(ws, self.listeners.clone());

        let previous = self.chat.lock().await.replace(conn);
        if let Some(previous) = previous {
            tracing::info!("Closing previous chat connection");
            previous.close().await;
        }
        Ok(url)
    }

    /// Send a JSON-encoded message on the chat socket.
    pub async fn send_message(&self, message: &impl Serialize) -> Result<(), HitboxError> {
        let text = serde_json::to_string(message)?;
        let chat = self.chat.lock().await;
        match chat.as_ref() {
            Some(conn) if conn.is_open() => conn.send(text).await,
            _ => Err(HitboxError::NotConnected),
        }
    }

    pub async fn is_chat_connected(&self) -> bool {
        self.chat.lock().await.as_ref().is_some_and(ChatConnection::is_open)
    }

    /// Close the chat socket if one is open.
    pub async fn chat_disconnect(&self) {
        let conn = self.chat.lock().await.take();
        if let Some(conn) = conn {
            conn.close().await;
            tracing::info!("Hitbox chat disconnected");
        }
    }
}
