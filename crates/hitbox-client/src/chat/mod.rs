//! Hitbox chat connectivity.
//!
//! Picks a chat server from GET /chat/servers, performs the socket.io v1
//! handshake to obtain a session id, and connects to
//! `ws://{server_ip}/socket.io/1/websocket/{session}`. Inbound frames are
//! broadcast to the listeners registered on the owning client.

mod connection;

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use rand::Rng;

pub use crate::api::ChatServer;
pub(crate) use connection::ChatConnection;

use crate::HitboxError;

const SOCKET_IO_PATH: &str = "socket.io/1/";
/// socket.io v1 heartbeat frame, echoed back to keep the session alive.
pub(crate) const HEARTBEAT: &str = "2::";
const EVENT_PREFIX: &str = "5:::";

/// Strategy for picking one chat server out of the advertised list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServerSelection {
    #[default]
    First,
    /// Uniformly random.
    Random,
}

impl fmt::Display for ServerSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::Random => f.write_str("random"),
        }
    }
}

impl FromStr for ServerSelection {
    type Err = HitboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "random" => Ok(Self::Random),
            other => Err(HitboxError::Configuration(format!(
                "unknown chat server selection '{other}' (expected 'first' or 'random')"
            ))),
        }
    }
}

/// Pick a chat server according to `strategy`.
pub fn select_server(
    servers: &[ChatServer],
    strategy: ServerSelection,
) -> Result<&ChatServer, HitboxError> {
    if servers.is_empty() {
        return Err(HitboxError::input("no chat servers provided"));
    }
    if let Some(bad) = servers.iter().find(|s| server_host(s).is_empty()) {
        return Err(HitboxError::input(format!("malformed chat server entry: {bad:?}")));
    }

    let index = match strategy {
        ServerSelection::First => 0,
        ServerSelection::Random => rand::thread_rng().gen_range(0..servers.len()),
    };
    tracing::debug!(index, %strategy, server = %servers[index].server_ip, "Chat server selected");
    Ok(&servers[index])
}

/// URL of the socket.io handshake for a chat server.
pub fn handshake_url(server: &ChatServer) -> String {
    format!("http://{}/{SOCKET_IO_PATH}", server_host(server))
}

/// Extract the session id from a socket.io handshake body
/// (`session:heartbeat:close:transports`).
pub fn parse_handshake_session(body: &str) -> Result<String, HitboxError> {
    let session = body.split(':').next().unwrap_or_default().trim();
    if session.is_empty() {
        return Err(HitboxError::input("chat handshake returned no session id"));
    }
    Ok(session.to_string())
}

/// WebSocket URL for a chat server and handshake session.
pub fn websocket_url(server: &ChatServer, session: &str) -> String {
    format!(
        "ws://{}/{SOCKET_IO_PATH}websocket/{session}",
        server_host(server)
    )
}

fn server_host(server: &ChatServer) -> &str {
    let host = server.server_ip.trim();
    let host = host.split_once("://").map_or(host, |(_, rest)| rest);
    host.trim_end_matches('/')
}

/// A text frame received from the chat socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub raw: String,
}

impl ChatMessage {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// JSON payload of a socket.io event frame (`5:::{...}`), if any.
    pub fn event(&self) -> Option<serde_json::Value> {
        self.raw
            .strip_prefix(EVENT_PREFIX)
            .and_then(|payload| serde_json::from_str(payload).ok())
    }
}

/// Handle returned by `add_listener`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&ChatMessage) + Send + Sync>;

#[derive(Default)]
struct ListenerSet {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

/// Message listeners shared between a client and its socket task.
#[derive(Clone, Default)]
pub(crate) struct Listeners {
    inner: Arc<RwLock<ListenerSet>>,
}

impl Listeners {
    pub(crate) fn add(&self, listener: Listener) -> ListenerId {
        let mut set = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let id = ListenerId(set.next_id);
        set.next_id += 1;
        set.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut set = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let before = set.entries.len();
        set.entries.retain(|(existing, _)| *existing != id);
        set.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    /// Call every listener in registration order. The lock is released
    /// before any listener runs.
    pub(crate) fn broadcast(&self, message: &ChatMessage) {
        let snapshot: Vec<Listener> = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in snapshot {
            listener(message);
        }
    }
}
