//! Hitbox streaming platform client library.
//!
//! Provides URL construction, a request dispatcher over a pluggable
//! HTTP transport, typed access to the public REST endpoints, and
//! chat WebSocket connectivity.

pub mod api;
pub mod chat;
pub mod config;
pub mod query;
pub mod transport;

use std::time::Duration;

pub use api::{HitboxClient, RequestOptions};
pub use chat::{ChatMessage, ChatServer, ListenerId, ServerSelection};
pub use config::ClientConfig;
pub use query::{ParamValue, QueryParams, build_url};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// Coarse classification of [`HitboxError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No usable router, or an invalid setting.
    Configuration,
    /// A required call parameter was missing or malformed.
    Input,
    /// Network failure, timeout, or a broken socket.
    Transport,
    /// The server answered with a non-2xx status.
    Remote,
}

/// Unified error type for the hitbox-client crate.
#[derive(Debug, thiserror::Error)]
pub enum HitboxError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Network failure reported by a non-reqwest [`Transport`].
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Hitbox API error (status {status}): {body}")]
    Remote {
        status: u16,
        body: serde_json::Value,
    },

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Chat socket is not connected")]
    NotConnected,
}

impl HitboxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Input(_) | Self::Json(_) | Self::UrlParse(_) => ErrorKind::Input,
            Self::Transport(_)
            | Self::Connection(_)
            | Self::Timeout(_)
            | Self::WebSocket(_)
            | Self::NotConnected => ErrorKind::Transport,
            Self::Remote { .. } => ErrorKind::Remote,
        }
    }

    /// HTTP status code for remote errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Build a transport failure from a custom [`Transport`] implementation.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    pub(crate) fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }
}
