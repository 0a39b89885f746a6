//! Hitbox REST API client.
//!
//! Every endpoint resolves a router, builds a URL with
//! [`build_url`](crate::query::build_url) and dispatches through the
//! configured [`Transport`]. Non-2xx responses surface as
//! [`HitboxError::Remote`] carrying both status and body.

mod auth;
mod media;
mod request;
mod users;

pub mod models;

pub use models::{ChatServer, TokenRequest};

use std::borrow::Cow;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::HitboxError;
use crate::chat::{ChatConnection, Listeners};
use crate::config::ClientConfig;
use crate::transport::{ReqwestTransport, Transport};

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Overrides the client's home router for this call.
    pub router: Option<String>,
}

impl RequestOptions {
    pub fn with_router(router: impl Into<String>) -> Self {
        Self {
            router: Some(router.into()),
        }
    }
}

/// Hitbox API client.
///
/// Owns its configuration, transport, chat listeners and chat socket.
pub struct HitboxClient {
    pub(crate) config: ClientConfig,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) listeners: Listeners,
    pub(crate) chat: Mutex<Option<ChatConnection>>,
}

impl HitboxClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            listeners: Listeners::default(),
            chat: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Set a configuration value by key. See [`ClientConfig::set`].
    pub fn set(&mut self, key: &str, value: &str) -> Result<&mut Self, HitboxError> {
        self.config.set(key, value)?;
        Ok(self)
    }

    /// Resolve the router for a call: explicit override first, then the
    /// client default.
    pub(crate) fn router<'a>(
        &'a self,
        options: &'a RequestOptions,
    ) -> Result<&'a str, HitboxError> {
        options
            .router
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .or_else(|| Some(self.config.home_router.trim()).filter(|r| !r.is_empty()))
            .ok_or_else(|| HitboxError::Configuration("home router required".into()))
    }
}

impl Default for HitboxClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

/// Reject empty required parameters before any network call.
pub(crate) fn require<'a>(name: &str, value: &'a str) -> Result<&'a str, HitboxError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(HitboxError::input(format!("{name} required")));
    }
    Ok(value)
}

/// Percent-encode a caller-supplied value for use as one URL path segment.
pub(crate) fn segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}
