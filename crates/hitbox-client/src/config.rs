//! Client configuration: defaults, key/value setter, environment overrides.

use std::time::Duration;

use crate::HitboxError;
use crate::chat::ServerSelection;

pub const DEFAULT_HOME_ROUTER: &str = "http://api.hitbox.tv";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

pub const KEY_HOME_ROUTER: &str = "home_router";
pub const KEY_TIMEOUT: &str = "timeout";
pub const KEY_CHAT_SERVER_SELECTION: &str = "chat_server_selection";

const ENV_HOME_ROUTER: &str = "HITBOX_HOME_ROUTER";
const ENV_TIMEOUT_MS: &str = "HITBOX_TIMEOUT_MS";
const ENV_CHAT_SERVER_SELECTION: &str = "HITBOX_CHAT_SERVER_SELECTION";

/// Runtime configuration read by every request.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL for relative request paths. May be emptied via `set`, in
    /// which case requests without a router override fail.
    pub home_router: String,
    pub timeout: Duration,
    pub chat_server_selection: ServerSelection,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            home_router: DEFAULT_HOME_ROUTER.into(),
            timeout: DEFAULT_TIMEOUT,
            chat_server_selection: ServerSelection::First,
        }
    }
}

impl ClientConfig {
    pub fn with_home_router(home_router: impl Into<String>) -> Self {
        Self {
            home_router: home_router.into(),
            ..Self::default()
        }
    }

    /// Defaults with `HITBOX_*` environment overrides applied.
    pub fn from_env() -> Result<Self, HitboxError> {
        let mut config = Self::default();
        let overrides = [
            (ENV_HOME_ROUTER, KEY_HOME_ROUTER),
            (ENV_TIMEOUT_MS, KEY_TIMEOUT),
            (ENV_CHAT_SERVER_SELECTION, KEY_CHAT_SERVER_SELECTION),
        ];
        for (var, key) in overrides {
            if let Ok(value) = std::env::var(var) {
                tracing::debug!(var, key, "Applying environment override");
                config.set(key, &value)?;
            }
        }
        Ok(config)
    }

    /// Set a single setting by key.
    ///
    /// `timeout` is given in milliseconds; `chat_server_selection` is
    /// `first` or `random`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<&mut Self, HitboxError> {
        validate_setting(key, value).map_err(|msg| {
            HitboxError::Configuration(format!("invalid value for {key}: {msg}"))
        })?;
        match key {
            KEY_HOME_ROUTER => self.home_router = value.trim().to_string(),
            KEY_TIMEOUT => self.timeout = Duration::from_millis(parse_millis(value)?),
            KEY_CHAT_SERVER_SELECTION => self.chat_server_selection = value.parse()?,
            other => {
                return Err(HitboxError::Configuration(format!("unknown setting: {other}")));
            }
        }
        Ok(self)
    }

    /// Read a single setting by key, formatted the way `set` accepts it.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            KEY_HOME_ROUTER => Some(self.home_router.clone()),
            KEY_TIMEOUT => Some(self.timeout.as_millis().to_string()),
            KEY_CHAT_SERVER_SELECTION => Some(self.chat_server_selection.to_string()),
            _ => None,
        }
    }
}

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        KEY_HOME_ROUTER => {
            let value = value.trim();
            if value.contains("://") {
                url::Url::parse(value).map_err(|e| e.to_string())?;
            }
        }
        KEY_TIMEOUT => {
            let ms: u64 = value.trim().parse().map_err(|_| "must be an integer")?;
            if !(1..=600_000).contains(&ms) {
                return Err("must be between 1 and 600000 milliseconds".into());
            }
        }
        KEY_CHAT_SERVER_SELECTION => {
            value.parse::<ServerSelection>().map_err(|e| e.to_string())?;
        }
        _ => {}
    }
    Ok(())
}

fn parse_millis(value: &str) -> Result<u64, HitboxError> {
    value
        .trim()
        .parse()
        .map_err(|_| HitboxError::Configuration(format!("invalid timeout: {value}")))
}
