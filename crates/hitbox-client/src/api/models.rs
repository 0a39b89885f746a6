use serde::{Deserialize, Serialize};

/// Chat server entry from GET /chat/servers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatServer {
    /// Host (optionally `host:port`) of the socket.io endpoint.
    pub server_ip: String,
}

/// Body of POST /auth/token.
#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest {
    pub login: String,
    pub pass: String,
    pub app: String,
}

impl TokenRequest {
    pub const APP: &'static str = "desktop";

    pub fn new(login: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            pass: pass.into(),
            app: Self::APP.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_servers_deserialize() {
        let body = r#"[{"server_ip":"chat1.hitbox.tv"},{"server_ip":"chat2.hitbox.tv"}]"#;
        let servers: Vec<ChatServer> = serde_json::from_str(body).unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[1].server_ip, "chat2.hitbox.tv");
    }

    #[test]
    fn token_request_targets_desktop_app() {
        let body = serde_json::to_value(TokenRequest::new("me", "secret")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"login": "me", "pass": "secret", "app": "desktop"})
        );
    }
}
