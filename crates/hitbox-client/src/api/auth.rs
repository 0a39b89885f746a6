use serde_json::Value;

use super::*;
use crate::query::QueryParams;

impl HitboxClient {
    /// Exchange login credentials for an authentication token.
    pub async fn token(
        &self,
        login: &str,
        pass: &str,
        options: &RequestOptions,
    ) -> Result<Value, HitboxError> {
        if login.trim().is_empty() || pass.is_empty() {
            return Err(HitboxError::input("login and pass required"));
        }
        tracing::info!(login = login.trim(), "Requesting Hitbox auth token");
        let body = TokenRequest::new(login.trim(), pass);
        self.post("auth/token", &body, options).await
    }

    /// Get stream ingest data for a user.
    pub async fn ingesting(
        &self,
        username: &str,
        token: &str,
        options: &RequestOptions,
    ) -> Result<Value, HitboxError> {
        let username = require("username", username)?;
        let token = require("token", token)?;
        let params = QueryParams::new().with("token", token);
        let path = format!("streamingest/{}", segment(username));
        self.get(&path, &params, options).await
    }
}
