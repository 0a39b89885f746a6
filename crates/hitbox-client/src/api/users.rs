use serde_json::Value;

use super::*;
use crate::query::QueryParams;

impl HitboxClient {
    /// Get a user profile by user name.
    pub async fn user(&self, user: &str, options: &RequestOptions) -> Result<Value, HitboxError> {
        let user = require("user", user)?;
        let path = format!("user/{}", segment(user));
        self.get(&path, &QueryParams::new(), options).await
    }

    /// Get a page of followers for a user.
    ///
    /// `offset` and `limit` are only sent when non-zero; the server applies
    /// its own defaults otherwise.
    pub async fn followers(
        &self,
        user: &str,
        offset: Option<u32>,
        limit: Option<u32>,
        options: &RequestOptions,
    ) -> Result<Value, HitboxError> {
        let user = require("user", user)?;
        let params = followers_query(offset, limit);
        let path = format!("followers/user/{}", segment(user));
        self.get(&path, &params, options).await
    }
}

pub(super) fn followers_query(offset: Option<u32>, limit: Option<u32>) -> QueryParams {
    QueryParams::new()
        .with("offset", offset)
        .with("limit", limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stub::{StubTransport, client_with};

    #[tokio::test]
    async fn user_requires_name_before_any_request() {
        let (client, stub) = client_with(StubTransport::default());
        let err = client.user("", &RequestOptions::default()).await.unwrap_err();
        assert!(matches!(err, HitboxError::Input(_)));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn user_targets_user_path() {
        let (client, stub) =
            client_with(StubTransport::default().respond(200, r#"{"user_name":"bob"}"#));
        let value = client.user("bob", &RequestOptions::default()).await.unwrap();
        assert_eq!(value["user_name"], "bob");
        assert_eq!(stub.last_url(), "http://api.hitbox.tv/user/bob");
    }

    #[tokio::test]
    async fn followers_sends_paging_params() {
        let (client, stub) = client_with(StubTransport::default());
        client
            .followers("bob", Some(20), Some(10), &RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(
            stub.last_url(),
            "http://api.hitbox.tv/followers/user/bob?offset=20&limit=10"
        );
    }

    #[tokio::test]
    async fn followers_name_with_delimiters_keeps_paging_params() {
        let (client, stub) = client_with(StubTransport::default());
        client
            .followers("bob#frag", Some(20), Some(10), &RequestOptions::default())
            .await
            .unwrap();
        let url = url::Url::parse(&stub.last_url()).unwrap();
        assert_eq!(url.path(), "/followers/user/bob%23frag");
        assert_eq!(url.query(), Some("offset=20&limit=10"));
        assert_eq!(url.fragment(), None);
    }

    #[tokio::test]
    async fn user_name_cannot_escape_its_path() {
        let (client, stub) = client_with(StubTransport::default());
        client
            .user("bob?admin=1", &RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(stub.last_url(), "http://api.hitbox.tv/user/bob%3Fadmin%3D1");

        client
            .user("../auth/token", &RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(stub.last_url(), "http://api.hitbox.tv/user/..%2Fauth%2Ftoken");
    }

    #[tokio::test]
    async fn followers_requires_user() {
        let (client, stub) = client_with(StubTransport::default());
        let err = client
            .followers(" ", None, None, &RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HitboxError::Input(_)));
        assert_eq!(stub.calls(), 0);
    }

    #[test]
    fn zero_offset_is_not_sent() {
        let params = followers_query(Some(0), Some(100));
        let url = crate::query::build_url("f", &params, "http://h").unwrap();
        assert_eq!(url, "http://h/f?limit=100");
    }
}
