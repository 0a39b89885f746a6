use serde_json::Value;

use super::*;
use crate::query::QueryParams;

impl HitboxClient {
    /// List live media, or a single stream's media when `stream` is given.
    pub async fn media(
        &self,
        stream: Option<&str>,
        options: &RequestOptions,
    ) -> Result<Value, HitboxError> {
        let stream = stream.map(str::trim).unwrap_or_default();
        let url = format!("media/{}", segment(stream));
        self.get(&url, &QueryParams::new(), options).await
    }

    /// Games sorted by current viewers, most popular first.
    pub async fn games(&self, options: &RequestOptions) -> Result<Value, HitboxError> {
        self.get("games/", &QueryParams::new(), options).await
    }

    /// List active teams, or a single team when `team` is given.
    pub async fn teams(
        &self,
        team: Option<&str>,
        options: &RequestOptions,
    ) -> Result<Value, HitboxError> {
        let team = team.map(str::trim).unwrap_or_default();
        let url = format!("teams/{}", segment(team));
        self.get(&url, &QueryParams::new(), options).await
    }

    /// Available chat servers.
    pub async fn chat_servers(
        &self,
        options: &RequestOptions,
    ) -> Result<Vec<ChatServer>, HitboxError> {
        self.get_json("chat/servers", &QueryParams::new(), options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stub::{StubTransport, client_with};

    #[tokio::test]
    async fn media_without_stream_lists_all() {
        let (client, stub) = client_with(StubTransport::default().respond(200, "{}"));
        let value = client.media(None, &RequestOptions::default()).await.unwrap();
        assert_eq!(value, serde_json::json!({}));
        assert_eq!(stub.last_url(), "http://api.hitbox.tv/media/");
    }

    #[tokio::test]
    async fn media_with_stream_targets_stream() {
        let (client, stub) = client_with(StubTransport::default());
        client
            .media(Some("somestream"), &RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(stub.last_url(), "http://api.hitbox.tv/media/somestream");
    }

    #[tokio::test]
    async fn stream_and_team_names_are_escaped() {
        let (client, stub) = client_with(StubTransport::default());
        client
            .media(Some("a b#c"), &RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(stub.last_url(), "http://api.hitbox.tv/media/a%20b%23c");

        client
            .teams(Some("x/y"), &RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(stub.last_url(), "http://api.hitbox.tv/teams/x%2Fy");
    }

    #[tokio::test]
    async fn games_and_teams_use_their_own_paths() {
        let (client, stub) = client_with(StubTransport::default());
        client.games(&RequestOptions::default()).await.unwrap();
        assert_eq!(stub.last_url(), "http://api.hitbox.tv/games/");

        client.teams(None, &RequestOptions::default()).await.unwrap();
        assert_eq!(stub.last_url(), "http://api.hitbox.tv/teams/");

        client
            .teams(Some("speedrunners"), &RequestOptions::with_router("http://alt"))
            .await
            .unwrap();
        assert_eq!(stub.last_url(), "http://alt/teams/speedrunners");
    }

    #[tokio::test]
    async fn chat_servers_are_typed() {
        let (client, stub) = client_with(
            StubTransport::default().respond(200, r#"[{"server_ip":"chat.hitbox.tv"}]"#),
        );
        let servers = client.chat_servers(&RequestOptions::default()).await.unwrap();
        assert_eq!(
            servers,
            vec![ChatServer {
                server_ip: "chat.hitbox.tv".into()
            }]
        );
        assert_eq!(stub.last_url(), "http://api.hitbox.tv/chat/servers");
    }

    #[tokio::test]
    async fn malformed_chat_server_list_is_an_input_error() {
        let (client, _) = client_with(StubTransport::default().respond(200, r#"{"nope":1}"#));
        let err = client.chat_servers(&RequestOptions::default()).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Input);
    }
}
