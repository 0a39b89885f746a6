use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::*;
use crate::query::{QueryParams, build_url};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, json_headers};

impl HitboxClient {
    /// Execute a GET request and return the parsed body.
    pub async fn get(
        &self,
        path: &str,
        params: &QueryParams,
        options: &RequestOptions,
    ) -> Result<Value, HitboxError> {
        let resp = self.get_raw(path, params, options).await?;
        parse_response(resp)
    }

    /// Execute a GET request and return the transport response untouched,
    /// whatever its status.
    pub async fn get_raw(
        &self,
        path: &str,
        params: &QueryParams,
        options: &RequestOptions,
    ) -> Result<HttpResponse, HitboxError> {
        let url = build_url(path, params, self.router(options)?)?;
        self.execute(HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        })
        .await
    }

    /// Execute a POST request with a JSON body and return the parsed body.
    pub async fn post(
        &self,
        path: &str,
        body: &impl Serialize,
        options: &RequestOptions,
    ) -> Result<Value, HitboxError> {
        let resp = self.post_raw(path, body, options).await?;
        parse_response(resp)
    }

    /// Execute a POST request with a JSON body and return the transport
    /// response untouched.
    pub async fn post_raw(
        &self,
        path: &str,
        body: &impl Serialize,
        options: &RequestOptions,
    ) -> Result<HttpResponse, HitboxError> {
        let url = build_url(path, &QueryParams::new(), self.router(options)?)?;
        let body = serde_json::to_string(body)?;
        self.execute(HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: json_headers(),
            body: Some(body),
        })
        .await
    }

    /// GET and deserialize a successful body into `T`.
    pub(super) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
        options: &RequestOptions,
    ) -> Result<T, HitboxError> {
        let value = self.get(path, params, options).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Run one request through the transport, bounded by the configured timeout.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HitboxError> {
        let timeout = self.config.timeout;
        let method = request.method;
        let url = request.url.clone();
        tracing::debug!(?method, url = %url, "Dispatching Hitbox request");

        match tokio::time::timeout(timeout, self.transport.execute(request)).await {
            Ok(Ok(resp)) => {
                tracing::trace!(url = %url, status = resp.status, "Hitbox response received");
                Ok(resp)
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, url = %url, "Hitbox request failed");
                Err(e)
            }
            Err(_) => {
                let timeout_ms = timeout.as_millis() as u64;
                tracing::warn!(url = %url, timeout_ms, "Hitbox request timed out");
                Err(HitboxError::Timeout(timeout))
            }
        }
    }
}

/// Map a transport response onto the result contract: 2xx bodies are
/// returned, anything else becomes [`HitboxError::Remote`].
pub(crate) fn parse_response(resp: HttpResponse) -> Result<Value, HitboxError> {
    let body = parse_body(&resp.body);
    if !resp.is_success() {
        tracing::warn!(status = resp.status, "Hitbox API returned non-success status");
        return Err(HitboxError::Remote {
            status: resp.status,
            body,
        });
    }
    Ok(body)
}

/// JSON-decode a body, falling back to the raw text. Empty bodies are `null`.
pub(crate) fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::api::stub::{StubTransport, client_with};

    #[tokio::test]
    async fn get_success_returns_parsed_body() {
        let (client, stub) = client_with(StubTransport::default().respond(200, "{}"));
        let value = client
            .get("media/", &QueryParams::new(), &RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(value, serde_json::json!({}));
        assert_eq!(stub.last_url(), "http://api.hitbox.tv/media/");
    }

    #[tokio::test]
    async fn not_found_is_a_remote_error_with_body() {
        let (client, _) =
            client_with(StubTransport::default().respond(404, r#"{"error":"not found"}"#));
        let err = client
            .get("user/nobody", &QueryParams::new(), &RequestOptions::default())
            .await
            .unwrap_err();
        match err {
            HitboxError::Remote { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body["error"], "not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_returned_as_text() {
        let (client, _) = client_with(StubTransport::default().respond(200, "abc:60:60"));
        let value = client
            .get("x", &QueryParams::new(), &RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(value, Value::String("abc:60:60".into()));
    }

    #[tokio::test]
    async fn raw_skips_status_interpretation() {
        let (client, _) = client_with(StubTransport::default().respond(500, "boom"));
        let resp = client
            .get_raw("x", &QueryParams::new(), &RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body, "boom");
    }

    #[tokio::test]
    async fn post_serializes_json_body() {
        let (client, stub) = client_with(StubTransport::default().respond(200, r#"{"ok":true}"#));
        let value = client
            .post(
                "auth/token",
                &serde_json::json!({"login": "a"}),
                &RequestOptions::with_router("http://stub"),
            )
            .await
            .unwrap();
        assert_eq!(value["ok"], true);

        let requests = stub.requests.lock().unwrap();
        let req = &requests[0];
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://stub/auth/token");
        assert_eq!(req.body.as_deref(), Some(r#"{"login":"a"}"#));
        assert_eq!(req.headers, json_headers());
    }

    #[tokio::test]
    async fn missing_router_fails_before_dispatch() {
        let (mut client, stub) = client_with(StubTransport::default());
        client.set("home_router", "").unwrap();
        let err = client
            .get("media/", &QueryParams::new(), &RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HitboxError::Configuration(_)));
        assert_eq!(stub.calls(), 0);
    }

    struct StalledTransport;

    #[async_trait]
    impl Transport for StalledTransport {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, HitboxError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!("request should have timed out")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_request_times_out() {
        let mut client =
            HitboxClient::with_transport(ClientConfig::default(), Arc::new(StalledTransport));
        client.set("timeout", "250").unwrap();
        let err = client
            .get("media/", &QueryParams::new(), &RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HitboxError::Timeout(d) if d == Duration::from_millis(250)));
        assert_eq!(err.kind(), crate::ErrorKind::Transport);
    }

    struct UnreachableTransport;

    #[async_trait]
    impl Transport for UnreachableTransport {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, HitboxError> {
            Err(HitboxError::connection("host unreachable"))
        }
    }

    #[tokio::test]
    async fn custom_transport_failure_is_a_transport_error() {
        let client =
            HitboxClient::with_transport(ClientConfig::default(), Arc::new(UnreachableTransport));
        let err = client
            .get("media/", &QueryParams::new(), &RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HitboxError::Connection(ref msg) if msg == "host unreachable"));
        assert_eq!(err.kind(), crate::ErrorKind::Transport);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn empty_body_parses_to_null() {
        assert_eq!(parse_body("  "), Value::Null);
    }
}
