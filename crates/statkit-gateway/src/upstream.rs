use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::config::ApiKey;
use crate::error::{GatewayError, GatewayResult};

/// Status and decoded JSON body of a completion reply.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Value,
}

/// The single outbound call made per forwarded request.
#[async_trait]
pub trait CompletionUpstream: Send + Sync {
    async fn send(
        &self,
        endpoint: &str,
        api_key: &ApiKey,
        body: &Value,
    ) -> GatewayResult<UpstreamReply>;
}

/// HTTP upstream backed by a shared `reqwest::Client`.
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    pub fn new(timeout: Duration) -> GatewayResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Upstream(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CompletionUpstream for HttpUpstream {
    async fn send(
        &self,
        endpoint: &str,
        api_key: &ApiKey,
        body: &Value,
    ) -> GatewayResult<UpstreamReply> {
        let start = Instant::now();
        let response = self
            .client
            .post(endpoint)
            .bearer_auth(api_key.expose())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Upstream(format!("request to {endpoint} timed out"))
                } else {
                    GatewayError::Upstream(e.without_url().to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::Upstream(format!("response is not JSON: {e}")))?;

        info!(
            endpoint,
            status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "upstream replied"
        );
        Ok(UpstreamReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::proxy::handle_completion_request;
    use axum::http::StatusCode;
    use httpmock::prelude::*;
    use serde_json::json;

    fn upstream() -> HttpUpstream {
        HttpUpstream::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_sends_bearer_and_json() {
        let server = MockServer::start_async().await;
        let request = json!({"model": "grok-4-latest", "messages": []});
        let m = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("authorization", "Bearer xai-test")
                    .header("content-type", "application/json")
                    .json_body(request.clone());
                then.status(200).json_body(json!({"choices": []}));
            })
            .await;

        let reply = upstream()
            .send(
                &server.url("/v1/chat/completions"),
                &ApiKey::new("xai-test"),
                &request,
            )
            .await
            .unwrap();
        m.assert_async().await;
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, json!({"choices": []}));
    }

    #[tokio::test]
    async fn test_error_status_and_body_relayed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(429)
                    .json_body(json!({"error": {"message": "rate limited"}}));
            })
            .await;

        let reply = upstream()
            .send(
                &server.url("/v1/chat/completions"),
                &ApiKey::new("k"),
                &json!({}),
            )
            .await
            .unwrap();
        assert_eq!(reply.status, 429);
        assert_eq!(reply.body["error"]["message"], "rate limited");
    }

    #[tokio::test]
    async fn test_non_json_reply_is_500() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(502).body("<html>bad gateway</html>");
            })
            .await;

        let mut config = GatewayConfig::default();
        config.primary.api_key = Some(ApiKey::new("xai-test"));
        config.primary.endpoint = Some(server.url("/v1/chat/completions"));

        let resp = handle_completion_request(
            &axum::http::Method::POST,
            br#"{"messages":[]}"#,
            &config,
            &upstream(),
        )
        .await;
        assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = resp.body.unwrap();
        assert_eq!(body["error"], "Internal server error");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("response is not JSON"));
    }

    #[tokio::test]
    async fn test_timeout_is_enforced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/slow");
                then.status(200)
                    .delay(Duration::from_millis(500))
                    .json_body(json!({}));
            })
            .await;

        let endpoint = server.url("/slow");
        let err = HttpUpstream::new(Duration::from_millis(50))
            .unwrap()
            .send(&endpoint, &ApiKey::new("k"), &json!({}))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("upstream request failed: request to {endpoint} timed out")
        );
    }
}
