//! The completion proxy: one inbound POST becomes one upstream POST.

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::upstream::CompletionUpstream;

pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "POST, OPTIONS"),
    ("access-control-allow-headers", "Content-Type"),
];

/// Status plus optional JSON body. Every proxy response carries the CORS
/// headers.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl ProxyResponse {
    pub fn preflight() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: None,
        }
    }

    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    fn method_not_allowed() -> Self {
        Self::json(
            StatusCode::METHOD_NOT_ALLOWED,
            json!({ "error": "Method not allowed" }),
        )
    }
}

impl From<GatewayError> for ProxyResponse {
    fn from(err: GatewayError) -> Self {
        let body = match &err {
            GatewayError::Configuration => json!({ "error": err.to_string() }),
            other => json!({ "error": "Internal server error", "message": other.to_string() }),
        };
        Self::json(StatusCode::INTERNAL_SERVER_ERROR, body)
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let has_body = self.body.is_some();
        let mut response = match self.body {
            Some(body) => (self.status, body.to_string()).into_response(),
            None => self.status.into_response(),
        };
        let headers = response.headers_mut();
        for (name, value) in CORS_HEADERS {
            headers.insert(name, HeaderValue::from_static(value));
        }
        if has_body {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        response
    }
}

/// Answer one request to the completion route.
///
/// The body is parsed before the credential is looked up, so a malformed body
/// is reported even when no key is configured.
pub async fn handle_completion_request(
    method: &Method,
    body: &[u8],
    config: &GatewayConfig,
    upstream: &dyn CompletionUpstream,
) -> ProxyResponse {
    if method == Method::OPTIONS {
        return ProxyResponse::preflight();
    }
    if method != Method::POST {
        return ProxyResponse::method_not_allowed();
    }
    match forward(body, config, upstream).await {
        Ok(reply) => reply,
        Err(err) => {
            warn!("completion request failed: {err}");
            err.into()
        }
    }
}

async fn forward(
    body: &[u8],
    config: &GatewayConfig,
    upstream: &dyn CompletionUpstream,
) -> Result<ProxyResponse, GatewayError> {
    let mut request: Value =
        serde_json::from_slice(body).map_err(|e| GatewayError::InvalidBody(e.to_string()))?;
    let target = config.resolve()?;

    let fields = request
        .as_object_mut()
        .ok_or_else(|| GatewayError::InvalidBody("expected a JSON object".into()))?;
    if fields.get("model").and_then(Value::as_str) != Some(target.model.as_str()) {
        fields.insert("model".into(), Value::String(target.model.clone()));
    }

    debug!(endpoint = %target.endpoint, model = %target.model, "forwarding completion");
    let reply = upstream
        .send(&target.endpoint, &target.api_key, &request)
        .await?;
    let status = StatusCode::from_u16(reply.status)
        .map_err(|e| GatewayError::Upstream(format!("bad upstream status: {e}")))?;
    Ok(ProxyResponse::json(status, reply.body))
}
