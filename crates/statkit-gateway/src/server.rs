use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::assets::{serve_asset, AssetSource, DirAssets, EmbeddedAssets};
use crate::config::GatewayConfig;
use crate::error::GatewayResult;
use crate::proxy::{handle_completion_request, ProxyResponse};
use crate::upstream::{CompletionUpstream, HttpUpstream};

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub upstream: Arc<dyn CompletionUpstream>,
    pub assets: Arc<dyn AssetSource>,
}

impl AppState {
    /// State wired to the real HTTP upstream and the configured asset source.
    pub fn from_config(config: GatewayConfig) -> GatewayResult<Self> {
        let upstream = HttpUpstream::new(Duration::from_secs(config.timeout_secs))?;
        let assets: Arc<dyn AssetSource> = match &config.assets_dir {
            Some(dir) => Arc::new(DirAssets::new(dir)),
            None => Arc::new(EmbeddedAssets),
        };
        Ok(Self {
            config: Arc::new(config),
            upstream: Arc::new(upstream),
            assets,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let completion_path = format!("/{}", state.config.completion_path.trim_start_matches('/'));
    Router::new()
        .route(&completion_path, any(completion))
        .fallback(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn completion(State(state): State<AppState>, method: Method, body: Bytes) -> ProxyResponse {
    handle_completion_request(&method, &body, &state.config, state.upstream.as_ref()).await
}

async fn static_files(State(state): State<AppState>, uri: Uri) -> Response {
    let assets = Arc::clone(&state.assets);
    let path = uri.path().to_string();
    // Directory-backed sources read from disk.
    match tokio::task::spawn_blocking(move || serve_asset(assets.as_ref(), &path)).await {
        Ok(response) => response,
        Err(e) => {
            error!("asset task failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {e}")).into_response()
        }
    }
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: GatewayConfig) -> GatewayResult<()> {
    if !config.has_credential() {
        warn!("no API key configured; completion requests will fail");
    }
    let bind = config.bind.clone();
    let state = AppState::from_config(config)?;
    info!(
        %bind,
        completion_path = %state.config.completion_path,
        timeout_secs = state.config.timeout_secs,
        "gateway listening"
    );

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
