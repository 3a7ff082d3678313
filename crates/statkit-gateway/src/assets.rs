//! Static files for the browser front end, with client-side routing fallback.

use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use rust_embed::RustEmbed;
use tracing::{debug, error};

use crate::error::{GatewayError, GatewayResult};

pub const INDEX: &str = "index.html";

pub struct Asset {
    pub path: String,
    pub bytes: Cow<'static, [u8]>,
}

impl Asset {
    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.path)
            .first_or_octet_stream()
            .to_string()
    }
}

impl IntoResponse for Asset {
    fn into_response(self) -> Response {
        let mime = self.content_type();
        let mut response = (StatusCode::OK, self.bytes.into_owned()).into_response();
        if let Ok(value) = HeaderValue::from_str(&mime) {
            response.headers_mut().insert(header::CONTENT_TYPE, value);
        }
        response
    }
}

/// Where static files come from. `Ok(None)` means "no such asset"; errors are
/// reserved for lookups that could not be answered.
pub trait AssetSource: Send + Sync {
    fn lookup(&self, path: &str) -> GatewayResult<Option<Asset>>;
}

#[derive(RustEmbed)]
#[folder = "web/"]
struct WebBundle;

/// The bundle compiled into the binary.
pub struct EmbeddedAssets;

impl AssetSource for EmbeddedAssets {
    fn lookup(&self, path: &str) -> GatewayResult<Option<Asset>> {
        Ok(WebBundle::get(path).map(|file| Asset {
            path: path.to_string(),
            bytes: file.data,
        }))
    }
}

/// Files under a directory on disk.
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for DirAssets {
    fn lookup(&self, path: &str) -> GatewayResult<Option<Asset>> {
        // Only plain relative components may reach the filesystem.
        let rel = Path::new(path);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Ok(None);
        }
        match std::fs::read(self.root.join(rel)) {
            Ok(bytes) => Ok(Some(Asset {
                path: path.to_string(),
                bytes: Cow::Owned(bytes),
            })),
            // A file used as a directory prefix (`app.js/route`) is also a miss.
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                Ok(None)
            }
            Err(e) => Err(GatewayError::AssetLookup(format!("{path}: {e}"))),
        }
    }
}

fn asset_key(uri_path: &str) -> &str {
    let key = uri_path.trim_start_matches('/');
    if key.is_empty() || key.ends_with('/') {
        INDEX
    } else {
        key
    }
}

/// Serve `uri_path`, falling back to the index page when it does not exist.
pub fn serve_asset(source: &dyn AssetSource, uri_path: &str) -> Response {
    let key = asset_key(uri_path);
    let found = match source.lookup(key) {
        Ok(Some(asset)) => Ok(Some(asset)),
        Ok(None) => {
            debug!(path = key, "asset not found, serving index");
            source.lookup(INDEX)
        }
        Err(e) => Err(e),
    };
    match found {
        Ok(Some(asset)) => asset.into_response(),
        Ok(None) => lookup_failure(GatewayError::AssetLookup(format!("{INDEX} is missing"))),
        Err(e) => lookup_failure(e),
    }
}

fn lookup_failure(err: GatewayError) -> Response {
    error!("asset lookup failed: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("Error: {err}"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_asset_key() {
        assert_eq!(asset_key("/"), "index.html");
        assert_eq!(asset_key("/docs/"), "index.html");
        assert_eq!(asset_key("/assets/app.js"), "assets/app.js");
    }

    #[test]
    fn test_embedded_bundle_has_index() {
        let asset = EmbeddedAssets.lookup(INDEX).unwrap().unwrap();
        assert_eq!(asset.content_type(), "text/html");
        assert!(EmbeddedAssets.lookup("nope.js").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_path_serves_index() {
        let response = serve_asset(&EmbeddedAssets, "/calculator/z-score");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
        assert!(body_text(response).await.contains("<div id=\"root\">"));
    }

    #[tokio::test]
    async fn test_dir_assets_content_type() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(INDEX), "<html></html>").unwrap();
        std::fs::write(dir.path().join("app.css"), "body { margin: 0 }").unwrap();
        let source = DirAssets::new(dir.path());

        let response = serve_asset(&source, "/app.css");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
        assert_eq!(body_text(response).await, "body { margin: 0 }");
    }

    #[tokio::test]
    async fn test_dir_assets_reject_traversal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(INDEX), "shell").unwrap();
        let source = DirAssets::new(dir.path());
        assert!(source.lookup("../etc/passwd").unwrap().is_none());

        let response = serve_asset(&source, "/../secret");
        assert_eq!(body_text(response).await, "shell");
    }

    #[tokio::test]
    async fn test_file_prefix_route_serves_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(INDEX), "shell").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        let source = DirAssets::new(dir.path());
        assert!(source.lookup("app.js/route").unwrap().is_none());

        for path in ["/app.js/route", "/index.html/x"] {
            let response = serve_asset(&source, path);
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
            assert_eq!(body_text(response).await, "shell");
        }
    }

    #[tokio::test]
    async fn test_lookup_error_is_500_text() {
        let dir = tempfile::tempdir().unwrap();
        // Reading a directory as a file fails with something other than NotFound.
        std::fs::create_dir(dir.path().join("folder")).unwrap();
        let source = DirAssets::new(dir.path());

        let response = serve_asset(&source, "/folder");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        assert!(body_text(response).await.starts_with("Error: folder: "));
    }

    #[tokio::test]
    async fn test_missing_index_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let response = serve_asset(&DirAssets::new(dir.path()), "/anything");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Error: index.html is missing");
    }
}
