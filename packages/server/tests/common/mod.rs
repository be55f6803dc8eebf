use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use frontecs_server::{app, AppState, SiteStore};
use tempfile::TempDir;
use tower::ServiceExt;

pub const KEY: &str = "0a1b2c3d";

/// Site root with a built index page, an editor config and no saved edits
pub fn site() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("dist/assets")).unwrap();
    std::fs::create_dir_all(dir.path().join("__editor__")).unwrap();
    std::fs::write(dir.path().join("dist/index.html"), "<!DOCTYPE html><title>Walls</title>").unwrap();
    std::fs::write(dir.path().join("dist/assets/app.js"), "console.log(1)").unwrap();
    std::fs::write(
        dir.path().join("__editor__/config.json"),
        format!(r#"{{"secretKey":"{}","siteId":"walls"}}"#, KEY),
    )
    .unwrap();
    dir
}

pub fn build_test_app(dir: &TempDir) -> Router {
    app(AppState::new(SiteStore::new(dir.path())))
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: String) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
