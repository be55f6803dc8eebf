//! # Frontecs Server
//!
//! Persistence backend for the in-page editor.
//!
//! ```text
//! GET  /api/edits           → { edits, seo }
//! POST /api/save            → { ok }            (10 MB body limit)
//! POST /api/regenerate-key  → { newKey }
//! GET  /__editor__/*        → editor assets and config.json
//! GET  /*                   → dist/, falling back to dist/index.html
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod store;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use frontecs_editor::{EDITS_PATH, REGENERATE_KEY_PATH, SAVE_PATH};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::{AppError, AppResult};
pub use routes::AppState;
pub use store::{SiteStore, StoreError};

/// Largest accepted request body (embedded images make saves large)
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the application router
pub fn app(state: AppState) -> Router {
    let dist = state.store.dist_dir();
    let editor_dir = state.store.editor_dir();

    Router::new()
        .route(EDITS_PATH, get(routes::get_edits))
        .route(SAVE_PATH, post(routes::save))
        .route(REGENERATE_KEY_PATH, post(routes::regenerate_key))
        .nest_service("/__editor__", ServeDir::new(editor_dir))
        .fallback_service(ServeDir::new(&dist).fallback(ServeFile::new(dist.join("index.html"))))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
