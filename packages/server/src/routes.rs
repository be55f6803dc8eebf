//! Editor API handlers

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use frontecs_editor::{EditSet, RegenerateKeyRequest, RegenerateKeyResponse, SavePayload, SaveResponse};

use crate::error::AppResult;
use crate::store::SiteStore;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SiteStore>,
}

impl AppState {
    pub fn new(store: SiteStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// `GET /api/edits`: never fails; an unreadable file reads as empty
pub async fn get_edits(State(state): State<AppState>) -> Json<EditSet> {
    match state.store.edit_set().await {
        Ok(set) => Json(set),
        Err(e) => {
            tracing::warn!(error = %e, "stored edits unreadable, serving empty set");
            Json(EditSet::default())
        }
    }
}

/// `POST /api/save`
pub async fn save(
    State(state): State<AppState>,
    payload: Result<Json<SavePayload>, JsonRejection>,
) -> AppResult<Json<SaveResponse>> {
    let Json(payload) = payload?;
    state.store.save(&payload).await?;
    Ok(Json(SaveResponse { ok: true }))
}

/// `POST /api/regenerate-key`
pub async fn regenerate_key(
    State(state): State<AppState>,
    request: Result<Json<RegenerateKeyRequest>, JsonRejection>,
) -> AppResult<Json<RegenerateKeyResponse>> {
    let Json(request) = request?;
    let new_key = state.store.regenerate_key(&request.secret_key).await?;
    Ok(Json(RegenerateKeyResponse { new_key }))
}
