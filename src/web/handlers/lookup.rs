//! Lookup and removal HTTP handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::errors::AppResult;
use crate::models::{LookupResult, RemoveResult};
use crate::web::AppState;

/// `GET /lookup/:vin`
pub async fn lookup_vin(
    State(state): State<AppState>,
    Path(vin): Path<String>,
) -> AppResult<Json<LookupResult>> {
    state.lookup_service.lookup(&vin).await.map(Json)
}

/// `DELETE /remove/:vin`
pub async fn remove_vin(
    State(state): State<AppState>,
    Path(vin): Path<String>,
) -> AppResult<Json<RemoveResult>> {
    state.lookup_service.remove(&vin).await.map(Json)
}
