//! Export download handler

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};

use crate::errors::AppResult;
use crate::web::AppState;

/// `GET /export`
///
/// Sends the export artifact as an attachment; an empty cache produces a
/// zero-length file.
pub async fn export_cache(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let artifact = state.export_service.export().await?;

    let headers = [
        (header::CONTENT_TYPE, artifact.content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.file_name),
        ),
    ];

    Ok((headers, artifact.contents))
}
