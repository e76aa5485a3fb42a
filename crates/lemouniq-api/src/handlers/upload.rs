use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use lemouniq_core::{constants::UPLOAD_FIELD_NAME, AppError};

use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::{BatchResponse, IncomingFile};
use crate::state::AppState;

/// Collect every file sent under the upload field name, in order.
async fn read_files(mut multipart: Multipart) -> Result<Option<Vec<IncomingFile>>, HttpAppError> {
    let mut files: Option<Vec<IncomingFile>> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        files.get_or_insert_with(Vec::new).push(IncomingFile { filename, data });
    }

    Ok(files)
}

/// Upload a batch of prints
///
/// Every file under the `image` field is saved, stripped of metadata, resized for
/// print, rendered as canvas and poster mockups and given marketing copy. The
/// response carries one record per accepted file; failures of a single file are
/// reported in its record.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "upload",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Batch processed", body = BatchResponse),
        (status = 400, description = "No image field or no acceptable file", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_batch"))]
pub async fn upload_images(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<BatchResponse>, HttpAppError> {
    let files = read_files(multipart)
        .await?
        .ok_or(AppError::NoFilesPart)?;

    tracing::info!(files = files.len(), "Upload received");

    let response = state
        .pipeline
        .process_batch(files, &state.shutdown)
        .await?;

    Ok(Json(response))
}
