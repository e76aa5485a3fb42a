//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::services::upload::BatchResponse;
use lemouniq_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lemouniq API",
        version = "0.1.0",
        description = "Print ingestion API: uploads are stripped of metadata, resized to print resolution, rendered as product mockups and given marketing copy."
    ),
    paths(
        handlers::upload::upload_images,
        handlers::health::reachability,
        handlers::health::health_check,
    ),
    components(schemas(
        BatchResponse,
        models::ProcessedFileRecord,
        models::RejectedFile,
        models::FileStatus,
        models::PipelineStage,
        models::StageError,
        models::MockupSummary,
        models::MockupOutcome,
        lemouniq_core::ErrorKind,
        error::ErrorResponse,
        handlers::health::HealthResponse,
    )),
    tags(
        (name = "upload", description = "Batch print upload"),
        (name = "health", description = "Liveness probes")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
