//! Lemouniq API Library
//!
//! HTTP ingress for the print ingestion pipeline: the upload handler, the
//! per-file orchestrator, application state and startup wiring.

mod api_doc;
pub mod error;
mod handlers;
pub mod services;
pub mod setup;
pub mod state;
mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use services::upload::{BatchResponse, CopyStage, IncomingFile, MockupStage, UploadPipeline};
pub use state::AppState;
