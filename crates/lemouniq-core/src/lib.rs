//! Lemouniq Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! the image processing, external service and HTTP crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod pipeline_error;

// Re-export commonly used types
pub use config::{
    CopyConfig, Config, ImageHostConfig, MockupConfig, PrintSpec, ServerConfig, StorageDirs,
};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    Attribution, DescriptionPair, FileStatus, ImageAsset, MockupOutcome, MockupSummary,
    Orientation, PipelineStage, ProcessedFileRecord, RejectedFile, StageError,
};
pub use pipeline_error::{ErrorKind, PipelineError, PipelineResult};
