//! Upload pipeline
//!
//! Runs every accepted file of a batch through save, sanitize, resize, mockups and
//! descriptions, and collects one record per file.

mod pipeline;
mod stages;
mod types;

pub use pipeline::UploadPipeline;
pub use stages::{CopyStage, MockupStage};
pub use types::{BatchResponse, IncomingFile};
