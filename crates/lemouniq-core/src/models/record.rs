use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

use crate::pipeline_error::{ErrorKind, PipelineError};

/// Stage of the per-file pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Save,
    Sanitize,
    Resize,
    Mockups,
    Descriptions,
}

impl PipelineStage {
    /// A failure in a fatal stage stops the remaining stages for that file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineStage::Save | PipelineStage::Sanitize | PipelineStage::Resize
        )
    }
}

impl Display for PipelineStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PipelineStage::Save => write!(f, "save"),
            PipelineStage::Sanitize => write!(f, "sanitize"),
            PipelineStage::Resize => write!(f, "resize"),
            PipelineStage::Mockups => write!(f, "mockups"),
            PipelineStage::Descriptions => write!(f, "descriptions"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Success,
    Partial,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StageError {
    pub stage: PipelineStage,
    pub error_kind: ErrorKind,
    pub message: String,
}

impl StageError {
    pub fn new(stage: PipelineStage, err: &PipelineError) -> Self {
        Self {
            stage,
            error_kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Terminal state of one mockup rendering task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MockupOutcome {
    Completed,
    Failed,
    TimedOut,
    Cancelled,
}

/// Result of one product template (canvas or poster) for a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MockupSummary {
    /// e.g. `bird_canvas`
    pub product_type: String,
    pub outcome: MockupOutcome,
    /// Local paths of the downloaded mockups
    pub files: Vec<String>,
}

/// File refused at ingress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RejectedFile {
    pub filename: String,
    pub error_kind: ErrorKind,
}

/// Per-file entry of the batch response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProcessedFileRecord {
    pub filename: String,
    pub file_path: String,
    /// Batch progress after this file: (index + 1) * 100 / total
    pub processing_percentage: f64,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resized_path: Option<String>,
    pub mockups: Vec<MockupSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_path: Option<String>,
    pub errors: Vec<StageError>,
}

impl ProcessedFileRecord {
    pub fn new(filename: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            file_path: file_path.into(),
            processing_percentage: 0.0,
            status: FileStatus::Success,
            resized_path: None,
            mockups: Vec::new(),
            description_path: None,
            errors: Vec::new(),
        }
    }

    /// Attach a stage failure and downgrade the status accordingly.
    pub fn record_error(&mut self, stage: PipelineStage, err: &PipelineError) {
        self.errors.push(StageError::new(stage, err));
        self.status = if stage.is_fatal() {
            FileStatus::Failed
        } else if self.status == FileStatus::Failed {
            FileStatus::Failed
        } else {
            FileStatus::Partial
        };
    }

    /// Store a template result; anything short of completion makes the file partial.
    pub fn push_mockup(&mut self, summary: MockupSummary) {
        if summary.outcome != MockupOutcome::Completed && self.status == FileStatus::Success {
            self.status = FileStatus::Partial;
        }
        self.mockups.push(summary);
    }
}
