use bytes::Bytes;
use lemouniq_core::{ProcessedFileRecord, RejectedFile};
use serde::Serialize;
use utoipa::ToSchema;

/// One file read from the multipart body.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Name declared by the client, before sanitizing
    pub filename: String,
    pub data: Bytes,
}

impl IncomingFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// Body of a successful `POST /upload`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchResponse {
    pub processed_data: Vec<ProcessedFileRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedFile>,
}
