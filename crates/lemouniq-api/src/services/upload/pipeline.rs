use lemouniq_core::{
    AppError, Config, ErrorKind, FileStatus, ImageAsset, PipelineError, PipelineResult,
    PipelineStage, ProcessedFileRecord, RejectedFile,
};
use lemouniq_processing::{
    derive_keyword, image::probe, sanitize_filename, MetadataSanitizer, PrintResizer,
    UploadValidator,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::stages::{CopyStage, MockupStage};
use super::types::{BatchResponse, IncomingFile};

/// Sequential per-file pipeline: save, sanitize, resize, mockups, descriptions.
pub struct UploadPipeline {
    upload_dir: PathBuf,
    max_file_size_bytes: usize,
    validator: UploadValidator,
    sanitizer: MetadataSanitizer,
    resizer: PrintResizer,
    mockups: Arc<dyn MockupStage>,
    copy: Arc<dyn CopyStage>,
}

impl UploadPipeline {
    pub fn new(
        upload_dir: impl Into<PathBuf>,
        max_file_size_bytes: usize,
        validator: UploadValidator,
        sanitizer: MetadataSanitizer,
        resizer: PrintResizer,
        mockups: Arc<dyn MockupStage>,
        copy: Arc<dyn CopyStage>,
    ) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_file_size_bytes,
            validator,
            sanitizer,
            resizer,
            mockups,
            copy,
        }
    }

    /// Build the local stages from configuration around the given enrichment stages.
    pub fn from_config(
        config: &Config,
        mockups: Arc<dyn MockupStage>,
        copy: Arc<dyn CopyStage>,
    ) -> Self {
        Self::new(
            config.storage.upload_dir.clone(),
            config.server.max_file_size_bytes,
            UploadValidator::new(config.server.allowed_extensions.clone()),
            MetadataSanitizer::new(config.attribution.clone()),
            PrintResizer::new(
                config.print,
                config.storage.resized_dir.clone(),
                config.storage.resized_suffix.clone(),
            ),
            mockups,
            copy,
        )
    }

    /// Process a batch of uploaded files one after another.
    ///
    /// Fails the whole request only when a file exceeds the size limit or when no
    /// file has an allowed extension. Every other failure lands in the record of
    /// the file it belongs to.
    pub async fn process_batch(
        &self,
        files: Vec<IncomingFile>,
        cancel: &CancellationToken,
    ) -> Result<BatchResponse, AppError> {
        if let Some(oversized) = files
            .iter()
            .find(|f| f.data.len() > self.max_file_size_bytes)
        {
            return Err(AppError::PayloadTooLarge(format!(
                "File '{}' exceeds maximum allowed size of {} MB",
                oversized.filename,
                self.max_file_size_bytes / 1024 / 1024
            )));
        }

        let mut accepted = Vec::with_capacity(files.len());
        let mut rejected = Vec::new();
        for file in files {
            match self.validator.validate_extension(&file.filename) {
                Ok(()) => accepted.push(file),
                Err(e) => {
                    tracing::debug!(file = %file.filename, error = %e, "File rejected");
                    rejected.push(RejectedFile {
                        filename: file.filename,
                        error_kind: ErrorKind::UnsupportedExtension,
                    });
                }
            }
        }

        if accepted.is_empty() {
            return Err(AppError::NoValidFiles);
        }

        let total = accepted.len();
        tracing::info!(
            accepted = total,
            rejected = rejected.len(),
            "Processing upload batch"
        );

        let mut processed_data = Vec::with_capacity(total);
        for (index, file) in accepted.into_iter().enumerate() {
            let mut record = self.process_file(file, cancel).await;
            record.processing_percentage = batch_percentage(index, total);
            tracing::info!(
                file = %record.filename,
                status = ?record.status,
                progress = record.processing_percentage,
                "File processed"
            );
            processed_data.push(record);
        }

        Ok(BatchResponse {
            processed_data,
            rejected,
        })
    }

    async fn process_file(
        &self,
        file: IncomingFile,
        cancel: &CancellationToken,
    ) -> ProcessedFileRecord {
        if cancel.is_cancelled() {
            tracing::info!(file = %file.filename, "Shutdown in progress, file skipped");
            let mut record = ProcessedFileRecord::new(file.filename, String::new());
            record.record_error(PipelineStage::Save, &PipelineError::Cancelled);
            return record;
        }

        let filename = match sanitize_filename(&file.filename) {
            Ok(name) => name,
            Err(e) => {
                let mut record = ProcessedFileRecord::new(file.filename, String::new());
                record.record_error(PipelineStage::Save, &e);
                return record;
            }
        };

        let path = self.upload_dir.join(&filename);
        let mut record = ProcessedFileRecord::new(&filename, path.to_string_lossy());

        if let Err(e) = self.save(&path, &file.data).await {
            tracing::error!(file = %filename, stage = "save", error = %e, "Stage failed");
            record.record_error(PipelineStage::Save, &e);
            return record;
        }

        if let Err(e) = self.sanitizer.sanitize_file(&path).await {
            tracing::error!(file = %filename, stage = "sanitize", error = %e, "Stage failed");
            record.record_error(PipelineStage::Sanitize, &e);
            return record;
        }

        let asset = match self.load_asset(&filename, &path).await {
            Ok(asset) => asset,
            Err(e) => {
                record.record_error(PipelineStage::Resize, &e);
                return record;
            }
        };

        match self.resizer.resize_file(asset.path()).await {
            Ok(resized) => {
                record.resized_path = Some(resized.path.to_string_lossy().into_owned());
            }
            Err(e) => {
                tracing::error!(file = %filename, stage = "resize", error = %e, "Stage failed");
                record.record_error(PipelineStage::Resize, &e);
                return record;
            }
        }

        if cancel.is_cancelled() {
            record.record_error(PipelineStage::Mockups, &PipelineError::Cancelled);
            record.record_error(PipelineStage::Descriptions, &PipelineError::Cancelled);
            return record;
        }

        match self.mockups.run(&asset, cancel).await {
            Ok(report) => {
                for summary in report.summaries {
                    record.push_mockup(summary);
                }
                for e in &report.errors {
                    record.record_error(PipelineStage::Mockups, e);
                }
            }
            Err(e) => {
                tracing::warn!(file = %filename, stage = "mockups", error = %e, "Stage failed");
                record.record_error(PipelineStage::Mockups, &e);
            }
        }

        if cancel.is_cancelled() {
            record.record_error(PipelineStage::Descriptions, &PipelineError::Cancelled);
            return record;
        }

        let keyword = derive_keyword(&filename);
        match self.copy.run(&keyword).await {
            Ok(path) => record.description_path = Some(path.to_string_lossy().into_owned()),
            Err(e) => {
                tracing::warn!(
                    file = %filename,
                    keyword = %keyword,
                    stage = "descriptions",
                    error = %e,
                    "Stage failed"
                );
                record.record_error(PipelineStage::Descriptions, &e);
            }
        }

        if record.status != FileStatus::Success {
            tracing::debug!(file = %filename, errors = record.errors.len(), "File finished with errors");
        }
        record
    }

    async fn save(&self, path: &Path, data: &[u8]) -> PipelineResult<()> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        tokio::fs::write(path, data).await?;
        tracing::debug!(path = %path.display(), size = data.len(), "Upload saved");
        Ok(())
    }

    async fn load_asset(&self, filename: &str, path: &Path) -> PipelineResult<ImageAsset> {
        let probe_path = path.to_path_buf();
        let (width, height) = tokio::task::spawn_blocking(move || probe(&probe_path))
            .await
            .map_err(|e| PipelineError::Persistence(std::io::Error::other(e)))??;
        ImageAsset::new(filename, path, width, height)
    }
}

/// Coarse batch progress after the file at `index`.
fn batch_percentage(index: usize, total: usize) -> f64 {
    (index + 1) as f64 * 100.0 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{ImageFormat, Rgb, RgbImage};
    use lemouniq_core::{
        Attribution, MockupOutcome, MockupSummary, Orientation, PrintSpec,
    };
    use lemouniq_services::MockupReport;
    use std::io::Cursor;
    use std::sync::Mutex;

    struct RecordingMockups {
        seen: Mutex<Vec<(String, Orientation)>>,
    }

    #[async_trait]
    impl MockupStage for RecordingMockups {
        async fn run(
            &self,
            asset: &ImageAsset,
            _cancel: &CancellationToken,
        ) -> PipelineResult<MockupReport> {
            self.seen
                .lock()
                .unwrap()
                .push((asset.filename().to_string(), asset.orientation()));
            Ok(MockupReport {
                summaries: vec![MockupSummary {
                    product_type: format!("{}_canvas", asset.stem()),
                    outcome: MockupOutcome::TimedOut,
                    files: Vec::new(),
                }],
                errors: vec![PipelineError::TaskTimedOut {
                    task_key: "t".into(),
                    attempts: 10,
                }],
            })
        }
    }

    struct DirCopy {
        dir: PathBuf,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CopyStage for DirCopy {
        async fn run(&self, keyword: &str) -> PipelineResult<PathBuf> {
            self.calls.lock().unwrap().push(keyword.to_string());
            Ok(self.dir.join(format!("{}.txt", keyword)))
        }
    }

    /// Mockup stage that triggers shutdown while the first file is being rendered.
    struct ShutdownDuringMockups {
        token: CancellationToken,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MockupStage for ShutdownDuringMockups {
        async fn run(
            &self,
            asset: &ImageAsset,
            _cancel: &CancellationToken,
        ) -> PipelineResult<MockupReport> {
            self.seen.lock().unwrap().push(asset.filename().to_string());
            self.token.cancel();
            Ok(MockupReport::default())
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([10, 20, 30]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn pipeline(root: &Path, mockups: Arc<RecordingMockups>) -> UploadPipeline {
        pipeline_with(root, mockups, copy(root))
    }

    fn copy(root: &Path) -> Arc<DirCopy> {
        Arc::new(DirCopy {
            dir: root.join("descriptions"),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn pipeline_with(
        root: &Path,
        mockups: Arc<dyn MockupStage>,
        copy: Arc<DirCopy>,
    ) -> UploadPipeline {
        UploadPipeline::new(
            root.join("uploads"),
            1024 * 1024,
            UploadValidator::new(vec!["png".into(), "jpg".into(), "jpeg".into()]),
            MetadataSanitizer::new(Attribution::default()),
            PrintResizer::new(
                PrintSpec {
                    edge_inches: 1,
                    dpi: 10,
                    ..PrintSpec::default()
                },
                root.join("resized"),
                "_resized.png",
            ),
            mockups,
            copy,
        )
    }

    fn mockups() -> Arc<RecordingMockups> {
        Arc::new(RecordingMockups {
            seen: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_batch_percentage() {
        assert_eq!(batch_percentage(0, 3), 100.0 / 3.0);
        assert_eq!(batch_percentage(2, 3), 100.0);
        assert_eq!(batch_percentage(0, 1), 100.0);
    }

    #[tokio::test]
    async fn test_timed_out_mockups_mark_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let stage = mockups();
        let pipeline = pipeline(dir.path(), stage.clone());

        let response = pipeline
            .process_batch(
                vec![IncomingFile::new("abstract-bird_2.png", png(4, 8))],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let record = &response.processed_data[0];
        assert_eq!(record.status, FileStatus::Partial);
        assert_eq!(record.processing_percentage, 100.0);
        assert_eq!(record.mockups[0].outcome, MockupOutcome::TimedOut);
        assert_eq!(record.errors[0].stage, PipelineStage::Mockups);
        assert_eq!(record.errors[0].error_kind, ErrorKind::TaskTimedOut);
        assert!(record
            .description_path
            .as_deref()
            .unwrap()
            .ends_with("abstract bird 2.txt"));
        assert_eq!(
            stage.seen.lock().unwrap()[0],
            ("abstract-bird_2.png".to_string(), Orientation::Vertical)
        );
    }

    #[tokio::test]
    async fn test_resize_writes_print_file() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path(), mockups());

        let response = pipeline
            .process_batch(
                vec![IncomingFile::new("wide.png", png(8, 4))],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let resized = response.processed_data[0].resized_path.clone().unwrap();
        assert!(resized.ends_with("wide_resized.png"));
        let img = image::open(&resized).unwrap();
        assert_eq!((img.width(), img.height()), (20, 10));
    }

    #[tokio::test]
    async fn test_traversal_name_is_flattened() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path(), mockups());

        let response = pipeline
            .process_batch(
                vec![IncomingFile::new("../../etc/evil.png", png(4, 4))],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let record = &response.processed_data[0];
        assert_eq!(record.filename, "evil.png");
        assert!(dir.path().join("uploads").join("evil.png").exists());
    }

    #[tokio::test]
    async fn test_oversized_file_fails_request() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path(), mockups());

        let err = pipeline
            .process_batch(
                vec![IncomingFile::new("big.png", vec![0u8; 1024 * 1024 + 1])],
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }

    #[tokio::test]
    async fn test_only_rejected_files_is_no_valid_files() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path(), mockups());

        let err = pipeline
            .process_batch(
                vec![IncomingFile::new("anim.gif", vec![1, 2, 3])],
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoValidFiles));
    }

    #[tokio::test]
    async fn test_shutdown_stops_remaining_network_stages() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        let mockups = Arc::new(ShutdownDuringMockups {
            token: cancel.clone(),
            seen: Mutex::new(Vec::new()),
        });
        let copy = copy(dir.path());
        let pipeline = pipeline_with(dir.path(), mockups.clone(), copy.clone());

        let response = pipeline
            .process_batch(
                vec![
                    IncomingFile::new("first.png", png(4, 4)),
                    IncomingFile::new("second.png", png(4, 4)),
                ],
                &cancel,
            )
            .await
            .unwrap();

        assert_eq!(*mockups.seen.lock().unwrap(), vec!["first.png".to_string()]);
        assert!(copy.calls.lock().unwrap().is_empty());

        let first = &response.processed_data[0];
        assert_eq!(first.status, FileStatus::Partial);
        assert!(first.resized_path.is_some());
        assert_eq!(first.errors[0].stage, PipelineStage::Descriptions);
        assert_eq!(first.errors[0].error_kind, ErrorKind::Cancelled);

        let second = &response.processed_data[1];
        assert_eq!(second.status, FileStatus::Failed);
        assert_eq!(second.errors[0].error_kind, ErrorKind::Cancelled);
        assert!(!dir.path().join("uploads").join("second.png").exists());
        assert_eq!(second.processing_percentage, 100.0);
    }

    #[tokio::test]
    async fn test_cancelled_batch_skips_every_stage() {
        let dir = tempfile::tempdir().unwrap();
        let stage = mockups();
        let copy = copy(dir.path());
        let pipeline = pipeline_with(dir.path(), stage.clone(), copy.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let response = pipeline
            .process_batch(vec![IncomingFile::new("late.png", png(4, 4))], &cancel)
            .await
            .unwrap();

        assert!(stage.seen.lock().unwrap().is_empty());
        assert!(copy.calls.lock().unwrap().is_empty());
        assert_eq!(response.processed_data[0].status, FileStatus::Failed);
    }

    #[tokio::test]
    async fn test_long_unicode_name_is_saved_and_resized() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path(), mockups());
        let name = format!("{}.png", "é".repeat(300));

        let response = pipeline
            .process_batch(
                vec![IncomingFile::new(name, png(4, 4))],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let record = &response.processed_data[0];
        assert_ne!(record.status, FileStatus::Failed, "{:?}", record.errors);
        assert!(record.filename.len() <= 255);
        let resized = record.resized_path.as_deref().unwrap();
        assert!(std::path::Path::new(resized).exists());
    }
}
