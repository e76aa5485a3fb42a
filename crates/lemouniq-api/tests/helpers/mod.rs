//! Test helpers: build the router around fake enrichment stages.
//!
//! Run from workspace root: `cargo test -p lemouniq-api --test upload_test`.

pub mod fixtures;

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use lemouniq_api::setup::routes;
use lemouniq_api::{AppState, CopyStage, MockupStage, UploadPipeline};
use lemouniq_core::{
    Attribution, Config, CopyConfig, ImageAsset, ImageHostConfig, MockupConfig, MockupOutcome,
    MockupSummary, PipelineError, PipelineResult, PrintSpec, ServerConfig, StorageDirs,
};
use lemouniq_services::MockupReport;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Mockup stage that writes one default mockup per template without any network.
pub struct FakeMockups {
    pub output_dir: PathBuf,
    pub seen: Mutex<Vec<String>>,
}

#[async_trait]
impl MockupStage for FakeMockups {
    async fn run(
        &self,
        asset: &ImageAsset,
        _cancel: &CancellationToken,
    ) -> PipelineResult<MockupReport> {
        self.seen
            .lock()
            .expect("mockup log poisoned")
            .push(asset.filename().to_string());

        let mut report = MockupReport::default();
        for template in ["canvas", "poster"] {
            let product_type = format!("{}_{}", asset.stem(), template);
            let dest = self
                .output_dir
                .join(format!("{}_default_mockup.jpg", product_type));
            tokio::fs::create_dir_all(&self.output_dir).await?;
            tokio::fs::write(&dest, b"mockup").await?;
            report.summaries.push(MockupSummary {
                product_type,
                outcome: MockupOutcome::Completed,
                files: vec![dest.to_string_lossy().into_owned()],
            });
        }
        Ok(report)
    }
}

/// Copy stage that writes a fixed text, failing for keywords containing `nocopy`.
pub struct FakeCopy {
    pub output_dir: PathBuf,
}

#[async_trait]
impl CopyStage for FakeCopy {
    async fn run(&self, keyword: &str) -> PipelineResult<PathBuf> {
        if keyword.contains("nocopy") {
            return Err(PipelineError::unavailable("text generation", "HTTP 503"));
        }
        let path = self.output_dir.join(format!("{}.txt", keyword));
        tokio::fs::create_dir_all(&self.output_dir).await?;
        tokio::fs::write(
            &path,
            "Meta Description:\nshort\n\nProduct Description:\nlong",
        )
        .await?;
        Ok(path)
    }
}

/// Configuration rooted in `root`, with a 10px print target so resizes stay tiny.
pub fn test_config(root: &Path) -> Config {
    Config {
        server: ServerConfig {
            port: 0,
            environment: "test".to_string(),
            cors_origins: vec!["*".to_string()],
            max_file_size_bytes: 1024 * 1024,
            allowed_extensions: vec!["png".into(), "jpg".into(), "jpeg".into()],
            http_timeout_secs: 5,
        },
        storage: StorageDirs {
            upload_dir: root.join("uploads"),
            resized_dir: root.join("resized"),
            mockup_dir: root.join("mockups"),
            description_dir: root.join("descriptions"),
            resized_suffix: "_resized.png".to_string(),
        },
        print: PrintSpec {
            edge_inches: 1,
            dpi: 10,
            ..PrintSpec::default()
        },
        attribution: Attribution::default(),
        image_host: ImageHostConfig {
            upload_url: "http://127.0.0.1:9/upload".to_string(),
            api_key: None,
            expiration_secs: 600,
        },
        mockup: MockupConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            poll_interval_secs: 0,
            poll_max_attempts: 1,
        },
        copy: CopyConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            model: "test-model".to_string(),
        },
    }
}

/// Test application: server plus the directory tree it writes into.
pub struct TestApp {
    pub server: TestServer,
    pub config: Config,
    pub mockups: Arc<FakeMockups>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path());

    let mockups = Arc::new(FakeMockups {
        output_dir: config.storage.mockup_dir.clone(),
        seen: Mutex::new(Vec::new()),
    });
    let copy = Arc::new(FakeCopy {
        output_dir: config.storage.description_dir.clone(),
    });

    let pipeline = UploadPipeline::from_config(&config, mockups.clone(), copy);
    let state = Arc::new(AppState::new(
        config.clone(),
        pipeline,
        CancellationToken::new(),
    ));
    let app = routes::setup_routes(&config, state).expect("Failed to build routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        config,
        mockups,
        _temp_dir: temp_dir,
    }
}

/// Multipart form with every file under the `image` field.
pub fn image_form(files: Vec<(&str, Vec<u8>)>) -> MultipartForm {
    files
        .into_iter()
        .fold(MultipartForm::new(), |form, (name, data)| {
            form.add_part(
                "image",
                Part::bytes(bytes::Bytes::from(data))
                    .file_name(name.to_string())
                    .mime_type("application/octet-stream"),
            )
        })
}
