//! Upload API integration tests.
//!
//! Run with: `cargo test -p lemouniq-api --test upload_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::fixtures::{create_corrupt_image, create_test_jpeg, create_test_png};
use helpers::{image_form, setup_test_app};
use serde_json::Value;

fn records(body: &Value) -> &Vec<Value> {
    body["processed_data"]
        .as_array()
        .expect("Expected processed_data array")
}

#[tokio::test]
async fn test_batch_with_corrupt_middle_file_returns_mixed_results() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .multipart(image_form(vec![
            ("first.png", create_test_png(4, 8)),
            ("broken.png", create_corrupt_image()),
            ("third.jpg", create_test_jpeg(6, 6)),
        ]))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let records = records(&body);
    assert_eq!(records.len(), 3);

    assert_eq!(records[0]["filename"], "first.png");
    assert_eq!(records[0]["status"], "success");
    assert_eq!(records[1]["filename"], "broken.png");
    assert_eq!(records[1]["status"], "failed");
    assert_eq!(records[1]["errors"][0]["stage"], "sanitize");
    assert_eq!(records[1]["errors"][0]["error_kind"], "invalid_image");
    assert!(records[1].get("resized_path").is_none());
    assert_eq!(records[2]["status"], "success");

    let percentages: Vec<f64> = records
        .iter()
        .map(|r| r["processing_percentage"].as_f64().unwrap())
        .collect();
    assert!((percentages[0] - 100.0 / 3.0).abs() < 1e-9);
    assert!((percentages[1] - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(percentages[2], 100.0);

    // the failed file never reaches the enrichment stages
    assert_eq!(
        *app.mockups.seen.lock().unwrap(),
        vec!["first.png".to_string(), "third.jpg".to_string()]
    );
}

#[tokio::test]
async fn test_successful_file_produces_all_artifacts() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .multipart(image_form(vec![("abstract-bird_2.png", create_test_png(5, 4))]))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let record = &records(&body)[0];

    let storage = &app.config.storage;
    assert_eq!(
        record["file_path"],
        storage.upload_dir.join("abstract-bird_2.png").to_string_lossy().into_owned()
    );
    assert!(storage.upload_dir.join("abstract-bird_2.png").exists());

    let resized = storage.resized_dir.join("abstract-bird_2_resized.png");
    assert_eq!(record["resized_path"], resized.to_string_lossy().into_owned());
    let img = image::open(&resized).unwrap();
    assert_eq!((img.width(), img.height()), (13, 10));

    assert_eq!(record["mockups"].as_array().unwrap().len(), 2);
    assert_eq!(record["mockups"][0]["product_type"], "abstract-bird_2_canvas");
    assert_eq!(record["mockups"][1]["outcome"], "completed");

    let description = storage.description_dir.join("abstract bird 2.txt");
    assert_eq!(record["description_path"], description.to_string_lossy().into_owned());
    assert!(description.exists());
}

#[tokio::test]
async fn test_description_failure_marks_file_partial() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .multipart(image_form(vec![("nocopy.png", create_test_png(4, 4))]))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let record = &records(&body)[0];
    assert_eq!(record["status"], "partial");
    assert_eq!(record["errors"][0]["stage"], "descriptions");
    assert_eq!(record["errors"][0]["error_kind"], "external_service_unavailable");
    assert!(record.get("description_path").is_none());
    assert!(record.get("resized_path").is_some());
}

#[tokio::test]
async fn test_rejected_files_are_listed() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .multipart(image_form(vec![
            ("anim.gif", vec![0x47, 0x49, 0x46]),
            ("keep.JPEG", create_test_jpeg(4, 4)),
        ]))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(records(&body).len(), 1);
    assert_eq!(records(&body)[0]["filename"], "keep.JPEG");
    assert_eq!(body["rejected"][0]["filename"], "anim.gif");
    assert_eq!(body["rejected"][0]["error_kind"], "unsupported_extension");
}

#[tokio::test]
async fn test_missing_image_field_is_rejected() {
    let app = setup_test_app();

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(bytes::Bytes::from(create_test_png(2, 2))).file_name("a.png"),
    );
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "No files part");
    assert_eq!(body["code"], "NO_FILES_PART");
}

#[tokio::test]
async fn test_only_unsupported_files_is_rejected() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .multipart(image_form(vec![
            ("a.gif", vec![1, 2, 3]),
            ("notes.txt", b"hello".to_vec()),
        ]))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "No valid files uploaded");
    assert_eq!(body["recoverable"], false);
}

#[tokio::test]
async fn test_oversized_file_is_rejected() {
    let app = setup_test_app();
    let too_big = vec![0u8; app.config.server.max_file_size_bytes + 1];

    let response = app
        .client()
        .post("/upload")
        .multipart(image_form(vec![("huge.png", too_big)]))
        .await;

    assert_eq!(response.status_code(), 413);
    assert!(app.mockups.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_reachability_and_health() {
    let app = setup_test_app();

    let response = app.client().get("/test").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), "The backend is reachable");

    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_openapi_document_lists_upload() {
    let app = setup_test_app();

    let response = app.client().get("/api-docs/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert!(body["paths"]["/upload"]["post"].is_object());
    assert!(body["components"]["schemas"]["ProcessedFileRecord"].is_object());
}
