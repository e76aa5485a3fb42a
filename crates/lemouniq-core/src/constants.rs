//! Fixed values shared across crates.

/// Multipart field carrying the uploaded images.
pub const UPLOAD_FIELD_NAME: &str = "image";

/// Extensions accepted by the upload endpoint when `ALLOWED_EXTENSIONS` is unset.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

pub const DEFAULT_ATTRIBUTION_AUTHOR: &str = "Lemouniq";
pub const DEFAULT_ATTRIBUTION_WEBSITE: &str = "https://lemouniq.com";
pub const DEFAULT_ATTRIBUTION_EMAIL: &str = "info@lemouniq.com";

/// Print target: shorter edge of 20 inches at 300 DPI.
pub const DEFAULT_PRINT_EDGE_INCHES: u32 = 20;
pub const DEFAULT_PRINT_DPI: u32 = 300;

/// Largest upscaled print accepted, in pixels (about 600 MB as RGB8).
pub const DEFAULT_MAX_PRINT_PIXELS: u64 = 200_000_000;

/// Mockup task polling defaults (fixed interval, no backoff).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 10;

/// Seconds the public image host keeps an upload before expiring it.
pub const DEFAULT_IMAGE_HOST_EXPIRATION_SECS: u64 = 600;
