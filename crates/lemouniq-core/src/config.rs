//! Configuration module
//!
//! Settings are read from the environment (after loading a `.env` file if one is
//! present) and grouped by the component that consumes them.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_IMAGE_HOST_EXPIRATION_SECS, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_MAX_PRINT_PIXELS, DEFAULT_POLL_MAX_ATTEMPTS, DEFAULT_PRINT_DPI,
    DEFAULT_PRINT_EDGE_INCHES,
};
use crate::models::Attribution;

const SERVER_PORT: u16 = 5000;
const MAX_FILE_SIZE_MB: usize = 50;
const HTTP_TIMEOUT_SECS: u64 = 120;

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub max_file_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    /// Timeout applied to every outbound HTTP client
    pub http_timeout_secs: u64,
}

/// Local directories the pipeline writes into
#[derive(Clone, Debug)]
pub struct StorageDirs {
    pub upload_dir: PathBuf,
    pub resized_dir: PathBuf,
    pub mockup_dir: PathBuf,
    pub description_dir: PathBuf,
    /// Appended to the file stem of resized prints (e.g. `_resized.png`)
    pub resized_suffix: String,
}

/// Physical print target used by the resizer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrintSpec {
    pub edge_inches: u32,
    pub dpi: u32,
    /// Upper bound on `width * height` of an upscaled print
    pub max_output_pixels: u64,
}

impl PrintSpec {
    /// Minimum length in pixels of the shorter image edge, `None` on overflow.
    pub fn checked_target_edge_px(&self) -> Option<u32> {
        self.edge_inches.checked_mul(self.dpi)
    }

    /// Minimum length in pixels of the shorter image edge.
    ///
    /// Saturates on overflow; [`Config::validate`] rejects such settings.
    pub fn target_edge_px(&self) -> u32 {
        self.checked_target_edge_px().unwrap_or(u32::MAX)
    }
}

impl Default for PrintSpec {
    fn default() -> Self {
        Self {
            edge_inches: DEFAULT_PRINT_EDGE_INCHES,
            dpi: DEFAULT_PRINT_DPI,
            max_output_pixels: DEFAULT_MAX_PRINT_PIXELS,
        }
    }
}

/// Public image host (imgbb-compatible API)
#[derive(Clone, Debug)]
pub struct ImageHostConfig {
    pub upload_url: String,
    pub api_key: Option<String>,
    pub expiration_secs: u64,
}

/// Mockup rendering service (Printful-compatible API)
#[derive(Clone, Debug)]
pub struct MockupConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub poll_interval_secs: u64,
    pub poll_max_attempts: u32,
}

/// Text generation service (OpenAI-compatible chat completions)
#[derive(Clone, Debug)]
pub struct CopyConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageDirs,
    pub print: PrintSpec,
    pub attribution: Attribution,
    pub image_host: ImageHostConfig,
    pub mockup: MockupConfig,
    pub copy: CopyConfig,
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_secret(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, anyhow::Error> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{} must be a valid value, got '{}'", key, raw)),
        _ => Ok(default),
    }
}

fn megabytes_to_bytes(key: &str, mb: usize) -> Result<usize, anyhow::Error> {
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("{} is too large, got {}", key, mb))
}

fn env_list(key: &str, default: &[&str]) -> Vec<String> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => default.iter().map(|s| s.to_string()).collect(),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let max_file_size_mb: usize = env_parse("MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB)?;

        let server = ServerConfig {
            port: env_parse("PORT", SERVER_PORT)?,
            environment,
            cors_origins: env_string("CORS_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_file_size_bytes: megabytes_to_bytes("MAX_FILE_SIZE_MB", max_file_size_mb)?,
            allowed_extensions: env_list("ALLOWED_EXTENSIONS", DEFAULT_ALLOWED_EXTENSIONS),
            http_timeout_secs: env_parse("HTTP_TIMEOUT_SECS", HTTP_TIMEOUT_SECS)?,
        };

        let storage = StorageDirs {
            upload_dir: PathBuf::from(env_string("UPLOAD_FOLDER", "uploads")),
            resized_dir: PathBuf::from(env_string("OUTPUT_FOLDER", "resized")),
            mockup_dir: PathBuf::from(env_string("MOCKUP_FOLDER", "mockups")),
            description_dir: PathBuf::from(env_string("DESCRIPTION_FOLDER", "descriptions")),
            resized_suffix: env_string("RESIZED_FILE_ENDING", "_resized.png"),
        };

        let print = PrintSpec {
            edge_inches: env_parse("PRINT_EDGE_INCHES", DEFAULT_PRINT_EDGE_INCHES)?,
            dpi: env_parse("PRINT_DPI", DEFAULT_PRINT_DPI)?,
            max_output_pixels: env_parse("MAX_PRINT_PIXELS", DEFAULT_MAX_PRINT_PIXELS)?,
        };

        let defaults = Attribution::default();
        let attribution = Attribution {
            author: env_string("ATTRIBUTION_AUTHOR", &defaults.author),
            website: env_string("ATTRIBUTION_WEBSITE", &defaults.website),
            email: env_string("ATTRIBUTION_EMAIL", &defaults.email),
        };

        let image_host = ImageHostConfig {
            upload_url: env_string("IMAGE_HOST_URL", "https://api.imgbb.com/1/upload"),
            api_key: env_secret("IMG_BB_TOKEN"),
            expiration_secs: env_parse(
                "IMAGE_HOST_EXPIRATION_SECS",
                DEFAULT_IMAGE_HOST_EXPIRATION_SECS,
            )?,
        };

        let mockup = MockupConfig {
            base_url: env_string("MOCKUP_API_BASE_URL", "https://api.printful.com"),
            api_key: env_secret("PRINTFUL_TOKEN"),
            poll_interval_secs: env_parse("MOCKUP_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?,
            poll_max_attempts: env_parse("MOCKUP_POLL_MAX_ATTEMPTS", DEFAULT_POLL_MAX_ATTEMPTS)?,
        };

        let copy = CopyConfig {
            base_url: env_string("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            api_key: env_secret("OPENAI_API_KEY"),
            model: env_string("OPENAI_MODEL", "gpt-3.5-turbo"),
        };

        let config = Config {
            server,
            storage,
            print,
            attribution,
            image_host,
            mockup,
            copy,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.server.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.server.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS must not be empty"));
        }

        match self.print.checked_target_edge_px() {
            None => {
                return Err(anyhow::anyhow!(
                    "PRINT_EDGE_INCHES * PRINT_DPI overflows a pixel dimension"
                ))
            }
            Some(0) => {
                return Err(anyhow::anyhow!(
                    "PRINT_EDGE_INCHES and PRINT_DPI must both be greater than zero"
                ))
            }
            Some(_) => {}
        }

        if self.print.max_output_pixels == 0 {
            return Err(anyhow::anyhow!("MAX_PRINT_PIXELS must be greater than zero"));
        }

        if self.server.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than zero"));
        }

        if self.mockup.poll_max_attempts == 0 {
            return Err(anyhow::anyhow!(
                "MOCKUP_POLL_MAX_ATTEMPTS must be greater than zero"
            ));
        }

        if self.storage.resized_dir == self.storage.upload_dir {
            return Err(anyhow::anyhow!(
                "OUTPUT_FOLDER must differ from UPLOAD_FOLDER so resized prints never overwrite sources"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.server.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Names of external services that have no credentials configured.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.image_host.api_key.is_none() {
            missing.push("IMG_BB_TOKEN");
        }
        if self.mockup.api_key.is_none() {
            missing.push("PRINTFUL_TOKEN");
        }
        if self.copy.api_key.is_none() {
            missing.push("OPENAI_API_KEY");
        }
        missing
    }
}
