use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use utoipa::ToSchema;

use crate::constants::{
    DEFAULT_ATTRIBUTION_AUTHOR, DEFAULT_ATTRIBUTION_EMAIL, DEFAULT_ATTRIBUTION_WEBSITE,
};
use crate::pipeline_error::{PipelineError, PipelineResult};

/// Shape category of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Square,
    Vertical,
    Horizontal,
}

impl Orientation {
    /// Square iff equal sides, vertical iff taller than wide, horizontal otherwise.
    pub fn from_dimensions(width: u32, height: u32) -> PipelineResult<Self> {
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidImage(format!(
                "image dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(match width.cmp(&height) {
            std::cmp::Ordering::Equal => Orientation::Square,
            std::cmp::Ordering::Less => Orientation::Vertical,
            std::cmp::Ordering::Greater => Orientation::Horizontal,
        })
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Orientation::Square => write!(f, "square"),
            Orientation::Vertical => write!(f, "vertical"),
            Orientation::Horizontal => write!(f, "horizontal"),
        }
    }
}

/// A stored upload moving through the pipeline.
///
/// Orientation is derived from the dimensions and recomputed on every change, so
/// the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    filename: String,
    path: PathBuf,
    width: u32,
    height: u32,
    orientation: Orientation,
}

impl ImageAsset {
    pub fn new(
        filename: impl Into<String>,
        path: impl Into<PathBuf>,
        width: u32,
        height: u32,
    ) -> PipelineResult<Self> {
        Ok(Self {
            filename: filename.into(),
            path: path.into(),
            width,
            height,
            orientation: Orientation::from_dimensions(width, height)?,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// File name without its extension.
    pub fn stem(&self) -> &str {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.filename)
    }

    pub fn set_dimensions(&mut self, width: u32, height: u32) -> PipelineResult<()> {
        self.orientation = Orientation::from_dimensions(width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }
}

/// Fixed attribution block written into every sanitized image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub author: String,
    pub website: String,
    pub email: String,
}

impl Attribution {
    /// Key/value pairs in the order they are embedded.
    pub fn fields(&self) -> [(&'static str, &str); 3] {
        [
            ("Author", self.author.as_str()),
            ("Website", self.website.as_str()),
            ("Email", self.email.as_str()),
        ]
    }
}

impl Default for Attribution {
    fn default() -> Self {
        Self {
            author: DEFAULT_ATTRIBUTION_AUTHOR.to_string(),
            website: DEFAULT_ATTRIBUTION_WEBSITE.to_string(),
            email: DEFAULT_ATTRIBUTION_EMAIL.to_string(),
        }
    }
}
