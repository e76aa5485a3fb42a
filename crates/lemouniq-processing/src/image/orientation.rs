use image::ImageReader;
use lemouniq_core::{PipelineError, PipelineResult};
use std::path::Path;

/// Read the dimensions of an image file from its header without decoding pixels.
pub fn probe(path: &Path) -> PipelineResult<(u32, u32)> {
    let reader = ImageReader::open(path)?
        .with_guessed_format()
        .map_err(PipelineError::Persistence)?;
    reader
        .into_dimensions()
        .map_err(|e| PipelineError::InvalidImage(format!("{}: {}", path.display(), e)))
}
