use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use img_parts::png::{Png, PngChunk};
use lemouniq_core::{PipelineError, PipelineResult, PrintSpec};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use super::orientation::probe;

const PNG_PHYS: [u8; 4] = *b"pHYs";
const PNG_IDAT: [u8; 4] = *b"IDAT";
const PHYS_UNIT_METER: u8 = 1;

/// Output of a print resize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizedImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// False when the source already met the print target
    pub upscaled: bool,
}

/// Target dimensions for a print whose shorter edge must reach `target_edge`.
///
/// Never downscales. The shorter side is set exactly to the target and the longer
/// side is scaled by the same factor, rounded to the nearest pixel. Fails when the
/// scaled longer side does not fit a `u32`.
pub fn calculate_print_dimensions(
    width: u32,
    height: u32,
    target_edge: u32,
) -> PipelineResult<(u32, u32)> {
    let shorter = width.min(height);
    if shorter == 0 || shorter >= target_edge {
        return Ok((width, height));
    }

    let longer = u64::from(width.max(height));
    let shorter = u64::from(shorter);
    let target = u64::from(target_edge);
    let scaled_longer = (2 * longer * target + shorter) / (2 * shorter);
    let scaled_longer = u32::try_from(scaled_longer).map_err(|_| {
        PipelineError::InvalidImage(format!(
            "{}x{} cannot reach a {}px print edge: longer side would be {}px",
            width, height, target_edge, scaled_longer
        ))
    })?;

    if width <= height {
        Ok((target_edge, scaled_longer))
    } else {
        Ok((scaled_longer, target_edge))
    }
}

/// Pixels per meter for a DPI value, as stored in a PNG `pHYs` chunk.
fn pixels_per_meter(dpi: u32) -> u32 {
    ((u64::from(dpi) * 10_000 + 127) / 254) as u32
}

/// Upscales sanitized images to print resolution and writes a DPI-tagged PNG.
#[derive(Debug, Clone)]
pub struct PrintResizer {
    spec: PrintSpec,
    output_dir: PathBuf,
    suffix: String,
}

impl PrintResizer {
    pub fn new(spec: PrintSpec, output_dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            spec,
            output_dir: output_dir.into(),
            suffix: suffix.into(),
        }
    }

    /// Where the resized print of `source` is written.
    pub fn output_path(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        self.output_dir.join(format!("{}{}", stem, self.suffix))
    }

    pub async fn resize_file(&self, source: &Path) -> PipelineResult<ResizedImage> {
        let resizer = self.clone();
        let source = source.to_path_buf();
        tokio::task::spawn_blocking(move || resizer.resize_file_blocking(&source))
            .await
            .map_err(super::join_error)?
    }

    pub fn resize_file_blocking(&self, source: &Path) -> PipelineResult<ResizedImage> {
        let (orig_width, orig_height) = probe(source)?;
        let (width, height) =
            calculate_print_dimensions(orig_width, orig_height, self.spec.target_edge_px())?;
        let upscaled = (width, height) != (orig_width, orig_height);

        let pixels = u64::from(width) * u64::from(height);
        if upscaled && pixels > self.spec.max_output_pixels {
            return Err(PipelineError::InvalidImage(format!(
                "{}: print of {}x{} exceeds the {} pixel limit",
                source.display(),
                width,
                height,
                self.spec.max_output_pixels
            )));
        }

        let img = ImageReader::open(source)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| PipelineError::InvalidImage(format!("{}: {}", source.display(), e)))?;

        let output = if upscaled {
            img.resize_exact(width, height, FilterType::Nearest)
        } else {
            img
        };

        let encoded = encode_png_with_dpi(&output, self.spec.dpi)?;
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_path(source);
        std::fs::write(&path, encoded)?;

        tracing::info!(
            source = %source.display(),
            output = %path.display(),
            from = %format!("{}x{}", orig_width, orig_height),
            to = %format!("{}x{}", width, height),
            dpi = self.spec.dpi,
            "Print resized"
        );

        Ok(ResizedImage {
            path,
            width,
            height,
            upscaled,
        })
    }
}

fn encode_png_with_dpi(img: &DynamicImage, dpi: u32) -> PipelineResult<Vec<u8>> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| PipelineError::InvalidImage(format!("PNG encoding failed: {}", e)))?;

    let mut png = Png::from_bytes(Bytes::from(buffer))
        .map_err(|e| PipelineError::InvalidImage(format!("PNG re-read failed: {}", e)))?;

    let ppm = pixels_per_meter(dpi).to_be_bytes();
    let mut phys = Vec::with_capacity(9);
    phys.extend_from_slice(&ppm);
    phys.extend_from_slice(&ppm);
    phys.push(PHYS_UNIT_METER);

    let chunks = png.chunks_mut();
    chunks.retain(|chunk| chunk.kind() != PNG_PHYS);
    let insert_at = chunks
        .iter()
        .position(|chunk| chunk.kind() == PNG_IDAT)
        .unwrap_or(chunks.len());
    chunks.insert(insert_at, PngChunk::new(PNG_PHYS, Bytes::from(phys)));

    Ok(png.encoder().bytes().to_vec())
}
