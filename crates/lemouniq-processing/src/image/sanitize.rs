//! Metadata sanitizer
//!
//! Rebuilds the image container keeping only the segments needed to decode the
//! pixels, then embeds the attribution block. The compressed pixel stream is
//! carried over untouched, so decoding before and after yields identical buffers.

use bytes::Bytes;
use image::ImageReader;
use img_parts::jpeg::{Jpeg, JpegSegment};
use img_parts::png::{Png, PngChunk};
use lemouniq_core::{Attribution, PipelineError, PipelineResult};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

// PNG chunks that survive sanitizing. tRNS changes decoded alpha so it stays.
const PNG_KEPT_CHUNKS: [[u8; 4]; 5] = [*b"IHDR", *b"PLTE", *b"tRNS", *b"IDAT", *b"IEND"];
const PNG_TEXT: [u8; 4] = *b"tEXt";
const PNG_IDAT: [u8; 4] = *b"IDAT";

const JPEG_APP0: u8 = 0xE0;
const JPEG_APP14: u8 = 0xEE;
const JPEG_APP15: u8 = 0xEF;
const JPEG_COM: u8 = 0xFE;

const JFIF_IDENTIFIER: &[u8] = b"JFIF\0";
// identifier, version, units, x/y density
const JFIF_FIXED_LEN: usize = 12;

/// Strips embedded metadata and writes the attribution block.
#[derive(Debug, Clone)]
pub struct MetadataSanitizer {
    attribution: Attribution,
}

impl MetadataSanitizer {
    pub fn new(attribution: Attribution) -> Self {
        Self { attribution }
    }

    /// Sanitize the file in place. Returns the unchanged path.
    pub async fn sanitize_file(&self, path: &Path) -> PipelineResult<PathBuf> {
        let sanitizer = self.clone();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || sanitizer.sanitize_file_blocking(&path))
            .await
            .map_err(super::join_error)?
    }

    pub fn sanitize_file_blocking(&self, path: &Path) -> PipelineResult<PathBuf> {
        let data = std::fs::read(path)?;
        let cleaned = self.sanitize_bytes(&data).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Failed to sanitize image");
            e
        })?;

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&cleaned)?;
        tmp.persist(path).map_err(|e| PipelineError::Persistence(e.error))?;

        tracing::debug!(
            path = %path.display(),
            original_bytes = data.len(),
            sanitized_bytes = cleaned.len(),
            "Image metadata replaced with attribution"
        );
        Ok(path.to_path_buf())
    }

    /// Sanitize an in-memory PNG or JPEG.
    pub fn sanitize_bytes(&self, data: &[u8]) -> PipelineResult<Vec<u8>> {
        ensure_decodable(data)?;

        let bytes = Bytes::copy_from_slice(data);
        if let Ok(png) = Png::from_bytes(bytes.clone()) {
            return Ok(self.rebuild_png(png));
        }
        if let Ok(jpeg) = Jpeg::from_bytes(bytes) {
            return Ok(self.rebuild_jpeg(jpeg));
        }

        Err(PipelineError::InvalidImage(
            "only PNG and JPEG containers can be sanitized".to_string(),
        ))
    }

    fn rebuild_png(&self, mut png: Png) -> Vec<u8> {
        let chunks = png.chunks_mut();
        chunks.retain(|chunk| PNG_KEPT_CHUNKS.contains(&chunk.kind()));

        let insert_at = chunks
            .iter()
            .position(|chunk| chunk.kind() == PNG_IDAT)
            .unwrap_or(chunks.len());
        for (offset, (key, value)) in self.attribution.fields().into_iter().enumerate() {
            let mut contents = Vec::with_capacity(key.len() + 1 + value.len());
            contents.extend_from_slice(key.as_bytes());
            contents.push(0);
            contents.extend_from_slice(value.as_bytes());
            chunks.insert(
                insert_at + offset,
                PngChunk::new(PNG_TEXT, Bytes::from(contents)),
            );
        }

        png.encoder().bytes().to_vec()
    }

    fn rebuild_jpeg(&self, mut jpeg: Jpeg) -> Vec<u8> {
        let segments = jpeg.segments_mut();
        let original = std::mem::take(segments);
        let mut has_jfif = false;
        for segment in original {
            let marker = segment.marker();
            match marker {
                JPEG_APP0 => {
                    if has_jfif {
                        continue;
                    }
                    if let Some(header) = jfif_header(segment.contents()) {
                        segments.push(JpegSegment::new_with_contents(JPEG_APP0, header));
                        has_jfif = true;
                    }
                }
                JPEG_APP14 => segments.push(segment),
                JPEG_COM => {}
                _ if (JPEG_APP0..=JPEG_APP15).contains(&marker) => {}
                _ => segments.push(segment),
            }
        }

        let insert_at = segments
            .iter()
            .position(|segment| {
                let marker = segment.marker();
                marker != JPEG_APP0 && marker != JPEG_APP14
            })
            .unwrap_or(segments.len());
        for (offset, (key, value)) in self.attribution.fields().into_iter().enumerate() {
            let comment = format!("{}: {}", key, value);
            segments.insert(
                insert_at + offset,
                JpegSegment::new_with_contents(JPEG_COM, Bytes::from(comment)),
            );
        }

        jpeg.encoder().bytes().to_vec()
    }
}

/// JFIF APP0 payload with the embedded thumbnail removed.
///
/// Keeps version, density units and density, then declares a 0x0 thumbnail.
/// Anything other than a JFIF header (JFXX extensions included) yields `None`.
fn jfif_header(contents: &[u8]) -> Option<Bytes> {
    if !contents.starts_with(JFIF_IDENTIFIER) || contents.len() < JFIF_FIXED_LEN {
        return None;
    }
    let mut header = Vec::with_capacity(JFIF_FIXED_LEN + 2);
    header.extend_from_slice(&contents[..JFIF_FIXED_LEN]);
    header.extend_from_slice(&[0, 0]);
    Some(Bytes::from(header))
}

fn ensure_decodable(data: &[u8]) -> PipelineResult<()> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(PipelineError::Persistence)?;
    reader
        .decode()
        .map(|_| ())
        .map_err(|e| PipelineError::InvalidImage(e.to_string()))
}

/// Textual metadata embedded in a PNG (`tEXt`) or JPEG (`COM`) container.
pub fn read_attribution(data: &[u8]) -> PipelineResult<Vec<(String, String)>> {
    let bytes = Bytes::copy_from_slice(data);
    if let Ok(png) = Png::from_bytes(bytes.clone()) {
        return Ok(png
            .chunks()
            .iter()
            .filter(|chunk| chunk.kind() == PNG_TEXT)
            .filter_map(|chunk| {
                let contents = chunk.contents();
                let split = contents.iter().position(|b| *b == 0)?;
                Some((
                    String::from_utf8_lossy(&contents[..split]).into_owned(),
                    String::from_utf8_lossy(&contents[split + 1..]).into_owned(),
                ))
            })
            .collect());
    }
    if let Ok(jpeg) = Jpeg::from_bytes(bytes) {
        return Ok(jpeg
            .segments()
            .iter()
            .filter(|segment| segment.marker() == JPEG_COM)
            .filter_map(|segment| {
                let text = String::from_utf8_lossy(segment.contents()).into_owned();
                let (key, value) = text.split_once(": ")?;
                Some((key.to_string(), value.to_string()))
            })
            .collect());
    }
    Err(PipelineError::InvalidImage(
        "unrecognized image container".to_string(),
    ))
}
