use lemouniq_core::{PipelineError, PipelineResult};
use std::path::Path;

// Leaves room under the 255-byte name limit for the extension and for the
// suffixes appended to derived files (resized prints, mockups).
const MAX_STEM_BYTES: usize = 200;
const FALLBACK_KEYWORD: &str = "untitled";

/// Ingress checks for uploaded files.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    allowed_extensions: Vec<String>,
}

impl UploadValidator {
    pub fn new(allowed_extensions: Vec<String>) -> Self {
        Self {
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Case-insensitive extension check.
    pub fn validate_extension(&self, filename: &str) -> PipelineResult<()> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| PipelineError::UnsupportedExtension(filename.to_string()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(PipelineError::UnsupportedExtension(extension));
        }

        Ok(())
    }
}

/// Reduce a client-supplied name to a safe base name.
///
/// Directory components are dropped, anything other than alphanumerics, `.`, `-`
/// and `_` becomes `_`, and leading dots are removed so the result can never be
/// hidden or escape the upload directory.
pub fn sanitize_filename(filename: &str) -> PipelineResult<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();

    if base.is_empty() || base == "." || base == ".." {
        return Err(PipelineError::InvalidImage(format!(
            "unusable filename '{}'",
            filename
        )));
    }

    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim_start_matches('.');

    if sanitized.is_empty() {
        return Err(PipelineError::InvalidImage(format!(
            "unusable filename '{}'",
            filename
        )));
    }

    let sanitized = match sanitized.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => {
            format!("{}.{}", truncate_to_bytes(stem, MAX_STEM_BYTES), extension)
        }
        _ => truncate_to_bytes(sanitized, MAX_STEM_BYTES).to_string(),
    };

    Ok(sanitized)
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a character.
fn truncate_to_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Keyword for copy generation: the file stem with separator runs collapsed to spaces.
///
/// `abstract-bird_2.png` becomes `abstract bird 2`.
pub fn derive_keyword(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    let spaced: String = stem
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let keyword = spaced.split_whitespace().collect::<Vec<_>>().join(" ");

    if keyword.is_empty() {
        FALLBACK_KEYWORD.to_string()
    } else {
        keyword
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> UploadValidator {
        UploadValidator::new(vec!["png".into(), "jpg".into(), ".JPEG".into()])
    }

    #[test]
    fn test_validate_extension() {
        let v = validator();
        assert!(v.validate_extension("print.png").is_ok());
        assert!(v.validate_extension("PRINT.JPG").is_ok());
        assert!(v.validate_extension("print.jpeg").is_ok());
        assert!(matches!(
            v.validate_extension("print.gif"),
            Err(PipelineError::UnsupportedExtension(ext)) if ext == "gif"
        ));
        assert!(v.validate_extension("no_extension").is_err());
    }

    #[test]
    fn test_sanitize_filename_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_filename("C:\\temp\\art.png").unwrap(), "art.png");
        assert_eq!(sanitize_filename(".hidden.png").unwrap(), "hidden.png");
    }

    #[test]
    fn test_sanitize_filename_replaces_unsafe_characters() {
        assert_eq!(
            sanitize_filename("my print (1).png").unwrap(),
            "my_print__1_.png"
        );
        assert_eq!(sanitize_filename("my-file_1.jpg").unwrap(), "my-file_1.jpg");
    }

    #[test]
    fn test_sanitize_filename_rejects_empty() {
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("dir/").is_err());
    }

    #[test]
    fn test_sanitize_filename_limits_bytes_and_keeps_extension() {
        // two bytes per character
        let long = format!("{}.png", "é".repeat(300));
        let name = sanitize_filename(&long).unwrap();

        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), MAX_STEM_BYTES + ".png".len());
        assert!(format!("{}_resized.png", name.trim_end_matches(".png")).len() <= 255);

        // an odd budget never splits a character
        assert_eq!(truncate_to_bytes("éé", 3), "é");
        assert_eq!(truncate_to_bytes("short", 200), "short");
    }

    #[test]
    fn test_derive_keyword() {
        assert_eq!(derive_keyword("abstract-bird_2.png"), "abstract bird 2");
        assert_eq!(derive_keyword("Sunset  over--sea.jpg"), "Sunset over sea");
        assert_eq!(derive_keyword("___.png"), "untitled");
    }
}
