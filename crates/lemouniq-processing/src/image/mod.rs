//! Image processing module
//!
//! - Orientation classification (orientation)
//! - Metadata removal and attribution (sanitize)
//! - Print upscaling with DPI tagging (resize)

pub mod orientation;
pub mod resize;
pub mod sanitize;

pub use orientation::probe;
pub use resize::{calculate_print_dimensions, PrintResizer, ResizedImage};
pub use sanitize::{read_attribution, MetadataSanitizer};

use lemouniq_core::PipelineError;
use std::io;

/// Map a failed blocking task to a pipeline error.
pub(crate) fn join_error(err: tokio::task::JoinError) -> PipelineError {
    PipelineError::Persistence(io::Error::other(format!(
        "image task aborted: {}",
        err
    )))
}
