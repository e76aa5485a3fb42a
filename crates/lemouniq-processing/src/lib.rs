//! Lemouniq Processing Library
//!
//! Local, CPU-bound work on uploaded prints: orientation classification,
//! metadata sanitizing, print resizing and upload validation. Nothing here
//! talks to the network.

pub mod image;
pub mod validator;

pub use crate::image::{
    calculate_print_dimensions, read_attribution, MetadataSanitizer, PrintResizer,
    ResizedImage,
};
pub use validator::{derive_keyword, sanitize_filename, UploadValidator};
