//! Data models for the ingestion pipeline
//!
//! Split by concern: the image being processed, the generated copy, and the
//! per-file result returned to the client.

mod description;
mod image;
mod record;

pub use description::*;
pub use image::*;
pub use record::*;
