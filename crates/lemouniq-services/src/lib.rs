//! Lemouniq Services Library
//!
//! Clients for the external collaborators of the ingestion pipeline: the public
//! image host, the mockup rendering service and the text generation service.
//! Each client sits behind a trait so the pipeline can be exercised without
//! network access.

pub mod copywriter;
pub mod http;
pub mod image_host;
pub mod mockup;

pub use copywriter::{CopyWriter, OpenAiChatClient, TextGenerator};
pub use http::build_http_client;
pub use image_host::{ImageHost, ImgBbClient};
pub use mockup::{
    poll_until_terminal, MockupGenerator, MockupRenderer, MockupReport, PollOutcome,
    PollSettings, PrintfulClient, ProductTemplate, RenderedMockups, TaskState, TaskStatusSource,
};
