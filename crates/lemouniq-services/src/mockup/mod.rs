//! Mockup rendering: product templates, the remote client, task polling and
//! the per-print generator that ties them together.

pub mod client;
pub mod generator;
pub mod poll;
pub mod templates;

pub use client::{MockupRenderer, PrintfulClient, RenderedMockups};
pub use generator::{MockupGenerator, MockupReport};
pub use poll::{poll_until_terminal, PollOutcome, PollSettings, TaskState, TaskStatusSource};
pub use templates::{placement, Placement, ProductTemplate, CANVAS, POSTER, TEMPLATES};
