//! Rendering collaborators for the layout engine.
//!
//! This crate provides the concrete pieces the engine only knows through
//! traits, plus the final materialization step:
//! - `HtmlBlockRenderer` turns single content blocks into HTML fragments
//! - `EstimatingMeasurer` answers height queries without a browser
//! - `Materializer` writes the laid-out pages as one printable document

mod block;
mod error;
mod estimate;
mod page;
pub mod utils;

pub use block::HtmlBlockRenderer;
pub use error::RenderError;
pub use estimate::{wrap_lines, EstimateMetrics, EstimatingMeasurer};
pub use page::Materializer;
