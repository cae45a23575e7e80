// src/error.rs
use quire_layout::LayoutError;
use quire_render::RenderError;
use quire_traits::SourceError;
use thiserror::Error;

/// A comprehensive error type for the whole article layout pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Article extraction failed: {0}")]
    Source(#[from] SourceError),

    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
