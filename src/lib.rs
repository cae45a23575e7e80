//! quire lays extracted web articles out into fixed-size, column-aware pages.
//!
//! The pipeline runs the content model through the flattener, the placement
//! engine and the post-processor, then materializes the pages as HTML for an
//! external PDF rasterizer. Heights come from a [`MeasurementPort`]; the
//! default is the offline [`EstimatingMeasurer`].
//!
//! ```ignore
//! use quire::PipelineBuilder;
//!
//! let pipeline = PipelineBuilder::new().with_force_two_columns(true).build()?;
//! let laid_out = pipeline.layout(&article).await?;
//! let html = pipeline.materialize(&article, &laid_out);
//! ```

pub mod error;
pub mod pipeline;

pub use error::PipelineError;
pub use pipeline::{LayoutPipeline, PipelineBuilder};

pub use quire_layout::{
    ColumnPreference, ColumnPreferences, LaidOutArticle, LayoutConfig, LayoutDiagnostics, VPage,
};
pub use quire_render::{EstimatingMeasurer, HtmlBlockRenderer, Materializer};
pub use quire_source::{HttpExtractor, JsonFileSource};
pub use quire_traits::{ArticleSource, BlockRenderer, MeasurementPort, SourceError};
pub use quire_types::{Article, ContentBlock, Section, Theme};
