pub mod measure;
pub mod render;
pub mod source;

pub use measure::{FixedMeasurer, MeasureError, MeasurementPort};
pub use render::BlockRenderer;
pub use source::{ArticleSource, InMemoryArticleSource, SourceError};
