pub mod fixtures;

use quire::{LayoutPipeline, PipelineBuilder, PipelineError};
use quire_traits::FixedMeasurer;
use std::sync::Arc;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A builder whose oracle reports `height` for every block.
pub fn fixed_builder(height: f32) -> PipelineBuilder {
    PipelineBuilder::new().with_measurement_port(Arc::new(FixedMeasurer::new(height)))
}

pub fn fixed_pipeline(height: f32) -> Result<LayoutPipeline, PipelineError> {
    fixed_builder(height).build()
}

/// Number of rendered pages in a materialized document.
pub fn html_page_count(html: &str) -> usize {
    html.matches("<section class=\"page\"").count()
}
