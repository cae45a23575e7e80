mod builder;
mod orchestrator;

pub use builder::PipelineBuilder;
pub use orchestrator::LayoutPipeline;
