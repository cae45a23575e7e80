use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Invalid layout configuration: {0}")]
    InvalidConfig(String),
    #[error("Page limit exceeded ({0}); the document could not be laid out.")]
    PageLimitExceeded(usize),
}

pub mod algorithms;
pub mod config;
pub mod engine;
pub mod flatten;
pub mod measure;
pub mod output;
pub mod page;
pub mod postprocess;
pub mod split;

pub use self::config::{ColumnPreference, ColumnPreferences, LayoutConfig};
pub use self::engine::PlacementEngine;
pub use self::flatten::{flatten, FlatElement};
pub use self::measure::Measurer;
pub use self::output::{ForcedPlacement, GapReport, LaidOutArticle, LayoutDiagnostics, ShrunkBlock};
pub use self::page::{LayoutCursor, LayoutState, Placement, PlacedBlock, VColumn, VColumnSet, VPage};
pub use self::postprocess::post_process;

#[cfg(test)]
mod engine_test;
#[cfg(test)]
mod test_utils;
