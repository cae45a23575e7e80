//! MeasurementPort trait for abstracting height measurement.
//!
//! The layout engine never computes text wrapping itself. It hands rendered
//! markup to a port and trusts the height that comes back, which lets the
//! same engine run against a headless browser, a markup estimator, or a
//! deterministic fake in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;
use thiserror::Error;

/// Error type for measurement operations.
#[derive(Error, Debug, Clone)]
pub enum MeasureError {
    #[error("Measurement failed: {0}")]
    Failed(String),

    #[error("Measurement timed out after {0} ms")]
    Timeout(u64),
}

/// An oracle that reports the rendered height of a markup fragment.
///
/// Implementations must:
/// - render `markup` inside a container `column_width` pixels wide, using two
///   CSS columns when `two_column` is set,
/// - wait for embedded images to load or fail before reading geometry,
/// - return the ceiling of the measured height plus any fixed padding.
///
/// Calls are issued strictly one at a time by the layout engine, so an
/// implementation may reuse a single scratch surface between calls.
#[async_trait]
pub trait MeasurementPort: Send + Sync + Debug {
    async fn measure(
        &self,
        markup: &str,
        column_width: f32,
        two_column: bool,
    ) -> Result<f32, MeasureError>;

    /// A human-readable name for this port (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// A measurement port that answers from a lookup table.
///
/// Heights are keyed by exact markup. Markup with no entry gets
/// `default_height`. Width and column count are ignored unless a
/// width-specific entry was registered with [`FixedMeasurer::set_for_width`].
#[derive(Debug, Default)]
pub struct FixedMeasurer {
    heights: RwLock<HashMap<String, f32>>,
    by_width: RwLock<HashMap<(String, u32), f32>>,
    default_height: f32,
}

impl FixedMeasurer {
    pub fn new(default_height: f32) -> Self {
        Self {
            default_height,
            ..Default::default()
        }
    }

    /// Register the height reported for `markup` at any width.
    pub fn set(&self, markup: impl Into<String>, height: f32) {
        if let Ok(mut heights) = self.heights.write() {
            heights.insert(markup.into(), height);
        }
    }

    /// Register the height reported for `markup` at one specific width.
    pub fn set_for_width(&self, markup: impl Into<String>, width: f32, height: f32) {
        if let Ok(mut heights) = self.by_width.write() {
            heights.insert((markup.into(), width.round() as u32), height);
        }
    }
}

#[async_trait]
impl MeasurementPort for FixedMeasurer {
    async fn measure(
        &self,
        markup: &str,
        column_width: f32,
        _two_column: bool,
    ) -> Result<f32, MeasureError> {
        let width_key = (markup.to_string(), column_width.round() as u32);
        if let Some(h) = self.by_width.read().ok().and_then(|m| m.get(&width_key).copied()) {
            return Ok(h);
        }
        let height = self
            .heights
            .read()
            .ok()
            .and_then(|m| m.get(markup).copied())
            .unwrap_or(self.default_height);
        Ok(height)
    }

    fn name(&self) -> &'static str {
        "FixedMeasurer"
    }
}
