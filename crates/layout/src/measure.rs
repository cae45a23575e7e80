//! Bridges the block renderer and the measurement port.
//!
//! The engine asks for block heights many times over while probing fits,
//! look-aheads and split points, so every answer is cached by
//! `(markup, width, column mode)` for the lifetime of one layout run.

use log::{trace, warn};
use quire_traits::{BlockRenderer, MeasurementPort};
use quire_types::{ContentBlock, Theme};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Hash, PartialEq, Eq, Clone)]
struct MeasureKey {
    markup: String,
    width_bits: u32,
    two_column: bool,
}

pub struct Measurer {
    port: Arc<dyn MeasurementPort>,
    renderer: Arc<dyn BlockRenderer>,
    theme: Theme,
    cache: RwLock<HashMap<MeasureKey, f32>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl Measurer {
    pub fn new(
        port: Arc<dyn MeasurementPort>,
        renderer: Arc<dyn BlockRenderer>,
        theme: Theme,
    ) -> Self {
        Self {
            port,
            renderer,
            theme,
            cache: RwLock::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn render(&self, block: &ContentBlock) -> String {
        self.renderer.render(block, &self.theme)
    }

    /// Rendered height of `block` in a column `width` pixels wide.
    pub async fn measure_block(&self, block: &ContentBlock, width: f32, two_column: bool) -> f32 {
        let markup = self.render(block);
        self.measure_markup(&markup, width, two_column).await
    }

    /// Height of raw markup. Failures are logged and count as zero height so
    /// that one broken fragment never stalls a layout run.
    pub async fn measure_markup(&self, markup: &str, width: f32, two_column: bool) -> f32 {
        if markup.is_empty() {
            return 0.0;
        }
        let key = MeasureKey {
            markup: markup.to_string(),
            width_bits: width.to_bits(),
            two_column,
        };

        let cached = self.cache.read().ok().and_then(|c| c.get(&key).copied());
        if let Some(height) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!("measure cache hit ({:.1}px at width {:.1})", height, width);
            return height;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let height = match self.port.measure(markup, width, two_column).await {
            Ok(h) if h.is_finite() => h.max(0.0),
            Ok(h) => {
                warn!("{} returned a non-finite height ({}); treating as 0", self.port.name(), h);
                0.0
            }
            Err(e) => {
                warn!("{} failed, treating fragment as 0px: {}", self.port.name(), e);
                0.0
            }
        };
        trace!("measured {:.1}px at width {:.1} via {}", height, width, self.port.name());

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, height);
        }
        height
    }

    /// `(cache hits, port calls)` so far.
    pub fn stats(&self) -> (usize, usize) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}
