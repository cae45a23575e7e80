// src/pipeline/orchestrator.rs
use crate::error::PipelineError;
use log::{debug, info, warn};
use quire_layout::{ColumnPreferences, LaidOutArticle, LayoutConfig, Measurer, PlacementEngine};
use quire_render::Materializer;
use quire_traits::{ArticleSource, BlockRenderer, MeasurementPort};
use quire_types::{Article, Theme};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// The article layout pipeline.
///
/// Each call to [`LayoutPipeline::layout`] builds a fresh measurement cache,
/// so one pipeline can lay out any number of articles without sharing
/// state between runs.
pub struct LayoutPipeline {
    config: LayoutConfig,
    theme: Theme,
    preferences: ColumnPreferences,
    port: Arc<dyn MeasurementPort>,
    renderer: Arc<dyn BlockRenderer>,
}

impl LayoutPipeline {
    pub(crate) fn new(
        config: LayoutConfig,
        theme: Theme,
        preferences: ColumnPreferences,
        port: Arc<dyn MeasurementPort>,
        renderer: Arc<dyn BlockRenderer>,
    ) -> Self {
        Self {
            config,
            theme,
            preferences,
            port,
            renderer,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn preferences(&self) -> &ColumnPreferences {
        &self.preferences
    }

    /// Flattens, places and post-processes one article.
    pub async fn layout(&self, article: &Article) -> Result<LaidOutArticle, PipelineError> {
        let start = Instant::now();
        let measurer = Measurer::new(
            Arc::clone(&self.port),
            Arc::clone(&self.renderer),
            self.theme.clone(),
        );
        let engine = PlacementEngine::new(self.config.clone(), measurer)?;
        let laid_out = engine.generate_layout(article, &self.preferences).await?;

        let diagnostics = &laid_out.diagnostics;
        if !diagnostics.forced.is_empty() {
            warn!(
                "'{}' has {} forced placement(s); content will overflow its column",
                article.title,
                diagnostics.forced.len()
            );
        }
        debug!(
            "Layout of '{}' took {:.2?} ({} cache hits)",
            article.title,
            start.elapsed(),
            diagnostics.cache_hits
        );
        Ok(laid_out)
    }

    /// Runs [`LayoutPipeline::layout`] on a private single-threaded runtime.
    pub fn layout_blocking(&self, article: &Article) -> Result<LaidOutArticle, PipelineError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.layout(article))
    }

    /// Fetches an article from `source` and lays it out.
    pub async fn layout_from(
        &self,
        source: &dyn ArticleSource,
        location: &str,
    ) -> Result<(Article, LaidOutArticle), PipelineError> {
        debug!("Fetching article from {} ({})", location, source.name());
        let article = source.fetch(location).await?;
        let laid_out = self.layout(&article).await?;
        Ok((article, laid_out))
    }

    pub fn materializer(&self) -> Materializer {
        Materializer::new(
            self.config.clone(),
            self.theme.clone(),
            Arc::clone(&self.renderer),
        )
    }

    /// The laid-out pages as one standalone HTML document.
    pub fn materialize(&self, article: &Article, laid_out: &LaidOutArticle) -> String {
        self.materializer().render_document(article, laid_out)
    }

    pub fn write_html<P: AsRef<Path>>(
        &self,
        article: &Article,
        laid_out: &LaidOutArticle,
        path: P,
    ) -> Result<(), PipelineError> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        self.materializer().write_document(article, laid_out, writer)?;
        info!("Wrote HTML to {}", path.as_ref().display());
        Ok(())
    }

    /// Writes the virtual pages and diagnostics as pretty-printed JSON.
    pub fn write_json<P: AsRef<Path>>(
        &self,
        laid_out: &LaidOutArticle,
        path: P,
    ) -> Result<(), PipelineError> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(writer, laid_out)?;
        info!("Wrote layout JSON to {}", path.as_ref().display());
        Ok(())
    }
}
