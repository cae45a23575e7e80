// src/pipeline/builder.rs
use super::orchestrator::LayoutPipeline;
use crate::error::PipelineError;
use quire_layout::{ColumnPreference, ColumnPreferences, LayoutConfig};
use quire_render::{EstimatingMeasurer, HtmlBlockRenderer};
use quire_traits::{BlockRenderer, MeasurementPort};
use quire_types::Theme;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// A builder for creating a `LayoutPipeline`.
pub struct PipelineBuilder {
    config: LayoutConfig,
    theme: Theme,
    preferences: ColumnPreferences,
    force_two_columns: Option<bool>,
    port: Option<Arc<dyn MeasurementPort>>,
    renderer: Option<Arc<dyn BlockRenderer>>,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            config: LayoutConfig::default(),
            theme: Theme::default(),
            preferences: ColumnPreferences::new(),
            force_two_columns: None,
            port: None,
            renderer: None,
        }
    }
}

impl PipelineBuilder {
    /// Creates a new `PipelineBuilder` with A4 defaults, the HTML renderer
    /// and the offline height estimator.
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    /// Loads a JSON layout config. Missing fields keep their defaults.
    pub fn with_config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, PipelineError> {
        self.config = read_json(path.as_ref(), "layout config")?;
        Ok(self)
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Loads a JSON theme. Missing fields keep their defaults.
    pub fn with_theme_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, PipelineError> {
        self.theme = read_json(path.as_ref(), "theme")?;
        Ok(self)
    }

    /// Pins one section to one or two columns, overriding the automatic
    /// decision and the global force flag.
    pub fn with_column_preference(mut self, section_id: impl Into<String>, preference: ColumnPreference) -> Self {
        self.preferences.insert(section_id.into(), preference);
        self
    }

    /// Overrides `forceTwoColumns` from whatever config was loaded.
    pub fn with_force_two_columns(mut self, force: bool) -> Self {
        self.force_two_columns = Some(force);
        self
    }

    /// Replaces the height oracle, e.g. with a headless browser bridge.
    pub fn with_measurement_port(mut self, port: Arc<dyn MeasurementPort>) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn BlockRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Consumes the builder and creates the `LayoutPipeline`.
    pub fn build(self) -> Result<LayoutPipeline, PipelineError> {
        let mut config = self.config;
        if let Some(force) = self.force_two_columns {
            config.force_two_columns = force;
        }
        config.validate()?;

        let port: Arc<dyn MeasurementPort> = match self.port {
            Some(port) => port,
            None => {
                log::info!("No measurement port configured. Using the offline estimator.");
                Arc::new(EstimatingMeasurer::default())
            }
        };
        let renderer: Arc<dyn BlockRenderer> = match self.renderer {
            Some(renderer) => renderer,
            None => Arc::new(HtmlBlockRenderer::new()),
        };
        log::debug!(
            "Building pipeline with {} and {}",
            port.name(),
            renderer.name()
        );

        Ok(LayoutPipeline::new(
            config,
            self.theme,
            self.preferences,
            port,
            renderer,
        ))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, PipelineError> {
    let source = fs::read_to_string(path).map_err(|e| {
        PipelineError::Io(io::Error::new(
            e.kind(),
            format!("Failed to read {} from '{}': {}", what, path.display(), e),
        ))
    })?;
    serde_json::from_str(&source)
        .map_err(|e| PipelineError::Config(format!("Invalid {} in '{}': {}", what, path.display(), e)))
}
