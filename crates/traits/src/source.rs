//! ArticleSource trait for abstracting article extraction.
//!
//! The layout pipeline only ever sees a finished [`Article`]. Where it came
//! from (a remote extractor, a JSON file on disk, a test fixture) is hidden
//! behind this trait.

use async_trait::async_trait;
use quire_types::Article;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;
use thiserror::Error;

/// Error type for article extraction. Every variant is terminal for a
/// pipeline run: no partial layout is attempted.
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    #[error("Article not found: {0}")]
    NotFound(String),

    #[error("Network error while contacting the extractor: {0}")]
    Network(String),

    #[error("Extractor responded with status {code}: {message}")]
    Status { code: u16, message: String },

    #[error("Could not parse the extracted article: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Io(err.to_string())
    }
}

/// A provider of structured articles, addressed by URL or path.
#[async_trait]
pub trait ArticleSource: Send + Sync + Debug {
    /// Fetch and extract the article at `location`.
    async fn fetch(&self, location: &str) -> Result<Article, SourceError>;

    /// Returns a human-readable name for this source (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// An in-memory article source, pre-populated before use.
#[derive(Debug, Default)]
pub struct InMemoryArticleSource {
    articles: RwLock<HashMap<String, Article>>,
}

impl InMemoryArticleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an article under the given location key.
    pub fn add(&self, location: impl Into<String>, article: Article) -> Result<(), SourceError> {
        let location = location.into();
        let mut articles = self
            .articles
            .write()
            .map_err(|_| SourceError::Io("article store lock poisoned".to_string()))?;
        articles.insert(location, article);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.articles.read().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.articles.read().map(|a| a.is_empty()).unwrap_or(true)
    }
}

#[async_trait]
impl ArticleSource for InMemoryArticleSource {
    async fn fetch(&self, location: &str) -> Result<Article, SourceError> {
        let articles = self
            .articles
            .read()
            .map_err(|_| SourceError::Io("article store lock poisoned".to_string()))?;
        articles
            .get(location)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(location.to_string()))
    }

    fn name(&self) -> &'static str {
        "InMemoryArticleSource"
    }
}
