use crate::parse_article;
use async_trait::async_trait;
use log::debug;
use quire_traits::{ArticleSource, SourceError};
use quire_types::Article;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reads article JSON from the file system. Relative locations resolve
/// against `root` when one is set.
#[derive(Debug, Clone, Default)]
pub struct JsonFileSource {
    root: Option<PathBuf>,
}

impl JsonFileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        let path = Path::new(location.strip_prefix("file://").unwrap_or(location));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl ArticleSource for JsonFileSource {
    async fn fetch(&self, location: &str) -> Result<Article, SourceError> {
        let path = self.resolve(location);
        let json = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SourceError::NotFound(path.display().to_string()),
            _ => SourceError::Io(format!("{}: {}", path.display(), e)),
        })?;
        let article = parse_article(&json)
            .map_err(|e| SourceError::Parse(format!("{}: {}", path.display(), e)))?;
        debug!(
            "Loaded '{}' from {} ({} sections)",
            article.title,
            path.display(),
            article.sections.len()
        );
        Ok(article)
    }

    fn name(&self) -> &'static str {
        "JsonFileSource"
    }
}
