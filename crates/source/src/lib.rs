//! Article sources for the layout pipeline.
//!
//! ## Available Sources
//!
//! - `JsonFileSource`: article JSON stored on disk
//! - `HttpExtractor`: the remote extraction service, for web pages and
//!   uploaded documents
//!
//! Both answer with the same [`Article`] shape and report every failure as a
//! terminal [`SourceError`].

mod file;
mod http;

pub use file::JsonFileSource;
pub use http::HttpExtractor;
pub use quire_traits::{ArticleSource, SourceError};

use quire_types::Article;
use serde::Deserialize;

/// Extractors answer either with the article itself or wrapped in an
/// `{"article": ...}` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Wrapped { article: Article },
    Bare(Article),
}

/// Parses extractor JSON into an [`Article`].
pub fn parse_article(json: &str) -> Result<Article, SourceError> {
    let payload: Payload =
        serde_json::from_str(json).map_err(|e| SourceError::Parse(e.to_string()))?;
    Ok(match payload {
        Payload::Wrapped { article } => article,
        Payload::Bare(article) => article,
    })
}
