use crate::parse_article;
use async_trait::async_trait;
use log::{debug, info};
use quire_traits::{ArticleSource, SourceError};
use quire_types::Article;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const EXTRACT_ARTICLE: &str = "api/extract-article";
const EXTRACT_DOCUMENT: &str = "api/extract-document";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct ExtractRequest<'a> {
    url: &'a str,
}

/// Error payload of a failed extraction. Servers use either field.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the article extraction service.
///
/// Failures are never retried here: a network error, an error status or an
/// unreadable body ends the pipeline run with a [`SourceError`].
#[derive(Debug, Clone)]
pub struct HttpExtractor {
    client: Client,
    base_url: String,
}

impl HttpExtractor {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// `POST /api/extract-article {url}`.
    pub async fn extract_article(&self, url: &str) -> Result<Article, SourceError> {
        let endpoint = self.endpoint(EXTRACT_ARTICLE);
        info!("Extracting article from {} via {}", url, endpoint);
        let response = self
            .client
            .post(&endpoint)
            .json(&ExtractRequest { url })
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;
        read_article(response).await
    }

    /// Uploads a document as multipart `file` to `POST /api/extract-document`.
    pub async fn extract_document(
        &self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<Article, SourceError> {
        let endpoint = self.endpoint(EXTRACT_DOCUMENT);
        info!("Uploading {} ({} bytes) to {}", filename, bytes.len(), endpoint);
        let form = Form::new().part("file", Part::bytes(bytes).file_name(filename.to_string()));
        let response = self
            .client
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;
        read_article(response).await
    }
}

async fn read_article(response: Response) -> Result<Article, SourceError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| SourceError::Network(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error.or(b.message))
            .unwrap_or_else(|| body.trim().to_string());
        return Err(SourceError::Status {
            code: status.as_u16(),
            message,
        });
    }

    let article = parse_article(&body)?;
    debug!(
        "Extractor returned '{}' with {} sections",
        article.title,
        article.sections.len()
    );
    Ok(article)
}

#[async_trait]
impl ArticleSource for HttpExtractor {
    async fn fetch(&self, location: &str) -> Result<Article, SourceError> {
        self.extract_article(location).await
    }

    fn name(&self) -> &'static str {
        "HttpExtractor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Multipart, State};
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::Value;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    /// A request as the extraction service decoded it.
    #[derive(Debug, PartialEq)]
    enum Received {
        Article { url: String },
        Document { field: String, filename: String, bytes: Vec<u8> },
    }

    #[derive(Clone)]
    struct FakeExtractor {
        status: StatusCode,
        body: String,
        seen: mpsc::UnboundedSender<Received>,
    }

    impl FakeExtractor {
        fn reply(&self) -> impl IntoResponse + use<> {
            (
                self.status,
                [(header::CONTENT_TYPE, "application/json")],
                self.body.clone(),
            )
        }
    }

    async fn extract_article(
        State(service): State<FakeExtractor>,
        Json(request): Json<Value>,
    ) -> impl IntoResponse {
        let url = request["url"].as_str().unwrap_or_default().to_string();
        let _ = service.seen.send(Received::Article { url });
        service.reply()
    }

    async fn extract_document(
        State(service): State<FakeExtractor>,
        mut multipart: Multipart,
    ) -> impl IntoResponse {
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.unwrap().to_vec();
            let _ = service.seen.send(Received::Document {
                field: name,
                filename,
                bytes,
            });
        }
        service.reply()
    }

    /// Starts a fake extraction service answering every request with
    /// `status` and `body`. Decoded requests arrive on the receiver.
    async fn spawn_extractor(
        status: StatusCode,
        body: &str,
    ) -> (String, mpsc::UnboundedReceiver<Received>) {
        let (seen, received) = mpsc::unbounded_channel();
        let service = FakeExtractor {
            status,
            body: body.to_string(),
            seen,
        };
        let app = Router::new()
            .route("/api/extract-article", post(extract_article))
            .route("/api/extract-document", post(extract_document))
            .with_state(service);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (address, received)
    }

    async fn status_message(status: StatusCode, body: &str) -> (u16, String) {
        let (address, _received) = spawn_extractor(status, body).await;
        let client = HttpExtractor::new(address).unwrap();
        match client.fetch("https://example.com/post").await {
            Err(SourceError::Status { code, message }) => (code, message),
            other => panic!("expected a status error, got {:?}", other),
        }
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = HttpExtractor::with_client(Client::new(), "http://localhost:3000/");
        assert_eq!(
            client.endpoint(EXTRACT_ARTICLE),
            "http://localhost:3000/api/extract-article"
        );
    }

    #[tokio::test]
    async fn test_extract_article_posts_url() {
        let (address, mut received) =
            spawn_extractor(StatusCode::OK, r#"{"title": "Remote", "sections": []}"#).await;
        let client = HttpExtractor::new(address).unwrap();

        let article = client.extract_article("https://example.com/post").await.unwrap();
        assert_eq!(article.title, "Remote");
        assert_eq!(
            received.recv().await,
            Some(Received::Article {
                url: "https://example.com/post".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_error_status_carries_server_message() {
        let (code, message) =
            status_message(StatusCode::BAD_GATEWAY, r#"{"error": "upstream failed"}"#).await;
        assert_eq!(code, 502);
        assert_eq!(message, "upstream failed");
    }

    #[tokio::test]
    async fn test_error_field_wins_over_message_field() {
        let body = r#"{"error": "extraction failed", "message": "see logs"}"#;
        let (code, message) = status_message(StatusCode::INTERNAL_SERVER_ERROR, body).await;
        assert_eq!(code, 500);
        assert_eq!(message, "extraction failed");

        let (_, message) =
            status_message(StatusCode::NOT_FOUND, r#"{"message": "no such page"}"#).await;
        assert_eq!(message, "no such page");
    }

    #[tokio::test]
    async fn test_error_without_json_uses_raw_body() {
        let (code, message) = status_message(StatusCode::SERVICE_UNAVAILABLE, "  busy\n").await;
        assert_eq!(code, 503);
        assert_eq!(message, "busy");
    }

    #[tokio::test]
    async fn test_document_upload_is_multipart() {
        let (address, mut received) =
            spawn_extractor(StatusCode::OK, r#"{"article": {"title": "Uploaded"}}"#).await;
        let client = HttpExtractor::new(address).unwrap();

        let article = client
            .extract_document(b"%PDF-1.7".to_vec(), "paper.pdf")
            .await
            .unwrap();
        assert_eq!(article.title, "Uploaded");
        assert_eq!(
            received.recv().await,
            Some(Received::Document {
                field: "file".to_string(),
                filename: "paper.pdf".to_string(),
                bytes: b"%PDF-1.7".to_vec(),
            })
        );
    }

    #[tokio::test]
    async fn test_unparseable_body_is_a_parse_error() {
        let (address, _received) = spawn_extractor(StatusCode::OK, "<html>oops</html>").await;
        let client = HttpExtractor::new(address).unwrap();
        let result = client.extract_article("https://example.com").await;
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }
}
