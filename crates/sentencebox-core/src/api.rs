// REST client for the sentence backend.
//
// `SentenceApi` is the seam between the app loop and the network: the
// production implementation talks HTTP through reqwest, tests plug in an
// in-memory backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::model::{NewSentence, Sentence, SentenceId, SentenceUpdate};

const SENTENCES_PATH: &str = "/api/sentences";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("network error: {0}")]
    Transport(String),

    #[error("failed to decode backend response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == StatusCode::NOT_FOUND.as_u16())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// `{"message": ...}` acknowledgement returned by update/delete/copy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
    /// Only present on copy acknowledgements.
    #[serde(default)]
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// SentenceApi
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SentenceApi: Send + Sync {
    /// Fetch the full sentence list.
    async fn list(&self) -> Result<Vec<Sentence>, ApiError>;

    async fn create(&self, new: &NewSentence) -> Result<Sentence, ApiError>;

    async fn update(&self, id: SentenceId, update: &SentenceUpdate) -> Result<Ack, ApiError>;

    async fn delete(&self, id: SentenceId) -> Result<Ack, ApiError>;

    /// Bump the backend's copy counter for `id`.
    async fn record_copy(&self, id: SentenceId) -> Result<Ack, ApiError>;
}

// ---------------------------------------------------------------------------
// HttpSentenceApi
// ---------------------------------------------------------------------------

/// reqwest-backed client for `/api/sentences`.
pub struct HttpSentenceApi {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpSentenceApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.server.base_url.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}{SENTENCES_PATH}", self.base_url)
    }

    fn item_url(&self, id: SentenceId) -> String {
        format!("{}{SENTENCES_PATH}/{id}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = request.timeout(self.timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SentenceApi for HttpSentenceApi {
    async fn list(&self) -> Result<Vec<Sentence>, ApiError> {
        debug!("GET {}", self.collection_url());
        // An empty store is served as `null`.
        let list: Option<Vec<Sentence>> = self.send(self.http.get(self.collection_url())).await?;
        Ok(list.unwrap_or_default())
    }

    async fn create(&self, new: &NewSentence) -> Result<Sentence, ApiError> {
        debug!("POST {}", self.collection_url());
        self.send(self.http.post(self.collection_url()).json(new)).await
    }

    async fn update(&self, id: SentenceId, update: &SentenceUpdate) -> Result<Ack, ApiError> {
        debug!("PUT {}", self.item_url(id));
        self.send(self.http.put(self.item_url(id)).json(update)).await
    }

    async fn delete(&self, id: SentenceId) -> Result<Ack, ApiError> {
        debug!("DELETE {}", self.item_url(id));
        self.send(self.http.delete(self.item_url(id))).await
    }

    async fn record_copy(&self, id: SentenceId) -> Result<Ack, ApiError> {
        let url = format!("{}/copy", self.item_url(id));
        debug!("POST {url}");
        self.send(self.http.post(url)).await
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// One captured HTTP request: request line and body.
    #[derive(Debug)]
    struct Captured {
        request_line: String,
        body: String,
    }

    /// Serve exactly one connection with a canned response and hand back
    /// what the client sent.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            // Read headers, then as much body as Content-Length promises.
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let content_length = text[..split]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + content_length {
                        break;
                    }
                }
            }
            let text = String::from_utf8_lossy(&raw).to_string();
            let (head, body_part) = text.split_once("\r\n\r\n").unwrap_or((text.as_str(), ""));
            let request_line = head.lines().next().unwrap_or_default().to_string();

            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();

            Captured {
                request_line,
                body: body_part.to_string(),
            }
        });

        (format!("http://{addr}"), handle)
    }

    fn client(base: &str) -> HttpSentenceApi {
        HttpSentenceApi::new(base, Duration::from_secs(5))
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = HttpSentenceApi::new("http://example.com:8080/", Duration::from_secs(1));
        assert_eq!(api.base_url(), "http://example.com:8080");
        assert_eq!(api.collection_url(), "http://example.com:8080/api/sentences");
        assert_eq!(api.item_url(9), "http://example.com:8080/api/sentences/9");
    }

    #[tokio::test]
    async fn list_parses_array() {
        let (base, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"[{"id":1,"content":"a","group":"g","copy_count":2},{"id":2,"content":"b","group":"g","copy_count":0}]"#,
        )
        .await;

        let list = client(&base).list().await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].content, "a");
        assert_eq!(list[0].copy_count, 2);

        let captured = server.await.unwrap();
        assert_eq!(captured.request_line, "GET /api/sentences HTTP/1.1");
    }

    #[tokio::test]
    async fn list_treats_null_as_empty() {
        let (base, server) = serve_once("HTTP/1.1 200 OK", "null").await;
        let list = client(&base).list().await.unwrap();
        assert!(list.is_empty());
        let _ = server.await;
    }

    #[tokio::test]
    async fn list_reports_bad_json_as_decode_error() {
        let (base, server) = serve_once("HTTP/1.1 200 OK", r#"{"oops":true}"#).await;
        let err = client(&base).list().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)), "got {err:?}");
        let _ = server.await;
    }

    #[tokio::test]
    async fn create_posts_json_and_returns_sentence() {
        let (base, server) = serve_once(
            "HTTP/1.1 201 Created",
            r#"{"id":3,"content":"new one","group":"默认","copy_count":0}"#,
        )
        .await;

        let created = client(&base)
            .create(&NewSentence {
                content: "new one".into(),
                group: None,
            })
            .await
            .unwrap();
        assert_eq!(created.id, 3);
        assert_eq!(created.group, "默认");

        let captured = server.await.unwrap();
        assert_eq!(captured.request_line, "POST /api/sentences HTTP/1.1");
        assert_eq!(captured.body, r#"{"content":"new one"}"#);
    }

    #[tokio::test]
    async fn update_puts_only_set_fields() {
        let (base, server) = serve_once("HTTP/1.1 200 OK", r#"{"message":"更新成功"}"#).await;

        let ack = client(&base)
            .update(4, &SentenceUpdate::regroup("home"))
            .await
            .unwrap();
        assert_eq!(ack.message, "更新成功");

        let captured = server.await.unwrap();
        assert_eq!(captured.request_line, "PUT /api/sentences/4 HTTP/1.1");
        assert_eq!(captured.body, r#"{"group":"home"}"#);
    }

    #[tokio::test]
    async fn delete_not_found_is_status_error() {
        let (base, server) = serve_once("HTTP/1.1 404 Not Found", "句子不存在\n").await;

        let err = client(&base).delete(99).await.unwrap_err();
        assert!(err.is_not_found(), "got {err:?}");
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "句子不存在");
            }
            other => panic!("expected Status, got {other:?}"),
        }

        let captured = server.await.unwrap();
        assert_eq!(captured.request_line, "DELETE /api/sentences/99 HTTP/1.1");
    }

    #[tokio::test]
    async fn record_copy_hits_copy_endpoint() {
        let (base, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"message":"复制成功","content":"hello"}"#,
        )
        .await;

        let ack = client(&base).record_copy(5).await.unwrap();
        assert_eq!(ack.content.as_deref(), Some("hello"));

        let captured = server.await.unwrap();
        assert_eq!(captured.request_line, "POST /api/sentences/5/copy HTTP/1.1");
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{addr}")).list().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
    }
}
