//! Google Gemini `generateContent` client.

use async_trait::async_trait;
use pipeline::{GenerationError, TextGenerator};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Sampling temperature used when none is configured.
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Public Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Connection and sampling settings for [`GeminiProvider`].
#[derive(Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    /// Scheme and host, without a trailing slash.
    pub base_url: String,
}

impl GeminiConfig {
    /// Default model, temperature and endpoint for `api_key`.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum GeminiError {
    /// The request could not be sent or the response body could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body was not a `generateContent` response.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The prompt or the candidate was blocked by safety filters.
    #[error("blocked: {0}")]
    Blocked(String),

    /// The first candidate carried no text parts.
    #[error("response contained no text")]
    NoText,
}

impl From<GeminiError> for GenerationError {
    fn from(e: GeminiError) -> Self {
        match e {
            GeminiError::Transport(inner) => GenerationError::Unavailable(inner.to_string()),
            GeminiError::NoText => GenerationError::EmptyResponse,
            other => GenerationError::Rejected(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn request_body(prompt: &str, temperature: f32) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: [RequestContent {
            role: "user",
            parts: [RequestPart { text: prompt }],
        }],
        generation_config: GenerationConfig { temperature },
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(body: &str) -> Result<String, GeminiError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| GeminiError::Decode(e.to_string()))?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(match response.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => GeminiError::Blocked(reason),
            None => GeminiError::NoText,
        });
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if !text.trim().is_empty() {
        return Ok(text);
    }
    match candidate.finish_reason.as_deref() {
        Some(reason @ ("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT")) => {
            Err(GeminiError::Blocked(reason.to_owned()))
        }
        _ => Err(GeminiError::NoText),
    }
}

/// Pulls the human-readable message out of an error response, falling back to
/// the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_owned())
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// [`TextGenerator`] backed by the Gemini REST API.
///
/// One instance is shared by every stage that generates text.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("blogsmith/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(http, config))
    }

    /// Uses an existing HTTP client, e.g. one with custom proxy or TLS settings.
    pub fn with_client(http: reqwest::Client, config: GeminiConfig) -> Self {
        Self { http, config }
    }

    #[instrument(skip_all, fields(model = %self.config.model, prompt_chars = prompt.len()))]
    async fn call(&self, prompt: &str) -> Result<String, GeminiError> {
        let response = self
            .http
            .post(self.config.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request_body(prompt, self.config.temperature))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = error_message(&body);
            warn!(status = status.as_u16(), %message, "Gemini request failed");
            return Err(GeminiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let text = extract_text(&body)?;
        debug!(response_chars = text.len(), "Gemini response received");
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        Ok(self.call(prompt).await?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    use super::*;

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(request_body("Hello", 0.5)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "Hello"}]}],
                "generationConfig": {"temperature": 0.5}
            })
        );
    }

    #[test]
    fn endpoint_includes_model() {
        let mut config = GeminiConfig::new("k");
        config.base_url = "http://localhost:1/".into();
        assert_eq!(
            config.endpoint(),
            "http://localhost:1/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn debug_redacts_api_key() {
        let rendered = format!("{:?}", GeminiConfig::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn text_parts_are_concatenated() {
        let body = json!({
            "candidates": [{
                "content": {"parts": [{"text": "Hello, "}, {"text": "world"}]},
                "finishReason": "STOP"
            }]
        })
        .to_string();
        assert_eq!(extract_text(&body).unwrap(), "Hello, world");
    }

    #[test]
    fn blocked_prompt_is_reported() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}}).to_string();
        assert!(matches!(extract_text(&body), Err(GeminiError::Blocked(r)) if r == "SAFETY"));
    }

    #[test]
    fn blocked_candidate_is_reported() {
        let body = json!({"candidates": [{"finishReason": "SAFETY"}]}).to_string();
        assert!(matches!(extract_text(&body), Err(GeminiError::Blocked(_))));
    }

    #[test]
    fn empty_candidate_has_no_text() {
        let body = json!({"candidates": [{"content": {"parts": []}, "finishReason": "STOP"}]})
            .to_string();
        assert!(matches!(extract_text(&body), Err(GeminiError::NoText)));
        assert_eq!(
            GenerationError::from(GeminiError::NoText),
            GenerationError::EmptyResponse
        );
    }

    #[test]
    fn garbage_body_is_a_decode_error() {
        assert!(matches!(extract_text("<html>"), Err(GeminiError::Decode(_))));
    }

    #[test]
    fn error_message_prefers_api_message() {
        let body = json!({
            "error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}
        })
        .to_string();
        assert_eq!(error_message(&body), "Quota exceeded");
        assert_eq!(error_message(" plain text "), "plain text");
    }

    /// Serves one canned HTTP response and hands back the raw request.
    async fn serve_once(
        status_line: &'static str,
        body: String,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(split) = text.find("\r\n\r\n") {
                    let length = text[..split]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= split + 4 + length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
        });
        (format!("http://{addr}"), rx)
    }

    fn provider(base_url: String) -> GeminiProvider {
        let mut config = GeminiConfig::new("test-key");
        config.base_url = base_url;
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        GeminiProvider::with_client(http, config)
    }

    #[tokio::test]
    async fn generate_posts_prompt_and_returns_text() {
        let body = json!({"candidates": [{"content": {"parts": [{"text": "A|B\nDepth: basic"}]}}]})
            .to_string();
        let (base_url, request) = serve_once("200 OK", body).await;

        let text = provider(base_url).generate("plan Rust").await.unwrap();

        assert_eq!(text, "A|B\nDepth: basic");
        let request = request.await.unwrap();
        assert!(request.starts_with("POST /v1beta/models/gemini-1.5-pro:generateContent"));
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
        assert!(request.contains("plan Rust"));
    }

    #[tokio::test]
    async fn http_error_is_rejected_with_api_message() {
        let body = json!({"error": {"code": 429, "message": "Quota exceeded"}}).to_string();
        let (base_url, _request) = serve_once("429 Too Many Requests", body).await;

        let err = provider(base_url).generate("plan Rust").await.unwrap_err();

        assert_eq!(
            err,
            GenerationError::Rejected("HTTP 429: Quota exceeded".into())
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_unavailable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = provider(format!("http://{addr}"))
            .generate("plan Rust")
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Unavailable(_)), "{err:?}");
    }
}
