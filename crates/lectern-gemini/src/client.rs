//! HTTP client for the Generative Language API.

use crate::error::{GeminiError, GeminiResult};
use crate::retry::{with_retry, RetryPolicy};
use crate::types::*;
use lectern_config::GeminiConfig;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Client for the Generative Language API.
///
/// Handles the resumable file-upload handshake, plain generation, and
/// schema-constrained generation. Every network round trip goes through the
/// configured [`RetryPolicy`].
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl GeminiClient {
    /// Create a new client from configuration.
    ///
    /// Fails when no API key is present in the config file or the
    /// `GEMINI_API_KEY` environment variable.
    pub fn from_config(config: &GeminiConfig) -> GeminiResult<Self> {
        let api_key = config.resolved_api_key().ok_or(GeminiError::MissingApiKey)?;
        let timeout = Duration::from_secs(config.timeout_seconds);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GeminiError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout,
            retry: RetryPolicy {
                max_attempts: config.retry_attempts.max(1),
                delay: Duration::from_secs(config.retry_delay_seconds),
            },
        })
    }

    /// Create a new client with default settings.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> GeminiResult<Self> {
        let timeout = Duration::from_secs(300);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GeminiError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout,
            retry: RetryPolicy::default(),
        })
    }

    /// Upload a file so generate requests can reference it.
    ///
    /// The file is re-read on every retry attempt, so a partially written
    /// source gets a fresh chance rather than a stale buffer.
    pub async fn upload_file(&self, path: &Path) -> GeminiResult<FileHandle> {
        let mime_type = mime_for_path(path);
        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        info!("Uploading {} ({})", path.display(), mime_type);
        with_retry(&self.retry, "file upload", || async {
            let bytes = tokio::fs::read(path).await.map_err(|e| GeminiError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })?;
            self.upload_once(&display_name, mime_type, bytes).await
        })
        .await
    }

    /// One round of the resumable upload handshake: announce the file, then
    /// send the bytes and finalize in a single request.
    async fn upload_once(
        &self,
        display_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> GeminiResult<FileHandle> {
        let start_url = format!("{}/upload/v1beta/files?key={}", self.base_url, self.api_key);
        let metadata = UploadStartRequest {
            file: UploadFileMeta {
                display_name: display_name.to_string(),
            },
        };

        let start = self
            .client
            .post(&start_url)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&metadata)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !start.status().is_success() {
            return Err(api_error(start).await);
        }

        let upload_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                GeminiError::UploadProtocol("server did not return an upload URL".to_string())
            })?;

        let finalize = self
            .client
            .post(&upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !finalize.status().is_success() {
            return Err(api_error(finalize).await);
        }

        let uploaded: UploadResponse = finalize.json().await?;
        debug!(
            "Registered as {}",
            uploaded.file.name.as_deref().unwrap_or("<unnamed>")
        );
        Ok(FileHandle {
            uri: uploaded.file.uri,
            mime_type: uploaded
                .file
                .mime_type
                .unwrap_or_else(|| mime_type.to_string()),
        })
    }

    /// Generate free text from a single user turn of parts.
    pub async fn generate(&self, model: &str, parts: &[Part]) -> GeminiResult<String> {
        with_retry(&self.retry, "content generation", || {
            self.generate_once(model, parts, None)
        })
        .await
    }

    /// Generate JSON constrained to `schema` (an OpenAPI-style object).
    ///
    /// The returned string is the raw JSON text; the caller parses it into
    /// its own shape.
    pub async fn generate_structured(
        &self,
        model: &str,
        parts: &[Part],
        schema: &serde_json::Value,
    ) -> GeminiResult<String> {
        with_retry(&self.retry, "structured generation", || {
            self.generate_once(model, parts, Some(schema))
        })
        .await
    }

    async fn generate_once(
        &self,
        model: &str,
        parts: &[Part],
        schema: Option<&serde_json::Value>,
    ) -> GeminiResult<String> {
        let url = format!(
            "{}/v1beta/{}:generateContent?key={}",
            self.base_url,
            qualified_model(model),
            self.api_key
        );
        debug!("Generating with {} ({} parts)", model, parts.len());

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: parts.to_vec(),
            }],
            generation_config: schema.map(|schema| GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: schema.clone(),
            }),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body: GenerateContentResponse = response.json().await?;
        let text = response_text(body);
        if text.trim().is_empty() {
            return Err(GeminiError::EmptyResponse);
        }
        Ok(text)
    }

    fn map_send_error(&self, e: reqwest::Error) -> GeminiError {
        if e.is_timeout() {
            GeminiError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            GeminiError::Http(e)
        }
    }
}

/// Model names on the wire are `models/<name>`; accept both spellings in
/// configuration.
fn qualified_model(model: &str) -> String {
    if model.contains('/') {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

async fn api_error(response: reqwest::Response) -> GeminiError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    GeminiError::ApiError { status, message }
}

/// Best-effort MIME type from the file extension. The upload handshake
/// requires one up front.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("mp4" | "m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        Some("avi") => "video/x-msvideo",
        Some("opus" | "ogg") => "audio/ogg",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        Some("flac") => "audio/flac",
        Some("aac") => "audio/aac",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("pdf") => "application/pdf",
        Some("md" | "markdown") => "text/markdown",
        Some("html" | "htm") => "text/html",
        Some("csv") => "text/csv",
        _ => "text/plain",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = GeminiConfig {
            api_key: Some("test-key".to_string()),
            ..GeminiConfig::default()
        };
        let client = GeminiClient::from_config(&config);
        assert!(client.is_ok());
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let config = GeminiConfig::default();
        if std::env::var("GEMINI_API_KEY").is_err() {
            assert!(matches!(
                GeminiClient::from_config(&config),
                Err(GeminiError::MissingApiKey)
            ));
        }
    }

    #[test]
    fn test_qualified_model() {
        assert_eq!(qualified_model("gemini-2.5-flash"), "models/gemini-2.5-flash");
        assert_eq!(
            qualified_model("models/gemini-2.5-flash"),
            "models/gemini-2.5-flash"
        );
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a/talk.opus")), "audio/ogg");
        assert_eq!(mime_for_path(Path::new("slides.PDF")), "application/pdf");
        assert_eq!(mime_for_path(Path::new("clip.mp4")), "video/mp4");
        assert_eq!(mime_for_path(Path::new("notes.rs")), "text/plain");
        assert_eq!(mime_for_path(Path::new("no_extension")), "text/plain");
    }
}
