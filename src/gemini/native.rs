//! Native Gemini REST client: file upload, state polling, content generation.

use crate::config::GeminiSettings;
use crate::error::{FactCheckError, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Processing state of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    #[default]
    StateUnspecified,
    Processing,
    Active,
    Failed,
}

/// A file stored by the Gemini Files API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiFile {
    /// Resource name, e.g. `files/abc123`.
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub state: FileState,
}

#[derive(Deserialize)]
struct FileEnvelope {
    file: GeminiFile,
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
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Client for the native Gemini REST API.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    poll_interval: Duration,
}

impl GeminiClient {
    /// Create a new client from settings.
    pub fn new(settings: &GeminiSettings, api_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: settings.video_model.clone(),
            poll_interval: Duration::from_secs(settings.poll_interval_secs),
        })
    }

    /// Override the interval between file state polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Model used for `generateContent`.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Upload a local file with the resumable upload protocol.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn upload_file(&self, path: &Path) -> Result<GeminiFile> {
        let bytes = tokio::fs::read(path).await?;
        let mime_type = mime_type_for(path);
        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video")
            .to_string();

        info!("Uploading {} bytes to Gemini", bytes.len());

        let start = self
            .http
            .post(format!("{}/upload/v1beta/files", self.api_base))
            .header("x-goog-api-key", &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;
        let start = check_status(start).await?;

        let upload_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .ok_or_else(|| FactCheckError::Gemini("Upload session URL missing from response".into()))?;

        let finished = self
            .http
            .post(&upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await?;
        let finished = check_status(finished).await?;

        let envelope: FileEnvelope = finished.json().await?;
        debug!("Uploaded as {}", envelope.file.name);
        Ok(envelope.file)
    }

    /// Fetch the current metadata of an uploaded file.
    pub async fn get_file(&self, name: &str) -> Result<GeminiFile> {
        let response = self
            .http
            .get(format!("{}/v1beta/{}", self.api_base, name))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Poll until the file leaves the `PROCESSING` state.
    #[instrument(skip(self, file), fields(file = %file.name))]
    pub async fn wait_until_active(&self, mut file: GeminiFile) -> Result<GeminiFile> {
        while file.state == FileState::Processing {
            debug!("Gemini is still processing the video");
            tokio::time::sleep(self.poll_interval).await;
            file = self.get_file(&file.name).await?;
        }

        if file.state == FileState::Failed {
            return Err(FactCheckError::VideoProcessingFailed);
        }

        Ok(file)
    }

    /// Generate text from a prompt, optionally grounded on an uploaded file.
    #[instrument(skip(self, file, prompt), fields(model = %self.model))]
    pub async fn generate(&self, file: Option<&GeminiFile>, prompt: &str) -> Result<String> {
        let mut parts = Vec::new();
        if let Some(f) = file {
            parts.push(json!({
                "file_data": { "mime_type": f.mime_type, "file_uri": f.uri }
            }));
        }
        parts.push(json!({ "text": prompt }));

        let response = self
            .http
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.api_base, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({ "contents": [{ "parts": parts }] }))
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: GenerateContentResponse = response.json().await?;

        extract_text(body)
    }

    /// Delete an uploaded file. Failures are logged, not returned.
    pub async fn delete_file(&self, name: &str) {
        let result = self
            .http
            .delete(format!("{}/v1beta/{}", self.api_base, name))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await;

        match result {
            Ok(r) if r.status().is_success() => debug!("Deleted Gemini file {}", name),
            Ok(r) => warn!("Could not delete Gemini file {}: HTTP {}", name, r.status()),
            Err(e) => warn!("Could not delete Gemini file {}: {}", name, e),
        }
    }

    /// Upload a video, wait for processing, run the prompt, and delete the upload.
    pub async fn analyze_video(&self, path: &Path, prompt: &str) -> Result<String> {
        let uploaded = self.upload_file(path).await?;
        let name = uploaded.name.clone();

        let result = match self.wait_until_active(uploaded).await {
            Ok(active) => self.generate(Some(&active), prompt).await,
            Err(e) => Err(e),
        };

        self.delete_file(&name).await;
        result
    }
}

/// Pull the text out of a generation response, surfacing safety blocks as errors.
fn extract_text(body: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = body.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(FactCheckError::Gemini(format!(
            "Prompt blocked by safety filters ({})",
            reason
        )));
    }

    let candidate = body
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| FactCheckError::Gemini("No candidates in response".into()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        if let Some(reason) = candidate.finish_reason.filter(|r| r == "SAFETY") {
            return Err(FactCheckError::Gemini(format!(
                "Response blocked by safety filters ({})",
                reason
            )));
        }
        return Err(FactCheckError::Gemini("Empty response from model".into()));
    }

    Ok(text)
}

/// Turn a non-success response into an error carrying the API's message.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorEnvelope>(&body) {
        Ok(env) if !env.error.status.is_empty() => {
            format!("{} ({})", env.error.message, env.error.status)
        }
        Ok(env) => env.error.message,
        Err(_) => body,
    };

    Err(FactCheckError::Gemini(format!("HTTP {}: {}", status.as_u16(), message)))
}

/// Guess a video MIME type from the file extension.
fn mime_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("3gp") => "video/3gpp",
        _ => "video/mp4",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        let settings = GeminiSettings {
            api_base: server.uri(),
            ..GeminiSettings::default()
        };
        GeminiClient::new(&settings, "test-key")
            .unwrap()
            .with_poll_interval(Duration::from_millis(0))
    }

    #[test]
    fn test_mime_type_for() {
        assert_eq!(mime_type_for(Path::new("/tmp/a.MP4")), "video/mp4");
        assert_eq!(mime_type_for(Path::new("clip.webm")), "video/webm");
        assert_eq!(mime_type_for(Path::new("clip.mov")), "video/quicktime");
        assert_eq!(mime_type_for(Path::new("noext")), "video/mp4");
    }

    #[tokio::test]
    async fn test_generate_text_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "API test " }, { "text": "successful" }] },
                    "finishReason": "STOP"
                }]
            })))
            .mount(&server)
            .await;

        let text = client_for(&server).generate(None, "Say hi").await.unwrap();
        assert_eq!(text, "API test successful");
    }

    #[tokio::test]
    async fn test_generate_blocked_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate(None, "x").await.unwrap_err();
        assert!(err.to_string().contains("blocked"));
    }

    #[tokio::test]
    async fn test_api_error_message_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {
                    "code": 429,
                    "message": "You exceeded your current quota",
                    "status": "RESOURCE_EXHAUSTED"
                }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate(None, "x").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("quota"));
        assert!(msg.contains("RESOURCE_EXHAUSTED"));
    }

    #[tokio::test]
    async fn test_wait_until_active_polls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/files/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "files/abc", "uri": "u", "mimeType": "video/mp4", "state": "PROCESSING"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1beta/files/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "files/abc", "uri": "u", "mimeType": "video/mp4", "state": "ACTIVE"
            })))
            .mount(&server)
            .await;

        let file = GeminiFile {
            name: "files/abc".into(),
            uri: "u".into(),
            mime_type: "video/mp4".into(),
            state: FileState::Processing,
        };
        let active = client_for(&server).wait_until_active(file).await.unwrap();
        assert_eq!(active.state, FileState::Active);
    }

    #[tokio::test]
    async fn test_wait_until_active_failed() {
        let server = MockServer::start().await;
        let file = GeminiFile {
            name: "files/bad".into(),
            uri: String::new(),
            mime_type: String::new(),
            state: FileState::Failed,
        };
        let err = client_for(&server).wait_until_active(file).await.unwrap_err();
        assert!(err.to_string().contains("Video processing failed"));
    }

    #[tokio::test]
    async fn test_analyze_video_round_trip() {
        let server = MockServer::start().await;
        let session_url = format!("{}/upload-session/1", server.uri());

        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .and(header("X-Goog-Upload-Command", "start"))
            .respond_with(ResponseTemplate::new(200).insert_header("x-goog-upload-url", session_url.as_str()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/upload-session/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "file": { "name": "files/v1", "uri": "https://files/v1", "mimeType": "video/mp4", "state": "ACTIVE" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "A person talks about rockets." }] } }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/v1beta/files/v1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"not really a video").unwrap();

        let text = client_for(&server)
            .analyze_video(&video, "Describe")
            .await
            .unwrap();
        assert_eq!(text, "A person talks about rockets.");
    }
}
