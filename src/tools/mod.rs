//! Tool definitions and implementations for the crew's agents.
//!
//! Every tool takes textual input, performs one external operation and
//! returns text. Failures never escape a tool: they come back as an error
//! string the agent can read and react to.

mod blog;
mod fact_check;
pub mod failure;
mod search;
mod video;

pub use blog::{extract_article, format_article, Article, BROWSER_USER_AGENT};
pub use fact_check::{claims_from_value, count_claims, fact_check_brief};
pub use search::{format_results, SearchResponse, SerperClient};
pub use video::{format_instagram_report, format_youtube_report};

use crate::config::{Credentials, Prompts, Settings};
use crate::error::{FactCheckError, Result};
use crate::gemini::GeminiClient;
use crate::media::{self, DownloadOptions, VideoMetadata};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument, warn};

/// The tools an agent may be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    DownloadVideo,
    AnalyzeVideo,
    AnalyzeYoutube,
    AnalyzeBlog,
    FactCheck,
    WebSearch,
}

impl ToolKind {
    /// Function name exposed to the model.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::DownloadVideo => "download_video",
            ToolKind::AnalyzeVideo => "analyze_video",
            ToolKind::AnalyzeYoutube => "analyze_youtube",
            ToolKind::AnalyzeBlog => "analyze_blog",
            ToolKind::FactCheck => "fact_check",
            ToolKind::WebSearch => "web_search",
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A parsed tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Download a YouTube/Instagram video to local disk.
    DownloadVideo { url: String },

    /// Analyze a local video file or an Instagram URL with Gemini.
    AnalyzeVideo { video_path: String },

    /// Metadata + download + Gemini analysis for a YouTube URL.
    AnalyzeYoutube { url: String },

    /// Extract and summarize a blog post or article.
    AnalyzeBlog { url: String },

    /// Prepare claims for verification.
    FactCheck { claims: String },

    /// Search the web.
    WebSearch { query: String },
}

impl ToolCall {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolCall::DownloadVideo { .. } => ToolKind::DownloadVideo,
            ToolCall::AnalyzeVideo { .. } => ToolKind::AnalyzeVideo,
            ToolCall::AnalyzeYoutube { .. } => ToolKind::AnalyzeYoutube,
            ToolCall::AnalyzeBlog { .. } => ToolKind::AnalyzeBlog,
            ToolCall::FactCheck { .. } => ToolKind::FactCheck,
            ToolCall::WebSearch { .. } => ToolKind::WebSearch,
        }
    }
}

/// Tool execution context with access to the external services.
pub struct ToolContext {
    gemini: Option<GeminiClient>,
    search: Option<SerperClient>,
    http: reqwest::Client,
    prompts: Prompts,
    temp_dir: PathBuf,
}

impl ToolContext {
    /// Create a tool context. Services whose keys are missing stay disabled
    /// and their tools answer with an error string.
    pub fn new(settings: &Settings, prompts: Prompts, credentials: &Credentials) -> Result<Self> {
        let gemini = credentials
            .gemini_api_key
            .as_deref()
            .map(|key| GeminiClient::new(&settings.gemini, key))
            .transpose()?;

        let search = credentials
            .serper_api_key
            .as_deref()
            .map(|key| SerperClient::new(&settings.search, key))
            .transpose()?;

        let http = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            gemini,
            search,
            http,
            prompts,
            temp_dir: settings.temp_dir(),
        })
    }

    /// Create a context from explicit parts.
    pub fn with_clients(
        gemini: Option<GeminiClient>,
        search: Option<SerperClient>,
        prompts: Prompts,
        temp_dir: PathBuf,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            gemini,
            search,
            http,
            prompts,
            temp_dir,
        })
    }

    /// Execute a tool call and return its textual result.
    pub async fn execute(&self, tool: &ToolCall) -> String {
        match tool {
            ToolCall::DownloadVideo { url } => self.download_video(url).await,
            ToolCall::AnalyzeVideo { video_path } => self.analyze_video(video_path).await,
            ToolCall::AnalyzeYoutube { url } => self.analyze_youtube(url).await,
            ToolCall::AnalyzeBlog { url } => self.analyze_blog(url).await,
            ToolCall::FactCheck { claims } => fact_check_brief(claims),
            ToolCall::WebSearch { query } => self.web_search(query).await,
        }
    }

    fn scratch_dir(&self, prefix: &str) -> Result<tempfile::TempDir> {
        std::fs::create_dir_all(&self.temp_dir)?;
        Ok(tempfile::Builder::new().prefix(prefix).tempdir_in(&self.temp_dir)?)
    }

    #[instrument(skip(self))]
    async fn download_video(&self, url: &str) -> String {
        match self.download_to_scratch(url).await {
            Ok(path) => format!("Video downloaded successfully to: {}", path.display()),
            Err(e) => format!("Error downloading video: {}", e),
        }
    }

    async fn download_to_scratch(&self, url: &str) -> Result<PathBuf> {
        // Kept on disk so a later analyze_video call can read it
        let dir = self.scratch_dir("video_fact_check_")?.keep();
        media::download_video(url, &dir, &DownloadOptions::default()).await
    }

    #[instrument(skip(self))]
    async fn analyze_video(&self, video_path: &str) -> String {
        let Some(gemini) = &self.gemini else {
            return "Error: GEMINI_API_KEY not found in environment variables".to_string();
        };

        let result = if media::is_instagram(video_path) {
            self.analyze_instagram(gemini, video_path).await
        } else {
            self.analyze_local(gemini, Path::new(video_path)).await
        };

        result.unwrap_or_else(|e| video_error_message(&e))
    }

    async fn analyze_local(&self, gemini: &GeminiClient, path: &Path) -> Result<String> {
        if !path.is_file() {
            return Err(FactCheckError::InvalidInput(format!(
                "Video file not found: {}",
                path.display()
            )));
        }
        gemini.analyze_video(path, &self.prompts.analysis.generic).await
    }

    async fn analyze_instagram(&self, gemini: &GeminiClient, url: &str) -> Result<String> {
        info!("Extracting Instagram metadata");
        let meta = match media::fetch_metadata(url, "Instagram Post").await {
            Ok(m) => m,
            Err(e) => {
                warn!("Instagram metadata unavailable: {}", e);
                VideoMetadata::instagram_fallback()
            }
        };

        let dir = self.scratch_dir("video_fact_check_")?;
        let path = media::download_video(url, dir.path(), &DownloadOptions::compact()).await?;

        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.analysis.instagram, &video::instagram_prompt_vars(&meta));
        let analysis = gemini.analyze_video(&path, &prompt).await?;

        Ok(format_instagram_report(&meta, &analysis))
    }

    #[instrument(skip(self))]
    async fn analyze_youtube(&self, url: &str) -> String {
        let Some(gemini) = &self.gemini else {
            return "Error: GEMINI_API_KEY not found in environment variables".to_string();
        };

        let url = media::normalize_youtube_url(url);
        self.analyze_youtube_inner(gemini, &url)
            .await
            .unwrap_or_else(|e| youtube_error_message(&url, &e))
    }

    async fn analyze_youtube_inner(&self, gemini: &GeminiClient, url: &str) -> Result<String> {
        let meta = media::fetch_metadata(url, "Unknown").await?;

        // Removed with everything in it when `dir` drops
        let dir = self.scratch_dir("youtube_fact_check_")?;
        let path = media::download_video(url, dir.path(), &DownloadOptions::compact()).await?;
        info!("Video downloaded to {}", path.display());

        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.analysis.youtube, &video::youtube_prompt_vars(&meta));
        let analysis = gemini.analyze_video(&path, &prompt).await?;

        Ok(format_youtube_report(url, &meta, &analysis))
    }

    #[instrument(skip(self))]
    async fn analyze_blog(&self, url: &str) -> String {
        let html = match self.fetch_page(url).await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => {
                return format!("Error: Request timed out while fetching {}", url);
            }
            Err(e) => return format!("Error fetching blog content: {}", e),
        };

        let article = extract_article(&html);
        format_article(url, &article)
    }

    async fn fetch_page(&self, url: &str) -> std::result::Result<String, reqwest::Error> {
        self.http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }

    #[instrument(skip(self))]
    async fn web_search(&self, query: &str) -> String {
        let Some(search) = &self.search else {
            return "Error: SERPER_API_KEY not found in environment variables".to_string();
        };

        match search.search(query).await {
            Ok(response) => format_results(query, &response),
            Err(e) => format!("Error searching the web: {}", e),
        }
    }
}

fn video_error_message(error: &FactCheckError) -> String {
    match error {
        FactCheckError::VideoProcessingFailed => "Error: Video processing failed".to_string(),
        e => format!("Error analyzing video: {}", e),
    }
}

fn youtube_error_message(url: &str, error: &FactCheckError) -> String {
    match error {
        FactCheckError::VideoProcessingFailed => "Error: Video processing failed in Gemini".to_string(),
        e => failure::youtube_failure_message(url, &e.to_string()),
    }
}

/// OpenAI-style function definitions for the given tools.
pub fn tool_definitions(kinds: &[ToolKind]) -> Vec<async_openai::types::ChatCompletionTool> {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    kinds
        .iter()
        .map(|kind| {
            let (description, parameters) = match kind {
                ToolKind::DownloadVideo => (
                    "Downloads videos from YouTube or Instagram. Accepts a URL and returns the \
                     local file path of the downloaded video.",
                    string_param("url", "YouTube or Instagram video/reel URL to download"),
                ),
                ToolKind::AnalyzeVideo => (
                    "Analyzes video content using Google Gemini. For Instagram URLs, extracts \
                     metadata (title, description, author) first. For local files, analyzes \
                     directly. Returns people, visual content, text overlays, speech and the \
                     claims made in the video.",
                    string_param("video_path", "Local path to the video file to analyze OR Instagram URL"),
                ),
                ToolKind::AnalyzeYoutube => (
                    "Analyzes YouTube videos and Shorts. Extracts metadata (title, description, \
                     channel, views, date), downloads the video temporarily and analyzes it with \
                     Gemini. Use this for ALL YouTube content (youtube.com, youtu.be, youtube.com/shorts).",
                    string_param("url", "YouTube video URL to analyze (including YouTube Shorts)"),
                ),
                ToolKind::AnalyzeBlog => (
                    "Analyzes blog posts and articles from URLs. Extracts the main content, title, \
                     author and publication date. Use this for written content from blogs and news sites.",
                    string_param("url", "Blog or article URL to analyze"),
                ),
                ToolKind::FactCheck => (
                    "Prepares claims for verification. Input can be a single claim or multiple \
                     claims separated by newlines. Use this after extracting claims, then search \
                     for evidence.",
                    serde_json::json!({
                        "type": "object",
                        "properties": {
                            "claims": {
                                "type": "string",
                                "description": "Claims or statements to fact-check, one per line"
                            }
                        },
                        "required": ["claims"]
                    }),
                ),
                ToolKind::WebSearch => (
                    "Searches the internet and returns the most relevant results with titles, \
                     links, snippets and dates. Use it to find credible sources for a claim.",
                    string_param("query", "The search query"),
                ),
            };

            ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name: kind.name().to_string(),
                    description: Some(description.to_string()),
                    parameters: Some(parameters),
                    strict: None,
                },
            }
        })
        .collect()
}

fn string_param(name: &str, description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            name: { "type": "string", "description": description }
        },
        "required": [name]
    })
}

fn required_str(args: &serde_json::Value, key: &str) -> Result<String> {
    args[key]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| FactCheckError::Agent(format!("Missing '{}' argument", key)))
}

/// Parse a tool call from the model's function-call format.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| FactCheckError::Agent(format!("Invalid tool arguments: {}", e)))?;

    match name {
        "download_video" => Ok(ToolCall::DownloadVideo {
            url: required_str(&args, "url")?,
        }),
        "analyze_video" => Ok(ToolCall::AnalyzeVideo {
            video_path: required_str(&args, "video_path")?,
        }),
        "analyze_youtube" => Ok(ToolCall::AnalyzeYoutube {
            url: required_str(&args, "url")?,
        }),
        "analyze_blog" => Ok(ToolCall::AnalyzeBlog {
            url: required_str(&args, "url")?,
        }),
        "fact_check" => {
            let claims = claims_from_value(&args["claims"])
                .ok_or_else(|| FactCheckError::Agent("Missing 'claims' argument".to_string()))?;
            Ok(ToolCall::FactCheck { claims })
        }
        "web_search" => Ok(ToolCall::WebSearch {
            query: required_str(&args, "query")?,
        }),
        _ => Err(FactCheckError::Agent(format!("Unknown tool: {}", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn offline_context() -> ToolContext {
        ToolContext::with_clients(None, None, Prompts::default(), std::env::temp_dir()).unwrap()
    }

    #[test]
    fn test_parse_analyze_youtube() {
        let tool = parse_tool_call("analyze_youtube", r#"{"url": "https://youtu.be/dQw4w9WgXcQ"}"#).unwrap();
        assert_eq!(
            tool,
            ToolCall::AnalyzeYoutube {
                url: "https://youtu.be/dQw4w9WgXcQ".to_string()
            }
        );
        assert_eq!(tool.kind(), ToolKind::AnalyzeYoutube);
    }

    #[test]
    fn test_parse_fact_check_list() {
        let tool = parse_tool_call("fact_check", r#"{"claims": ["a", "b"]}"#).unwrap();
        match tool {
            ToolCall::FactCheck { claims } => assert_eq!(claims, "a\nb"),
            _ => panic!("Expected FactCheck tool"),
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_tool_call("web_search", "{}").is_err());
        assert!(parse_tool_call("web_search", "not json").is_err());
        assert!(parse_tool_call("delete_everything", "{}").is_err());
    }

    #[test]
    fn test_tool_definitions_match_kinds() {
        let defs = tool_definitions(&[ToolKind::WebSearch, ToolKind::FactCheck]);
        let names: Vec<_> = defs.iter().map(|d| d.function.name.as_str()).collect();
        assert_eq!(names, vec!["web_search", "fact_check"]);

        let params = defs[0].function.parameters.as_ref().unwrap();
        assert_eq!(params["required"][0], "query");
    }

    #[tokio::test]
    async fn test_missing_keys_become_error_strings() {
        let ctx = offline_context();

        let out = ctx
            .execute(&ToolCall::AnalyzeVideo { video_path: "/tmp/x.mp4".into() })
            .await;
        assert_eq!(out, "Error: GEMINI_API_KEY not found in environment variables");

        let out = ctx.execute(&ToolCall::WebSearch { query: "x".into() }).await;
        assert!(out.starts_with("Error: SERPER_API_KEY not found"));
    }

    #[tokio::test]
    async fn test_fact_check_tool() {
        let out = offline_context()
            .execute(&ToolCall::FactCheck { claims: "one\ntwo\nthree".into() })
            .await;
        assert!(out.starts_with("Ready to fact-check 3 claim(s):"));
    }

    #[tokio::test]
    async fn test_analyze_blog_fetches_and_formats() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/post"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html").set_body_string(
                "<html><head><title>Miracle Cure</title></head><body><p>Drinking lemon water cures everything.</p></body></html>",
            ))
            .mount(&server)
            .await;

        let url = format!("{}/post", server.uri());
        let out = offline_context().execute(&ToolCall::AnalyzeBlog { url: url.clone() }).await;
        assert!(out.contains("BLOG/ARTICLE ANALYSIS"));
        assert!(out.contains(&format!("URL: {}", url)));
        assert!(out.contains("Title: Miracle Cure"));
        assert!(out.contains("Drinking lemon water cures everything."));
    }

    #[tokio::test]
    async fn test_analyze_blog_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = format!("{}/gone", server.uri());
        let out = offline_context().execute(&ToolCall::AnalyzeBlog { url }).await;
        assert!(out.starts_with("Error fetching blog content:"));
    }

    #[tokio::test]
    async fn test_analyze_blog_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(15)))
            .mount(&server)
            .await;

        let url = format!("{}/slow", server.uri());
        let out = offline_context().execute(&ToolCall::AnalyzeBlog { url: url.clone() }).await;
        assert_eq!(out, format!("Error: Request timed out while fetching {}", url));
    }

    fn gemini_for(server: &MockServer) -> GeminiClient {
        let settings = crate::config::GeminiSettings {
            api_base: server.uri(),
            ..Default::default()
        };
        GeminiClient::new(&settings, "test-key")
            .unwrap()
            .with_poll_interval(Duration::from_millis(0))
    }

    /// Mount the upload handshake; the finished file reports `state`.
    async fn mount_upload(server: &MockServer, state: &str) {
        let session_url = format!("{}/upload-session/1", server.uri());
        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .respond_with(ResponseTemplate::new(200).insert_header("x-goog-upload-url", session_url.as_str()))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/upload-session/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "file": { "name": "files/v1", "uri": "https://files/v1", "mimeType": "video/mp4", "state": state }
            })))
            .mount(server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/v1beta/files/v1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(server)
            .await;
    }

    fn local_clip(dir: &tempfile::TempDir) -> String {
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"not really a video").unwrap();
        video.to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn test_analyze_local_video() {
        let server = MockServer::start().await;
        mount_upload(&server, "ACTIVE").await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": "A man claims the moon is hollow." }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let ctx = ToolContext::with_clients(Some(gemini_for(&server)), None, Prompts::default(), dir.path().to_path_buf())
            .unwrap();
        let out = ctx
            .execute(&ToolCall::AnalyzeVideo { video_path: local_clip(&dir) })
            .await;
        assert_eq!(out, "A man claims the moon is hollow.");
    }

    #[tokio::test]
    async fn test_analyze_local_video_processing_failed() {
        let server = MockServer::start().await;
        mount_upload(&server, "FAILED").await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let ctx = ToolContext::with_clients(Some(gemini_for(&server)), None, Prompts::default(), dir.path().to_path_buf())
            .unwrap();
        let out = ctx
            .execute(&ToolCall::AnalyzeVideo { video_path: local_clip(&dir) })
            .await;
        assert_eq!(out, "Error: Video processing failed");
    }

    #[tokio::test]
    async fn test_analyze_missing_video_file() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.mp4");

        let ctx = ToolContext::with_clients(Some(gemini_for(&server)), None, Prompts::default(), dir.path().to_path_buf())
            .unwrap();
        let out = ctx
            .execute(&ToolCall::AnalyzeVideo { video_path: missing.to_string_lossy().to_string() })
            .await;
        assert_eq!(
            out,
            format!("Error analyzing video: Invalid input: Video file not found: {}", missing.display())
        );
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_youtube_failure_is_troubleshooting_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let ctx = ToolContext::with_clients(Some(gemini_for(&server)), None, Prompts::default(), dir.path().to_path_buf())
            .unwrap();
        let url = format!("{}/watch/missing", server.uri());
        let out = ctx.execute(&ToolCall::AnalyzeYoutube { url: url.clone() }).await;

        // yt-dlp either is missing or cannot fetch the page; both end up here
        assert!(out.starts_with("Error"), "{}", out);
        assert!(out.contains(&format!("URL provided: {}", url)));
        assert!(out.contains("Troubleshooting:"));
    }

    #[test]
    fn test_video_error_messages() {
        assert_eq!(
            video_error_message(&FactCheckError::VideoProcessingFailed),
            "Error: Video processing failed"
        );
        assert_eq!(
            youtube_error_message("https://youtu.be/x", &FactCheckError::VideoProcessingFailed),
            "Error: Video processing failed in Gemini"
        );

        let missing = youtube_error_message(
            "https://www.youtube.com/watch?v=x",
            &FactCheckError::ToolNotFound("yt-dlp".into()),
        );
        assert!(missing.starts_with("Error analyzing YouTube video: External tool not found: yt-dlp."));
        assert!(missing.contains("4. Verify your API key is valid"));

        let quota = youtube_error_message("u", &FactCheckError::Gemini("You exceeded your current quota".into()));
        assert!(quota.starts_with("Error: API quota exceeded."));
    }
}
