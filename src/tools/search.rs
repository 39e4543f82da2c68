//! Web search through the Serper API.

use crate::config::SearchSettings;
use crate::error::{FactCheckError, Result};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub answer_box: Option<AnswerBox>,
    pub knowledge_graph: Option<KnowledgeGraph>,
    #[serde(default)]
    pub organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerBox {
    pub title: Option<String>,
    pub answer: Option<String>,
    pub snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KnowledgeGraph {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    pub date: Option<String>,
}

/// Serper (Google Search) client.
#[derive(Clone)]
pub struct SerperClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    num_results: u32,
}

impl SerperClient {
    pub fn new(settings: &SearchSettings, api_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            num_results: settings.num_results,
        })
    }

    /// Run a search and return the parsed response.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<SearchResponse> {
        let response = self
            .http
            .post(format!("{}/search", self.api_base))
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query, "num": self.num_results }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FactCheckError::Search(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let parsed: SearchResponse = response.json().await?;
        debug!("{} organic results", parsed.organic.len());
        Ok(parsed)
    }
}

/// Render search results as plain text for the agent.
pub fn format_results(query: &str, response: &SearchResponse) -> String {
    let mut out = format!("Search results for: {}\n", query);

    if let Some(answer) = &response.answer_box {
        let text = answer
            .answer
            .as_deref()
            .or(answer.snippet.as_deref())
            .unwrap_or_default();
        if !text.is_empty() {
            out.push_str(&format!("\nAnswer box: {}\n", text));
            if let Some(title) = &answer.title {
                out.push_str(&format!("  ({})\n", title));
            }
        }
    }

    if let Some(kg) = &response.knowledge_graph {
        if let Some(title) = &kg.title {
            out.push_str(&format!("\nKnowledge graph: {}", title));
            if let Some(kind) = &kg.kind {
                out.push_str(&format!(" [{}]", kind));
            }
            out.push('\n');
            if let Some(desc) = &kg.description {
                out.push_str(&format!("  {}\n", desc));
            }
        }
    }

    if response.organic.is_empty() {
        out.push_str("\nNo results found.\n");
        return out;
    }

    out.push('\n');
    for (i, r) in response.organic.iter().enumerate() {
        out.push_str(&format!("{}. {}\n   Link: {}\n", i + 1, r.title, r.link));
        if !r.snippet.is_empty() {
            out.push_str(&format!("   Snippet: {}\n", r.snippet));
        }
        if let Some(date) = &r.date {
            out.push_str(&format!("   Date: {}\n", date));
        }
    }

    out
}
