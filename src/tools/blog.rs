//! Blog and article extraction.

use crate::media::truncate_chars;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

const MIN_CONTENT_CHARS: usize = 200;
const MAX_CONTENT_CHARS: usize = 3000;

/// User agent sent when fetching pages; many sites reject bare clients.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Main fields pulled out of an article page.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub author: String,
    pub date: String,
    pub content: String,
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Invalid selector")
}

fn content_class() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(content|article|post|entry)").expect("Invalid regex"))
}

fn author_class() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)author").expect("Invalid regex"))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn paragraphs_of(el: ElementRef<'_>, p: &Selector) -> String {
    el.select(p)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn meta_content(doc: &Html, css: &str) -> Option<String> {
    doc.select(&selector(css))
        .next()
        .and_then(|m| m.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Extract title, description, author, date and main text from HTML.
pub fn extract_article(html: &str) -> Article {
    let doc = Html::parse_document(html);
    let p = selector("p");

    let title = doc
        .select(&selector("title"))
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "No title found".to_string());

    let description = meta_content(&doc, r#"meta[name="description"]"#).unwrap_or_default();

    // First container whose class looks like an article body
    let mut content = doc
        .select(&selector("article, main, div"))
        .find(|el| {
            el.value()
                .attr("class")
                .is_some_and(|c| content_class().is_match(c))
        })
        .map(|el| paragraphs_of(el, &p))
        .unwrap_or_default();

    if content.chars().count() < MIN_CONTENT_CHARS {
        content = paragraphs_of(doc.root_element(), &p);
    }

    let content = truncate_chars(&content, MAX_CONTENT_CHARS, "...[content truncated for analysis]");

    let author = meta_content(&doc, r#"meta[name="author"]"#)
        .or_else(|| {
            doc.select(&selector("[class]"))
                .find(|el| {
                    el.value()
                        .attr("class")
                        .is_some_and(|c| author_class().is_match(c))
                })
                .map(element_text)
                .filter(|t| !t.is_empty())
        })
        .unwrap_or_else(|| "Unknown".to_string());

    let date = doc
        .select(&selector("time"))
        .next()
        .and_then(|t| {
            let text = element_text(t);
            if text.is_empty() {
                t.value().attr("datetime").map(|d| d.to_string())
            } else {
                Some(text)
            }
        })
        .or_else(|| meta_content(&doc, r#"meta[property="article:published_time"]"#))
        .unwrap_or_else(|| "Unknown".to_string());

    Article {
        title,
        description,
        author,
        date,
        content,
    }
}

/// Render an article as the text block the analyst agent receives.
pub fn format_article(url: &str, article: &Article) -> String {
    format!(
        "\nBLOG/ARTICLE ANALYSIS\n\
         =====================\n\n\
         URL: {url}\n\
         Title: {}\n\
         Author: {}\n\
         Date: {}\n\n\
         Description: {}\n\n\
         MAIN CONTENT:\n\
         {}\n\n\
         ANALYSIS INSTRUCTIONS:\n\
         - Identify the main claims made in this article\n\
         - Focus on factual statements that can be verified\n\
         - Note any sensational or misleading language\n\
         - Check if sources are cited\n\
         - Assess credibility indicators\n",
        article.title, article.author, article.date, article.description, article.content
    )
}
