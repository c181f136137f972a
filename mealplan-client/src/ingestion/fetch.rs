use anyhow::Result;
use async_trait::async_trait;
use itertools::Itertools;
use mealplan::services::{FetchError, PageFetcher};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use scraper::{Html, Node};
use std::time::Duration;

use super::FetchSettings;

/// Elements whose text never belongs in the recipe text.
const HIDDEN_ELEMENTS: [&str; 8] = [
    "head", "script", "style", "noscript", "template", "svg", "iframe", "nav",
];

/// Elements that start a new line of text.
const BLOCK_ELEMENTS: [&str; 22] = [
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "footer",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "li", "ol", "p", "section", "tr",
];

/// Fetches pages over HTTP and flattens their HTML to text.
pub struct WebFetcher {
    client: reqwest::Client,
}

impl WebFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(&settings.user_agent)
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }

    async fn fetch_page_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl PageFetcher for WebFetcher {
    async fn fetch_and_clean_text_from_url(&self, url: &str) -> Result<String, FetchError> {
        tracing::info!("Fetching text from {}", url);
        let html = self.fetch_page_text(url).await.inspect_err(|err| {
            tracing::error!("Error fetching page text from {}: {}", url, err);
        })?;
        let text = clean_html_text(&html);
        if text.is_empty() {
            tracing::error!("No readable text at {}", url);
            return Err(FetchError::Processing(format!("no readable text at {url}")));
        }
        tracing::info!("Cleaned {} characters of text from {}", text.len(), url);
        Ok(text)
    }
}

/// Reduce an HTML document to its visible text, one block per line.
pub fn clean_html_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();
    for node in document.root_element().descendants() {
        match node.value() {
            Node::Element(element) if BLOCK_ELEMENTS.contains(&element.name()) => {
                text.push('\n');
            }
            Node::Text(fragment) => {
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
                });
                if !hidden {
                    text.push_str(fragment);
                }
            }
            _ => {}
        }
    }
    text.lines()
        .map(|line| line.split_whitespace().join(" "))
        .filter(|line| !line.is_empty())
        .join("\n")
}
