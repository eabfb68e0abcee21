use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Node};
use serde_json::json;

use super::{report, require_str, Tool};
use crate::errors::ToolError;
use crate::models::message::Arguments;
use crate::models::tool::ToolSignature;

const MAX_CONTENT_CHARS: usize = 20_000;
const SKIPPED_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "head", "template"];

/// Downloads a page and reduces it to readable text
pub struct FetchUrl {
    signature: ToolSignature,
    client: Client,
}

impl FetchUrl {
    pub fn new() -> Self {
        let signature = ToolSignature::new(
            "fetch_url",
            "Fetch a web page and return its readable text content.",
            json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "The URL to fetch and extract content from."
                    }
                },
                "required": ["url"]
            }),
        );
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; vibecoder/0.1)")
            .build()
            .unwrap_or_default();
        Self { signature, client }
    }

    async fn fetch(&self, args: &Arguments) -> Result<String, ToolError> {
        let url = require_str(args, "url")?;
        let failed = |e: reqwest::Error| {
            ToolError::Io(format!("Could not fetch content from URL: {} ({})", url, e))
        };

        let response = self.client.get(url).send().await.map_err(failed)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Io(format!(
                "Could not fetch content from URL: {} ({})",
                url, status
            )));
        }
        let body = response.text().await.map_err(failed)?;

        let text = extract_text(&body);
        if text.is_empty() {
            return Err(ToolError::Io(format!(
                "Content could not be extracted from {}",
                url
            )));
        }
        Ok(truncate(text))
    }
}

impl Default for FetchUrl {
    fn default() -> Self {
        Self::new()
    }
}

/// Visible text of an HTML document, one line per text run
fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| SKIPPED_ELEMENTS.contains(&element.name()))
        });
        if hidden {
            continue;
        }

        let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines.join("\n")
}

fn truncate(text: String) -> String {
    match text.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((end, _)) => format!("{}\n[Content truncated]", &text[..end]),
        None => text,
    }
}

#[async_trait]
impl Tool for FetchUrl {
    fn signature(&self) -> &ToolSignature {
        &self.signature
    }

    async fn run(&self, args: &Arguments) -> Result<String, ToolError> {
        report(self.fetch(args).await)
    }
}
