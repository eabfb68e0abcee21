use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{optional_str, report, require_str, Tool};
use crate::errors::ToolError;
use crate::models::message::Arguments;
use crate::models::tool::ToolSignature;
use crate::providers::configs::WebSearchConfig;

const SUPPORTED_ENGINES: [&str; 1] = ["brave"];
const DEFAULT_RESULTS: i64 = 5;
const MAX_RESULTS: i64 = 20;

/// Searches the web through the Brave search API
pub struct WebSearch {
    signature: ToolSignature,
    client: Client,
    config: WebSearchConfig,
}

#[derive(Debug, PartialEq)]
struct SearchHit {
    url: String,
    title: String,
    summary: String,
}

impl WebSearch {
    pub fn new(config: WebSearchConfig) -> Self {
        let signature = ToolSignature::new(
            "web_search",
            "Search the web and return a ranked list of result titles, links and summaries. \
            Follow up with fetch_url to read a result.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query to perform."
                    },
                    "engine": {
                        "type": "string",
                        "enum": SUPPORTED_ENGINES,
                        "default": "brave",
                        "description": "The search engine to use (currently only 'brave' is supported)."
                    },
                    "count": {
                        "type": "integer",
                        "description": "Number of results to return (default 5, max 20).",
                        "default": 5
                    }
                },
                "required": ["query"]
            }),
        );
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            signature,
            client,
            config,
        }
    }

    async fn search(&self, args: &Arguments) -> Result<String, ToolError> {
        let query = require_str(args, "query")?;
        let engine = optional_str(args, "engine").unwrap_or("brave");
        if !SUPPORTED_ENGINES.contains(&engine) {
            return Err(ToolError::InvalidArgument(format!(
                "Engine '{}' not supported. Supported engines: {}",
                engine,
                SUPPORTED_ENGINES.join(", ")
            )));
        }
        if self.config.api_key.is_empty() {
            return Err(ToolError::Io(
                "API key not set in environment variable BRAVE_API_KEY.".to_string(),
            ));
        }

        let url = format!(
            "{}/res/v1/web/search",
            self.config.host.trim_end_matches('/')
        );
        let failed = |e: reqwest::Error| ToolError::Io(format!("Web search failed: {}", e));

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.config.api_key)
            .query(&[
                ("q", query.to_string()),
                ("count", result_count(args.get("count")).to_string()),
            ])
            .send()
            .await
            .map_err(failed)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Io(format!("Web search failed: {}", status)));
        }
        let body: Value = response.json().await.map_err(failed)?;

        Ok(format_results(query, &hits(&body)))
    }
}

/// Default when absent or not an integer; clamped to 1..=20
fn result_count(raw: Option<&Value>) -> i64 {
    raw.and_then(Value::as_i64)
        .unwrap_or(DEFAULT_RESULTS)
        .clamp(1, MAX_RESULTS)
}

fn hits(body: &Value) -> Vec<SearchHit> {
    let field = |item: &Value, key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    body.pointer("/web/results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .map(|item| SearchHit {
                    url: field(item, "url"),
                    title: field(item, "title"),
                    summary: field(item, "description"),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn format_results(query: &str, hits: &[SearchHit]) -> String {
    let mut lines = vec![format!("## Search results for: {}", query)];
    if hits.is_empty() {
        lines.push("No results found.".to_string());
    }
    for (rank, hit) in hits.iter().enumerate() {
        lines.push(format!(
            "- ({}) [{}]({})\n  {}",
            rank + 1,
            hit.title,
            hit.url,
            hit.summary
        ));
    }
    lines.push(String::new());
    lines.join("\n")
}

#[async_trait]
impl Tool for WebSearch {
    fn signature(&self) -> &ToolSignature {
        &self.signature
    }

    async fn run(&self, args: &Arguments) -> Result<String, ToolError> {
        report(self.search(args).await)
    }
}
