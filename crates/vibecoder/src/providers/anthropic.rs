use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{Completion, Provider};
use super::configs::AnthropicProviderConfig;
use super::utils::{block_response_to_completion, messages_to_block_spec, tools_to_block_spec};
use crate::models::message::AgentMessage;
use crate::models::tool::ToolSignature;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Content-block backend: the system prompt is a request field and tool traffic
/// travels as typed content blocks
pub struct AnthropicProvider {
    client: Client,
    config: AnthropicProviderConfig,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    pub fn default_model(&self) -> &str {
        &self.config.model
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!("{}/v1/messages", self.config.host.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        let status = response.status();
        match status {
            StatusCode::OK => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            _ => {
                let error_text = response.text().await.unwrap_or_default();
                Err(anyhow!("Request failed: {} - {}", status, error_text))
            }
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn complete(
        &self,
        model: &str,
        system: &str,
        history: &[AgentMessage],
        tools: &[ToolSignature],
    ) -> Result<Completion> {
        let payload = json!({
            "model": model,
            "messages": messages_to_block_spec(history),
            "tools": tools_to_block_spec(tools)?,
            "max_tokens": self.config.max_tokens,
            "system": system,
        });

        let response = self.post(payload).await?;

        if let Some(error) = response.get("error") {
            return Err(anyhow!("Anthropic API error: {}", error));
        }

        Ok(block_response_to_completion(&response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::Arguments;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(host: String) -> AnthropicProviderConfig {
        AnthropicProviderConfig {
            host,
            api_key: "test_api_key".to_string(),
            model: "claude-3-5-haiku-latest".to_string(),
            max_tokens: 4096,
        }
    }

    #[tokio::test]
    async fn test_complete_text_and_tool_use() -> Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test_api_key"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_01",
                "type": "message",
                "role": "assistant",
                "content": [
                    {"type": "text", "text": "Let me look."},
                    {"type": "tool_use", "id": "toolu_01", "name": "tree_files", "input": {"path": "."}}
                ],
                "stop_reason": "tool_use",
                "usage": {"input_tokens": 30, "output_tokens": 12}
            })))
            .mount(&mock_server)
            .await;

        let provider = AnthropicProvider::new(config(mock_server.uri()))?;
        let completion = provider
            .complete(
                "claude-3-5-haiku-latest",
                "system",
                &[AgentMessage::user("list files")],
                &[],
            )
            .await?;

        assert_eq!(completion.text.as_deref(), Some("Let me look."));
        assert_eq!(completion.tool_calls[0].id, "toolu_01");
        assert_eq!(completion.tool_calls[0].arguments["path"], ".");
        assert_eq!(completion.usage.input_tokens, 30);
        assert_eq!(completion.usage.output_tokens, 12);
        Ok(())
    }

    #[tokio::test]
    async fn test_payload_shape() -> Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_partial_json(json!({
                "model": "claude-3-5-sonnet-latest",
                "system": "be brief",
                "max_tokens": 4096,
                "messages": [
                    {"role": "user", "content": "list files"},
                    {"role": "assistant", "content": [{"type": "tool_use", "id": "toolu_01", "name": "tree_files", "input": {}}]},
                    {"role": "user", "content": [{"type": "tool_result", "tool_use_id": "toolu_01", "content": "src"}]}
                ],
                "tools": [{
                    "name": "read_file",
                    "input_schema": {"type": "object", "required": ["path"]}
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "Done."}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let tool = ToolSignature::new(
            "read_file",
            "Read a file",
            json!({
                "type": "object",
                "properties": {"path": {"type": "string"}},
                "required": ["path"]
            }),
        );
        let history = vec![
            AgentMessage::user("list files"),
            AgentMessage::tool_use("tree_files", "toolu_01", Arguments::new()),
            AgentMessage::tool_result("tree_files", "toolu_01", "src"),
        ];

        let provider = AnthropicProvider::new(config(mock_server.uri()))?;
        let completion = provider
            .complete("claude-3-5-sonnet-latest", "be brief", &history, &[tool])
            .await?;
        assert_eq!(completion.text.as_deref(), Some("Done."));
        assert!(completion.tool_calls.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_key_fails_on_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "type": "error",
                "error": {"type": "authentication_error", "message": "invalid x-api-key"}
            })))
            .mount(&mock_server)
            .await;

        let mut config = config(mock_server.uri());
        config.api_key = String::new();
        let provider = AnthropicProvider::new(config).unwrap();

        let err = provider
            .complete("claude", "", &[AgentMessage::user("hi")], &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("invalid x-api-key"));
    }
}
