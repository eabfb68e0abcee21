use futures::stream::BoxStream;
use tracing::{debug, warn};

use crate::errors::{AgentError, AgentResult};
use crate::models::message::AgentMessage;
use crate::providers::base::{Provider, Usage};
use crate::tools::ToolRegistry;

/// Agent drives one conversation with a language model backend, running the
/// tools it asks for until it answers without requesting any
pub struct Agent {
    provider: Box<dyn Provider>,
    tools: ToolRegistry,
    system_prompt: String,
    model: String,
    history: Vec<AgentMessage>,
}

impl Agent {
    pub fn new<S, M>(
        provider: Box<dyn Provider>,
        tools: ToolRegistry,
        system_prompt: S,
        model: M,
    ) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        Self {
            provider,
            tools,
            system_prompt: system_prompt.into(),
            model: model.into(),
            history: Vec::new(),
        }
    }

    /// Seed the conversation with earlier messages
    pub fn with_history(mut self, messages: Vec<AgentMessage>) -> Self {
        self.history.extend(messages);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model<S: Into<String>>(&mut self, model: S) {
        self.model = model.into();
    }

    pub fn history(&self) -> &[AgentMessage] {
        &self.history
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Send `input` and stream back everything the turn produces: the model's
    /// text first, then each tool request immediately followed by its result.
    ///
    /// The stream ends after a round in which the model requested no tools.
    /// Backend failures and tool execution failures end it with an error and
    /// are not retried.
    pub fn ask<S: Into<String>>(&mut self, input: S) -> BoxStream<'_, AgentResult<AgentMessage>> {
        let input = input.into();

        Box::pin(async_stream::try_stream! {
            self.history.push(AgentMessage::user(input));

            loop {
                let signatures = self.tools.signatures();
                debug!(
                    model = %self.model,
                    messages = self.history.len(),
                    tools = signatures.len(),
                    "requesting completion"
                );

                let completion = self
                    .provider
                    .complete(&self.model, &self.system_prompt, &self.history, &signatures)
                    .await
                    .map_err(backend_error)?;
                let Usage { input_tokens, output_tokens } = completion.usage;

                if let Some(text) = completion.text {
                    let response = AgentMessage::response(text).with_usage(input_tokens, output_tokens);
                    self.history.push(response.clone());
                    yield response;
                }

                if completion.tool_calls.is_empty() {
                    break;
                }

                for call in completion.tool_calls {
                    let tool_use = AgentMessage::tool_use(&call.name, &call.id, call.arguments.clone())
                        .with_usage(input_tokens, output_tokens);
                    yield tool_use.clone();

                    let content = match self.tools.get(&call.name) {
                        None => {
                            warn!(tool = %call.name, "model requested an unregistered tool");
                            format!(
                                "[Tool {} not implemented] Available tools: {}",
                                call.name,
                                self.tools.names().join(", ")
                            )
                        }
                        Some(tool) => {
                            debug!(tool = %call.name, id = %call.id, "running tool");
                            tool.run(&call.arguments).await.map_err(|e| AgentError::ToolExecution {
                                tool: call.name.clone(),
                                message: e.to_string(),
                            })?
                        }
                    };

                    let tool_result = AgentMessage::tool_result(&call.name, &call.id, content);
                    yield tool_result.clone();

                    self.history.push(tool_use);
                    self.history.push(tool_result);
                }
            }
        })
    }
}

fn backend_error(err: anyhow::Error) -> AgentError {
    match err.downcast::<AgentError>() {
        Ok(agent_error) => agent_error,
        Err(err) => AgentError::Backend(format!("{:#}", err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ToolError;
    use crate::models::message::{Arguments, MessageKind};
    use crate::models::tool::ToolSignature;
    use crate::providers::base::Completion;
    use crate::providers::mock::MockProvider;
    use crate::tools::Tool;
    use async_trait::async_trait;
    use futures::TryStreamExt;
    use serde_json::{json, Value};

    struct FixedTool {
        signature: ToolSignature,
        output: Result<String, ToolError>,
    }

    impl FixedTool {
        fn new(name: &str, output: Result<String, ToolError>) -> Self {
            Self {
                signature: ToolSignature::new(
                    name,
                    "Returns a canned answer",
                    json!({"type": "object", "properties": {"path": {"type": "string"}}}),
                ),
                output,
            }
        }
    }

    #[async_trait]
    impl Tool for FixedTool {
        fn signature(&self) -> &ToolSignature {
            &self.signature
        }

        async fn run(&self, _args: &Arguments) -> Result<String, ToolError> {
            self.output.clone()
        }
    }

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new()
            .with(FixedTool::new("tree", Ok("src\nCargo.toml".to_string())))
            .with(FixedTool::new("read_file", Ok("fn main() {}".to_string())))
    }

    async fn collect(agent: &mut Agent, input: &str) -> AgentResult<Vec<AgentMessage>> {
        agent.ask(input).try_collect().await
    }

    #[tokio::test]
    async fn test_simple_response() -> AgentResult<()> {
        let provider = MockProvider::new(vec![Completion::text("Hello!")]);
        let requests = provider.requests();
        let mut agent = Agent::new(Box::new(provider), registry(), "system", "test-model");

        let messages = collect(&mut agent, "hello").await?;

        assert_eq!(messages, vec![AgentMessage::response("Hello!")]);
        assert_eq!(requests.lock().unwrap().len(), 1);
        assert_eq!(
            agent.history(),
            &[AgentMessage::user("hello"), AgentMessage::response("Hello!")]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_tool_round_trip() -> AgentResult<()> {
        let provider = MockProvider::new(vec![
            Completion::default().with_tool_call("call_1", "tree", args(json!({"path": "."}))),
            Completion::text("Done."),
        ]);
        let requests = provider.requests();
        let mut agent = Agent::new(Box::new(provider), registry(), "system", "test-model");

        let messages = collect(&mut agent, "list files").await?;

        assert_eq!(
            messages,
            vec![
                AgentMessage::tool_use("tree", "call_1", args(json!({"path": "."}))),
                AgentMessage::tool_result("tree", "call_1", "src\nCargo.toml"),
                AgentMessage::response("Done."),
            ]
        );

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], vec![AgentMessage::user("list files")]);
        assert_eq!(requests[1].len(), 3);
        assert_eq!(requests[1][1].tool_call_id(), Some("call_1"));
        assert_eq!(requests[1][2].tool_call_id(), Some("call_1"));
        assert_eq!(agent.history().len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_text_comes_before_tools_and_calls_stay_in_order() -> AgentResult<()> {
        let provider = MockProvider::new(vec![
            Completion::text("Let me look.")
                .with_tool_call("a", "tree", Arguments::new())
                .with_tool_call("b", "read_file", args(json!({"path": "main.rs"}))),
            Completion::text("Found it."),
        ]);
        let mut agent = Agent::new(Box::new(provider), registry(), "", "m");

        let messages = collect(&mut agent, "find main").await?;
        let kinds: Vec<(&str, Option<&str>)> = messages
            .iter()
            .map(|message| match &message.kind {
                MessageKind::Response => ("response", None),
                MessageKind::ToolUse { tool_call_id, .. } => ("use", Some(tool_call_id.as_str())),
                MessageKind::ToolResult { tool_call_id, .. } => {
                    ("result", Some(tool_call_id.as_str()))
                }
                MessageKind::User => ("user", None),
            })
            .collect();

        assert_eq!(
            kinds,
            vec![
                ("response", None),
                ("use", Some("a")),
                ("result", Some("a")),
                ("use", Some("b")),
                ("result", Some("b")),
                ("response", None),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_tool_is_answered_without_error() -> AgentResult<()> {
        let provider = MockProvider::new(vec![
            Completion::default().with_tool_call("x1", "deploy", Arguments::new()),
            Completion::text("Sorry."),
        ]);
        let mut agent = Agent::new(Box::new(provider), registry(), "", "m");

        let messages = collect(&mut agent, "ship it").await?;

        assert_eq!(messages.len(), 3);
        assert_eq!(
            messages[1].content,
            "[Tool deploy not implemented] Available tools: tree, read_file"
        );
        assert_eq!(messages[1].tool_call_id(), Some("x1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_usage_is_attached() -> AgentResult<()> {
        let provider = MockProvider::new(vec![Completion::text("Hi").with_usage(Usage::new(42, 7))]);
        let mut agent = Agent::new(Box::new(provider), registry(), "", "m");

        let messages = collect(&mut agent, "hello").await?;
        assert_eq!(messages[0].input_tokens, 42);
        assert_eq!(messages[0].output_tokens, 7);
        Ok(())
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let provider = MockProvider::with_results(vec![Err("rate limited".to_string())]);
        let mut agent = Agent::new(Box::new(provider), registry(), "", "m");

        let err = collect(&mut agent, "hello").await.unwrap_err();
        match err {
            AgentError::Backend(message) => assert!(message.contains("rate limited")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(agent.history(), &[AgentMessage::user("hello")]);
    }

    #[tokio::test]
    async fn test_tool_execution_error_propagates() {
        let tools = ToolRegistry::new().with(FixedTool::new(
            "explode",
            Err(ToolError::Execution("disk on fire".to_string())),
        ));
        let provider = MockProvider::new(vec![
            Completion::default().with_tool_call("1", "explode", Arguments::new()),
            Completion::text("never reached"),
        ]);
        let requests = provider.requests();
        let mut agent = Agent::new(Box::new(provider), tools, "", "m");

        let mut stream = agent.ask("go");
        let first = stream.try_next().await.unwrap().unwrap();
        assert_eq!(first.tool_name(), Some("explode"));

        let err = stream.try_next().await.unwrap_err();
        assert!(matches!(err, AgentError::ToolExecution { ref tool, .. } if tool == "explode"));
        drop(stream);

        assert_eq!(requests.lock().unwrap().len(), 1);
        assert_eq!(agent.history(), &[AgentMessage::user("go")]);
    }

    #[tokio::test]
    async fn test_seeded_history_and_model() -> AgentResult<()> {
        let provider = MockProvider::new(vec![Completion::text("Welcome back.")]);
        let requests = provider.requests();
        let mut agent = Agent::new(Box::new(provider), registry(), "", "gpt-4.1-mini")
            .with_history(vec![AgentMessage::user("previous summary")]);
        agent.set_model("gpt-4o");
        assert_eq!(agent.model(), "gpt-4o");

        collect(&mut agent, "continue").await?;

        let requests = requests.lock().unwrap();
        assert_eq!(
            requests[0],
            vec![
                AgentMessage::user("previous summary"),
                AgentMessage::user("continue")
            ]
        );
        Ok(())
    }
}
