use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};
use rand::seq::SliceRandom;
use vibecoder::errors::AgentResult;
use vibecoder::models::message::AgentMessage;

use crate::agents::agent::Agent;

const RESPONSES_PER_TURN: usize = 10;
const PACING: Duration = Duration::from_millis(10);

const LOREM: &[&str] = &[
    "Lorem ipsum dolor sit amet, consectetur adipiscing elit.",
    "Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.",
    "Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi.",
    "Duis aute irure dolor in reprehenderit in voluptate velit esse.",
    "Cillum dolore eu fugiat nulla pariatur.",
    "Excepteur sint occaecat cupidatat non proident, sunt in culpa qui officia.",
    "Deserunt mollit anim id est laborum.",
    "Curabitur pretium tincidunt lacus.",
    "Nulla gravida orci a odio.",
    "Nullam varius, turpis et commodo pharetra, est eros bibendum elit.",
];

/// Offline agent for exercising the REPL without a backend
pub struct MockAgent {
    model: String,
}

impl MockAgent {
    pub fn new() -> Self {
        Self {
            model: "mock".to_string(),
        }
    }
}

impl Default for MockAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for MockAgent {
    fn model(&self) -> &str {
        &self.model
    }

    fn set_model(&mut self, model: &str) {
        self.model = model.to_string();
    }

    /// The first response is always the opening lorem sentence; the rest are
    /// random picks, each after a short pause
    fn ask(&mut self, _input: String) -> BoxStream<'_, AgentResult<AgentMessage>> {
        let mut rng = rand::thread_rng();
        let rest: Vec<&'static str> = (1..RESPONSES_PER_TURN)
            .filter_map(|_| LOREM.choose(&mut rng).copied())
            .collect();

        let first =
            stream::once(async { AgentResult::Ok(AgentMessage::response(LOREM[0])) });
        let paced = stream::iter(rest).then(|text| async move {
            tokio::time::sleep(PACING).await;
            Ok(AgentMessage::response(text))
        });
        first.chain(paced).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[tokio::test(start_paused = true)]
    async fn test_mock_agent_streams_ten_responses() {
        let mut agent = MockAgent::new();
        let messages: Vec<AgentMessage> = agent.ask("hi".to_string()).try_collect().await.unwrap();

        assert_eq!(messages.len(), RESPONSES_PER_TURN);
        assert_eq!(messages[0].content, LOREM[0]);
        assert!(messages
            .iter()
            .all(|m| m.is_text() && LOREM.contains(&m.content.as_str())));
    }

    #[test]
    fn test_mock_agent_model() {
        let mut agent = MockAgent::new();
        assert_eq!(agent.model(), "mock");
        agent.set_model("other");
        assert_eq!(agent.model(), "other");
    }
}
