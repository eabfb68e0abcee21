use futures::stream::BoxStream;
use vibecoder::agent::Agent as VibeAgent;
use vibecoder::errors::AgentResult;
use vibecoder::models::message::AgentMessage;

/// What the REPL needs from an agent; implemented by the library agent and
/// by the offline mock
pub trait Agent: Send {
    fn model(&self) -> &str;
    fn set_model(&mut self, model: &str);
    fn ask(&mut self, input: String) -> BoxStream<'_, AgentResult<AgentMessage>>;
}

impl Agent for VibeAgent {
    fn model(&self) -> &str {
        VibeAgent::model(self)
    }

    fn set_model(&mut self, model: &str) {
        VibeAgent::set_model(self, model);
    }

    fn ask(&mut self, input: String) -> BoxStream<'_, AgentResult<AgentMessage>> {
        VibeAgent::ask(self, input)
    }
}
