#[cfg(test)]
pub mod recording;
pub mod terminal;

use vibecoder::models::message::AgentMessage;

/// Output side of the REPL. Input is read elsewhere, on its own thread.
pub trait Prompt: Send {
    /// Show one message from the agent; `speaker` labels responses
    fn render(&mut self, speaker: &str, message: &AgentMessage);
    /// Echo text sent on the user's behalf
    fn echo(&mut self, text: &str);
    fn info(&mut self, text: &str);
    fn warn(&mut self, text: &str);
    fn close(&self) {}
}
