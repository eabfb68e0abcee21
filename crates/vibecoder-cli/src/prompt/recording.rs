use std::sync::{Arc, Mutex};

use vibecoder::models::message::AgentMessage;

use super::Prompt;

/// Prompt that keeps every line it is asked to show
#[derive(Clone, Default)]
pub struct RecordingPrompt {
    pub lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingPrompt {
    fn push(&self, line: String) {
        self.lines.lock().unwrap().push(line);
    }
}

impl Prompt for RecordingPrompt {
    fn render(&mut self, speaker: &str, message: &AgentMessage) {
        self.push(format!("render {}: {}", speaker, message.summary()));
    }

    fn echo(&mut self, text: &str) {
        self.push(format!("echo {}", text));
    }

    fn info(&mut self, text: &str) {
        self.push(format!("info {}", text));
    }

    fn warn(&mut self, text: &str) {
        self.push(format!("warn {}", text));
    }

    fn close(&self) {
        self.push("closed".to_string());
    }
}
