//! These models represent the objects passed between the REPL, the agent and the backends
//!
//! There are two wire formats we need to interact with:
//! - completions-style messages (role/content/tool_calls), sent to OpenAI compatible backends
//! - content-block messages (role/content blocks), sent to Anthropic style backends
//!
//! We always keep the internal representation typed and only produce the wire shapes
//! at the edge, through the `to_*_value` helpers on each model.
pub mod message;
pub mod tool;
