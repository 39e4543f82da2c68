//! Role-scoped LLM agents with tool calling.
//!
//! An agent wraps a chat model with a persona (role, goal, backstory) and a
//! subset of the tools in [`crate::tools`]. It keeps calling the model and
//! executing the tools it asks for until the model answers in plain text.

mod runner;

pub use runner::{Agent, AgentResponse, ToolCallRecord};

#[cfg(test)]
pub(crate) use runner::tests as test_support;
