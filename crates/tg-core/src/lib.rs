//! tg-core: Core types and traits for the travel-guide assistant
//!
//! This crate provides the chat message model, the tool schema, and the
//! `Provider` abstraction over a chat-completion endpoint that the rest of
//! the workspace builds on.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::Error;
pub use message::{Message, Role, ToolCall};
pub use provider::{CompletionRequest, CompletionResponse, FinishReason, Provider};
pub use tool::{PropertySchema, Tool, ToolDefinition, ToolOutput, ToolParameters};

pub type Result<T> = std::result::Result<T, Error>;
