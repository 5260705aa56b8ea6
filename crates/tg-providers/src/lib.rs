//! tg-providers: chat-completion backends for the travel-guide assistant.
//!
//! One provider is implemented: the OpenAI-compatible chat-completions API,
//! which also covers Ollama's `/v1` endpoint (the default local runtime).

pub mod openai;

pub use openai::OpenAiProvider;
