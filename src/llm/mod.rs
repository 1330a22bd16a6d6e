//! Completion provider integration.
//!
//! Talks to any OpenAI-compatible chat completions endpoint, including
//! vision-capable models that accept inline image data URLs. The pipeline
//! depends on the [`CompletionProvider`] trait so tests can substitute a
//! scripted provider for the HTTP client.

mod client;
mod config;
pub mod prompts;

pub use client::{
    ChatMessage, Completion, CompletionClient, CompletionError, CompletionProvider, ContentPart,
    ImageUrl, MessageContent,
};
pub use config::CompletionConfig;
