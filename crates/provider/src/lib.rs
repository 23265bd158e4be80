//! # tern-provider
//!
//! Streaming chat-completion client for tern.
//!
//! `anthropic` implements [`tern_core::ChatProvider`] against the native
//! Messages API; `wire` holds the SSE payload types; `parser` translates
//! wire events into the normalized [`tern_core::StreamEvent`] vocabulary
//! the engine consumes.

pub mod anthropic;
pub mod parser;
pub mod wire;

pub use anthropic::{AnthropicClient, known_models, max_tokens_for};
pub use parser::EventParser;
pub use wire::{WireBlock, WireDelta, WireError, WireEvent};
