//! The tern exchange engine.
//!
//! Turns one user submission into a complete assistant response by driving
//! the streaming tool-call loop: parse provider events, execute tool calls,
//! fold results back into the conversation, and continue until a turn ends
//! with no calls outstanding.

pub mod accumulator;
pub mod orchestrator;
pub mod rewriter;

pub use accumulator::{FinalizedToolCall, ToolCallAccumulator};
pub use orchestrator::{ExchangeOptions, Orchestrator, BUDGET_MARKER};
pub use rewriter::{rewrite, CITATION_INSTRUCTION};
