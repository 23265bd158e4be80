//! # tern-core
//!
//! Domain types, traits, and error definitions for the tern streaming
//! tool-call orchestration engine. This crate carries no HTTP or provider
//! code; it defines the model that all other crates implement against.
//!
//! The seams are traits: [`ChatProvider`] for the streaming completion
//! backend, [`ToolAdapter`] for model-invocable capabilities. Concrete
//! implementations live in `tern-provider` and `tern-tools`; the exchange
//! state machine lives in `tern-engine`.

pub mod error;
pub mod message;
pub mod provider;
pub mod stream;
pub mod tool;

pub use error::{ExchangeError, ProviderError, ToolError};
pub use message::{ContentBlock, Message, MessageContent, Role};
pub use provider::{ChatProvider, ToolDefinition, TurnRequest, TurnStream};
pub use stream::StreamEvent;
pub use tool::{ToolAdapter, ToolOutcome, ToolSet};
