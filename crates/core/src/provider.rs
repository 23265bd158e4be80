//! Provider trait — the abstraction over streaming chat-completion backends.
//!
//! A provider knows how to open one streaming turn against a remote model
//! and deliver normalized [`StreamEvent`]s back over a channel. The
//! orchestrator calls `open_turn` without knowing which backend is in use.

use crate::error::ProviderError;
use crate::message::Message;
use crate::stream::StreamEvent;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A request for one streaming turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRequest {
    /// The model to use.
    pub model: String,

    /// Temperature (0.0 = deterministic).
    pub temperature: f32,

    /// Maximum output tokens for this turn.
    pub max_tokens: u32,

    /// The conversation so far. Any system-role entries are merged into
    /// `system` by the provider client, never sent in the message list.
    pub messages: Vec<Message>,

    /// The system prompt.
    pub system: String,

    /// Tool schemas the model may invoke. Empty disables tool use for
    /// this turn entirely.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

/// A tool schema declared to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's input object.
    pub input_schema: serde_json::Value,
}

/// The receiving half of one turn's event stream.
///
/// Finite and non-restartable: the channel closes after `TurnEnd` or an
/// error. Dropping the receiver aborts the underlying connection.
pub type TurnStream = tokio::sync::mpsc::Receiver<Result<StreamEvent, ProviderError>>;

/// The streaming chat-completion backend.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// A human-readable name for this provider.
    fn name(&self) -> &str;

    /// Open a streaming turn. Errors returned here cover request setup and
    /// HTTP status failures; mid-stream failures arrive on the channel.
    async fn open_turn(&self, request: TurnRequest) -> Result<TurnStream, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_definition_serialization() {
        let def = ToolDefinition {
            name: "search".into(),
            description: "Search the internet for current information.".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "The search query" }
                },
                "required": ["query"]
            }),
        };
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["name"], "search");
        assert_eq!(json["input_schema"]["required"][0], "query");
    }

    #[test]
    fn empty_tools_omitted_from_request() {
        let request = TurnRequest {
            model: "claude-3-5-haiku-latest".into(),
            temperature: 0.7,
            max_tokens: 4096,
            messages: vec![],
            system: String::new(),
            tools: vec![],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("tools").is_none());
    }
}
