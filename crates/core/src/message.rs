//! Message and conversation domain types.
//!
//! A conversation is an ordered sequence of messages. During an exchange the
//! orchestrator only ever appends to it — the rewrite step after a tool turn
//! is strictly additive and never touches earlier entries.

use serde::{Deserialize, Serialize};

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// System instructions. Never sent verbatim to the provider — merged
    /// into the top-level system parameter before the first call.
    System,
}

/// A structured content block inside a message.
///
/// The tagged serialization matches the provider wire shape, so block
/// sequences pass through to the request body unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text { text: String },

    /// The assistant's claim of a tool invocation, exactly as requested.
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },

    /// The result of a tool invocation, keyed back to the requesting call.
    ToolResult { tool_use_id: String, content: String },
}

/// Message content: plain text or a block sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl MessageContent {
    /// The plain-text view of this content. Block sequences concatenate
    /// their text blocks; tool blocks contribute nothing.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    /// Create a plain-text user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a plain-text assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create an assistant message carrying tool-use blocks.
    pub fn tool_use(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Blocks(blocks),
        }
    }

    /// Create a user message carrying tool-result blocks.
    pub fn tool_results(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Blocks(blocks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_is_plain_text() {
        let msg = Message::user("Hello!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, MessageContent::Text("Hello!".into()));
    }

    #[test]
    fn content_block_wire_shape() {
        let block = ContentBlock::ToolUse {
            id: "toolu_01".into(),
            name: "search".into(),
            input: serde_json::json!({"query": "cats"}),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "tool_use");
        assert_eq!(json["id"], "toolu_01");
        assert_eq!(json["input"]["query"], "cats");
    }

    #[test]
    fn tool_result_wire_shape() {
        let block = ContentBlock::ToolResult {
            tool_use_id: "toolu_01".into(),
            content: "[]".into(),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "tool_result");
        assert_eq!(json["tool_use_id"], "toolu_01");
    }

    #[test]
    fn text_content_serializes_as_bare_string() {
        let msg = Message::assistant("Hi!");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["content"], "Hi!");
        assert_eq!(json["role"], "assistant");
    }

    #[test]
    fn block_content_serializes_as_array() {
        let msg = Message::tool_results(vec![ContentBlock::ToolResult {
            tool_use_id: "toolu_01".into(),
            content: "done".into(),
        }]);
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json["content"].is_array());
    }

    #[test]
    fn as_text_concatenates_text_blocks() {
        let content = MessageContent::Blocks(vec![
            ContentBlock::Text { text: "one".into() },
            ContentBlock::ToolUse {
                id: "t".into(),
                name: "search".into(),
                input: serde_json::Value::Null,
            },
            ContentBlock::Text { text: "two".into() },
        ]);
        assert_eq!(content.as_text(), "one\ntwo");
    }

    #[test]
    fn message_roundtrip() {
        let msg = Message::user("round trip");
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
