//! Wire types for the provider's SSE event payloads.
//!
//! Every `data:` line of the event stream deserializes into a [`WireEvent`].
//! Unknown event, block, and delta types deserialize into `Unknown` variants
//! instead of failing — the stream format grows over time and new event
//! kinds must not break older clients.

use serde::Deserialize;

/// One raw provider event, as carried in an SSE `data:` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireEvent {
    MessageStart {
        #[serde(default)]
        message: serde_json::Value,
    },

    ContentBlockStart {
        index: usize,
        content_block: WireBlock,
    },

    ContentBlockDelta {
        index: usize,
        delta: WireDelta,
    },

    ContentBlockStop {
        index: usize,
    },

    MessageDelta {
        #[serde(default)]
        delta: serde_json::Value,
        #[serde(default)]
        usage: serde_json::Value,
    },

    MessageStop,

    Ping,

    Error {
        error: WireError,
    },

    #[serde(other)]
    Unknown,
}

/// A content block opened by `content_block_start`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireBlock {
    Text {
        #[serde(default)]
        text: String,
    },

    ToolUse {
        id: String,
        name: String,
    },

    #[serde(other)]
    Unknown,
}

/// An incremental delta inside `content_block_delta`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireDelta {
    TextDelta {
        text: String,
    },

    InputJsonDelta {
        partial_json: String,
    },

    #[serde(other)]
    Unknown,
}

/// An in-stream error payload.
#[derive(Debug, Clone, Deserialize)]
pub struct WireError {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}
