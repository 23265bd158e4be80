//! The normalized stream event vocabulary.
//!
//! Provider clients translate their vendor-specific incremental events into
//! this small internal vocabulary. The orchestrator consumes only these —
//! it never sees the wire format. Stream-level errors travel as the `Err`
//! arm of the event channel, not as a variant here.

use serde::{Deserialize, Serialize};

/// One normalized event from a provider turn stream.
///
/// Produced as a lazy, finite, non-restartable sequence per stream
/// connection, terminated by `TurnEnd` (or a stream error).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A fragment of assistant text.
    TextDelta { text: String },

    /// The model opened a tool call.
    ToolCallStart { id: String, name: String },

    /// A fragment of the tool call's JSON argument buffer. Fragments for
    /// one id arrive in order and are concatenated as-is.
    ToolCallArgDelta { id: String, fragment: String },

    /// The tool call's argument buffer is complete.
    ToolCallEnd { id: String },

    /// The provider finished this turn.
    TurnEnd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_tags() {
        let json = serde_json::to_value(StreamEvent::TextDelta { text: "hi".into() }).unwrap();
        assert_eq!(json["type"], "text_delta");

        let json = serde_json::to_value(StreamEvent::TurnEnd).unwrap();
        assert_eq!(json["type"], "turn_end");
    }

    #[test]
    fn roundtrip() {
        let event = StreamEvent::ToolCallArgDelta {
            id: "toolu_01".into(),
            fragment: "{\"qu".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: StreamEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
