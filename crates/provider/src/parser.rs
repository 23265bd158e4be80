//! Stream event parser — wire events to the normalized vocabulary.
//!
//! Purely a translation layer: each [`WireEvent`] maps to zero or one
//! [`StreamEvent`]. Routing uses the block's declared type, never its
//! position in the stream. The only state is an index-to-call-id routing
//! table filled in by `content_block_start`, so index-addressed deltas and
//! stops reach the right tool call; there are no counters, and re-feeding
//! an event yields the same output.
//!
//! Unknown event, block, and delta types map to no event at all — the
//! provider may add kinds this client does not know about.

use crate::wire::{WireBlock, WireDelta, WireEvent};
use std::collections::HashMap;
use tern_core::error::ProviderError;
use tern_core::stream::StreamEvent;

/// Translates one turn's wire events into normalized stream events.
///
/// One parser per stream connection; it is not reusable across turns.
#[derive(Default)]
pub struct EventParser {
    /// Block index → tool call id, for blocks declared `tool_use`.
    tool_blocks: HashMap<usize, String>,
}

impl EventParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate one wire event. `Ok(None)` means the event carries nothing
    /// the engine needs. An in-stream `error` event surfaces as `Err`.
    pub fn parse(&mut self, event: &WireEvent) -> Result<Option<StreamEvent>, ProviderError> {
        match event {
            WireEvent::ContentBlockStart {
                index,
                content_block: WireBlock::ToolUse { id, name },
            } => {
                self.tool_blocks.insert(*index, id.clone());
                Ok(Some(StreamEvent::ToolCallStart {
                    id: id.clone(),
                    name: name.clone(),
                }))
            }

            WireEvent::ContentBlockDelta {
                delta: WireDelta::TextDelta { text },
                ..
            } => Ok(Some(StreamEvent::TextDelta { text: text.clone() })),

            WireEvent::ContentBlockDelta {
                index,
                delta: WireDelta::InputJsonDelta { partial_json },
            } => match self.tool_blocks.get(index) {
                Some(id) => Ok(Some(StreamEvent::ToolCallArgDelta {
                    id: id.clone(),
                    fragment: partial_json.clone(),
                })),
                None => Err(ProviderError::Protocol(format!(
                    "input_json_delta for block {index} with no open tool_use block"
                ))),
            },

            WireEvent::ContentBlockStop { index } => Ok(self
                .tool_blocks
                .get(index)
                .map(|id| StreamEvent::ToolCallEnd { id: id.clone() })),

            WireEvent::MessageStop => Ok(Some(StreamEvent::TurnEnd)),

            WireEvent::Error { error } => Err(match error.kind.as_str() {
                "authentication_error" => ProviderError::Authentication(error.message.clone()),
                "rate_limit_error" => ProviderError::RateLimited { retry_after_secs: 5 },
                _ => ProviderError::StreamInterrupted(format!(
                    "{}: {}",
                    error.kind, error.message
                )),
            }),

            // Text block starts, message bookkeeping, pings, and anything
            // the wire layer could not classify carry nothing for us.
            WireEvent::ContentBlockStart { .. }
            | WireEvent::ContentBlockDelta { .. }
            | WireEvent::MessageStart { .. }
            | WireEvent::MessageDelta { .. }
            | WireEvent::Ping
            | WireEvent::Unknown => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(json: &str) -> WireEvent {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn text_delta_normalizes() {
        let mut parser = EventParser::new();
        let event = parser
            .parse(&wire(
                r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hello"}}"#,
            ))
            .unwrap();
        assert_eq!(
            event,
            Some(StreamEvent::TextDelta {
                text: "Hello".into()
            })
        );
    }

    #[test]
    fn parsing_is_idempotent() {
        let mut parser = EventParser::new();
        let raw = wire(
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"x"}}"#,
        );
        let first = parser.parse(&raw).unwrap();
        let second = parser.parse(&raw).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn tool_block_lifecycle() {
        let mut parser = EventParser::new();

        let start = parser
            .parse(&wire(
                r#"{"type":"content_block_start","index":1,"content_block":{"type":"tool_use","id":"toolu_01","name":"search","input":{}}}"#,
            ))
            .unwrap();
        assert_eq!(
            start,
            Some(StreamEvent::ToolCallStart {
                id: "toolu_01".into(),
                name: "search".into()
            })
        );

        let delta = parser
            .parse(&wire(
                r#"{"type":"content_block_delta","index":1,"delta":{"type":"input_json_delta","partial_json":"{\"query\":\"cats\"}"}}"#,
            ))
            .unwrap();
        assert_eq!(
            delta,
            Some(StreamEvent::ToolCallArgDelta {
                id: "toolu_01".into(),
                fragment: "{\"query\":\"cats\"}".into()
            })
        );

        let stop = parser
            .parse(&wire(r#"{"type":"content_block_stop","index":1}"#))
            .unwrap();
        assert_eq!(stop, Some(StreamEvent::ToolCallEnd { id: "toolu_01".into() }));
    }

    #[test]
    fn routing_uses_declared_type_not_position() {
        let mut parser = EventParser::new();
        // Block 0 is text, block 1 is a tool call; deltas for each index
        // must normalize by what the block declared, not by arrival order.
        parser
            .parse(&wire(
                r#"{"type":"content_block_start","index":0,"content_block":{"type":"text","text":""}}"#,
            ))
            .unwrap();
        parser
            .parse(&wire(
                r#"{"type":"content_block_start","index":1,"content_block":{"type":"tool_use","id":"toolu_02","name":"browse","input":{}}}"#,
            ))
            .unwrap();

        let arg = parser
            .parse(&wire(
                r#"{"type":"content_block_delta","index":1,"delta":{"type":"input_json_delta","partial_json":"{}"}}"#,
            ))
            .unwrap();
        assert!(matches!(arg, Some(StreamEvent::ToolCallArgDelta { id, .. }) if id == "toolu_02"));

        let text = parser
            .parse(&wire(
                r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"hi"}}"#,
            ))
            .unwrap();
        assert!(matches!(text, Some(StreamEvent::TextDelta { .. })));
    }

    #[test]
    fn text_block_stop_emits_nothing() {
        let mut parser = EventParser::new();
        parser
            .parse(&wire(
                r#"{"type":"content_block_start","index":0,"content_block":{"type":"text","text":""}}"#,
            ))
            .unwrap();
        let stop = parser
            .parse(&wire(r#"{"type":"content_block_stop","index":0}"#))
            .unwrap();
        assert_eq!(stop, None);
    }

    #[test]
    fn arg_delta_without_tool_block_is_protocol_violation() {
        let mut parser = EventParser::new();
        let err = parser
            .parse(&wire(
                r#"{"type":"content_block_delta","index":7,"delta":{"type":"input_json_delta","partial_json":"{}"}}"#,
            ))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Protocol(_)));
    }

    #[test]
    fn message_stop_is_turn_end() {
        let mut parser = EventParser::new();
        let event = parser.parse(&wire(r#"{"type":"message_stop"}"#)).unwrap();
        assert_eq!(event, Some(StreamEvent::TurnEnd));
    }

    #[test]
    fn unknown_events_are_dropped() {
        let mut parser = EventParser::new();
        assert_eq!(
            parser
                .parse(&wire(r#"{"type":"shiny_new_event","x":1}"#))
                .unwrap(),
            None
        );
        assert_eq!(parser.parse(&wire(r#"{"type":"ping"}"#)).unwrap(), None);
        assert_eq!(
            parser
                .parse(&wire(
                    r#"{"type":"content_block_delta","index":0,"delta":{"type":"thinking_delta","thinking":"..."}}"#,
                ))
                .unwrap(),
            None
        );
    }

    #[test]
    fn auth_error_event_maps_to_authentication() {
        let mut parser = EventParser::new();
        let err = parser
            .parse(&wire(
                r#"{"type":"error","error":{"type":"authentication_error","message":"bad key"}}"#,
            ))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Authentication(_)));
    }

    #[test]
    fn rate_limit_error_event_maps_to_rate_limited() {
        let mut parser = EventParser::new();
        let err = parser
            .parse(&wire(
                r#"{"type":"error","error":{"type":"rate_limit_error","message":"slow down"}}"#,
            ))
            .unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited { .. }));
    }

    #[test]
    fn generic_error_event_maps_to_stream_interrupted() {
        let mut parser = EventParser::new();
        let err = parser
            .parse(&wire(
                r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#,
            ))
            .unwrap_err();
        match err {
            ProviderError::StreamInterrupted(msg) => assert!(msg.contains("overloaded_error")),
            other => panic!("expected StreamInterrupted, got {other:?}"),
        }
    }
}
