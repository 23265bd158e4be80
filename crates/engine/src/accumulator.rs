//! Tool-call accumulator — buffers argument fragments until a call closes.
//!
//! Fragments for one call id arrive in order and are concatenated as-is;
//! the accumulator never reorders. On end, the buffer parses as a JSON
//! argument object. Events addressing an id the accumulator does not know
//! (including a second end for an already-finalized id) fail the turn.

use serde_json::Value;
use tern_core::error::ExchangeError;

/// A tool call whose argument buffer is still streaming.
#[derive(Debug, Clone)]
pub struct PendingToolCall {
    pub id: String,
    pub name: String,
    pub argument_buffer: String,
}

/// A closed tool call with parsed arguments, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedToolCall {
    pub id: String,
    pub name: String,
    pub args: Value,
}

/// Collects tool-call events for one turn.
#[derive(Default)]
pub struct ToolCallAccumulator {
    open: Vec<PendingToolCall>,
    finalized: Vec<FinalizedToolCall>,
}

impl ToolCallAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tool call opened.
    pub fn on_start(&mut self, id: String, name: String) -> Result<(), ExchangeError> {
        if self.open.iter().any(|c| c.id == id) {
            return Err(ExchangeError::Protocol(format!(
                "tool call {id} started twice"
            )));
        }
        self.open.push(PendingToolCall {
            id,
            name,
            argument_buffer: String::new(),
        });
        Ok(())
    }

    /// An argument fragment arrived; appended in arrival order.
    pub fn on_arg_fragment(&mut self, id: &str, fragment: &str) -> Result<(), ExchangeError> {
        let call = self
            .open
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| {
                ExchangeError::Protocol(format!("argument fragment for unknown tool call {id}"))
            })?;
        call.argument_buffer.push_str(fragment);
        Ok(())
    }

    /// A tool call closed: parse its buffer as a JSON argument object.
    ///
    /// An empty buffer finalizes to `{}` — a tool invoked with no
    /// arguments streams no fragments at all.
    pub fn on_end(&mut self, id: &str) -> Result<(), ExchangeError> {
        let position = self
            .open
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| {
                ExchangeError::Protocol(format!("end for unknown tool call {id}"))
            })?;
        let pending = self.open.remove(position);

        let args = if pending.argument_buffer.trim().is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(&pending.argument_buffer).map_err(|e| {
                ExchangeError::MalformedToolArguments {
                    call_id: pending.id.clone(),
                    reason: e.to_string(),
                }
            })?
        };

        self.finalized.push(FinalizedToolCall {
            id: pending.id,
            name: pending.name,
            args,
        });
        Ok(())
    }

    /// Calls started but not yet closed.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Take the finalized calls, in the order they closed.
    pub fn drain_finalized(&mut self) -> Vec<FinalizedToolCall> {
        std::mem::take(&mut self.finalized)
    }
}
