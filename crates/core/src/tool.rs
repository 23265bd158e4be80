//! Tool adapter trait — the uniform capability behind model tool calls.
//!
//! Adapters wrap network-backed capabilities (search providers, a page
//! fetcher) behind `execute(args) -> payload`. They hold no shared mutable
//! state and are safely callable concurrently.

use crate::error::ToolError;
use crate::provider::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The result of one executed tool call.
///
/// The payload is opaque to the orchestrator: produced by the adapter,
/// consumed only by the conversation rewriter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    /// The call id this result answers.
    pub tool_call_id: String,

    /// Serialized result payload (or a failure description).
    pub payload: String,
}

/// A network-backed capability the model can invoke.
#[async_trait]
pub trait ToolAdapter: Send + Sync {
    /// The tool name declared to the model (e.g. "search", "browse").
    fn name(&self) -> &str;

    /// Description sent to the model.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's input object.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute with parsed arguments; returns the serialized payload.
    async fn execute(&self, args: serde_json::Value) -> Result<String, ToolError>;

    /// The schema entry declared to the model for this adapter.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.parameters_schema(),
        }
    }
}

/// The set of adapters available to one exchange.
///
/// Registration order is preserved so the declared schema list is stable.
#[derive(Default)]
pub struct ToolSet {
    adapters: Vec<Box<dyn ToolAdapter>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter. A later adapter with the same name shadows an
    /// earlier one on lookup.
    pub fn register(&mut self, adapter: Box<dyn ToolAdapter>) {
        self.adapters.push(adapter);
    }

    pub fn get(&self, name: &str) -> Option<&dyn ToolAdapter> {
        self.adapters
            .iter()
            .rev()
            .find(|a| a.name() == name)
            .map(|a| a.as_ref())
    }

    /// All schemas, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.adapters.iter().map(|a| a.to_definition()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Execute a named tool.
    pub async fn execute(
        &self,
        name: &str,
        args: serde_json::Value,
    ) -> Result<String, ToolError> {
        let adapter = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        adapter.execute(args).await
    }
}
