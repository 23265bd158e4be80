//! The exchange orchestrator — drives the stream/dispatch/rewrite loop.
//!
//! One exchange is an explicit loop: open a streaming turn, fold events
//! into text and tool calls, execute any finalized calls concurrently,
//! rewrite the conversation with the results, and go again. A turn that
//! closes with no tool calls ends the exchange with the accumulated text.
//!
//! Cancellation is checked at the two places the loop parks: waiting on
//! the event channel and waiting on in-flight tool calls. Tool failures
//! are recovered locally as failure payloads; everything else aborts the
//! exchange through `ExchangeError`.

use crate::accumulator::ToolCallAccumulator;
use crate::rewriter::rewrite;
use futures::future;
use std::sync::Arc;
use tern_config::AppConfig;
use tern_core::error::ExchangeError;
use tern_core::message::Message;
use tern_core::provider::{ChatProvider, TurnRequest};
use tern_core::stream::StreamEvent;
use tern_core::tool::{ToolOutcome, ToolSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Appended to the visible text when the tool-call ceiling cuts a turn off.
pub const BUDGET_MARKER: &str = "\n\n[Tool call limit reached]";

/// Per-exchange generation settings.
#[derive(Debug, Clone)]
pub struct ExchangeOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// When false, no tool schemas are declared and turns cannot branch
    /// into tool calls at all.
    pub tool_use_enabled: bool,
    /// Ceiling on executed tool calls across the whole exchange.
    pub max_tool_calls: u32,
}

impl ExchangeOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            tool_use_enabled: config.tools.enabled,
            max_tool_calls: config.tools.max_tool_calls,
        }
    }
}

/// Runs exchanges against one provider with one tool set.
pub struct Orchestrator {
    provider: Arc<dyn ChatProvider>,
    tools: Arc<ToolSet>,
    options: ExchangeOptions,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        tools: Arc<ToolSet>,
        options: ExchangeOptions,
    ) -> Self {
        Self {
            provider,
            tools,
            options,
        }
    }

    /// Run one exchange to completion.
    ///
    /// `on_delta` receives every visible text fragment as it streams, in
    /// arrival order; text already delivered is never retracted, even when
    /// the exchange later fails. The returned string is the concatenation
    /// of everything `on_delta` saw.
    pub async fn run_exchange<F>(
        &self,
        conversation: Vec<Message>,
        system_prompt: &str,
        mut on_delta: F,
        cancel: CancellationToken,
    ) -> Result<String, ExchangeError>
    where
        F: FnMut(&str) + Send,
    {
        let mut conversation = conversation;
        let mut accumulated = String::new();
        let mut executed: u32 = 0;

        let declare_tools = self.options.tool_use_enabled && !self.tools.is_empty();

        loop {
            let request = TurnRequest {
                model: self.options.model.clone(),
                temperature: self.options.temperature,
                max_tokens: self.options.max_tokens,
                messages: conversation.clone(),
                system: system_prompt.to_string(),
                tools: if declare_tools {
                    self.tools.definitions()
                } else {
                    Vec::new()
                },
            };

            let mut stream = self.provider.open_turn(request).await?;
            let mut accumulator = ToolCallAccumulator::new();

            loop {
                let received = tokio::select! {
                    _ = cancel.cancelled() => return Err(ExchangeError::Cancelled),
                    received = stream.recv() => received,
                };

                let Some(event) = received else {
                    return Err(ExchangeError::Protocol(
                        "event stream closed before turn end".into(),
                    ));
                };

                match event? {
                    StreamEvent::TextDelta { text } => {
                        accumulated.push_str(&text);
                        on_delta(&text);
                    }
                    StreamEvent::ToolCallStart { id, name } => {
                        accumulator.on_start(id, name)?;
                    }
                    StreamEvent::ToolCallArgDelta { id, fragment } => {
                        accumulator.on_arg_fragment(&id, &fragment)?;
                    }
                    StreamEvent::ToolCallEnd { id } => {
                        accumulator.on_end(&id)?;
                    }
                    StreamEvent::TurnEnd => break,
                }
            }

            if accumulator.open_count() > 0 {
                return Err(ExchangeError::Protocol(
                    "turn ended with unclosed tool calls".into(),
                ));
            }

            let calls = accumulator.drain_finalized();
            if calls.is_empty() {
                return Ok(accumulated);
            }

            let requested = calls.len() as u32;
            if executed + requested > self.options.max_tool_calls {
                warn!(
                    executed,
                    requested,
                    ceiling = self.options.max_tool_calls,
                    "Tool call budget exceeded"
                );
                accumulated.push_str(BUDGET_MARKER);
                on_delta(BUDGET_MARKER);
                return Err(ExchangeError::ToolBudgetExceeded {
                    executed,
                    ceiling: self.options.max_tool_calls,
                });
            }

            debug!(count = requested, "Dispatching tool calls");
            let dispatches = calls.iter().map(|call| {
                let tools = Arc::clone(&self.tools);
                let id = call.id.clone();
                let name = call.name.clone();
                let args = call.args.clone();
                async move {
                    let payload = match tools.execute(&name, args).await {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!(tool = %name, error = %e, "Tool call failed");
                            format!("Error: {e}")
                        }
                    };
                    ToolOutcome {
                        tool_call_id: id,
                        payload,
                    }
                }
            });

            let outcomes = tokio::select! {
                _ = cancel.cancelled() => return Err(ExchangeError::Cancelled),
                outcomes = future::join_all(dispatches) => outcomes,
            };
            executed += requested;

            rewrite(&mut conversation, &calls, &outcomes);
        }
    }
}
