//! Anthropic-style Messages API streaming client.
//!
//! Implements [`ChatProvider`] against the native Messages API:
//! - `x-api-key` header authentication (not Bearer)
//! - `anthropic-version` header
//! - System prompt as a top-level field — system-role messages are merged
//!   into it and never sent in the message list
//! - Native tool use with `tool_use` / `tool_result` content blocks
//! - Streaming via SSE, normalized through [`EventParser`]

use crate::parser::EventParser;
use crate::wire::WireEvent;
use async_trait::async_trait;
use futures::StreamExt;
use tern_core::error::ProviderError;
use tern_core::message::{Message, Role};
use tern_core::provider::{ChatProvider, TurnRequest, TurnStream};
use tracing::{debug, trace, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Known model ids with their default max output tokens.
pub fn known_models() -> &'static [(&'static str, u32)] {
    &[
        ("claude-3-opus-20240229", 4096),
        ("claude-3-sonnet-20240229", 4096),
        ("claude-3-haiku-20240307", 4096),
        ("claude-3-5-haiku-latest", 4096),
    ]
}

/// Default max output tokens for a model id.
pub fn max_tokens_for(model: &str) -> u32 {
    known_models()
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, max)| *max)
        .unwrap_or(4096)
}

/// Streaming Messages API client.
pub struct AnthropicClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicClient {
    /// Create a new client. Fails if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Use a custom base URL (proxies, self-hosted gateways, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Merge the request's system parameter with any system-role messages.
    /// System messages are never sent verbatim in the message list.
    fn extract_system(request: &TurnRequest) -> (String, Vec<&Message>) {
        let mut system_parts: Vec<&str> = Vec::new();
        if !request.system.is_empty() {
            system_parts.push(&request.system);
        }

        let mut non_system = Vec::new();
        for msg in &request.messages {
            match msg.role {
                Role::System => system_parts.push(msg.content.as_text_ref()),
                _ => non_system.push(msg),
            }
        }

        (system_parts.join("\n\n"), non_system)
    }

    /// Build the request body. Message content serializes straight to the
    /// wire shape, including tool_use and tool_result block sequences.
    fn request_body(&self, request: &TurnRequest) -> serde_json::Value {
        let (system, messages) = Self::extract_system(request);

        let api_messages: Vec<serde_json::Value> = messages
            .iter()
            .map(|msg| {
                serde_json::json!({
                    "role": match msg.role {
                        Role::User => "user",
                        Role::Assistant => "assistant",
                        Role::System => unreachable!("system messages are extracted"),
                    },
                    "content": msg.content,
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": api_messages,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "stream": true,
        });

        if !system.is_empty() {
            body["system"] = serde_json::json!(system);
        }

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(request.tools);
        }

        body
    }

    fn map_status(status: u16, body: String) -> ProviderError {
        match status {
            401 | 403 => ProviderError::Authentication("Invalid API key".into()),
            429 => ProviderError::RateLimited { retry_after_secs: 5 },
            _ => ProviderError::Api {
                status_code: status,
                message: body,
            },
        }
    }
}

#[async_trait]
impl ChatProvider for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn open_turn(&self, request: TurnRequest) -> Result<TurnStream, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = self.request_body(&request);

        debug!(provider = "anthropic", model = %request.model, tools = request.tools.len(), "Opening streaming turn");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Streaming request rejected");
            return Err(Self::map_status(status, error_body));
        }

        let (tx, rx) = tokio::sync::mpsc::channel(64);

        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();
            let mut parser = EventParser::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim_end_matches('\r').to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    // The event type also rides inside the data payload, so
                    // `event:` lines and comments carry nothing extra.
                    if !line.starts_with("data: ") {
                        continue;
                    }
                    let data = line["data: ".len()..].trim();
                    if data.is_empty() {
                        continue;
                    }

                    let wire_event: WireEvent = match serde_json::from_str(data) {
                        Ok(v) => v,
                        Err(e) => {
                            trace!(error = %e, data = %data, "Ignoring unparseable SSE payload");
                            continue;
                        }
                    };

                    let done = matches!(wire_event, WireEvent::MessageStop);

                    match parser.parse(&wire_event) {
                        Ok(Some(event)) => {
                            if tx.send(Ok(event)).await.is_err() {
                                return; // receiver dropped, turn abandoned
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            let _ = tx.send(Err(e)).await;
                            return;
                        }
                    }

                    if done {
                        return;
                    }
                }
            }
            // Stream ended without message_stop; the engine treats the
            // closed channel as a protocol violation.
        });

        Ok(rx)
    }
}

// Small shim so extract_system can borrow text content without cloning.
trait AsTextRef {
    fn as_text_ref(&self) -> &str;
}

impl AsTextRef for tern_core::message::MessageContent {
    fn as_text_ref(&self) -> &str {
        match self {
            tern_core::message::MessageContent::Text(text) => text,
            tern_core::message::MessageContent::Blocks(_) => "",
        }
    }
}
