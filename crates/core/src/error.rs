//! Error types for the tern domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Each bounded context
//! has its own enum; `ExchangeError` is the terminal result type an
//! exchange caller sees.

use thiserror::Error;

/// The terminal error of one exchange.
///
/// Tool-level failures never appear here — they are recovered locally by
/// reporting them back to the model as tool-result payloads. Everything
/// below ends the exchange. Partial text already streamed to the caller's
/// incremental callback is never retracted.
#[derive(Debug, Clone, Error)]
pub enum ExchangeError {
    /// Bad or missing provider credential. Fatal, no retry.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Provider rate limit. Retry policy is the caller's decision.
    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Generic network or provider failure.
    #[error("Network error: {0}")]
    Network(String),

    /// A finalized tool call carried an argument buffer that does not parse.
    /// The turn is aborted: a malformed call cannot be executed safely.
    #[error("Malformed arguments for tool call {call_id}: {reason}")]
    MalformedToolArguments { call_id: String, reason: String },

    /// The exchange requested more tool calls than the configured ceiling.
    #[error("Tool call budget exceeded: {executed} executed, ceiling {ceiling}")]
    ToolBudgetExceeded { executed: u32, ceiling: u32 },

    /// The caller cancelled the exchange. Not an application error — the
    /// UI must not render this as a failure state.
    #[error("Exchange cancelled")]
    Cancelled,

    /// Unexpected event ordering from the provider stream.
    #[error("Protocol violation: {0}")]
    Protocol(String),
}

/// Errors from the provider client and its event stream.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Protocol violation: {0}")]
    Protocol(String),
}

impl From<ProviderError> for ExchangeError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Authentication(msg) => Self::Authentication(msg),
            ProviderError::RateLimited { retry_after_secs } => {
                Self::RateLimited { retry_after_secs }
            }
            ProviderError::Network(msg) => Self::Network(msg),
            ProviderError::Api {
                status_code,
                message,
            } => Self::Network(format!("provider returned {status_code}: {message}")),
            ProviderError::StreamInterrupted(msg) => Self::Network(msg),
            ProviderError::Protocol(msg) => Self::Protocol(msg),
        }
    }
}

/// Errors from tool adapters.
///
/// These are recovered locally: the orchestrator converts them into a
/// tool-result payload describing the failure so generation continues.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_auth_maps_to_exchange_auth() {
        let err: ExchangeError = ProviderError::Authentication("bad key".into()).into();
        assert!(matches!(err, ExchangeError::Authentication(_)));
    }

    #[test]
    fn provider_api_error_surfaces_as_network() {
        let err: ExchangeError = ProviderError::Api {
            status_code: 529,
            message: "overloaded".into(),
        }
        .into();
        match err {
            ExchangeError::Network(msg) => {
                assert!(msg.contains("529"));
                assert!(msg.contains("overloaded"));
            }
            other => panic!("expected Network, got {other:?}"),
        }
    }

    #[test]
    fn rate_limit_carries_retry_hint() {
        let err: ExchangeError = ProviderError::RateLimited {
            retry_after_secs: 5,
        }
        .into();
        assert!(err.to_string().contains("5s"));
    }

    #[test]
    fn budget_error_displays_counts() {
        let err = ExchangeError::ToolBudgetExceeded {
            executed: 3,
            ceiling: 3,
        };
        assert!(err.to_string().contains("3"));
    }
}
