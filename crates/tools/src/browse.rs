//! Browse adapter — page-content retrieval behind the `browse` tool.
//!
//! Fetches extracted text for one or more URLs via the Exa contents
//! endpoint (`POST /contents` with `ids` and a text extraction spec),
//! capped to a per-page character limit.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tern_core::error::ToolError;
use tern_core::tool::ToolAdapter;
use tracing::debug;

const EXA_BASE_URL: &str = "https://api.exa.ai";
pub const DEFAULT_MAX_CHARACTERS: usize = 2048;

/// Arguments the model supplies for a `browse` call.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowseArgs {
    pub urls: Vec<String>,
    #[serde(default)]
    pub include_markup: Option<bool>,
    #[serde(default)]
    pub max_characters: Option<usize>,
}

/// Extracted text for one URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub url: String,
    pub text: String,
}

/// The `browse` tool.
pub struct BrowseAdapter {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    default_max_characters: usize,
}

impl BrowseAdapter {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::Client::new(),
            base_url: EXA_BASE_URL.into(),
            default_max_characters: DEFAULT_MAX_CHARACTERS,
        }
    }

    /// Use a custom base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the default per-page character cap.
    pub fn with_max_characters(mut self, max: usize) -> Self {
        self.default_max_characters = max;
        self
    }

    fn parse_args(args: serde_json::Value) -> Result<BrowseArgs, ToolError> {
        let parsed: BrowseArgs = serde_json::from_value(args)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        if parsed.urls.is_empty() {
            return Err(ToolError::InvalidArguments("no urls given".into()));
        }
        Ok(parsed)
    }
}

#[async_trait]
impl ToolAdapter for BrowseAdapter {
    fn name(&self) -> &str {
        "browse"
    }

    fn description(&self) -> &str {
        "Fetch the text content of one or more web pages. Returns extracted \
         text per URL, truncated to a character limit."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "urls": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "The URLs to fetch"
                },
                "include_markup": {
                    "type": "boolean",
                    "description": "Keep HTML tags in the extracted text (default false)"
                },
                "max_characters": {
                    "type": "integer",
                    "description": "Per-page character cap (default 2048)"
                }
            },
            "required": ["urls"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<String, ToolError> {
        if self.api_key.is_empty() {
            return Err(ToolError::MissingCredential(
                "Browse requires an Exa API key".into(),
            ));
        }
        let args = Self::parse_args(args)?;
        let max_characters = args.max_characters.unwrap_or(self.default_max_characters);

        debug!(urls = args.urls.len(), max_characters, "Executing browse");

        let body = serde_json::json!({
            "ids": args.urls,
            "contents": {
                "text": {
                    "maxCharacters": max_characters,
                    "includeHtmlTags": args.include_markup.unwrap_or(false),
                }
            }
        });

        let url = format!("{}/contents", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ToolError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Api {
                status_code: status,
                message: body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ToolError::Network(e.to_string()))?;
        let pages = normalize_contents(&body, max_characters);

        serde_json::to_string(&pages).map_err(|e| ToolError::InvalidArguments(e.to_string()))
    }
}

fn normalize_contents(body: &serde_json::Value, max_characters: usize) -> Vec<PageContent> {
    body["results"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .map(|result| PageContent {
                    url: result["url"]
                        .as_str()
                        .or_else(|| result["id"].as_str())
                        .unwrap_or_default()
                        .to_string(),
                    text: truncate_chars(
                        result["text"].as_str().unwrap_or_default(),
                        max_characters,
                    ),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Truncate to at most `max` characters, respecting char boundaries.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
