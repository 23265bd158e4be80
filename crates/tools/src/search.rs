//! Search adapter — web search behind the `search` tool.
//!
//! Two interchangeable backends produce the same normalized hit shape, so
//! the rest of the pipeline is provider-agnostic:
//! - Google Custom Search (`customsearch/v1?key=…&cx=…&q=…`)
//! - Exa (`POST /search` with native domain and category filters)
//!
//! Domain filters the backend cannot express natively (Google) are folded
//! into the query string as `site:` clauses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tern_core::error::ToolError;
use tern_core::tool::ToolAdapter;
use tracing::debug;

const GOOGLE_BASE_URL: &str = "https://www.googleapis.com";
const EXA_BASE_URL: &str = "https://api.exa.ai";
const DEFAULT_RESULT_COUNT: usize = 5;
const MAX_RESULT_COUNT: usize = 10;

/// Which service answers search queries, with its credentials.
#[derive(Debug, Clone)]
pub enum SearchBackend {
    GoogleCustomSearch { api_key: String, cx: String },
    Exa { api_key: String },
}

/// Arguments the model supplies for a `search` call.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchArgs {
    pub query: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub include_domains: Option<Vec<String>>,
    #[serde(default)]
    pub exclude_domains: Option<Vec<String>>,
    #[serde(default)]
    pub result_count: Option<usize>,
}

/// One normalized search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// The `search` tool.
pub struct SearchAdapter {
    backend: SearchBackend,
    client: reqwest::Client,
    base_url: String,
}

impl SearchAdapter {
    pub fn new(backend: SearchBackend) -> Self {
        let base_url = match &backend {
            SearchBackend::GoogleCustomSearch { .. } => GOOGLE_BASE_URL,
            SearchBackend::Exa { .. } => EXA_BASE_URL,
        };
        Self {
            backend,
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Use a custom base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn parse_args(args: serde_json::Value) -> Result<SearchArgs, ToolError> {
        let parsed: SearchArgs = serde_json::from_value(args)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        if parsed.query.trim().is_empty() {
            return Err(ToolError::InvalidArguments("empty query".into()));
        }
        Ok(parsed)
    }

    async fn search_google(
        &self,
        api_key: &str,
        cx: &str,
        args: &SearchArgs,
        count: usize,
    ) -> Result<Vec<SearchHit>, ToolError> {
        if api_key.is_empty() || cx.is_empty() {
            return Err(ToolError::MissingCredential(
                "Google Custom Search requires an API key and a cx id".into(),
            ));
        }

        let query = fold_domains_into_query(args);
        let url = format!("{}/customsearch/v1", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", api_key),
                ("cx", cx),
                ("q", &query),
                ("num", &count.to_string()),
            ])
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
        Ok(normalize_google(&body, count))
    }

    async fn search_exa(
        &self,
        api_key: &str,
        args: &SearchArgs,
        count: usize,
    ) -> Result<Vec<SearchHit>, ToolError> {
        if api_key.is_empty() {
            return Err(ToolError::MissingCredential(
                "Exa search requires an API key".into(),
            ));
        }

        let mut body = serde_json::json!({
            "query": args.query,
            "numResults": count,
        });
        if let Some(category) = &args.category {
            body["category"] = serde_json::json!(category);
        }
        if let Some(domains) = &args.include_domains {
            body["includeDomains"] = serde_json::json!(domains);
        }
        if let Some(domains) = &args.exclude_domains {
            body["excludeDomains"] = serde_json::json!(domains);
        }

        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-api-key", api_key)
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
        Ok(normalize_exa(&body, count))
    }
}

#[async_trait]
impl ToolAdapter for SearchAdapter {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search the internet for current information. Returns a list of \
         relevant results with titles, URLs, and snippets."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "category": {
                    "type": "string",
                    "description": "Optional result category (e.g. news, research paper)"
                },
                "include_domains": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Restrict results to these domains"
                },
                "exclude_domains": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Drop results from these domains"
                },
                "result_count": {
                    "type": "integer",
                    "description": "Number of results to return (default 5)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<String, ToolError> {
        let args = Self::parse_args(args)?;
        let count = args
            .result_count
            .unwrap_or(DEFAULT_RESULT_COUNT)
            .clamp(1, MAX_RESULT_COUNT);

        debug!(query = %args.query, count, "Executing search");

        let hits = match &self.backend {
            SearchBackend::GoogleCustomSearch { api_key, cx } => {
                self.search_google(api_key, cx, &args, count).await?
            }
            SearchBackend::Exa { api_key } => self.search_exa(api_key, &args, count).await?,
        };

        serde_json::to_string(&hits).map_err(|e| ToolError::InvalidArguments(e.to_string()))
    }
}

/// Google has no native include/exclude domain filter for this endpoint,
/// so the clauses ride in the query string.
fn fold_domains_into_query(args: &SearchArgs) -> String {
    let mut query = args.query.clone();
    if let Some(includes) = &args.include_domains {
        let clause = includes
            .iter()
            .map(|d| format!("site:{d}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        if !clause.is_empty() {
            query = format!("{query} ({clause})");
        }
    }
    if let Some(excludes) = &args.exclude_domains {
        for domain in excludes {
            query.push_str(&format!(" -site:{domain}"));
        }
    }
    query
}

fn normalize_google(body: &serde_json::Value, limit: usize) -> Vec<SearchHit> {
    body["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .take(limit)
                .map(|item| SearchHit {
                    title: item["title"].as_str().unwrap_or_default().to_string(),
                    url: item["link"].as_str().unwrap_or_default().to_string(),
                    snippet: item["snippet"].as_str().unwrap_or_default().to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn normalize_exa(body: &serde_json::Value, limit: usize) -> Vec<SearchHit> {
    body["results"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .take(limit)
                .map(|result| SearchHit {
                    title: result["title"].as_str().unwrap_or_default().to_string(),
                    url: result["url"].as_str().unwrap_or_default().to_string(),
                    snippet: result["snippet"]
                        .as_str()
                        .or_else(|| result["text"].as_str())
                        .unwrap_or_default()
                        .to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}
