//! Tool adapters for tern — the capabilities behind model tool calls.
//!
//! Each adapter wraps one network-backed capability behind the uniform
//! [`tern_core::ToolAdapter`] contract. Adapters receive their credentials
//! explicitly at construction; nothing here reads global settings.

pub mod browse;
pub mod search;

pub use browse::{BrowseAdapter, PageContent};
pub use search::{SearchAdapter, SearchBackend, SearchHit};

use tern_config::{SearchBackendKind, ToolsConfig};
use tern_core::tool::ToolSet;

/// Build the standard tool set from configuration.
///
/// The search backend is selected by explicit configuration, not by
/// branching at call sites; both backends declare the same schema.
pub fn toolset_from_config(config: &ToolsConfig) -> ToolSet {
    let mut set = ToolSet::new();

    let backend = match config.search_backend {
        SearchBackendKind::Google => SearchBackend::GoogleCustomSearch {
            api_key: config.google_api_key.clone().unwrap_or_default(),
            cx: config.google_cx.clone().unwrap_or_default(),
        },
        SearchBackendKind::Exa => SearchBackend::Exa {
            api_key: config.exa_api_key.clone().unwrap_or_default(),
        },
    };
    set.register(Box::new(SearchAdapter::new(backend)));

    set.register(Box::new(
        BrowseAdapter::new(config.exa_api_key.clone().unwrap_or_default())
            .with_max_characters(config.browse_max_characters),
    ));

    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toolset_declares_search_and_browse() {
        let set = toolset_from_config(&ToolsConfig::default());
        let names: Vec<String> = set
            .definitions()
            .iter()
            .map(|d| d.name.clone())
            .collect();
        assert_eq!(names, vec!["search", "browse"]);
    }

    #[test]
    fn exa_backend_selected_by_config() {
        let config = ToolsConfig {
            search_backend: SearchBackendKind::Exa,
            exa_api_key: Some("exa-key".into()),
            ..ToolsConfig::default()
        };
        let set = toolset_from_config(&config);
        assert!(set.get("search").is_some());
        assert!(set.get("browse").is_some());
    }
}
