//! Engine configuration.

use crate::backend::{RecommendationScope, SearchType};
use crate::coin::Category;
use crate::error::{EngineError, Result};
use crate::results::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables of a [`QueryEngine`](crate::QueryEngine).
///
/// Every field has a default, so a config file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Result records per page.
    pub page_size: usize,

    /// Quiet interval before a recommendation lookup fires.
    pub debounce_ms: u64,

    /// A lookup needs more than this many characters in the field.
    pub min_query_chars: usize,

    /// Search type selected at start-up.
    pub search_type: SearchType,

    /// Tables searched for recommendations.
    pub recommendation_scope: Vec<Category>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce_ms: 300,
            min_query_chars: 2,
            search_type: SearchType::default(),
            recommendation_scope: Category::ALL.to_vec(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| EngineError::ConfigIo { path: path.to_path_buf(), source })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(EngineError::InvalidConfig("page_size must be at least 1".into()));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn scope(&self) -> RecommendationScope {
        RecommendationScope::from_categories(&self.recommendation_scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.page_size, 100);
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.scope(), RecommendationScope::DESCRIPTORS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            EngineConfig::from_json_str(r#"{ "page_size": 25, "search_type": "Type", "unknown": 1 }"#).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.search_type, SearchType::TypeSeriesItem);
        assert_eq!(config.min_query_chars, 2);
    }

    #[test]
    fn test_scope_from_categories() {
        let config = EngineConfig::from_json_str(r#"{ "recommendation_scope": ["list_person", "list_verb"] }"#).unwrap();
        assert_eq!(config.scope(), RecommendationScope::PERSON | RecommendationScope::VERB);
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let err = EngineConfig::from_json_str(r#"{ "page_size": 0 }"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::load("/nonexistent/icosearch.json").unwrap_err();
        assert!(matches!(err, EngineError::ConfigIo { .. }));
    }
}
