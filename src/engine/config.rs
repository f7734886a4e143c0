//! Engine configuration
//!
//! Every field has a default, so the glue may pass a partial object (or
//! nothing at all).

use crate::errors::EngineError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MARK_CLASS: &str = "highlighted-text";
pub const DEFAULT_PANEL_ID: &str = "resumo-panel";
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/resumir";

/// How mark ids are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// `h1`, `h2`, ... (deterministic)
    #[default]
    Sequential,
    /// Prefix plus a random uuid; needs the `uuid` feature
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Class stamped on every mark node
    pub mark_class: String,
    pub id_prefix: String,
    pub id_strategy: IdStrategy,
    /// Element whose subtree never starts a mark (the control panel)
    pub panel_element_id: Option<String>,
    /// Joiner between annotation texts in the export payload
    pub separator: String,
    /// Summarization endpoint, used by the glue that performs the request
    pub summarize_endpoint: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mark_class: DEFAULT_MARK_CLASS.to_string(),
            id_prefix: "h".to_string(),
            id_strategy: IdStrategy::Sequential,
            panel_element_id: Some(DEFAULT_PANEL_ID.to_string()),
            separator: "\n".to_string(),
            summarize_endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, EngineError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()
    }

    /// Reject settings that would produce unusable markup
    pub fn validate(self) -> Result<Self, EngineError> {
        if self.mark_class.trim().is_empty() {
            return Err(EngineError::Config("mark_class must not be empty".to_string()));
        }
        if self.mark_class.contains(char::is_whitespace) {
            return Err(EngineError::Config(format!(
                "mark_class '{}' must be a single class name",
                self.mark_class
            )));
        }
        if self.id_prefix.is_empty() {
            return Err(EngineError::Config("id_prefix must not be empty".to_string()));
        }
        Ok(self)
    }
}
