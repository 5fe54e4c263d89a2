//! Configuration
//!
//! The allow-list and the capability that unlocks fault notices. Loaded once
//! when the component graph is built; a configured allow-list replaces the
//! default one outright.

use menuvis_plugin::{AllowList, DEFAULT_PRIVILEGED_CAPABILITY};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: privileged_capability must not be empty")]
    EmptyCapability,
}

impl From<ConfigError> for menuvis_core::VisError {
    fn from(e: ConfigError) -> Self {
        menuvis_core::VisError::internal(e.to_string())
            .with_suggestion("Check the visibility configuration file")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Names a visibility expression may call
    pub allow_list: AllowList,
    /// Capability a viewer needs to see evaluation faults
    pub privileged_capability: String,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            allow_list: menuvis_std::default_allow_list(),
            privileged_capability: DEFAULT_PRIVILEGED_CAPABILITY.to_string(),
        }
    }
}

impl VisibilityConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    pub fn with_privileged_capability(mut self, capability: impl Into<String>) -> Self {
        self.privileged_capability = capability.into();
        self
    }

    fn validate(mut self) -> Result<Self, ConfigError> {
        self.privileged_capability = self.privileged_capability.trim().to_string();
        if self.privileged_capability.is_empty() {
            return Err(ConfigError::EmptyCapability);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_standard_library() {
        let config = VisibilityConfig::default();
        assert!(config.allow_list.contains("is_page"));
        assert_eq!(config.privileged_capability, "manage_options");
    }

    #[test]
    fn test_allow_list_is_replaced_and_deduplicated() {
        let config = VisibilityConfig::from_json_str(
            r#"{"allow_list": ["is_page", "is_home", "IS_PAGE", "is_home"]}"#,
        ).unwrap();
        assert_eq!(config.allow_list.names(), &["is_page".to_string(), "is_home".to_string()]);
        assert!(!config.allow_list.contains("is_front_page"));
        assert_eq!(config.privileged_capability, "manage_options");
    }

    #[test]
    fn test_empty_object_is_default() {
        let config = VisibilityConfig::from_json_str("{}").unwrap();
        assert_eq!(config.allow_list.len(), VisibilityConfig::default().allow_list.len());
    }

    #[test]
    fn test_invalid_json() {
        let err = VisibilityConfig::from_json_str(r#"{"allow_list": 3}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_blank_capability_is_rejected() {
        let err = VisibilityConfig::from_json_str(r#"{"privileged_capability": "  "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyCapability));
    }

    #[test]
    fn test_missing_file() {
        let err = VisibilityConfig::from_json_file("/nonexistent/menuvis.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        let vis: menuvis_core::VisError = err.into();
        assert_eq!(vis.code, menuvis_core::codes::INTERNAL);
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("menuvis-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"allow_list": ["is_home"], "privileged_capability": "edit_theme_options"}"#).unwrap();
        let config = VisibilityConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.allow_list.names(), &["is_home".to_string()]);
        assert_eq!(config.privileged_capability, "edit_theme_options");
    }
}
