//! Configuration for the call core, loadable from YAML.
//!
//! ```yaml
//! default_role: user
//! tools:
//!   require_description: false
//!   require_parameter_docs: false
//!   validate_arguments: true
//! ```

use crate::normalize::{MessageNormalizer, DEFAULT_ROLE};
use crate::tools::{ConverterConfig, ToolConverter};
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Role given to messages built from plain text or content parts
    pub default_role: String,
    pub tools: ConverterConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_role: DEFAULT_ROLE.to_string(),
            tools: ConverterConfig::default(),
        }
    }
}

impl CoreConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: CoreConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            Error::Yaml(inner) => Error::configuration_with_context(
                format!("failed to parse config: {}", inner),
                ErrorContext::new().with_source(path.display().to_string()),
            ),
            other => other,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_role.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "default role must not be empty",
                ErrorContext::new().with_field_path("default_role"),
            ));
        }
        Ok(())
    }

    pub fn normalizer(&self) -> Result<MessageNormalizer> {
        self.validate()?;
        MessageNormalizer::new(&self.default_role)
    }

    pub fn converter(&self) -> ToolConverter {
        ToolConverter::new(self.tools.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::message::MessageRole;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.normalizer().unwrap().default_role(), &MessageRole::User);
        assert!(config.converter().config().validate_arguments);
    }

    #[test]
    fn test_partial_yaml() {
        let config = CoreConfig::from_yaml_str(
            "default_role: system\ntools:\n  require_description: true\n",
        )
        .unwrap();
        assert_eq!(config.default_role, "system");
        assert!(config.tools.require_description);
        assert!(config.tools.validate_arguments);
    }

    #[test]
    fn test_empty_role_rejected() {
        let err = CoreConfig::from_yaml_str("default_role: ''").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            CoreConfig::from_yaml_str("tools: [1, 2"),
            Err(Error::Yaml(_))
        ));
    }
}
