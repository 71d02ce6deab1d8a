//! Configuration of the provisioning core.
//!
//! The configuration is small and read-mostly: it is built once (from code or
//! JSON) and shared by the resource manager, the definition resolver and the
//! lifecycle classification.
//!
//! ```rust
//! use shadow_provisioning::config::ProvisioningConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProvisioningConfig::builder()
//!     .with_corpse_grace_period_seconds(3600)
//!     .with_resource_cache_enabled(false)
//!     .build()?;
//! assert!(config.implicit_default_intent);
//!
//! let from_json = ProvisioningConfig::from_json_str(r#"{"implicitDefaultIntent": false}"#)?;
//! assert!(!from_json.implicit_default_intent);
//! # Ok(())
//! # }
//! ```

use crate::error::{ConfigurationError, ConfigurationResult};
use crate::schema::ItemName;
use chrono::Duration;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_naming_fallback() -> ItemName {
    ItemName::icfs_name()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningConfig {
    /// Treat the only object type of a kind as its default when none is marked
    #[serde(default = "default_true")]
    pub implicit_default_intent: bool,
    /// How long completed pending operations keep a shadow in a transitional state
    #[serde(default)]
    pub corpse_grace_period_seconds: i64,
    #[serde(default = "default_true")]
    pub resource_cache_enabled: bool,
    /// Attribute used as shadow name when neither the naming attribute nor
    /// the primary identifier can be used
    #[serde(default = "default_naming_fallback")]
    pub naming_fallback_attribute: ItemName,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            implicit_default_intent: true,
            corpse_grace_period_seconds: 0,
            resource_cache_enabled: true,
            naming_fallback_attribute: default_naming_fallback(),
        }
    }
}

impl ProvisioningConfig {
    pub fn builder() -> ProvisioningConfigBuilder {
        ProvisioningConfigBuilder::new()
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> ConfigurationResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigurationError::InvalidValue {
                message: format!("Cannot parse provisioning configuration: {e}"),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for consistency.
    pub fn validate(&self) -> ConfigurationResult<()> {
        if self.corpse_grace_period_seconds < 0 {
            return Err(ConfigurationError::InvalidValue {
                message: format!(
                    "Corpse grace period must not be negative, was {}",
                    self.corpse_grace_period_seconds
                ),
            });
        }
        Ok(())
    }

    pub fn grace_period(&self) -> Duration {
        Duration::seconds(self.corpse_grace_period_seconds)
    }
}

/// Builder for provisioning configurations with validation.
#[derive(Debug, Clone, Default)]
pub struct ProvisioningConfigBuilder {
    config: ProvisioningConfig,
}

impl ProvisioningConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_implicit_default_intent(mut self, enabled: bool) -> Self {
        self.config.implicit_default_intent = enabled;
        self
    }

    pub fn with_corpse_grace_period_seconds(mut self, seconds: i64) -> Self {
        self.config.corpse_grace_period_seconds = seconds;
        self
    }

    pub fn with_resource_cache_enabled(mut self, enabled: bool) -> Self {
        self.config.resource_cache_enabled = enabled;
        self
    }

    pub fn with_naming_fallback_attribute(mut self, attribute: ItemName) -> Self {
        self.config.naming_fallback_attribute = attribute;
        self
    }

    /// Build the configuration with validation.
    pub fn build(self) -> ConfigurationResult<ProvisioningConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
