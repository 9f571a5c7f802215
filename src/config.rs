//! Configuration loading via `ortho-config`.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_MIN_VOLUME_SIZE_BYTES: u64 = 50 * 1024 * 1024 * 1024;
const DEFAULT_PROVISION_TIMEOUT_SECS: u64 = 300;

/// Process-wide provisioner configuration derived from environment variables,
/// configuration files, and CLI flags. Read-only once constructed; every
/// provisioning operation shares the same instance.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "OCI")]
pub struct ProvisionerConfig {
    /// Compartment new volumes are created in. This value is required.
    pub compartment_id: String,
    /// Tenancy the compartment belongs to. This value is required.
    pub tenancy_id: String,
    /// Explicit region for descriptor labels. When unset, the region is
    /// resolved from instance metadata at provisioning time.
    pub region: Option<String>,
    /// Smallest volume the provisioner will create when rounding is enabled.
    /// Defaults to 50 GiB, the provider's minimum supported volume size.
    #[ortho_config(default = 53_687_091_200)]
    pub min_volume_size_bytes: u64,
    /// Whether requests below the minimum size are rounded up to it.
    #[ortho_config(default = true)]
    pub volume_rounding_enabled: bool,
    /// Overall deadline for a volume to become available, in seconds.
    #[ortho_config(default = 300)]
    pub provision_timeout_secs: u64,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
    section: &'static str,
}

impl FieldMetadata {
    const fn new(
        description: &'static str,
        env_var: &'static str,
        toml_key: &'static str,
        section: &'static str,
    ) -> Self {
        Self {
            description,
            env_var,
            toml_key,
            section,
        }
    }
}

impl ProvisionerConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to [{}] in provisioner.toml",
                metadata.description, metadata.env_var, metadata.toml_key, metadata.section
            )));
        }
        Ok(())
    }

    /// Loads configuration using the `ortho-config` derive. Values merge
    /// defaults, configuration files, environment variables, and CLI flags in
    /// that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the loader fails to merge sources.
    pub fn load_from_sources() -> Result<Self, ConfigError> {
        Self::load().map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("oci-block-provisioner")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields. Error messages include
    /// guidance on how to provide missing values via environment variables or
    /// configuration files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty
    /// and [`ConfigError::InvalidValue`] when the timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.compartment_id,
            &FieldMetadata::new(
                "compartment identifier",
                "OCI_COMPARTMENT_ID",
                "compartment_id",
                "oci",
            ),
        )?;
        Self::require_field(
            &self.tenancy_id,
            &FieldMetadata::new("tenancy identifier", "OCI_TENANCY_ID", "tenancy_id", "oci"),
        )?;
        if self.provision_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(String::from(
                "provision_timeout_secs must be greater than zero",
            )));
        }
        Ok(())
    }

    /// Overall provisioning deadline as a [`Duration`].
    #[must_use]
    pub const fn provision_timeout(&self) -> Duration {
        Duration::from_secs(self.provision_timeout_secs)
    }
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            compartment_id: String::new(),
            tenancy_id: String::new(),
            region: None,
            min_volume_size_bytes: DEFAULT_MIN_VOLUME_SIZE_BYTES,
            volume_rounding_enabled: true,
            provision_timeout_secs: DEFAULT_PROVISION_TIMEOUT_SECS,
        }
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a configuration field holds an unusable value.
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ProvisionerConfig {
        ProvisionerConfig {
            compartment_id: String::from("ocid1.compartment.oc1..aaaa"),
            tenancy_id: String::from("ocid1.tenancy.oc1..dddd"),
            ..ProvisionerConfig::default()
        }
    }

    #[test]
    fn validation_accepts_a_complete_config() {
        assert_eq!(valid_config().validate(), Ok(()));
    }

    #[test]
    fn validation_rejects_missing_compartment_with_actionable_error() {
        let config = ProvisionerConfig {
            compartment_id: String::from("  "),
            ..valid_config()
        };
        let error = config.validate().expect_err("compartment is required");
        let ConfigError::MissingField(message) = error else {
            panic!("unexpected error variant: {error:?}");
        };
        assert!(message.contains("OCI_COMPARTMENT_ID"));
        assert!(message.contains("compartment_id"));
    }

    #[test]
    fn validation_rejects_missing_tenancy() {
        let config = ProvisionerConfig {
            tenancy_id: String::new(),
            ..valid_config()
        };
        let error = config.validate().expect_err("tenancy is required");
        assert!(matches!(error, ConfigError::MissingField(_)));
    }

    #[test]
    fn validation_rejects_zero_timeout() {
        let config = ProvisionerConfig {
            provision_timeout_secs: 0,
            ..valid_config()
        };
        let error = config.validate().expect_err("timeout must be positive");
        assert!(matches!(error, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn defaults_match_provider_limits() {
        let config = ProvisionerConfig::default();
        assert_eq!(config.min_volume_size_bytes, 50 * 1024 * 1024 * 1024);
        assert!(config.volume_rounding_enabled);
        assert_eq!(config.provision_timeout(), Duration::from_secs(300));
        assert_eq!(config.region, None);
    }
}
