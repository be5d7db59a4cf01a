//! Configuration loading via `ortho-config`.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::ec2::{DEFAULT_AWS_BIN, Ec2CliConfig};
use crate::image::{CascadePolicy, UnknownCascadePolicy};

/// Settings for the `autoscale-images` binary derived from environment
/// variables, configuration files, and CLI flags.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "AUTOSCALE",
    discovery(
        app_name = "autoscale",
        env_var = "AUTOSCALE_CONFIG_PATH",
        config_file_name = "autoscale.toml",
        dotfile_name = ".autoscale.toml",
        project_file_name = "autoscale.toml"
    )
)]
pub struct AutoscaleConfig {
    /// Path to the `aws` CLI binary. Defaults to `aws` on `PATH`.
    #[ortho_config(default = DEFAULT_AWS_BIN.to_owned())]
    pub aws_bin: String,
    /// AWS region; the CLI's own default applies when unset.
    pub region: Option<String>,
    /// Named AWS CLI profile.
    pub profile: Option<String>,
    /// Reaction to failed snapshot deletes: `best-effort` (default) keeps
    /// going and reports every failure, `abort-on-first-failure` stops and
    /// leaves the image in place.
    #[ortho_config(default = "best-effort".to_owned())]
    pub cascade_policy: String,
    /// Log filter used when `RUST_LOG` is unset.
    #[ortho_config(default = "info".to_owned())]
    pub log_level: String,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }

    fn missing(&self) -> ConfigError {
        ConfigError::MissingField(format!(
            "missing {}: set {} or add {} to autoscale.toml",
            self.description, self.env_var, self.toml_key
        ))
    }
}

impl AutoscaleConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(metadata.missing());
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("autoscale-images")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation. Error messages say how to provide
    /// missing values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty
    /// and [`ConfigError::InvalidValue`] for an unknown cascade policy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.aws_bin,
            &FieldMetadata::new("AWS CLI binary", "AUTOSCALE_AWS_BIN", "aws_bin"),
        )?;
        Self::require_field(
            &self.log_level,
            &FieldMetadata::new("log level", "AUTOSCALE_LOG_LEVEL", "log_level"),
        )?;
        self.policy()?;
        Ok(())
    }

    /// Parses the configured cascade policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown policy name.
    pub fn policy(&self) -> Result<CascadePolicy, ConfigError> {
        self.cascade_policy
            .parse()
            .map_err(|err: UnknownCascadePolicy| ConfigError::InvalidValue {
                field: String::from("cascade_policy"),
                message: err.to_string(),
            })
    }

    /// Builds the AWS CLI adapter settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when validation fails.
    pub fn ec2_cli_config(&self) -> Result<Ec2CliConfig, ConfigError> {
        self.validate()?;
        Ec2CliConfig::new(&self.aws_bin)
            .map(|config| {
                config
                    .region(self.region.clone())
                    .profile(self.profile.clone())
            })
            .map_err(|err| ConfigError::InvalidValue {
                field: String::from("aws_bin"),
                message: err.to_string(),
            })
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a field holds a value outside its accepted set.
    #[error("invalid {field}: {message}")]
    InvalidValue {
        /// Offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}
