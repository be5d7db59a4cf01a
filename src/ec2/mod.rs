//! AWS EC2 adapter that drives the `aws` CLI.
//!
//! Each capability call maps to exactly one `aws ec2` invocation with JSON
//! output. Credentials, retries, and pagination are left to the CLI and its
//! own configuration.

mod error;
mod types;

use std::collections::BTreeMap;
use std::ffi::OsString;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::gateway::{ImageDescription, ImageGateway};
use crate::runner::{CommandOutput, CommandRunner, ProcessCommandRunner};
use crate::tags::TagStore;

pub use error::Ec2CliError;
use types::{
    CreateImageOutput, DescribeImagesOutput, DescribeTagsOutput, FilterSpec, TagSpec,
};

/// Default AWS CLI binary name.
pub const DEFAULT_AWS_BIN: &str = "aws";

/// Settings for invoking the AWS CLI.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ec2CliConfig {
    /// Path to the `aws` CLI binary.
    pub aws_bin: String,
    /// Region passed as `--region`; the CLI default applies when unset.
    pub region: Option<String>,
    /// Named profile passed as `--profile`.
    pub profile: Option<String>,
}

impl Ec2CliConfig {
    /// Constructs a config, trimming whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`Ec2CliError::InvalidConfig`] when `aws_bin` is blank.
    pub fn new(aws_bin: impl Into<String>) -> Result<Self, Ec2CliError> {
        let trimmed_aws_bin = aws_bin.into().trim().to_owned();
        if trimmed_aws_bin.is_empty() {
            return Err(Ec2CliError::InvalidConfig {
                field: String::from("aws_bin"),
            });
        }
        Ok(Self {
            aws_bin: trimmed_aws_bin,
            region: None,
            profile: None,
        })
    }

    /// Sets the region; blank values are treated as unset.
    #[must_use]
    pub fn region(mut self, value: Option<String>) -> Self {
        self.region = non_blank(value);
        self
    }

    /// Sets the profile; blank values are treated as unset.
    #[must_use]
    pub fn profile(mut self, value: Option<String>) -> Self {
        self.profile = non_blank(value);
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Image gateway and tag store backed by `aws ec2`.
#[derive(Clone, Debug)]
pub struct Ec2Cli<R: CommandRunner> {
    config: Ec2CliConfig,
    runner: R,
}

impl Ec2Cli<ProcessCommandRunner> {
    /// Creates an adapter wired to the real process runner.
    #[must_use]
    pub const fn with_process_runner(config: Ec2CliConfig) -> Self {
        Self::new(config, ProcessCommandRunner)
    }
}

impl<R: CommandRunner> Ec2Cli<R> {
    /// Creates an adapter using the provided configuration and runner.
    #[must_use]
    pub const fn new(config: Ec2CliConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Returns the adapter configuration.
    #[must_use]
    pub const fn config(&self) -> &Ec2CliConfig {
        &self.config
    }

    /// Builds the argument vector for `aws ec2 <action> ...`.
    fn build_args(&self, action: &str, params: Vec<OsString>) -> Vec<OsString> {
        let mut args = vec![OsString::from("ec2"), OsString::from(action)];
        args.extend(params);

        if let Some(region) = &self.config.region {
            args.push(OsString::from("--region"));
            args.push(OsString::from(region));
        }
        if let Some(profile) = &self.config.profile {
            args.push(OsString::from("--profile"));
            args.push(OsString::from(profile));
        }

        args.push(OsString::from("--output"));
        args.push(OsString::from("json"));
        args
    }

    fn run_aws(&self, action: &str, params: Vec<OsString>) -> Result<CommandOutput, Ec2CliError> {
        let args = self.build_args(action, params);
        debug!(program = %self.config.aws_bin, action, "running aws cli");
        let output = self.runner.run(&self.config.aws_bin, &args)?;
        if output.is_success() {
            return Ok(output);
        }

        Err(Ec2CliError::CommandFailure {
            program: self.config.aws_bin.clone(),
            action: action.to_owned(),
            status: output.code,
            status_text: output.status_text(),
            stderr: output.stderr_summary().to_owned(),
        })
    }

    fn run_aws_json<T>(&self, action: &str, params: Vec<OsString>) -> Result<T, Ec2CliError>
    where
        T: DeserializeOwned,
    {
        let output = self.run_aws(action, params)?;
        serde_json::from_str::<T>(&output.stdout).map_err(|err| Ec2CliError::Parse {
            action: action.to_owned(),
            message: err.to_string(),
        })
    }

    fn json_param(action: &str, value: &impl serde::Serialize) -> Result<OsString, Ec2CliError> {
        serde_json::to_string(value)
            .map(OsString::from)
            .map_err(|err| Ec2CliError::Encode {
                action: action.to_owned(),
                message: err.to_string(),
            })
    }
}

impl<R: CommandRunner> ImageGateway for Ec2Cli<R> {
    type Error = Ec2CliError;

    fn create_image(
        &self,
        instance_id: &str,
        name: &str,
        no_reboot: bool,
    ) -> Result<String, Ec2CliError> {
        let reboot_flag = if no_reboot { "--no-reboot" } else { "--reboot" };
        let output: CreateImageOutput = self.run_aws_json(
            "create-image",
            vec![
                OsString::from("--instance-id"),
                OsString::from(instance_id),
                OsString::from("--name"),
                OsString::from(name),
                OsString::from(reboot_flag),
            ],
        )?;
        if output.image_id.trim().is_empty() {
            return Err(Ec2CliError::UnexpectedShape {
                action: String::from("create-image"),
                message: String::from("empty ImageId"),
            });
        }
        Ok(output.image_id)
    }

    fn describe_image(&self, image_id: &str) -> Result<ImageDescription, Ec2CliError> {
        let output: DescribeImagesOutput = self.run_aws_json(
            "describe-images",
            vec![OsString::from("--image-ids"), OsString::from(image_id)],
        )?;
        output
            .images
            .into_iter()
            .find(|image| image.image_id == image_id)
            .map(ImageDescription::from)
            .ok_or_else(|| Ec2CliError::UnexpectedShape {
                action: String::from("describe-images"),
                message: format!("image {image_id} not present in response"),
            })
    }

    fn delete_image(&self, image_id: &str) -> Result<(), Ec2CliError> {
        self.run_aws(
            "deregister-image",
            vec![OsString::from("--image-id"), OsString::from(image_id)],
        )
        .map(|_| ())
    }

    fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), Ec2CliError> {
        self.run_aws(
            "delete-snapshot",
            vec![OsString::from("--snapshot-id"), OsString::from(snapshot_id)],
        )
        .map(|_| ())
    }
}

impl<R: CommandRunner> TagStore for Ec2Cli<R> {
    type Error = Ec2CliError;

    fn write_tag(&self, resource_id: &str, key: &str, value: &str) -> Result<(), Ec2CliError> {
        let tags = Self::json_param("create-tags", &[TagSpec { key, value }])?;
        self.run_aws(
            "create-tags",
            vec![
                OsString::from("--resources"),
                OsString::from(resource_id),
                OsString::from("--tags"),
                tags,
            ],
        )
        .map(|_| ())
    }

    fn read_tags(&self, resource_id: &str) -> Result<BTreeMap<String, String>, Ec2CliError> {
        let filters = Self::json_param(
            "describe-tags",
            &[FilterSpec {
                name: "resource-id",
                values: [resource_id],
            }],
        )?;
        let output: DescribeTagsOutput = self.run_aws_json(
            "describe-tags",
            vec![OsString::from("--filters"), filters],
        )?;
        Ok(output
            .tags
            .into_iter()
            .filter(|tag| {
                tag.resource_id
                    .as_deref()
                    .is_none_or(|owner| owner == resource_id)
            })
            .map(|tag| (tag.key, tag.value))
            .collect())
    }
}
