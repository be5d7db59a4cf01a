//! Machine image lifecycle for autoscaling rollouts.
//!
//! A running instance is frozen into an [`Image`], the image is tagged with
//! the deploy group a rollout will look it up by, and obsolete images are torn
//! down together with the [`Snapshot`]s that back them. Provider access goes
//! through the [`ImageGateway`] and [`TagStore`] capabilities; [`Ec2Cli`]
//! implements both on top of the `aws` CLI.

pub mod config;
pub mod ec2;
pub mod gateway;
pub mod image;
pub mod runner;
pub mod snapshot;
pub mod tags;
pub mod test_support;

pub use config::{AutoscaleConfig, ConfigError};
pub use ec2::{DEFAULT_AWS_BIN, Ec2Cli, Ec2CliConfig, Ec2CliError};
pub use gateway::{BlockDeviceMapping, EbsVolume, ImageDescription, ImageGateway};
pub use image::{
    CascadePolicy, Clock, CreateOptions, IMAGE_NAME_PREFIX, Image, ImageError, ImageRemoval,
    RemoteOperation, SnapshotFailure, SystemClock,
};
pub use runner::{CommandOutput, CommandRunner, ProcessCommandRunner, RunnerError};
pub use snapshot::Snapshot;
pub use tags::{DEPLOY_GROUP_TAG, TagStore};
