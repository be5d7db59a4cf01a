//! Command-line interface definitions for the `autoscale-images` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::Parser;

/// Top-level CLI for the `autoscale-images` binary.
#[derive(Debug, Parser)]
#[command(
    name = "autoscale-images",
    about = "Create, tag, and retire machine images for autoscaling rollouts",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Capture an instance into a new image.
    #[command(name = "create", about = "Capture an instance into a new image")]
    Create(CreateCommand),
    /// Write one tag on an image.
    #[command(name = "tag", about = "Write one tag on an image")]
    Tag(TagCommand),
    /// Print the deploy group an image is tagged with.
    #[command(
        name = "deploy-group",
        about = "Print the deploy group an image is tagged with"
    )]
    DeployGroup(DeployGroupCommand),
    /// Delete an image together with its snapshots.
    #[command(name = "delete", about = "Delete an image together with its snapshots")]
    Delete(DeleteCommand),
}

/// Arguments for the `create` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct CreateCommand {
    /// Instance to capture (for example `i-1234567890`).
    #[arg(value_name = "INSTANCE_ID")]
    pub(crate) instance_id: String,
    /// Capture without stopping the instance first.
    ///
    /// Faster, but the filesystem may be captured mid-write.
    #[arg(long)]
    pub(crate) no_reboot: bool,
    /// Tag the new image with this deploy group.
    #[arg(long, value_name = "GROUP")]
    pub(crate) deploy_group: Option<String>,
}

/// Arguments for the `tag` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct TagCommand {
    /// Image to tag.
    #[arg(value_name = "IMAGE_ID")]
    pub(crate) image_id: String,
    /// Tag key.
    #[arg(value_name = "KEY")]
    pub(crate) key: String,
    /// Tag value.
    #[arg(value_name = "VALUE")]
    pub(crate) value: String,
}

/// Arguments for the `deploy-group` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct DeployGroupCommand {
    /// Image to inspect.
    #[arg(value_name = "IMAGE_ID")]
    pub(crate) image_id: String,
}

/// Arguments for the `delete` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct DeleteCommand {
    /// Image to delete.
    #[arg(value_name = "IMAGE_ID")]
    pub(crate) image_id: String,
    /// Stop at the first snapshot that cannot be deleted and keep the image,
    /// overriding the configured cascade policy.
    #[arg(long)]
    pub(crate) abort_on_first_failure: bool,
}
