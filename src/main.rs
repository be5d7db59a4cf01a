//! Binary entry point for the `autoscale-images` CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use autoscale_images::{
    AutoscaleConfig, CascadePolicy, CreateOptions, Ec2Cli, Image, ImageError, ProcessCommandRunner,
};

mod cli;

use cli::{Cli, CreateCommand, DeleteCommand, DeployGroupCommand, TagCommand};

/// Exit code used when `deploy-group` finds no tag.
const EXIT_ABSENT: i32 = 1;

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32, CliError> {
    let config =
        AutoscaleConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    init_logging(&config.log_level);

    let ec2_config = config
        .ec2_cli_config()
        .map_err(|err| CliError::Config(err.to_string()))?;
    let policy = config
        .policy()
        .map_err(|err| CliError::Config(err.to_string()))?;
    let client = Ec2Cli::with_process_runner(ec2_config);
    debug!(
        aws_bin = %client.config().aws_bin,
        region = client.config().region.as_deref().unwrap_or("cli default"),
        %policy,
        "configuration loaded"
    );

    dispatch(cli, &client, policy)
}

fn init_logging(log_level: &str) {
    let installed = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
    if installed.is_err() {
        debug!("tracing subscriber already installed");
    }
}

fn dispatch(
    cli: Cli,
    client: &Ec2Cli<ProcessCommandRunner>,
    policy: CascadePolicy,
) -> Result<i32, CliError> {
    match cli {
        Cli::Create(command) => create(client, command),
        Cli::Tag(command) => tag(client, &command),
        Cli::DeployGroup(command) => deploy_group(client, &command),
        Cli::Delete(command) => delete(client, &command, policy),
    }
}

fn create(client: &Ec2Cli<ProcessCommandRunner>, command: CreateCommand) -> Result<i32, CliError> {
    let mut options = CreateOptions::new().no_reboot(command.no_reboot);
    if let Some(group) = command.deploy_group {
        options = options.deploy_group(group);
    }
    let image = Image::create(client, &command.instance_id, &options)?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", image.id())?;
    for snapshot in image.snapshots() {
        writeln!(stdout, "  snapshot {}", snapshot.id())?;
    }
    Ok(0)
}

fn tag(client: &Ec2Cli<ProcessCommandRunner>, command: &TagCommand) -> Result<i32, CliError> {
    let image = Image::with_id(&command.image_id)?;
    image.tag(client, &command.key, &command.value)?;
    Ok(0)
}

fn deploy_group(
    client: &Ec2Cli<ProcessCommandRunner>,
    command: &DeployGroupCommand,
) -> Result<i32, CliError> {
    let image = Image::with_id(&command.image_id)?;
    let Some(group) = image.deploy_group(client)? else {
        return Ok(EXIT_ABSENT);
    };
    writeln!(io::stdout(), "{group}")?;
    Ok(0)
}

fn delete(
    client: &Ec2Cli<ProcessCommandRunner>,
    command: &DeleteCommand,
    configured: CascadePolicy,
) -> Result<i32, CliError> {
    let policy = if command.abort_on_first_failure {
        CascadePolicy::AbortOnFirstFailure
    } else {
        configured
    };
    let image = Image::describe(client, &command.image_id)?;
    image.delete_with_policy(client, policy)?;
    writeln!(io::stdout(), "deleted {}", command.image_id)?;
    Ok(0)
}

fn report_error(err: &CliError) {
    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{err}").ok();
    if let CliError::Image(image_err) = err {
        for snapshot_id in image_err.orphaned_snapshot_ids() {
            writeln!(stderr, "orphaned snapshot: {snapshot_id}").ok();
        }
    }
}
