//! Command-line interface definitions.

pub mod check;
pub mod create;
pub mod output;
pub mod ps;
pub mod pull;
pub mod start;
pub mod stop;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;

/// Podlift - deploy and operate multi-pod applications.
#[derive(Parser, Debug)]
#[command(name = "podlift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "podlift.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy an application from a template bundle
    Create(CreateArgs),

    /// Start an application
    Start(StartArgs),

    /// Stop an application
    Stop(StopArgs),

    /// List all or specified running application(s)
    Ps(PsArgs),

    /// Pull a container image through the configured runtime
    Pull(PullArgs),

    /// Run host precondition checks
    Check,
}

/// Arguments for the `create` subcommand.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Application name
    pub name: String,

    /// Template bundle to deploy from (required)
    #[arg(short = 't', long)]
    pub template_name: String,
}

/// Arguments for the `start` subcommand.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Application name
    pub name: String,

    /// Specific pod name(s) to start; comma-separated or repeated
    #[arg(long, value_delimiter = ',')]
    pub pod: Vec<String>,

    /// Skip displaying logs after starting a single pod
    #[arg(long)]
    pub skip_logs: bool,

    /// Automatically accept all confirmation prompts
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the `stop` subcommand.
#[derive(Args, Debug)]
pub struct StopArgs {
    /// Application name
    pub name: String,

    /// Specific pod name(s) to stop; comma-separated or repeated
    #[arg(long, value_delimiter = ',')]
    pub pod: Vec<String>,

    /// Automatically accept all confirmation prompts
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the `pull` subcommand.
#[derive(Args, Debug)]
pub struct PullArgs {
    /// Image reference, e.g. `quay.io/podlift/db:latest`
    pub image: String,
}

/// Arguments for the `ps` subcommand.
#[derive(Args, Debug)]
pub struct PsArgs {
    /// Application name (optional)
    pub name: Option<String>,

    /// Output format (e.g., wide)
    #[arg(short = 'o', long)]
    pub output: Option<String>,
}

impl PsArgs {
    #[must_use]
    pub fn is_wide(&self) -> bool {
        self.output
            .as_deref()
            .is_some_and(|o| o.eq_ignore_ascii_case("wide"))
    }
}

/// Dispatch a parsed command.
pub async fn run(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Create(args) => create::execute(&config, args).await,
        Commands::Start(args) => start::execute(&config, args).await,
        Commands::Stop(args) => stop::execute(&config, args).await,
        Commands::Ps(args) => ps::execute(&config, args).await,
        Commands::Pull(args) => pull::execute(&config, args).await,
        Commands::Check => check::execute(&config).await,
    }
}
