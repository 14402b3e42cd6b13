//! Command-line interface definitions.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the bundle deployer.
#[derive(Parser, Debug)]
#[command(
    name = "bundle-deploy",
    about = "Deploy bundled read-only resources into a writable data directory, once",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Path to deploy.toml (default: <bundle>/deploy.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory resources are deployed into
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Override the bundle root resources are read from
    #[arg(short, long, global = true)]
    pub bundle: Option<PathBuf>,

    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deploy bundled resources unless already deployed
    Deploy(DeployOpts),
    /// Show the deployment flag and resolved locations
    Status,
    /// Compare deployed files with the bundle
    Verify,
    /// Clear the deployment flag so the next deploy runs again
    Reset,
    /// Print version information
    Version,
}

/// Options for the `deploy` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct DeployOpts {
    /// Deploy even if the flag says this already happened
    #[arg(short, long)]
    pub force: bool,
}

impl Command {
    /// Name used for the per-command log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Deploy(_) => "deploy",
            Self::Status => "status",
            Self::Verify => "verify",
            Self::Reset => "reset",
            Self::Version => "version",
        }
    }
}
