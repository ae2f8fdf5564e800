//! Command-line surface
//!
//! Argument parsing lives here so the binary stays a thin shell and the
//! commands can be driven from tests.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::{self, Config};
use crate::context::BuildContext;
use crate::domain::version::{EnvProperties, SystemClock};
use crate::git::GitBackend;
use crate::ui;

#[derive(clap::Parser, Debug)]
#[command(
    name = "git-stamp",
    version,
    about = "Derive a project version from git branch, tag and commit metadata"
)]
pub struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(short, long, default_value = ".", help = "Working copy to read")]
    pub repo: PathBuf,

    #[arg(long, value_enum, help = "How to invoke git (overrides config)")]
    pub backend: Option<GitBackend>,

    #[arg(long, help = "Base version for snapshot versions (overrides config)")]
    pub base_version: Option<String>,

    #[arg(long, help = "Fail instead of degrading when git itself errors")]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Print the resolved version (default)
    Version,
    /// Show branch, head commit, tags and the resolved version
    Info,
}

impl Args {
    /// Load the configuration file and apply flag overrides on top.
    pub fn effective_config(&self) -> Result<Config> {
        let mut config = config::load_config(self.config.as_deref(), &self.repo)
            .context("Failed to load configuration")?;

        if let Some(backend) = self.backend {
            config.git.backend = backend;
        }
        if let Some(base_version) = &self.base_version {
            config.version.base_version = base_version.clone();
        }

        Ok(config)
    }
}

pub fn run(args: Args) -> Result<()> {
    let config = args.effective_config()?;
    let command = args.command.unwrap_or(Command::Version);

    if command == Command::Info {
        ui::display_status(&format!(
            "Reading {} with the {} backend",
            args.repo.display(),
            config.git.backend
        ));
    }

    let context = BuildContext::resolve(&config, &args.repo, args.strict)
        .with_context(|| format!("Failed to read git metadata from {}", args.repo.display()))?;
    let resolved = context.version(&EnvProperties, &SystemClock);

    match command {
        Command::Version => ui::display_version(&resolved),
        Command::Info => ui::display_info(context.snapshot(), &resolved),
    }

    Ok(())
}
