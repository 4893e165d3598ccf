//! Command-line and file configuration.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use transport::TransportConfig;

use crate::commands::Command;

/// Drive an in-memory group through the dispatch core.
#[derive(Debug, Parser)]
#[command(name = "cli", version, about = "Broadcast or unicast through an in-memory group")]
pub struct CliConfig {
    /// Group name shared by every member.
    #[arg(long, default_value = "cluster")]
    pub group: String,

    /// Number of members to start.
    #[arg(long, default_value_t = 3)]
    pub members: usize,

    /// Optional JSON file with transport settings.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings read from `--config`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliFileConfig {
    pub transport: TransportConfig,
}

impl CliFileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }
}

impl CliConfig {
    /// Run the selected command on a fresh runtime.
    pub fn run(self) -> anyhow::Result<()> {
        init_tracing(self.verbose);

        let file = match &self.config {
            Some(path) => CliFileConfig::load(path)?,
            None => CliFileConfig::default(),
        };

        let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
        let result = runtime.block_on(self.command.execute(&self.group, self.members, &file.transport))?;
        print!("{result}");
        Ok(())
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
