use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use stacker_server::{StackerConfig, StoreConfig};

#[derive(Parser)]
#[command(name = "stacker", about = "Users and their tasks over a JSend HTTP API", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(ConfigArgs),
    /// Scan the store for index inconsistencies
    Check(ConfigArgs),
    /// Repair the inconsistencies a scan finds
    Repair(RepairArgs),
    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

/// Where configuration comes from. Flags override the file.
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Address to listen on
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Use the directory store rooted here
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Per-request timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl ConfigArgs {
    pub fn resolve(&self) -> anyhow::Result<StackerConfig> {
        let mut config = match &self.config {
            Some(path) => StackerConfig::load(path)?,
            None => StackerConfig::default(),
        };
        if let Some(bind) = self.bind {
            config.server.bind_addr = bind;
        }
        if let Some(ms) = self.timeout_ms {
            config.server.request_timeout_ms = ms;
        }
        if let Some(path) = &self.data_dir {
            config.store = StoreConfig::Directory { path: path.clone() };
        }
        Ok(config)
    }
}

#[derive(Args, Clone, Debug)]
pub struct RepairArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Report what would be repaired without writing
    #[arg(long)]
    pub dry_run: bool,
}
