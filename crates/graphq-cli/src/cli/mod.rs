//! CLI for graphq.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use graphq_core::config;
use std::path::PathBuf;

use commands::{run_batch, run_completions, run_show_config, run_sample, RunArgs};

/// Top-level CLI for graphq.
#[derive(Debug, Parser)]
#[command(name = "graphq")]
#[command(about = "graphq: throttling-aware Gremlin batch runner", long_about = None)]
pub struct Cli {
    /// Use this config file instead of ~/.config/graphq/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run a batch of queries in order, stopping at the first fatal failure.
    Run {
        /// File with one query per line (default: the built-in sample workload).
        #[arg(long, short = 'f', value_name = "PATH")]
        file: Option<PathBuf>,
        /// Total runs allowed if the batch aborts (overrides [rerun] max_runs).
        #[arg(long, value_name = "N")]
        runs: Option<u32>,
        /// Seconds between an aborted run and the next (overrides [rerun] delay_secs).
        #[arg(long, value_name = "SECS")]
        rerun_delay: Option<u64>,
        /// Print the per-run results as JSON instead of a text summary.
        #[arg(long)]
        json: bool,
    },

    /// Print the built-in sample workload.
    Sample,

    /// Show the config file path and effective settings.
    Config,

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Sample => run_sample(),
            CliCommand::Completions { shell } => run_completions(shell),
            CliCommand::Config => {
                let (path, cfg) = load_config(cli.config)?;
                run_show_config(&path, &cfg)
            }
            CliCommand::Run {
                file,
                runs,
                rerun_delay,
                json,
            } => {
                let (_, cfg) = load_config(cli.config)?;
                let args = RunArgs {
                    file,
                    runs,
                    rerun_delay,
                    json,
                };
                run_batch(&cfg, &args).await
            }
        }
    }
}

fn load_config(explicit: Option<PathBuf>) -> Result<(PathBuf, config::GraphqConfig)> {
    let cfg = match &explicit {
        Some(path) => config::load_from_path(path)?,
        None => config::load_or_init()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);
    let path = match explicit {
        Some(path) => path,
        None => config::config_path()?,
    };
    Ok((path, cfg))
}

#[cfg(test)]
mod tests;
