//! CLI for mdlocal.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mdlocal_core::config::{self, LocalizerConfig};
use std::path::PathBuf;

use commands::{run_config, run_localize, run_refs, run_scan};

/// Top-level CLI for mdlocal.
#[derive(Debug, Parser)]
#[command(name = "mdlocal")]
#[command(about = "mdlocal: download remote images referenced by Markdown files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Localize every Markdown file under a directory.
    Run {
        /// Directory scanned recursively for `.md` files.
        dir: PathBuf,
        /// Fetch up to N distinct images of a document at once (overrides config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
        /// Per-image fetch timeout in seconds (overrides config).
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
        /// Name of the per-document asset directory (overrides config).
        #[arg(long, value_name = "NAME")]
        assets_dir: Option<String>,
        /// List what would be downloaded without fetching or writing anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// List the Markdown files that `run` would process.
    Scan {
        /// Directory scanned recursively for `.md` files.
        dir: PathBuf,
    },

    /// Print the remote image references found in one file.
    Refs {
        /// Markdown file to inspect.
        file: PathBuf,
    },

    /// Print the config file path and the effective configuration.
    Config,
}

/// Command-line overrides for the loaded configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Overrides {
    pub jobs: Option<usize>,
    pub timeout: Option<u64>,
    pub assets_dir: Option<String>,
}

impl Overrides {
    pub fn apply(&self, cfg: &mut LocalizerConfig) {
        if let Some(jobs) = self.jobs {
            cfg.max_concurrent_fetches = jobs.max(1);
        }
        if let Some(secs) = self.timeout {
            cfg.fetch_timeout_secs = secs;
        }
        if let Some(name) = &self.assets_dir {
            cfg.assets_dir_name = name.clone();
        }
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init().context("loading config")?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                dir,
                jobs,
                timeout,
                assets_dir,
                dry_run,
            } => {
                Overrides {
                    jobs,
                    timeout,
                    assets_dir,
                }
                .apply(&mut cfg);
                run_localize(cfg, &dir, dry_run)?;
            }
            CliCommand::Scan { dir } => run_scan(&dir)?,
            CliCommand::Refs { file } => run_refs(&cfg, &file)?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}
