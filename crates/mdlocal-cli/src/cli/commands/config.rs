//! `mdlocal config` – show where the config lives and what it contains.

use anyhow::Result;
use mdlocal_core::config::{self, LocalizerConfig};

pub fn run_config(cfg: &LocalizerConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
