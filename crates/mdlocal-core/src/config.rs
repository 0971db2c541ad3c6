use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Global configuration loaded from `~/.config/mdlocal/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizerConfig {
    /// Name of the per-document subdirectory that receives downloaded images.
    pub assets_dir_name: String,
    /// Total time allowed for one image fetch, in seconds.
    pub fetch_timeout_secs: u64,
    /// Connect timeout for one image fetch, in seconds.
    pub connect_timeout_secs: u64,
    /// Maximum number of redirects followed per fetch.
    pub max_redirects: u32,
    /// Distinct URLs of one document fetched at once (1 = sequential).
    pub max_concurrent_fetches: usize,
    /// Text encodings tried in order when reading a document; first clean decode wins.
    pub encodings: Vec<String>,
    /// Optional `User-Agent` header for image requests.
    pub user_agent: Option<String>,
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self {
            assets_dir_name: "assets".to_string(),
            fetch_timeout_secs: 30,
            connect_timeout_secs: 15,
            max_redirects: 10,
            max_concurrent_fetches: 1,
            encodings: ["utf-8", "gbk", "gb2312", "latin-1"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            user_agent: None,
        }
    }
}

impl LocalizerConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mdlocal")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<LocalizerConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = LocalizerConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: LocalizerConfig = toml::from_str(&data)?;
    Ok(cfg)
}
