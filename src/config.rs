use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  pub default_guild: Option<String>,
  /// Custom title for header (defaults to "blockwatch")
  pub title: Option<String>,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the dashboard REST API
  pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// How long a cached block-list is served without refetching
  #[serde(default = "default_ttl_ms")]
  pub ttl_ms: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      ttl_ms: default_ttl_ms(),
    }
  }
}

impl CacheConfig {
  pub fn ttl(&self) -> Duration {
    Duration::from_millis(self.ttl_ms)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
  /// How long manual refresh stays disabled after use
  #[serde(default = "default_cooldown_ms")]
  pub cooldown_ms: u64,
}

impl Default for RefreshConfig {
  fn default() -> Self {
    Self {
      cooldown_ms: default_cooldown_ms(),
    }
  }
}

impl RefreshConfig {
  pub fn cooldown(&self) -> Duration {
    Duration::from_millis(self.cooldown_ms)
  }
}

fn default_true() -> bool {
  true
}

fn default_ttl_ms() -> u64 {
  30_000
}

fn default_cooldown_ms() -> u64 {
  15_000
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./blockwatch.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/blockwatch/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/blockwatch/config.yaml\n\
                 with at least:\n\n  api:\n    url: https://dashboard.example.com/api"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("blockwatch.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("blockwatch").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(contents)
  }

  /// Get the API token from environment variables.
  ///
  /// Checks BLOCKWATCH_API_TOKEN first, then DASHBOARD_API_TOKEN as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("BLOCKWATCH_API_TOKEN")
      .or_else(|_| std::env::var("DASHBOARD_API_TOKEN"))
      .map_err(|_| {
        eyre!(
          "API token not found. Set BLOCKWATCH_API_TOKEN or DASHBOARD_API_TOKEN environment variable."
        )
      })
  }
}
