use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://www.tiktok.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
pub const DEFAULT_WATERMARK_API: &str = "https://www.tikwm.com/api/";
pub const DEFAULT_WATERMARK_HOST: &str = "https://www.tikwm.com";

/// How page state is obtained: plain fetch, headless rendering, or probe-then-fallback.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    #[default]
    Auto,
    Direct,
    Rendered,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub strategy: FetchStrategy,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    pub browser: BrowserConfig,
    pub watermark: WatermarkConfig,
    pub download: DownloadConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub cookie_file: Option<PathBuf>,
    pub pool_max_idle_per_host: usize,
    pub base_url: String,
    pub page_size: u32,
    /// Replaces the built-in browser headers (and cookies) on page fetches.
    pub headers: Option<BTreeMap<String, String>>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cookie_file: None,
            pool_max_idle_per_host: 20,
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: 35,
            headers: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct BrowserConfig {
    pub chrome_path: Option<PathBuf>,
}

impl BrowserConfig {
    /// `CHROME_PATH` wins over the config file so containers can point at their own build.
    pub fn resolved_chrome_path(&self) -> Option<PathBuf> {
        std::env::var_os("CHROME_PATH")
            .map(PathBuf::from)
            .or_else(|| self.chrome_path.clone())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WatermarkConfig {
    pub api_url: String,
    pub host: String,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_WATERMARK_API.to_string(),
            host: DEFAULT_WATERMARK_HOST.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DownloadConfig {
    pub directory: Option<PathBuf>,
}

impl DownloadConfig {
    /// Base directory under which per-user download folders are created.
    pub fn base_directory(&self) -> PathBuf {
        if let Some(dir) = &self.directory {
            return dir.clone();
        }

        dirs::download_dir()
            .map(|dir| dir.join("tokscrape"))
            .unwrap_or_else(|| PathBuf::from("downloads"))
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn get_logging_format(&self) -> &str {
        &self.logging.format
    }
}
