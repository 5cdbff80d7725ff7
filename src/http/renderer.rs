use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptionsBuilder};
use std::ffi::OsStr;
use std::path::PathBuf;
use tracing::{debug, info};

#[async_trait]
pub trait Renderer: Send + Sync {
    /// Human-readable name of the renderer
    fn name(&self) -> &'static str;

    /// Navigate to `url` and return the rendered HTML, or `None` when the
    /// page produced no content.
    async fn render(&self, url: &str) -> Result<Option<String>>;
}

/// Launches a fresh headless Chrome for every call; nothing is pooled.
pub struct HeadlessRenderer {
    chrome_path: Option<PathBuf>,
}

impl HeadlessRenderer {
    pub fn new(chrome_path: Option<PathBuf>) -> Self {
        Self { chrome_path }
    }

    fn render_blocking(url: &str, chrome_path: Option<PathBuf>) -> anyhow::Result<String> {
        // Sandbox off: expected to run in containers without user namespaces.
        let args = [
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-setuid-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--disable-gpu"),
        ];

        let mut builder = LaunchOptionsBuilder::default();
        builder
            .headless(true)
            .sandbox(false)
            .window_size(Some((1920, 1080)))
            .args(args.to_vec());
        if let Some(path) = chrome_path {
            builder.path(Some(path));
        }
        let options = builder.build()?;

        let browser = Browser::new(options)?;
        let tab = browser.new_tab()?;

        info!("Rendering {} in headless browser", url);
        tab.navigate_to(url)?;
        tab.wait_until_navigated()?;

        let content = tab.get_content()?;
        debug!("Rendered {} bytes from {}", content.len(), url);
        Ok(content)
    }
}

#[async_trait]
impl Renderer for HeadlessRenderer {
    fn name(&self) -> &'static str {
        "headless-chrome"
    }

    async fn render(&self, url: &str) -> Result<Option<String>> {
        let url = url.to_string();
        let chrome_path = self.chrome_path.clone();

        let content = tokio::task::spawn_blocking(move || Self::render_blocking(&url, chrome_path))
            .await
            .map_err(|e| ScrapeError::Browser(format!("render task failed: {e}")))?
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;

        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(content))
    }
}
