mod downloader;
mod pagination;
mod state;
mod strategy;
mod watermark;

pub use downloader::{DownloadOptions, DownloadReport};

use downloader::BulkDownloader;
use pagination::VideoLister;
use state::StateScript;
use strategy::StateResolver;
use watermark::WatermarkResolver;

use crate::config::Config;
use crate::error::{require, Result, ScrapeError};
use crate::http::{
    CookieJar, FetchOptions, HeadlessRenderer, HttpTransport, PageFetcher, Renderer,
};
use crate::models::raw::{SigiState, UniversalData};
use crate::models::{Music, User, Video};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct TikTokScraper {
    resolver: StateResolver,
    lister: VideoLister,
    watermark: WatermarkResolver,
    downloader: BulkDownloader,
    base_url: String,
    download_base: std::path::PathBuf,
}

impl TikTokScraper {
    pub fn new(config: &Config) -> Result<Self> {
        let mut fetcher =
            PageFetcher::new(&config.http.user_agent, config.http.pool_max_idle_per_host)?;
        if let Some(path) = &config.http.cookie_file {
            fetcher = fetcher.with_cookies(CookieJar::load(path)?);
        }

        let renderer = HeadlessRenderer::new(config.browser.resolved_chrome_path());
        Ok(Self::with_parts(Arc::new(fetcher), Arc::new(renderer), config))
    }

    pub fn with_parts(
        transport: Arc<dyn HttpTransport>,
        renderer: Arc<dyn Renderer>,
        config: &Config,
    ) -> Self {
        let watermark = WatermarkResolver::new(
            transport.clone(),
            &config.watermark.api_url,
            &config.watermark.host,
        );

        let options = config.http.headers.as_ref().map(|headers| FetchOptions {
            headers: headers
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        });

        Self {
            resolver: StateResolver::new(transport.clone(), renderer, config.strategy)
                .with_options(options),
            lister: VideoLister::new(
                transport.clone(),
                &config.http.base_url,
                config.http.page_size,
            ),
            downloader: BulkDownloader::new(transport, watermark.clone()),
            watermark,
            base_url: config.http.base_url.trim_end_matches('/').to_string(),
            download_base: config.download.base_directory(),
        }
    }

    async fn universal_data(&self, url: &str) -> Result<UniversalData> {
        let state = self.resolver.resolve(url, StateScript::Universal).await?;
        Ok(serde_json::from_value(state.into_value())?)
    }

    /// Video metadata plus its watermark-free URL. `None` when the platform
    /// answers with its id-0 "not found" placeholder.
    pub async fn video(&self, link: &str) -> Result<Option<Video>> {
        let link = require(link, "video link")?;
        info!("Fetching video {}", link);

        let detail = self
            .universal_data(link)
            .await?
            .default_scope
            .video_detail
            .ok_or_else(|| ScrapeError::Extraction("no video detail in page state".into()))?;
        let status = detail.status_code;
        let item = detail
            .item_info
            .and_then(|info| info.item_struct)
            .ok_or_else(|| {
                ScrapeError::Extraction(format!("no item in video detail (status {status:?})"))
            })?;

        let Some(video) = Video::from_item(&item, Some(link)) else {
            info!("Video {} not found", link);
            return Ok(None);
        };

        let no_watermark = self.watermark.resolve(link).await?;
        Ok(Some(video.with_no_watermark_url(no_watermark)))
    }

    pub async fn user(&self, username: &str) -> Result<User> {
        let username = require(username, "username")?;
        let username = username.trim_start_matches('@');
        info!("Fetching user {}", username);

        let url = format!("{}/@{}", self.base_url, username);
        let info = self
            .universal_data(&url)
            .await?
            .default_scope
            .user_detail
            .and_then(|detail| detail.user_info)
            .ok_or_else(|| ScrapeError::Extraction("no user detail in page state".into()))?;
        let user = info
            .user
            .ok_or_else(|| ScrapeError::Extraction("no user in user detail".into()))?;

        Ok(User::from_raw(&user, info.stats.as_ref()))
    }

    pub async fn all_videos_from_user(&self, username: &str) -> Result<Vec<Video>> {
        let user = self.user(username).await?;
        let handle = user.unique_id.clone().unwrap_or_else(|| username.to_string());
        let sec_uid = user
            .sec_uid
            .ok_or_else(|| ScrapeError::MissingSecUid(handle.clone()))?;

        let items = self.lister.list(&sec_uid).await?;
        let videos: Vec<Video> = items
            .iter()
            .filter_map(|item| {
                let url = item
                    .id
                    .as_deref()
                    .map(|id| crate::models::canonical_video_url(Some(handle.as_str()), id));
                Video::from_item(item, url.as_deref())
            })
            .collect();

        info!("Found {} videos for {}", videos.len(), handle);
        Ok(videos)
    }

    /// Music track of the video at `link`.
    pub async fn music(&self, link: &str) -> Result<Music> {
        let link = require(link, "video link")?;
        info!("Fetching music of {}", link);

        let music = self
            .universal_data(link)
            .await?
            .default_scope
            .video_detail
            .and_then(|detail| detail.item_info)
            .and_then(|info| info.item_struct)
            .and_then(|item| item.music)
            .ok_or_else(|| ScrapeError::Extraction("no music in video detail".into()))?;

        Ok(Music::from(&music))
    }

    /// Videos of a challenge page. Uses the legacy `ItemList`/`ItemModule` layout.
    pub async fn hashtag(&self, tag: &str) -> Result<Vec<Video>> {
        let tag = require(tag, "hashtag")?;
        let tag = tag.trim_start_matches('#');
        info!("Fetching hashtag {}", tag);

        let url = format!("{}/tag/{}", self.base_url, tag);
        let state = self.resolver.resolve(&url, StateScript::Sigi).await?;
        let state: SigiState = serde_json::from_value(state.into_value())?;

        let ids = state
            .item_list
            .get("challenge")
            .map(|list| list.list.as_slice())
            .unwrap_or_default();
        debug!("Challenge {} lists {} items", tag, ids.len());

        let mut videos = Vec::with_capacity(ids.len());
        for id in ids {
            match state.item_module.get(id) {
                Some(item) => videos.extend(Video::from_item(item, None)),
                None => warn!("Item {} listed for #{} but missing from ItemModule", id, tag),
            }
        }

        Ok(videos)
    }

    pub async fn download_all_videos_from_user(
        &self,
        username: &str,
        options: &DownloadOptions,
    ) -> Result<DownloadReport> {
        let username = require(username, "username")?;
        let directory = options
            .path
            .clone()
            .unwrap_or_else(|| self.download_base.join(username.trim_start_matches('@')));

        let videos = self.all_videos_from_user(username).await?;
        self.downloader
            .download_all(&videos, &directory, options.no_watermark)
            .await
    }

    pub async fn no_watermark(&self, link: &str) -> Result<String> {
        let link = require(link, "video link")?;
        self.watermark.resolve(link).await
    }
}
