pub mod de;
pub mod raw;

use crate::utils::format_epoch_date;
use raw::{AuthorField, RawAuthor, RawItem, RawMusic, RawUserStats};
use serde::Serialize;

pub const NO_BIO_LINK: &str = "none";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthorSummary {
    pub id: Option<String>,
    pub unique_id: Option<String>,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Video {
    pub id: String,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub height: Option<u64>,
    pub width: Option<u64>,
    pub duration: Option<u64>,
    /// Resolution label such as `720p`.
    pub ratio: Option<String>,
    pub share_count: Option<u64>,
    pub like_count: Option<u64>,
    pub comment_count: Option<u64>,
    pub play_count: Option<u64>,
    /// Platform-hosted download URL (`downloadAddr`).
    pub download_url: Option<String>,
    /// Platform-hosted streaming URL (`playAddr`).
    pub play_url: Option<String>,
    /// Third-party watermark-free URL, only filled when resolved.
    pub no_watermark_url: Option<String>,
    pub cover: Option<String>,
    pub dynamic_cover: Option<String>,
    pub format: Option<String>,
    pub author: Option<AuthorSummary>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Option<String>,
    pub unique_id: Option<String>,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub signature: Option<String>,
    pub created_at: Option<String>,
    pub verified: Option<bool>,
    pub sec_uid: Option<String>,
    pub bio_link: String,
    pub private_account: Option<bool>,
    pub follower_count: Option<u64>,
    pub following_count: Option<u64>,
    pub heart_count: Option<u64>,
    pub video_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Music {
    pub id: Option<String>,
    pub title: Option<String>,
    pub play_url: Option<String>,
    pub cover_large: Option<String>,
    pub cover_thumb: Option<String>,
    pub author_name: Option<String>,
    pub duration: Option<u64>,
    pub original: Option<bool>,
    pub album: Option<String>,
}

/// Page URL of a video, using the author's handle when known.
pub fn canonical_video_url(handle: Option<&str>, id: &str) -> String {
    match handle {
        Some(handle) if !handle.is_empty() => {
            format!("https://www.tiktok.com/@{handle}/video/{id}")
        }
        _ => format!("https://m.tiktok.com/v/{id}.html"),
    }
}

fn is_missing_id(id: Option<&str>) -> bool {
    match id.map(str::trim) {
        None | Some("") | Some("0") => true,
        Some(_) => false,
    }
}

impl AuthorSummary {
    fn from_item(item: &RawItem) -> Option<Self> {
        match &item.author {
            Some(AuthorField::Full(author)) => Some(Self {
                id: author.id.clone(),
                unique_id: author.unique_id.clone(),
                nickname: author.nickname.clone(),
                avatar: author.avatar_thumb.clone(),
            }),
            Some(AuthorField::Handle(handle)) => Some(Self {
                id: item.author_id.clone(),
                unique_id: Some(handle.clone()),
                nickname: item.nickname.clone(),
                avatar: item.avatar_thumb.clone(),
            }),
            None => None,
        }
    }
}

impl Video {
    /// Maps a raw item, returning `None` for the platform's "not found"
    /// placeholder whose id is `0`.
    pub fn from_item(item: &RawItem, page_url: Option<&str>) -> Option<Self> {
        if is_missing_id(item.id.as_deref()) {
            return None;
        }
        let id = item.id.clone()?;

        let author = AuthorSummary::from_item(item);
        let url = match page_url {
            Some(url) => url.to_string(),
            None => canonical_video_url(
                author.as_ref().and_then(|a| a.unique_id.as_deref()),
                &id,
            ),
        };

        let video = item.video.clone().unwrap_or_default();
        let stats = item.stats.clone().unwrap_or_default();

        Some(Self {
            description: item.desc.clone(),
            created_at: item.create_time.and_then(format_epoch_date),
            height: video.height,
            width: video.width,
            duration: video.duration,
            ratio: video.ratio,
            share_count: stats.share_count,
            like_count: stats.digg_count,
            comment_count: stats.comment_count,
            play_count: stats.play_count,
            download_url: video.download_addr,
            play_url: video.play_addr,
            no_watermark_url: None,
            cover: video.cover,
            dynamic_cover: video.dynamic_cover,
            format: video.format,
            author,
            url,
            id,
        })
    }

    pub fn with_no_watermark_url(mut self, url: String) -> Self {
        self.no_watermark_url = Some(url);
        self
    }

    /// `<id>_<resolution>.<format>`
    pub fn file_name(&self) -> String {
        let resolution = self
            .ratio
            .clone()
            .filter(|r| !r.is_empty())
            .or_else(|| self.height.map(|h| format!("{h}p")))
            .unwrap_or_else(|| "unknown".to_string());
        let format = self
            .format
            .as_deref()
            .filter(|f| !f.is_empty())
            .unwrap_or("mp4");
        format!("{}_{}.{}", self.id, resolution, format)
    }
}

impl User {
    pub fn from_raw(user: &RawAuthor, stats: Option<&RawUserStats>) -> Self {
        let stats = stats.cloned().unwrap_or_default();

        Self {
            id: user.id.clone(),
            unique_id: user.unique_id.clone(),
            nickname: user.nickname.clone(),
            avatar: user.avatar_larger.clone(),
            signature: user.signature.as_deref().map(|s| s.trim().to_string()),
            created_at: user.create_time.and_then(format_epoch_date),
            verified: user.verified,
            sec_uid: user.sec_uid.clone().filter(|s| !s.is_empty()),
            bio_link: user
                .bio_link
                .as_ref()
                .and_then(|b| b.link.clone())
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| NO_BIO_LINK.to_string()),
            private_account: user.private_account,
            follower_count: stats.follower_count,
            following_count: stats.following_count,
            heart_count: stats.heart_count,
            video_count: stats.video_count,
        }
    }
}

impl From<&RawMusic> for Music {
    fn from(music: &RawMusic) -> Self {
        Self {
            id: music.id.clone(),
            title: music.title.clone(),
            play_url: music.play_url.clone(),
            cover_large: music.cover_large.clone(),
            cover_thumb: music.cover_thumb.clone(),
            author_name: music.author_name.clone(),
            duration: music.duration,
            original: music.original,
            album: music.album.clone(),
        }
    }
}
