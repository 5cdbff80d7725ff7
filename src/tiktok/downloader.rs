use super::watermark::WatermarkResolver;
use crate::error::Result;
use crate::http::HttpTransport;
use crate::models::Video;
use crate::utils::format_count;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Target directory. Defaults to `<download base>/<username>`.
    pub path: Option<PathBuf>,
    /// Fetch the third-party watermark-free file instead of the platform one.
    pub no_watermark: bool,
}

#[derive(Debug, Serialize)]
pub struct DownloadReport {
    pub directory: PathBuf,
    pub saved: Vec<PathBuf>,
    pub skipped: Vec<String>,
    pub bytes: u64,
}

pub struct BulkDownloader {
    transport: Arc<dyn HttpTransport>,
    watermark: WatermarkResolver,
}

impl BulkDownloader {
    pub fn new(transport: Arc<dyn HttpTransport>, watermark: WatermarkResolver) -> Self {
        Self {
            transport,
            watermark,
        }
    }

    /// Streams every video into `directory`, one at a time. Only watermark
    /// resolution failures are skipped; anything else aborts the batch.
    pub async fn download_all(
        &self,
        videos: &[Video],
        directory: &Path,
        no_watermark: bool,
    ) -> Result<DownloadReport> {
        prepare_directory(directory).await?;
        info!(
            "Downloading {} videos into {}",
            videos.len(),
            directory.display()
        );

        let mut report = DownloadReport {
            directory: directory.to_path_buf(),
            saved: Vec::new(),
            skipped: Vec::new(),
            bytes: 0,
        };

        for video in videos {
            let media_url = if no_watermark {
                match self.watermark.resolve(&video.url).await {
                    Ok(url) => url,
                    Err(e) => {
                        warn!("Skipping {}: {}", video.id, e);
                        report.skipped.push(video.id.clone());
                        continue;
                    }
                }
            } else {
                match &video.download_url {
                    Some(url) => url.clone(),
                    None => {
                        warn!("Skipping {}: no media URL", video.id);
                        report.skipped.push(video.id.clone());
                        continue;
                    }
                }
            };

            let dest = directory.join(video.file_name());
            let written = self.transport.stream_to_file(&media_url, &dest).await?;
            info!("Saved {} ({} bytes)", dest.display(), format_count(written));

            report.bytes += written;
            report.saved.push(dest);
        }

        info!(
            "Downloaded {} videos ({} bytes), skipped {}",
            report.saved.len(),
            format_count(report.bytes),
            report.skipped.len()
        );
        Ok(report)
    }
}

/// Replaces whatever sits at `path` with a fresh empty directory.
pub async fn prepare_directory(path: &Path) -> Result<()> {
    match tokio::fs::symlink_metadata(path).await {
        Ok(meta) if meta.is_dir() => {
            warn!("Removing existing directory {}", path.display());
            tokio::fs::remove_dir_all(path).await?;
        }
        Ok(_) => {
            warn!("Removing existing file {}", path.display());
            tokio::fs::remove_file(path).await?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    tokio::fs::create_dir_all(path).await?;
    Ok(())
}
