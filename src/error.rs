use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("{0} is required")]
    InvalidInput(&'static str),

    #[error("failed to load page: {0}")]
    Load(String),

    #[error("embedded page state not found: {0}")]
    Extraction(String),

    #[error("watermark removal API rate limit reached, retry in a few seconds")]
    RateLimited,

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("user {0} has no secUid, cannot list videos")]
    MissingSecUid(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Rejects empty or whitespace-only arguments before anything touches the network.
pub fn require<'a>(value: &'a str, name: &'static str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ScrapeError::InvalidInput(name));
    }
    Ok(trimmed)
}
