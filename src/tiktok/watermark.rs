use crate::error::{Result, ScrapeError};
use crate::http::HttpTransport;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// tikwm reports its own rate limiting with this code.
const RATE_LIMITED_CODE: i64 = -1;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: i64,
    msg: Option<String>,
    data: Option<ApiData>,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    hdplay: Option<String>,
}

/// Resolves watermark-free media URLs through the public tikwm API.
#[derive(Clone)]
pub struct WatermarkResolver {
    transport: Arc<dyn HttpTransport>,
    api_url: String,
    host: String,
}

impl WatermarkResolver {
    pub fn new(transport: Arc<dyn HttpTransport>, api_url: &str, host: &str) -> Self {
        Self {
            transport,
            api_url: api_url.to_string(),
            host: host.trim_end_matches('/').to_string(),
        }
    }

    pub async fn resolve(&self, link: &str) -> Result<String> {
        debug!("Resolving watermark-free URL for {}", link);
        let form = [
            ("url", link),
            ("count", "12"),
            ("cursor", "0"),
            ("web", "1"),
            ("hd", "1"),
        ];

        let response = self.transport.post_form(&self.api_url, &form).await?;
        if !response.is_success() {
            return Err(ScrapeError::Upstream(format!(
                "watermark removal API returned HTTP {}",
                response.status
            )));
        }

        let parsed: ApiResponse = serde_json::from_str(&response.body)?;
        self.media_url(parsed)
    }

    fn media_url(&self, response: ApiResponse) -> Result<String> {
        match response.code {
            0 => {}
            RATE_LIMITED_CODE => return Err(ScrapeError::RateLimited),
            code => {
                return Err(ScrapeError::Upstream(format!(
                    "watermark removal API error {}: {}",
                    code,
                    response.msg.unwrap_or_default()
                )))
            }
        }

        let path = response
            .data
            .and_then(|data| data.hdplay)
            .filter(|path| !path.is_empty())
            .ok_or_else(|| {
                ScrapeError::Upstream("watermark removal API returned no media path".to_string())
            })?;

        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(path);
        }
        if path.starts_with('/') {
            Ok(format!("{}{}", self.host, path))
        } else {
            Ok(format!("{}/{}", self.host, path))
        }
    }
}
