mod cookies;
mod fetcher;
mod renderer;

pub use cookies::CookieJar;
pub use fetcher::PageFetcher;
pub use renderer::{HeadlessRenderer, Renderer};

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Per-request header set. When given, it replaces the default browser
/// headers and the cookie header entirely.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub headers: Vec<(String, String)>,
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET `url` with `query` appended. The body is returned whatever the status.
    async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        options: Option<&FetchOptions>,
    ) -> Result<HttpResponse>;

    /// POST `form` as `application/x-www-form-urlencoded`.
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<HttpResponse>;

    /// Stream the body of `url` into `dest`, returning the number of bytes written.
    async fn stream_to_file(&self, url: &str, dest: &Path) -> Result<u64>;
}
