use super::{CookieJar, FetchOptions, HttpResponse, HttpTransport};
use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, CACHE_CONTROL, CONNECTION, CONTENT_TYPE, COOKIE,
    USER_AGENT,
};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use url::Url;

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// reqwest-backed transport with a spoofed desktop browser header set.
///
/// The connection pool caps idle keep-alive connections per host; reqwest has
/// no limit on concurrent sockets, so bursts above the idle cap open extra
/// connections.
pub struct PageFetcher {
    client: reqwest::Client,
    default_headers: HeaderMap,
    cookies: Option<CookieJar>,
}

impl PageFetcher {
    pub fn new(user_agent: &str, pool_max_idle_per_host: usize) -> Result<Self> {
        // Accept-Encoding is left to reqwest so gzip/brotli bodies are decoded for us.
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(pool_max_idle_per_host)
            .tcp_keepalive(std::time::Duration::from_secs(60))
            .build()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|e| ScrapeError::Load(format!("invalid user agent: {e}")))?,
        );
        default_headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        default_headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        default_headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        Ok(Self {
            client,
            default_headers,
            cookies: None,
        })
    }

    pub fn with_cookies(mut self, jar: CookieJar) -> Self {
        if !jar.is_empty() {
            self.cookies = Some(jar);
        }
        self
    }

    fn headers_for(&self, url: &Url, options: Option<&FetchOptions>) -> HeaderMap {
        if let Some(options) = options {
            return custom_headers(options);
        }

        let mut headers = self.default_headers.clone();
        let cookie = self
            .cookies
            .as_ref()
            .zip(url.host_str())
            .and_then(|(jar, host)| jar.header_for(host));

        if let Some(cookie) = cookie {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    headers.insert(COOKIE, value);
                }
                Err(e) => warn!("Dropping unencodable cookie header: {}", e),
            }
        }

        headers
    }
}

fn custom_headers(options: &FetchOptions) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in &options.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!("Ignoring invalid header {}", name),
        }
    }
    headers
}

fn parse_url(url: &str, query: &[(&str, &str)]) -> Result<Url> {
    let parsed = if query.is_empty() {
        Url::parse(url)
    } else {
        Url::parse_with_params(url, query)
    };
    parsed.map_err(|e| ScrapeError::Load(format!("invalid URL {url}: {e}")))
}

#[async_trait]
impl HttpTransport for PageFetcher {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        options: Option<&FetchOptions>,
    ) -> Result<HttpResponse> {
        let url = parse_url(url, query)?;
        let headers = self.headers_for(&url, options);
        debug!("GET {}", url);

        let response = self.client.get(url).headers(headers).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("Received {} bytes with status {}", body.len(), status);

        Ok(HttpResponse { status, body })
    }

    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<HttpResponse> {
        let url = parse_url(url, &[])?;
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .headers(self.default_headers.clone())
            .header(
                CONTENT_TYPE,
                "application/x-www-form-urlencoded; charset=UTF-8",
            )
            .body(body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }

    async fn stream_to_file(&self, url: &str, dest: &Path) -> Result<u64> {
        let url = parse_url(url, &[])?;
        let headers = self.headers_for(&url, None);
        debug!("Streaming {} to {}", url, dest.display());

        let mut response = self.client.get(url).headers(headers).send().await?;
        if !response.status().is_success() {
            return Err(ScrapeError::Upstream(format!(
                "media download failed: HTTP {}",
                response.status()
            )));
        }

        let written = write_body(&mut response, dest).await;
        if written.is_err() {
            match tokio::fs::remove_file(dest).await {
                Ok(()) => debug!("Removed partial download {}", dest.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Could not remove partial download {}: {}", dest.display(), e),
            }
        }
        written
    }
}

async fn write_body(response: &mut reqwest::Response, dest: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(dest).await?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(written)
}
