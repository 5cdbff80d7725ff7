use crate::error::{Result, ScrapeError};
use crate::http::{FetchOptions, HttpResponse, HttpTransport, Renderer};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted stand-in for the network.
#[derive(Default)]
pub struct FakeTransport {
    gets: Mutex<VecDeque<Option<HttpResponse>>>,
    posts: Mutex<VecDeque<HttpResponse>>,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_get(self, body: impl Into<String>) -> Self {
        self.with_get_status(200, body)
    }

    pub fn with_get_status(self, status: u16, body: impl Into<String>) -> Self {
        self.gets.lock().unwrap().push_back(Some(HttpResponse {
            status,
            body: body.into(),
        }));
        self
    }

    pub fn with_failed_get(self) -> Self {
        self.gets.lock().unwrap().push_back(None);
        self
    }

    pub fn with_post(self, status: u16, body: impl Into<String>) -> Self {
        self.posts.lock().unwrap().push_back(HttpResponse {
            status,
            body: body.into(),
        });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        _options: Option<&FetchOptions>,
    ) -> Result<HttpResponse> {
        let query: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
        if query.is_empty() {
            self.record(format!("GET {url}"));
        } else {
            self.record(format!("GET {url}?{}", query.join("&")));
        }

        match self.gets.lock().unwrap().pop_front() {
            Some(Some(response)) => Ok(response),
            Some(None) => Err(ScrapeError::Load(format!("scripted failure for {url}"))),
            None => Err(ScrapeError::Load(format!("no scripted response for {url}"))),
        }
    }

    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<HttpResponse> {
        let link = form
            .iter()
            .find(|(k, _)| *k == "url")
            .map(|(_, v)| *v)
            .unwrap_or_default();
        self.record(format!("POST {url} {link}"));

        self.posts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ScrapeError::Load(format!("no scripted response for {url}")))
    }

    async fn stream_to_file(&self, url: &str, dest: &Path) -> Result<u64> {
        self.record(format!("STREAM {url}"));
        let data = format!("media from {url}");
        tokio::fs::write(dest, data.as_bytes()).await?;
        Ok(data.len() as u64)
    }
}

pub struct FakeRenderer {
    content: Option<String>,
    calls: AtomicUsize,
}

impl FakeRenderer {
    pub fn new(content: Option<String>) -> Self {
        Self {
            content,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn render(&self, _url: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.content.clone())
    }
}
