use crate::error::Result;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cookie {
    domain: String,
    name: String,
    value: String,
}

/// Cookies loaded from a Netscape-format `cookies.txt` export.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let jar = Self::parse(&content);
        info!("Loaded {} cookies from {}", jar.len(), path.display());
        Ok(jar)
    }

    pub fn parse(content: &str) -> Self {
        let mut cookies = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            let line = line.strip_prefix("#HttpOnly_").unwrap_or(line);

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 7 {
                continue;
            }

            cookies.push(Cookie {
                domain: parts[0].trim_start_matches('.').to_ascii_lowercase(),
                name: parts[5].to_string(),
                value: parts[6].to_string(),
            });
        }

        Self { cookies }
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// `name=value; name=value` for every cookie whose domain covers `host`.
    pub fn header_for(&self, host: &str) -> Option<String> {
        let host = host.to_ascii_lowercase();
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .filter(|c| host == c.domain || host.ends_with(&format!(".{}", c.domain)))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();

        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}
