use crate::error::{Result, ScrapeError};
use crate::http::HttpTransport;
use crate::models::raw::{ItemListPage, RawItem};
use std::sync::Arc;
use tracing::{debug, info};

/// Walks the cursor-paginated post listing of one account.
pub struct VideoLister {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
    page_size: String,
}

impl VideoLister {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str, page_size: u32) -> Self {
        Self {
            transport,
            endpoint: format!("{}/api/post/item_list/", base_url.trim_end_matches('/')),
            page_size: page_size.to_string(),
        }
    }

    /// Every item across all pages, in page-then-item order. Any failed page
    /// aborts the whole listing.
    pub async fn list(&self, sec_uid: &str) -> Result<Vec<RawItem>> {
        let mut items = Vec::new();
        let mut cursor = String::new();
        let mut has_more = true;
        let mut pages = 0usize;

        while has_more {
            let page = self.fetch_page(sec_uid, &cursor).await?;
            pages += 1;
            debug!(
                "Page {} at cursor {:?}: {} items, has_more={}",
                pages,
                cursor,
                page.item_list.len(),
                page.has_more
            );

            items.extend(page.item_list);
            has_more = page.has_more;

            if has_more {
                cursor = page.cursor.ok_or_else(|| {
                    ScrapeError::Extraction(format!(
                        "listing page {pages} reports more items but no cursor"
                    ))
                })?;
            }
        }

        info!("Listed {} items over {} pages", items.len(), pages);
        Ok(items)
    }

    async fn fetch_page(&self, sec_uid: &str, cursor: &str) -> Result<ItemListPage> {
        let query = [
            ("aid", "1988"),
            ("count", self.page_size.as_str()),
            ("secUid", sec_uid),
            ("cursor", cursor),
        ];
        let response = self.transport.get(&self.endpoint, &query, None).await?;
        Ok(serde_json::from_str(&response.body)?)
    }
}
