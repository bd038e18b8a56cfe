//! PagerDuty classic (offset based) pagination.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Pagination envelope returned alongside list payloads.
///
/// PagerDuty only fills `total` when `total=true` is requested, so it is
/// informational here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub more: bool,
    #[serde(default)]
    pub total: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct OffsetPage<T> {
    pub values: Vec<T>,
    pub info: PageInfo,
}

impl<T> OffsetPage<T> {
    /// A page is the last one when the API says so or it came back short.
    pub fn has_next(&self, requested_limit: u32) -> bool {
        self.info.more && self.values.len() as u32 >= requested_limit
    }

    pub fn next_offset(&self, requested_limit: u32) -> u32 {
        self.info.offset.unwrap_or(0) + self.info.limit.unwrap_or(requested_limit)
    }
}

#[async_trait]
pub trait Paginator<T>: Sync {
    async fn fetch_page(&self, offset: u32, limit: u32) -> Result<OffsetPage<T>>;

    async fn fetch_all(&self, limit: u32) -> Result<Vec<T>>
    where
        T: Send,
    {
        let mut all_items = Vec::new();
        let mut offset = 0;

        loop {
            debug!(offset, limit, "Fetching page");
            let page = self.fetch_page(offset, limit).await?;
            let has_next = page.has_next(limit);
            let next_offset = page.next_offset(limit).max(offset + 1);

            all_items.extend(page.values);

            if !has_next {
                debug!(total_items = all_items.len(), "Finished pagination");
                break;
            }

            offset = next_offset;
        }

        Ok(all_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakePages {
        items: Vec<u32>,
        requests: Mutex<Vec<(u32, u32)>>,
        claim_more: bool,
    }

    #[async_trait]
    impl Paginator<u32> for FakePages {
        async fn fetch_page(&self, offset: u32, limit: u32) -> Result<OffsetPage<u32>> {
            self.requests.lock().unwrap().push((offset, limit));
            let start = (offset as usize).min(self.items.len());
            let end = (start + limit as usize).min(self.items.len());
            Ok(OffsetPage {
                values: self.items[start..end].to_vec(),
                info: PageInfo {
                    limit: Some(limit),
                    offset: Some(offset),
                    more: self.claim_more || end < self.items.len(),
                    total: None,
                },
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_all_walks_offsets() {
        let pages = FakePages {
            items: (0..7).collect(),
            requests: Mutex::new(Vec::new()),
            claim_more: false,
        };

        let all = pages.fetch_all(3).await.unwrap();
        assert_eq!(all, (0..7).collect::<Vec<_>>());
        assert_eq!(*pages.requests.lock().unwrap(), vec![(0, 3), (3, 3), (6, 3)]);
    }

    #[tokio::test]
    async fn test_short_page_stops_even_if_more_is_set() {
        let pages = FakePages {
            items: (0..4).collect(),
            requests: Mutex::new(Vec::new()),
            claim_more: true,
        };

        let all = pages.fetch_all(3).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(pages.requests.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_page_info_defaults_when_fields_missing() {
        let info: PageInfo = serde_json::from_str("{}").unwrap();
        assert!(!info.more);
        assert!(info.limit.is_none());
        assert!(info.total.is_none());
    }
}
