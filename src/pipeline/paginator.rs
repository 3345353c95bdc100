use futures::stream::{self, Stream, TryStreamExt};
use gitscout_schema::SearchUsersResponse;
use std::pin::pin;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::UpstreamConfig;
use crate::error::ScoutError;
use crate::store::{Ledger, PartitionStore};
use crate::types::{IdentitySummary, Partition};
use crate::upstream::{Expect, GithubApi, Throttle};

/// One page of search hits, in upstream order.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub page: u32,
    pub total_count: u64,
    pub incomplete_results: bool,
    pub items: Vec<IdentitySummary>,
}

/// Whether a page after `page` exists for `total_count` hits.
pub fn has_next_page(page: u32, page_size: u32, total_count: u64) -> bool {
    u64::from(page) * u64::from(page_size) < total_count
}

pub struct SearchPaginator {
    api: Arc<GithubApi>,
    throttle: Arc<Throttle>,
    max_results: u64,
}

impl SearchPaginator {
    pub fn new(api: Arc<GithubApi>, throttle: Arc<Throttle>, cfg: &UpstreamConfig) -> Self {
        Self {
            api,
            throttle,
            max_results: cfg.max_results,
        }
    }

    pub async fn fetch_page(&self, partition: &Partition, page: u32) -> Result<SearchPage, ScoutError> {
        let subject = partition.to_string();
        let body = self
            .throttle
            .execute(&subject, Expect::Field("items"), || {
                self.api.search_users(partition, page)
            })
            .await?;
        let resp: SearchUsersResponse = serde_json::from_value(body)?;

        if resp.incomplete_results {
            warn!(page, total_count = resp.total_count, "Search index reported incomplete results");
        }

        Ok(SearchPage {
            page,
            total_count: resp.total_count,
            incomplete_results: resp.incomplete_results,
            items: resp.items.into_iter().map(IdentitySummary::from).collect(),
        })
    }

    /// Lazily walks pages 1, 2, ... while the latest `total_count` says more remain.
    pub fn pages<'a>(
        &'a self,
        partition: &'a Partition,
    ) -> impl Stream<Item = Result<SearchPage, ScoutError>> + 'a {
        let page_size = self.api.page_size();
        stream::try_unfold(Some(1u32), move |cursor| async move {
            let Some(page) = cursor else {
                return Ok(None);
            };
            let result = self.fetch_page(partition, page).await?;

            if page == 1 && result.total_count > self.max_results {
                warn!(
                    total_count = result.total_count,
                    max_results = self.max_results,
                    "Search matches more identities than the API exposes; narrow the window to reach the rest"
                );
            }
            let reachable = result.total_count.min(self.max_results);
            let next = has_next_page(page, page_size, reachable).then_some(page + 1);
            Ok(Some((result, next)))
        })
    }

    /// Every summary of a partition, page by page.
    pub fn summaries<'a>(
        &'a self,
        partition: &'a Partition,
    ) -> impl Stream<Item = Result<IdentitySummary, ScoutError>> + 'a {
        self.pages(partition)
            .map_ok(|page| stream::iter(page.items.into_iter().map(Ok)))
            .try_flatten()
    }

    /// Streams each page into `store` as it arrives, then records the partition in `ledger`.
    ///
    /// Returns the number of stored summaries. Nothing reaches the ledger if any page fails.
    pub async fn collect(
        &self,
        partition: &Partition,
        store: &PartitionStore,
        ledger: &Ledger,
    ) -> Result<u64, ScoutError> {
        let mut pages = pin!(self.pages(partition));
        let mut stored: u64 = 0;

        while let Some(page) = pages.try_next().await? {
            let written = store.append(partition, &page.items).await?;
            stored += written as u64;
            info!(
                page = page.page,
                items = written,
                total_count = page.total_count,
                stored,
                "Stored search page"
            );
        }

        if stored == 0 {
            store.touch(partition).await?;
        }
        ledger.record(partition, stored).await?;
        Ok(stored)
    }
}
