//! # cyr-news
//!
//! Fetches recent cybersecurity news for cyrisk.
//!
//! - [`SearchProvider`]: the search collaborator seam, implemented for the
//!   Google Custom Search JSON API by [`GoogleSearchClient`]
//! - [`ArticleCache`]: key-value cache keyed by query + date window, backed by
//!   memory ([`MemoryCache`]) or the filesystem ([`FsCache`])
//! - [`NewsFetcher`]: runs every keyword query through cache and provider,
//!   isolates per-query failures, and deduplicates by URL

pub mod cache;
mod error;
mod fetcher;
pub mod google;
mod http;

pub use cache::{ArticleCache, CacheKey, FsCache, MemoryCache};
pub use error::{CacheError, FetchError, SearchError};
pub use fetcher::{FetchReport, NewsFetcher, dedupe_and_order};
pub use google::GoogleSearchClient;

use std::future::Future;

use cyr_core::entities::Article;

/// A validated keyword query with its recency window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    keywords: String,
    recency_days: u32,
    max_results: u32,
}

impl SearchQuery {
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidQuery`] for blank keywords or a zero-day
    /// window.
    pub fn new(
        keywords: impl Into<String>,
        recency_days: u32,
        max_results: u32,
    ) -> Result<Self, SearchError> {
        let keywords = keywords.into();
        if keywords.trim().is_empty() {
            return Err(SearchError::InvalidQuery("keywords must not be empty".into()));
        }
        if recency_days == 0 {
            return Err(SearchError::InvalidQuery(
                "recency window must be at least one day".into(),
            ));
        }
        Ok(Self {
            keywords,
            recency_days,
            max_results: max_results.max(1),
        })
    }

    #[must_use]
    pub fn keywords(&self) -> &str {
        &self.keywords
    }

    #[must_use]
    pub const fn recency_days(&self) -> u32 {
        self.recency_days
    }

    #[must_use]
    pub const fn max_results(&self) -> u32 {
        self.max_results
    }
}

/// The search collaborator: keyword query in, ordered articles out.
pub trait SearchProvider: Send + Sync {
    /// Run one query. Results come back most relevant first.
    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<Vec<Article>, SearchError>> + Send;
}
