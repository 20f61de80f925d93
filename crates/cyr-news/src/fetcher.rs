use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use cyr_core::entities::Article;

use crate::cache::{ArticleCache, CacheKey};
use crate::error::FetchError;
use crate::{SearchProvider, SearchQuery};

/// Outcome of one fetch run across all keyword queries.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Deduplicated, most recent first.
    pub articles: Vec<Article>,
    pub failures: Vec<FetchError>,
    pub queries: usize,
    pub cache_hits: usize,
}

impl FetchReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.queries - self.failures.len()
    }
}

/// Runs keyword queries through the cache and the search provider.
pub struct NewsFetcher<S, C> {
    provider: S,
    cache: C,
    recency_days: u32,
    max_results: u32,
}

impl<S: SearchProvider, C: ArticleCache> NewsFetcher<S, C> {
    pub const fn new(provider: S, cache: C, recency_days: u32, max_results: u32) -> Self {
        Self {
            provider,
            cache,
            recency_days,
            max_results,
        }
    }

    pub const fn provider(&self) -> &S {
        &self.provider
    }

    pub const fn cache(&self) -> &C {
        &self.cache
    }

    /// Fetch every query using today's (UTC) cache window.
    pub async fn fetch(&self, queries: &[String]) -> FetchReport {
        self.fetch_as_of(queries, Utc::now().date_naive()).await
    }

    /// Fetch every query, keying the cache on `date`.
    ///
    /// A failing query is logged and recorded in the report; the remaining
    /// queries still run.
    pub async fn fetch_as_of(&self, queries: &[String], date: NaiveDate) -> FetchReport {
        let mut report = FetchReport {
            queries: queries.len(),
            ..FetchReport::default()
        };
        let mut collected = Vec::new();

        for keywords in queries {
            let key = CacheKey::new(keywords.clone(), self.recency_days, date);
            match self.cache.get(&key) {
                Ok(Some(articles)) => {
                    tracing::debug!(query = %keywords, count = articles.len(), "cache hit");
                    report.cache_hits += 1;
                    collected.extend(articles);
                    continue;
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(query = %keywords, error = %e, "ignoring unreadable cache entry"),
            }

            let result = match SearchQuery::new(keywords.clone(), self.recency_days, self.max_results) {
                Ok(query) => self.provider.search(&query).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(articles) => {
                    tracing::info!(query = %keywords, count = articles.len(), "fetched articles");
                    if let Err(e) = self.cache.put(&key, &articles) {
                        tracing::warn!(query = %keywords, error = %e, "failed to cache articles");
                    }
                    collected.extend(articles);
                }
                Err(source) => {
                    tracing::warn!(query = %keywords, error = %source, "query failed, skipping");
                    report.failures.push(FetchError {
                        query: keywords.clone(),
                        source,
                    });
                }
            }
        }

        report.articles = dedupe_and_order(collected);
        report
    }
}

/// Drop repeated URLs (first occurrence wins), then order most recent first.
/// Undated articles go last; equal dates keep their relevance order.
#[must_use]
pub fn dedupe_and_order(articles: Vec<Article>) -> Vec<Article> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Article> = articles
        .into_iter()
        .filter(|a| seen.insert(a.url.clone()))
        .collect();
    unique.sort_by(|a, b| b.published_date.cmp(&a.published_date));
    unique
}
