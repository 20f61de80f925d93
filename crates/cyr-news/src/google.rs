//! Google Custom Search JSON API client.
//!
//! Open Graph metatags (`og:title`, `og:description`,
//! `article:published_time`) are preferred over the plain result fields
//! because they carry the publisher's own headline and date.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use cyr_config::SearchConfig;
use cyr_core::entities::Article;

use crate::error::SearchError;
use crate::http::check_response;
use crate::{SearchProvider, SearchQuery};

#[derive(serde::Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(serde::Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
    #[serde(rename = "displayLink")]
    display_link: Option<String>,
    pagemap: Option<PageMap>,
}

#[derive(serde::Deserialize)]
struct PageMap {
    #[serde(default)]
    metatags: Vec<HashMap<String, serde_json::Value>>,
}

impl SearchItem {
    fn metatag(&self, name: &str) -> Option<&str> {
        self.pagemap
            .as_ref()?
            .metatags
            .first()?
            .get(name)?
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn into_article(self, query: &str) -> Article {
        let title = self
            .metatag("og:title")
            .map_or_else(|| self.title.clone(), str::to_string);
        let snippet = self
            .metatag("og:description")
            .map_or_else(|| self.snippet.clone(), str::to_string);
        let published_date = self.metatag("article:published_time").and_then(parse_date);
        Article {
            title,
            snippet,
            published_date,
            source: self
                .display_link
                .unwrap_or_else(|| String::from("Unknown Source")),
            url: self.link,
            query: query.to_string(),
        }
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` prefix.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok())
}

/// Map a raw API response body to articles.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if the body is not a search response.
pub fn parse_response(body: &str, query: &str) -> Result<Vec<Article>, SearchError> {
    let data: SearchResponse =
        serde_json::from_str(body).map_err(|e| SearchError::Parse(e.to_string()))?;
    Ok(data
        .items
        .into_iter()
        .map(|item| item.into_article(query))
        .collect())
}

/// HTTP client for the Google Custom Search JSON API.
pub struct GoogleSearchClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    engine_id: String,
    language: String,
    country: String,
}

impl GoogleSearchClient {
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cyrisk/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            engine_id: config.engine_id.clone(),
            language: config.language.clone(),
            country: config.country.clone(),
        })
    }

    fn request_url(&self, query: &SearchQuery) -> String {
        let mut url = format!(
            "{}?key={}&cx={}&q={}&num={}&dateRestrict=d{}&filter=1&start=1",
            self.endpoint,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.engine_id),
            urlencoding::encode(query.keywords()),
            query.max_results().min(cyr_config::MAX_RESULTS_PER_QUERY),
            query.recency_days(),
        );
        if !self.language.is_empty() {
            let _ = write!(url, "&lr={}", urlencoding::encode(&self.language));
        }
        if !self.country.is_empty() {
            let _ = write!(url, "&cr={}", urlencoding::encode(&self.country));
        }
        url
    }
}

impl SearchProvider for GoogleSearchClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Article>, SearchError> {
        tracing::debug!(query = query.keywords(), days = query.recency_days(), "searching news");
        let resp = check_response(self.http.get(self.request_url(query)).send().await?).await?;
        let body = resp.text().await?;
        parse_response(&body, query.keywords())
    }
}
