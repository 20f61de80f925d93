//! Article cache keyed by query and date window.
//!
//! A cache hit skips the search API entirely. Keys include the run date so
//! each day starts fresh, which keeps the quota usage at one call per query
//! per day.

use std::collections::HashMap;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use cyr_core::entities::Article;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CacheError;

/// Entries older than this many days are reported as stale.
pub const STALE_AFTER_DAYS: i64 = 7;
/// Entries older than this many days are reported as very old.
pub const VERY_OLD_AFTER_DAYS: i64 = 30;

const CACHE_EXTENSION: &str = "json";
const DIGEST_HEX_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub query: String,
    pub recency_days: u32,
    pub date: NaiveDate,
}

impl CacheKey {
    #[must_use]
    pub fn new(query: impl Into<String>, recency_days: u32, date: NaiveDate) -> Self {
        Self {
            query: query.into(),
            recency_days,
            date,
        }
    }

    /// `{date}_{days}d_{slug}-{hash}.json`. The slug keeps files readable, the
    /// hash keeps queries that slugify identically apart.
    #[must_use]
    pub fn file_name(&self) -> String {
        let slug: String = self
            .query
            .chars()
            .filter_map(|c| {
                if c.is_ascii_alphanumeric() {
                    Some(c.to_ascii_lowercase())
                } else if c.is_whitespace() || c == '-' {
                    Some('-')
                } else {
                    None
                }
            })
            .take(48)
            .collect();
        format!(
            "{}_{}d_{}-{}.{CACHE_EXTENSION}",
            self.date.format("%Y-%m-%d"),
            self.recency_days,
            slug.trim_matches('-'),
            query_digest(&self.query),
        )
    }
}

/// First 16 hex digits of the query's SHA-256.
fn query_digest(query: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(DIGEST_HEX_LEN);
    hex
}

/// On-disk record for one cached query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub cached_at: DateTime<Utc>,
    pub articles: Vec<Article>,
}

/// Key-value store for fetched articles.
pub trait ArticleCache: Send + Sync {
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backing store cannot be read.
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<Article>>, CacheError>;

    /// # Errors
    ///
    /// Returns [`CacheError`] if the backing store cannot be written.
    fn put(&self, key: &CacheKey, articles: &[Article]) -> Result<(), CacheError>;
}

/// In-process cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<CacheKey, Vec<Article>>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArticleCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<Article>>, CacheError> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &CacheKey, articles: &[Article]) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.clone(), articles.to_vec());
        Ok(())
    }
}

/// One file found in the cache directory.
#[derive(Debug)]
pub enum CachedFile {
    Valid {
        path: PathBuf,
        query: String,
        article_count: usize,
        cached_at: DateTime<Utc>,
        size_bytes: u64,
    },
    Corrupt {
        path: PathBuf,
        reason: String,
    },
}

/// Result of [`FsCache::health`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CacheHealth {
    pub total_files: usize,
    pub total_articles: usize,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

impl CacheHealth {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

/// One JSON file per key under a cache directory.
#[derive(Debug, Clone)]
pub struct FsCache {
    dir: PathBuf,
}

impl FsCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    fn cache_files(&self) -> Result<Vec<PathBuf>, CacheError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CacheError::io(&self.dir, e)),
        };
        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| CacheError::io(&self.dir, e))?.path();
            if path.is_file()
                && path.extension().is_some_and(|ext| ext == CACHE_EXTENSION)
            {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// List every cache file. Undecodable files are reported, not fatal.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the directory cannot be listed.
    pub fn inventory(&self) -> Result<Vec<CachedFile>, CacheError> {
        let mut files = Vec::new();
        for path in self.cache_files()? {
            let size_bytes = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            let decoded = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|raw| {
                    serde_json::from_str::<CacheEntry>(&raw).map_err(|e| e.to_string())
                });
            files.push(match decoded {
                Ok(entry) => CachedFile::Valid {
                    path,
                    query: entry.key.query,
                    article_count: entry.articles.len(),
                    cached_at: entry.cached_at,
                    size_bytes,
                },
                Err(reason) => CachedFile::Corrupt { path, reason },
            });
        }
        Ok(files)
    }

    /// Check the cache for corrupt and aged entries as of `now`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the directory cannot be listed.
    pub fn health(&self, now: DateTime<Utc>) -> Result<CacheHealth, CacheError> {
        let mut health = CacheHealth::default();
        for file in self.inventory()? {
            health.total_files += 1;
            match file {
                CachedFile::Valid {
                    path,
                    article_count,
                    cached_at,
                    ..
                } => {
                    health.total_articles += article_count;
                    let age = (now - cached_at).num_days();
                    let name = path.file_name().map_or_else(
                        || path.display().to_string(),
                        |n| n.to_string_lossy().into_owned(),
                    );
                    if age > VERY_OLD_AFTER_DAYS {
                        health
                            .warnings
                            .push(format!("{name} is very old ({age} days)"));
                    } else if age > STALE_AFTER_DAYS {
                        health.warnings.push(format!("{name} is {age} days old"));
                    }
                }
                CachedFile::Corrupt { path, reason } => {
                    health
                        .issues
                        .push(format!("{} is corrupt: {reason}", path.display()));
                }
            }
        }
        Ok(health)
    }

    /// Remove every cache file, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] on the first file that cannot be removed.
    pub fn clear(&self) -> Result<usize, CacheError> {
        let files = self.cache_files()?;
        for path in &files {
            fs::remove_file(path).map_err(|e| CacheError::io(path, e))?;
        }
        tracing::info!(removed = files.len(), dir = %self.dir.display(), "cache cleared");
        Ok(files.len())
    }
}

impl ArticleCache for FsCache {
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<Article>>, CacheError> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(path, e)),
        };
        let entry: CacheEntry = serde_json::from_str(&raw)
            .map_err(|source| CacheError::Corrupt { path, source })?;
        Ok(Some(entry.articles))
    }

    fn put(&self, key: &CacheKey, articles: &[Article]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(|e| CacheError::io(&self.dir, e))?;
        let entry = CacheEntry {
            key: key.clone(),
            cached_at: Utc::now(),
            articles: articles.to_vec(),
        };
        let json = serde_json::to_vec_pretty(&entry)?;
        let path = self.path_for(key);
        let mut tmp =
            tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| CacheError::io(&self.dir, e))?;
        tmp.write_all(&json).map_err(|e| CacheError::io(tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| CacheError::io(&path, e.error))?;
        tracing::debug!(path = %path.display(), articles = articles.len(), "cached query results");
        Ok(())
    }
}
