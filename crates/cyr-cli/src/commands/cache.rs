use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use cyr_config::CyriskConfig;
use cyr_news::FsCache;
use cyr_news::cache::{CacheHealth, CachedFile};

use crate::cli::CacheCommands;
use crate::ui;

/// Handle `cyrisk cache <action>`. Returns the process exit code.
pub fn handle(action: &CacheCommands, config: &CyriskConfig) -> anyhow::Result<i32> {
    let cache = FsCache::new(&config.search.cache_dir);
    match action {
        CacheCommands::Info => {
            print!("{}", render_info(&cache.inventory()?, Utc::now()));
            Ok(0)
        }
        CacheCommands::Check => {
            let health = cache.health(Utc::now())?;
            print!("{}", render_health(&health));
            Ok(if health.is_healthy() { 0 } else { 1 })
        }
        CacheCommands::Clear { yes } => {
            if !yes {
                anyhow::bail!(
                    "refusing to clear {} without --yes",
                    cache.dir().display()
                );
            }
            let removed = cache.clear()?;
            if !ui::prefs().quiet {
                println!(
                    "Removed {removed} cache file(s) from {}",
                    cache.dir().display()
                );
            }
            Ok(0)
        }
    }
}

fn render_info(files: &[CachedFile], now: DateTime<Utc>) -> String {
    if files.is_empty() {
        return "Cache is empty\n".to_string();
    }
    let mut out = String::new();
    let mut articles: usize = 0;
    let mut bytes: u64 = 0;
    for file in files {
        match file {
            CachedFile::Valid {
                query,
                article_count,
                cached_at,
                size_bytes,
                ..
            } => {
                articles += *article_count;
                bytes += *size_bytes;
                let age = (now - *cached_at).num_days();
                let _ = writeln!(
                    out,
                    "{query:<40} {article_count:>4} articles  {age:>3}d old  {size_bytes:>8} B"
                );
            }
            CachedFile::Corrupt { path, reason } => {
                let _ = writeln!(out, "{} (corrupt: {reason})", path.display());
            }
        }
    }
    let _ = writeln!(
        out,
        "{} file(s), {articles} article(s), {bytes} bytes",
        files.len()
    );
    out
}

fn render_health(health: &CacheHealth) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} file(s), {} article(s)",
        health.total_files, health.total_articles
    );
    for issue in &health.issues {
        let _ = writeln!(out, "  issue: {issue}");
    }
    for warning in &health.warnings {
        let _ = writeln!(out, "  warning: {warning}");
    }
    out.push_str(if health.is_healthy() {
        "Cache is healthy\n"
    } else {
        "Cache has issues\n"
    });
    out
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn info_reports_age_and_totals() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let files = vec![
            CachedFile::Valid {
                path: PathBuf::from("cache/a.json"),
                query: "\"ransomware\"".into(),
                article_count: 7,
                cached_at: Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap(),
                size_bytes: 2048,
            },
            CachedFile::Corrupt {
                path: PathBuf::from("cache/b.json"),
                reason: "EOF while parsing".into(),
            },
        ];
        let text = render_info(&files, now);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("\"ransomware\""));
        assert!(lines[0].contains("7 articles"));
        assert!(lines[0].contains("3d old"));
        assert_eq!(lines[1], "cache/b.json (corrupt: EOF while parsing)");
        assert_eq!(lines[2], "2 file(s), 7 article(s), 2048 bytes");
    }

    #[test]
    fn empty_cache_info() {
        assert_eq!(render_info(&[], Utc::now()), "Cache is empty\n");
    }

    #[test]
    fn health_lists_issues_before_warnings() {
        let health = CacheHealth {
            total_files: 2,
            total_articles: 5,
            issues: vec!["b.json is corrupt: bad".into()],
            warnings: vec!["a.json is 9 days old".into()],
        };
        assert_eq!(
            render_health(&health),
            "2 file(s), 5 article(s)\n\
             \x20 issue: b.json is corrupt: bad\n\
             \x20 warning: a.json is 9 days old\n\
             Cache has issues\n"
        );
    }
}
