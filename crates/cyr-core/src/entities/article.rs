use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A news article returned by the search collaborator.
///
/// Articles are deduplicated by `url`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub published_date: Option<NaiveDate>,
    pub snippet: String,
    /// Display domain of the publisher, e.g. `reuters.com`.
    pub source: String,
    /// Keyword query that surfaced the article.
    pub query: String,
}

impl Article {
    /// Publication month as `YYYY-MM`, if the date is known.
    #[must_use]
    pub fn published_month(&self) -> Option<String> {
        self.published_date.map(|d| d.format("%Y-%m").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_month_formats_year_and_month() {
        let article = Article {
            title: "t".into(),
            url: "https://example.com/a".into(),
            published_date: NaiveDate::from_ymd_opt(2026, 3, 9),
            snippet: String::new(),
            source: "example.com".into(),
            query: "\"malware\"".into(),
        };
        assert_eq!(article.published_month().as_deref(), Some("2026-03"));
    }

    #[test]
    fn undated_article_has_no_month() {
        let article = Article {
            title: "t".into(),
            url: "https://example.com/a".into(),
            published_date: None,
            snippet: String::new(),
            source: "example.com".into(),
            query: "q".into(),
        };
        assert!(article.published_month().is_none());
    }
}
