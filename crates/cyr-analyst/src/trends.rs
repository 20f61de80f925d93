//! Month-by-month article volume and the patterns it shows.
//!
//! Purely arithmetic; no model calls.

use std::collections::BTreeMap;

use cyr_core::entities::{Article, MonthlyVolume, ThreatTrends, TrendDirection};

/// Percent change between halves that counts as a trend.
const OVERALL_THRESHOLD_PCT: usize = 10;
/// Percent change of the recent three months against the earlier average.
const RECENT_THRESHOLD_PCT: usize = 20;
/// Share of dated articles above which one query dominates.
const DOMINANT_SHARE_PCT: usize = 40;
const RECENT_MONTHS: usize = 3;

/// Build the trend view for `articles`. Undated articles are counted but not
/// placed in any month.
#[must_use]
pub fn analyze(articles: &[Article]) -> ThreatTrends {
    let mut by_month: BTreeMap<String, MonthlyVolume> = BTreeMap::new();
    let mut undated = 0;
    for article in articles {
        let Some(month) = article.published_month() else {
            undated += 1;
            continue;
        };
        let volume = by_month.entry(month.clone()).or_insert_with(|| MonthlyVolume {
            month,
            total: 0,
            by_query: BTreeMap::new(),
        });
        volume.total += 1;
        *volume.by_query.entry(article.query.clone()).or_default() += 1;
    }
    let months: Vec<MonthlyVolume> = by_month.into_values().collect();
    let counts: Vec<usize> = months.iter().map(|m| m.total).collect();

    ThreatTrends {
        overall: overall_direction(&counts),
        most_volatile_query: most_volatile_query(&months),
        patterns: patterns(&months, &counts),
        summary: summary(&months),
        months,
        undated,
    }
}

fn overall_direction(counts: &[usize]) -> TrendDirection {
    if counts.len() < 2 {
        return TrendDirection::InsufficientData;
    }
    let (first, second) = counts.split_at(counts.len() / 2);
    let first: usize = first.iter().sum();
    let second: usize = second.iter().sum();
    if second * 100 > first * (100 + OVERALL_THRESHOLD_PCT) {
        TrendDirection::Increasing
    } else if second * 100 < first * (100 - OVERALL_THRESHOLD_PCT) {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

/// Per-query totals across all months, ordered by query.
fn query_totals(months: &[MonthlyVolume]) -> BTreeMap<&str, usize> {
    let mut totals = BTreeMap::new();
    for month in months {
        for (query, count) in &month.by_query {
            *totals.entry(query.as_str()).or_default() += count;
        }
    }
    totals
}

/// Highest-volume query; ties go to the alphabetically first.
fn top_query(months: &[MonthlyVolume]) -> Option<(String, usize)> {
    query_totals(months)
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (query, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((query, count)),
        })
        .map(|(q, c)| (q.to_string(), c))
}

/// Query with the highest population variance of its monthly counts (months
/// where it is absent count as zero). Ties go to the alphabetically first.
fn most_volatile_query(months: &[MonthlyVolume]) -> Option<String> {
    if months.len() < 2 {
        return None;
    }
    let n = months.len();
    // n² · variance = n·Σx² − (Σx)², exact in integers and ordered like the variance.
    let spread = |query: &str| {
        let (sum, sum_sq) = months.iter().fold((0, 0), |(sum, sum_sq), m| {
            let x = m.by_query.get(query).copied().unwrap_or(0);
            (sum + x, sum_sq + x * x)
        });
        n * sum_sq - sum * sum
    };
    query_totals(months)
        .into_keys()
        .map(|query| (query, spread(query)))
        .filter(|&(_, spread)| spread > 0)
        .fold(None, |best: Option<(&str, usize)>, (query, spread)| match best {
            Some((_, best_spread)) if best_spread >= spread => best,
            _ => Some((query, spread)),
        })
        .map(|(query, _)| query.to_string())
}

fn patterns(months: &[MonthlyVolume], counts: &[usize]) -> Vec<String> {
    if counts.len() < 2 {
        return vec![String::from("Insufficient data for pattern analysis")];
    }
    let mut found = Vec::new();

    if counts.len() >= RECENT_MONTHS {
        let (earlier, recent) = counts.split_at(counts.len() - RECENT_MONTHS);
        // With exactly three months, compare against the first month.
        let earlier = if earlier.is_empty() { &counts[..1] } else { earlier };
        let recent_sum: usize = recent.iter().sum();
        let earlier_sum: usize = earlier.iter().sum();
        // recent_avg vs earlier_avg, cross-multiplied to stay in integers.
        let lhs = recent_sum * earlier.len() * 100;
        let rhs = earlier_sum * RECENT_MONTHS;
        if lhs > rhs * (100 + RECENT_THRESHOLD_PCT) {
            found.push(String::from("Recent increase in reported threat activity"));
        } else if lhs < rhs * (100 - RECENT_THRESHOLD_PCT) {
            found.push(String::from("Recent decrease in reported threat activity"));
        }
    }

    let dated: usize = counts.iter().sum();
    if let Some((query, count)) = top_query(months) {
        if count * 100 > dated * DOMINANT_SHARE_PCT {
            found.push(format!(
                "{query} dominates coverage ({}% of dated articles)",
                count * 100 / dated
            ));
        }
    }

    if found.is_empty() {
        found.push(String::from("No clear patterns identified in available data"));
    }
    found
}

fn summary(months: &[MonthlyVolume]) -> String {
    if months.is_empty() {
        return String::from("No dated articles available for trend analysis.");
    }
    let total: usize = months.iter().map(|m| m.total).sum();
    let n = months.len();
    let mut text = format!(
        "Analysis of {total} dated articles across {n} month{}. ",
        if n == 1 { "" } else { "s" }
    );
    if let Some((query, count)) = top_query(months) {
        text.push_str(&format!("The most covered query was {query} with {count} articles. "));
    }
    let tenths = total * 10 / n;
    text.push_str(&format!(
        "Average of {}.{} articles per month.",
        tenths / 10,
        tenths % 10
    ));
    text
}
