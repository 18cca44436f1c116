//! Derived views over a loaded dataset: date/country/industry filtering,
//! free-text search and the company drill-down.
//!
//! Nothing here mutates its input; each call returns freshly owned rows.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::loader::Dataset;
use crate::records::{MergedArticle, Reader};

/// Filter control state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FilterParams {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub countries: BTreeSet<String>,
    pub industries: BTreeSet<String>,
}

impl FilterParams {
    /// The initial control state: the full article date range and every
    /// country and industry present in the reader table.
    ///
    /// Returns `None` when no article carries a parseable date.
    pub fn defaults_for(dataset: &Dataset) -> Option<Self> {
        let dates = || dataset.articles.iter().filter_map(|a| a.date.map(|d| d.date()));
        let start = dates().min()?;
        let end = dates().max()?;

        Some(Self {
            start,
            end,
            countries: distinct(dataset.readers.iter().map(|r| r.country.as_deref())),
            industries: distinct(dataset.readers.iter().map(|r| r.industry.as_deref())),
        })
    }
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> BTreeSet<String> {
    values.flatten().map(str::to_string).collect()
}

/// Articles and readers that passed one set of filters.
#[derive(Debug, Clone, Default)]
pub struct FilteredView {
    pub articles: Vec<MergedArticle>,
    pub readers: Vec<Reader>,
}

/// Applies `params` to both tables.
pub fn apply_filters(dataset: &Dataset, params: &FilterParams) -> FilteredView {
    FilteredView {
        articles: filter_articles_by_date(&dataset.articles, params.start, params.end),
        readers: filter_readers(&dataset.readers, &params.countries, &params.industries),
    }
}

/// Keeps articles whose publication date falls in `[start, end]`.
///
/// Articles without a date never match, and a reversed interval matches
/// nothing.
pub fn filter_articles_by_date(
    articles: &[MergedArticle],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<MergedArticle> {
    if start > end {
        return Vec::new();
    }

    articles
        .iter()
        .filter(|a| a.date.is_some_and(|d| (start..=end).contains(&d.date())))
        .cloned()
        .collect()
}

/// Keeps readers whose country and industry are both in the allowed sets.
/// Readers missing either value never match.
pub fn filter_readers(
    readers: &[Reader],
    countries: &BTreeSet<String>,
    industries: &BTreeSet<String>,
) -> Vec<Reader> {
    readers
        .iter()
        .filter(|r| {
            let in_set = |value: &Option<String>, set: &BTreeSet<String>| {
                value.as_ref().is_some_and(|v| set.contains(v))
            };
            in_set(&r.country, countries) && in_set(&r.industry, industries)
        })
        .cloned()
        .collect()
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

/// Case-insensitive substring search over article titles.
/// An empty query matches nothing.
pub fn search_articles(articles: &[MergedArticle], query: &str) -> Vec<MergedArticle> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    articles
        .iter()
        .filter(|a| contains_ci(a.title.as_deref(), &needle))
        .cloned()
        .collect()
}

/// Case-insensitive substring search over reader name, email and company.
/// An empty query matches nothing.
pub fn search_readers(readers: &[Reader], query: &str) -> Vec<Reader> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    readers
        .iter()
        .filter(|r| {
            contains_ci(r.full_name.as_deref(), &needle)
                || contains_ci(r.email.as_deref(), &needle)
                || contains_ci(r.company.as_deref(), &needle)
        })
        .cloned()
        .collect()
}

/// Sorted distinct company names.
pub fn companies(readers: &[Reader]) -> Vec<String> {
    distinct(readers.iter().map(|r| r.company.as_deref()))
        .into_iter()
        .collect()
}

/// Readers employed by `company`.
pub fn company_readers(readers: &[Reader], company: &str) -> Vec<Reader> {
    readers
        .iter()
        .filter(|r| r.company.as_deref() == Some(company))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{article_on, reader};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let articles = vec![
            article_on("a", "2024-01-01", 1),
            article_on("b", "2024-01-15", 1),
            article_on("c", "2024-01-31", 1),
            article_on("d", "2024-02-01", 1),
        ];

        let kept = filter_articles_by_date(&articles, date(2024, 1, 1), date(2024, 1, 31));
        let ids: Vec<_> = kept.iter().filter_map(|a| a.article_id.as_deref()).collect();

        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let articles = vec![article_on("a", "2024-01-10", 1)];
        let kept = filter_articles_by_date(&articles, date(2024, 2, 1), date(2024, 1, 1));
        assert!(kept.is_empty());
    }

    #[test]
    fn test_undated_articles_never_match() {
        let mut undated = article_on("a", "2024-01-10", 1);
        undated.date = None;
        let kept = filter_articles_by_date(&[undated], date(2000, 1, 1), date(2100, 1, 1));
        assert!(kept.is_empty());
    }

    #[test]
    fn test_reader_filter_requires_both_sets() {
        let readers = vec![
            reader("US", Some("Tech"), 1),
            reader("US", Some("Finance"), 1),
            reader("UK", Some("Tech"), 1),
            reader("US", None, 1),
        ];

        let kept = filter_readers(&readers, &set(&["US"]), &set(&["Tech"]));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].country.as_deref(), Some("US"));
        assert_eq!(kept[0].industry.as_deref(), Some("Tech"));
    }

    #[test]
    fn test_empty_allowed_set_yields_nothing() {
        let readers = vec![reader("US", Some("Tech"), 1), reader("UK", Some("Tech"), 1)];

        assert!(filter_readers(&readers, &BTreeSet::new(), &set(&["Tech"])).is_empty());
        assert!(filter_readers(&readers, &set(&["US", "UK"]), &BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_search_articles_is_case_insensitive() {
        let mut a = article_on("a", "2024-01-10", 1);
        a.title = Some("Tax Reform In Europe".to_string());
        let mut b = article_on("b", "2024-01-10", 1);
        b.title = Some("Employment Law".to_string());

        let hits = search_articles(&[a, b], "  TAX ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].article_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_search_treats_query_literally() {
        let mut a = article_on("a", "2024-01-10", 1);
        a.title = Some("What is (a) trust?".to_string());

        assert_eq!(search_articles(&[a.clone()], "(a)").len(), 1);
        assert!(search_articles(&[a], "").is_empty());
    }

    #[test]
    fn test_search_readers_matches_any_field() {
        let mut r1 = reader("US", Some("Tech"), 1);
        r1.full_name = Some("Ann Lee".to_string());
        let mut r2 = reader("US", Some("Tech"), 1);
        r2.email = Some("someone@lee-partners.com".to_string());
        let mut r3 = reader("US", Some("Tech"), 1);
        r3.company = Some("Other".to_string());

        let hits = search_readers(&[r1, r2, r3], "lee");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_companies_sorted_and_distinct() {
        let mut readers = vec![reader("US", None, 1), reader("US", None, 1), reader("US", None, 1)];
        readers[0].company = Some("Zeta".to_string());
        readers[1].company = Some("Acme".to_string());
        readers[2].company = Some("Zeta".to_string());

        assert_eq!(companies(&readers), vec!["Acme", "Zeta"]);
        assert_eq!(company_readers(&readers, "Zeta").len(), 2);
    }
}
