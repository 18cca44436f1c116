//! Result types produced by the aggregation functions.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::records::serialize_timestamp;

/// Occurrence count of one categorical value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountEntry {
    pub key: String,
    pub count: u64,
}

/// Sum of a numeric column for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SumEntry {
    pub key: String,
    pub total: u64,
}

/// Sum of a numeric column over one calendar month. `month` is the first
/// day of that month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyPoint {
    pub month: NaiveDate,
    pub total: u64,
}

/// One day-of-week row of the engagement heatmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatmapRow {
    pub day: String,
    pub values: Vec<u64>,
}

/// Day-of-week × hour-of-day sums, Monday first, hours 0 to 23.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heatmap {
    pub hours: Vec<u32>,
    pub rows: Vec<HeatmapRow>,
}

impl Heatmap {
    pub fn total(&self) -> u64 {
        self.rows.iter().flat_map(|r| r.values.iter()).sum()
    }

    /// The cell for `day` (0 = Monday) and `hour`.
    pub fn cell(&self, day: usize, hour: usize) -> Option<u64> {
        self.rows.get(day)?.values.get(hour).copied()
    }
}

/// Which metric orders a group summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMetric {
    Count,
    Sum(usize),
}

/// A group's row count plus one sum per requested metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub count: u64,
    pub sums: Vec<u64>,
}

pub const AUTHOR_SUMMARY_COLUMNS: [&str; 5] = [
    "Author Name",
    "Articles",
    "Article Reads",
    "Historic Reads",
    "Profile Views",
];

/// Per-author totals, laid out as the author summary export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorSummary {
    #[serde(rename = "Author Name")]
    pub author_name: String,
    #[serde(rename = "Articles")]
    pub articles: u64,
    #[serde(rename = "Article Reads")]
    pub article_reads: u64,
    #[serde(rename = "Historic Reads")]
    pub historic_reads: u64,
    #[serde(rename = "Profile Views")]
    pub profile_views: u64,
}

/// Reads summed per article title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TitleAggregate {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Article Reads")]
    pub article_reads: u64,
    #[serde(rename = "Date", serialize_with = "serialize_timestamp")]
    pub earliest_date: Option<NaiveDateTime>,
    #[serde(rename = "Author Name")]
    pub author_name: Option<String>,
}

/// Headline totals for the report's summary sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryMetrics {
    #[serde(rename = "Total Reads")]
    pub total_reads: u64,
    #[serde(rename = "Unique Articles")]
    pub unique_articles: usize,
    #[serde(rename = "Unique Readers")]
    pub unique_readers: usize,
}
