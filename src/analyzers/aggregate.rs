use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::analyzers::types::{
    AuthorSummary, CountEntry, GroupSummary, Heatmap, HeatmapRow, MonthlyPoint, SortMetric,
    SumEntry, TitleAggregate,
};
use crate::error::{PipelineError, Result};
use crate::records::MergedArticle;

/// Heatmap row labels, Monday first.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Groups keyed by string, remembering the order keys were first seen.
struct Groups<'a, V> {
    index: HashMap<&'a str, usize>,
    entries: Vec<(&'a str, V)>,
}

impl<'a, V: Default> Groups<'a, V> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn entry(&mut self, key: &'a str) -> &mut V {
        let entries = &mut self.entries;
        let idx = *self.index.entry(key).or_insert_with(|| {
            entries.push((key, V::default()));
            entries.len() - 1
        });
        &mut self.entries[idx].1
    }
}

/// Counts occurrences of each value of `key`, most frequent first.
///
/// Ties keep the order in which values first appear.
pub fn frequency_counts<T>(rows: &[T], key: impl Fn(&T) -> Option<&str>) -> Vec<CountEntry> {
    let mut groups: Groups<u64> = Groups::new();
    for row in rows {
        if let Some(k) = key(row) {
            *groups.entry(k) += 1;
        }
    }

    let mut counts: Vec<CountEntry> = groups
        .entries
        .into_iter()
        .map(|(key, count)| CountEntry {
            key: key.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// The `n` most frequent values of `key`. Returns fewer than `n` entries
/// when there are fewer distinct values.
pub fn frequency_top_n<T>(
    rows: &[T],
    key: impl Fn(&T) -> Option<&str>,
    n: usize,
) -> Vec<CountEntry> {
    let mut counts = frequency_counts(rows, key);
    counts.truncate(n);
    counts
}

/// Sums `value` per group of `key` and returns the `n` largest sums.
pub fn sum_top_n<T>(
    rows: &[T],
    key: impl Fn(&T) -> Option<&str>,
    value: impl Fn(&T) -> u64,
    n: usize,
) -> Vec<SumEntry> {
    let mut groups: Groups<u64> = Groups::new();
    for row in rows {
        if let Some(k) = key(row) {
            *groups.entry(k) += value(row);
        }
    }

    let mut sums: Vec<SumEntry> = groups
        .entries
        .into_iter()
        .map(|(key, total)| SumEntry {
            key: key.to_string(),
            total,
        })
        .collect();
    sums.sort_by(|a, b| b.total.cmp(&a.total));
    sums.truncate(n);
    sums
}

/// Sums `value` per calendar month of `date`, oldest month first.
///
/// Only months that have at least one row appear in the output.
pub fn monthly_sum<T>(
    rows: &[T],
    date: impl Fn(&T) -> Option<NaiveDate>,
    value: impl Fn(&T) -> u64,
) -> Vec<MonthlyPoint> {
    let mut buckets: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for row in rows {
        let Some(month) = date(row).and_then(|d| d.with_day(1)) else {
            continue;
        };
        *buckets.entry(month).or_default() += value(row);
    }

    buckets
        .into_iter()
        .map(|(month, total)| MonthlyPoint { month, total })
        .collect()
}

/// Cross-tabulates `value` by day of week and hour of day of `timestamp`.
///
/// Rows without a timestamp are dropped. Every day/hour cell is present,
/// with zero where no row fell.
pub fn pivot_sum<T>(
    rows: &[T],
    timestamp: impl Fn(&T) -> Option<NaiveDateTime>,
    value: impl Fn(&T) -> u64,
) -> Heatmap {
    let mut grid = [[0u64; 24]; 7];
    for row in rows {
        let Some(ts) = timestamp(row) else {
            continue;
        };
        let day = ts.weekday().num_days_from_monday() as usize;
        grid[day][ts.hour() as usize] += value(row);
    }

    Heatmap {
        hours: (0..24).collect(),
        rows: WEEKDAYS
            .iter()
            .zip(grid)
            .map(|(day, values)| HeatmapRow {
                day: day.to_string(),
                values: values.to_vec(),
            })
            .collect(),
    }
}

/// Groups rows by `key`, counting rows where `counted` holds and summing
/// each of `metrics`. Sorted descending by `sort_by`, ties in first-seen
/// order.
pub fn group_summary<T>(
    rows: &[T],
    key: impl Fn(&T) -> Option<&str>,
    counted: impl Fn(&T) -> bool,
    metrics: &[&dyn Fn(&T) -> u64],
    sort_by: SortMetric,
) -> Vec<GroupSummary> {
    let mut groups: Groups<(u64, Vec<u64>)> = Groups::new();
    for row in rows {
        let Some(k) = key(row) else {
            continue;
        };
        let (count, sums) = groups.entry(k);
        if sums.is_empty() {
            sums.resize(metrics.len(), 0);
        }
        if counted(row) {
            *count += 1;
        }
        for (sum, metric) in sums.iter_mut().zip(metrics) {
            *sum += metric(row);
        }
    }

    let mut summary: Vec<GroupSummary> = groups
        .entries
        .into_iter()
        .map(|(key, (count, sums))| GroupSummary {
            key: key.to_string(),
            count,
            sums,
        })
        .collect();

    let metric = |g: &GroupSummary| match sort_by {
        SortMetric::Count => g.count,
        SortMetric::Sum(i) => g.sums.get(i).copied().unwrap_or(0),
    };
    summary.sort_by(|a, b| metric(b).cmp(&metric(a)));
    summary
}

/// The first row with the largest `value`.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyResult`] when `rows` is empty.
pub fn max_row<'a, T>(
    rows: &'a [T],
    value: impl Fn(&T) -> u64,
    what: &'static str,
) -> Result<&'a T> {
    rows.iter()
        .reduce(|best, row| if value(row) > value(best) { row } else { best })
        .ok_or(PipelineError::EmptyResult(what))
}

/// The `n` rows with the largest `value`, ties in input order.
pub fn top_rows<T>(rows: &[T], value: impl Fn(&T) -> u64, n: usize) -> Vec<&T> {
    let mut sorted: Vec<&T> = rows.iter().collect();
    sorted.sort_by(|a, b| value(b).cmp(&value(a)));
    sorted.truncate(n);
    sorted
}

/// Number of distinct non-missing values of `key`.
pub fn distinct_count<T>(rows: &[T], key: impl Fn(&T) -> Option<&str>) -> usize {
    rows.iter().filter_map(key).collect::<HashSet<_>>().len()
}

/// Per-author article counts and read totals, highest `Article Reads` first.
pub fn author_summary(articles: &[MergedArticle]) -> Vec<AuthorSummary> {
    group_summary(
        articles,
        |a| a.author_name.as_deref(),
        |a| a.article_id.is_some(),
        &[
            &|a: &MergedArticle| a.article_reads,
            &|a: &MergedArticle| a.historic_reads,
            &|a: &MergedArticle| a.profile_views,
        ],
        SortMetric::Sum(0),
    )
    .into_iter()
    .map(|g| AuthorSummary {
        author_name: g.key,
        articles: g.count,
        article_reads: g.sums[0],
        historic_reads: g.sums[1],
        profile_views: g.sums[2],
    })
    .collect()
}

/// Reads summed per title with the title's earliest date and first known
/// author, top `n` by reads.
pub fn top_titles(articles: &[MergedArticle], n: usize) -> Vec<TitleAggregate> {
    let mut groups: Groups<TitleAggregate> = Groups::new();
    for article in articles {
        let Some(title) = article.title.as_deref() else {
            continue;
        };
        let agg = groups.entry(title);
        agg.article_reads += article.article_reads;
        agg.earliest_date = match (agg.earliest_date, article.date) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        if agg.author_name.is_none() {
            agg.author_name = article.author_name.clone();
        }
    }

    let mut titles: Vec<TitleAggregate> = groups
        .entries
        .into_iter()
        .map(|(title, agg)| TitleAggregate {
            title: title.to_string(),
            ..agg
        })
        .collect();
    titles.sort_by(|a, b| b.article_reads.cmp(&a.article_reads));
    titles.truncate(n);
    titles
}
