//! View models shared by both dashboards.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::analyzers::aggregate::{
    frequency_top_n, max_row, monthly_sum, pivot_sum, sum_top_n, top_rows,
};
use crate::analyzers::types::{CountEntry, Heatmap, MonthlyPoint, SumEntry};
use crate::analyzers::utility::{mean, round2};
use crate::error::{PipelineError, Result};
use crate::forecast::{ForecastPoint, Forecaster, forecast_monthly};
use crate::records::{MergedArticle, Reader, serialize_timestamp};

/// Shown in place of a KPI that has no rows to draw from.
pub const PLACEHOLDER: &str = "N/A";

#[derive(Debug, Clone, Serialize)]
pub struct ReaderInsights {
    pub top_countries: Vec<CountEntry>,
    pub top_industries: Vec<CountEntry>,
    pub top_positions: Vec<CountEntry>,
}

pub fn reader_insights(readers: &[Reader], n: usize) -> ReaderInsights {
    ReaderInsights {
        top_countries: frequency_top_n(readers, |r| r.country.as_deref(), n),
        top_industries: frequency_top_n(readers, |r| r.industry.as_deref(), n),
        top_positions: frequency_top_n(readers, |r| r.position.as_deref(), n),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TopArticle {
    pub title: Option<String>,
    pub author_name: Option<String>,
    pub article_reads: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleInsights {
    pub top_articles: Vec<TopArticle>,
    pub reads_over_time: Vec<MonthlyPoint>,
}

/// Monthly `Article Reads` totals.
pub fn monthly_reads(articles: &[MergedArticle]) -> Vec<MonthlyPoint> {
    monthly_sum(articles, |a| a.date.map(|d| d.date()), |a| a.article_reads)
}

pub fn article_insights(articles: &[MergedArticle], n: usize) -> ArticleInsights {
    ArticleInsights {
        top_articles: top_rows(articles, |a| a.article_reads, n)
            .into_iter()
            .map(|a| TopArticle {
                title: a.title.clone(),
                author_name: a.author_name.clone(),
                article_reads: a.article_reads,
            })
            .collect(),
        reads_over_time: monthly_reads(articles),
    }
}

/// Total reads per author, top `n`.
pub fn top_authors(articles: &[MergedArticle], n: usize) -> Vec<SumEntry> {
    sum_top_n(articles, |a| a.author_name.as_deref(), |a| a.article_reads, n)
}

/// Headline metrics for the filtered selection.
#[derive(Debug, Clone, Serialize)]
pub struct Kpis {
    pub total_readers: usize,
    pub total_reads: u64,
    pub top_author: String,
    pub top_article: String,
}

/// Headline metrics. Authors tied on reads resolve to the one that appears
/// first in `articles`, as in every other top-N ranking.
pub fn kpis(articles: &[MergedArticle], readers: &[Reader]) -> Result<Kpis> {
    let top_author = top_authors(articles, 1)
        .into_iter()
        .next()
        .map_or_else(|| PLACEHOLDER.to_string(), |e| e.key);

    let top_article = if articles.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        max_row(articles, |a| a.article_reads, "top article")?
            .title
            .clone()
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    };

    Ok(Kpis {
        total_readers: readers.len(),
        total_reads: articles.iter().map(|a| a.article_reads).sum(),
        top_author,
        top_article,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyReaderRow {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub reads: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyDeepDive {
    pub company: String,
    pub total_readers: usize,
    pub total_reads: u64,
    pub avg_reads_per_person: f64,
    pub top_positions: Vec<CountEntry>,
    pub readers: Vec<CompanyReaderRow>,
}

/// Positions shown on the company drill-down.
pub const COMPANY_TOP_POSITIONS: usize = 5;

/// Drill-down over the readers of one company.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyResult`] when the company has no readers.
pub fn company_deep_dive(company: &str, readers: &[Reader]) -> Result<CompanyDeepDive> {
    if readers.is_empty() {
        return Err(PipelineError::EmptyResult("company deep dive"));
    }

    let reads: Vec<u64> = readers.iter().map(|r| r.reads).collect();
    Ok(CompanyDeepDive {
        company: company.to_string(),
        total_readers: readers.len(),
        total_reads: reads.iter().sum(),
        avg_reads_per_person: round2(mean(&reads)),
        top_positions: frequency_top_n(readers, |r| r.position.as_deref(), COMPANY_TOP_POSITIONS),
        readers: readers
            .iter()
            .map(|r| CompanyReaderRow {
                full_name: r.full_name.clone(),
                email: r.email.clone(),
                position: r.position.clone(),
                reads: r.reads,
            })
            .collect(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleHit {
    pub title: Option<String>,
    pub author_name: Option<String>,
    pub article_reads: u64,
    #[serde(serialize_with = "serialize_timestamp")]
    pub date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReaderHit {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub reads: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults<T> {
    pub query: String,
    pub found: usize,
    pub results: Vec<T>,
}

impl<T> SearchResults<T> {
    pub fn new(query: &str, results: Vec<T>) -> Self {
        Self {
            query: query.to_string(),
            found: results.len(),
            results,
        }
    }
}

impl From<&MergedArticle> for ArticleHit {
    fn from(a: &MergedArticle) -> Self {
        Self {
            title: a.title.clone(),
            author_name: a.author_name.clone(),
            article_reads: a.article_reads,
            date: a.date,
        }
    }
}

impl From<&Reader> for ReaderHit {
    fn from(r: &Reader) -> Self {
        Self {
            full_name: r.full_name.clone(),
            email: r.email.clone(),
            company: r.company.clone(),
            position: r.position.clone(),
            reads: r.reads,
        }
    }
}

/// Reads by day of week and hour of the reader's last access.
pub fn engagement_heatmap(readers: &[Reader]) -> Heatmap {
    pivot_sum(readers, |r| r.last_access, |r| r.reads)
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastView {
    pub history: Vec<MonthlyPoint>,
    pub forecast: Option<Vec<ForecastPoint>>,
    pub message: Option<String>,
}

/// Monthly read history with a forecast when the history is long enough.
pub fn predictive_insights(
    articles: &[MergedArticle],
    forecaster: &impl Forecaster,
    periods: usize,
) -> ForecastView {
    let history = monthly_reads(articles);
    let forecast = forecast_monthly(&history, forecaster, periods);
    let message = forecast
        .is_none()
        .then(|| "Not enough data to generate a forecast.".to_string());

    ForecastView {
        history,
        forecast,
        message,
    }
}
