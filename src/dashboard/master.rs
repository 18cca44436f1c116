//! The master dashboard: filtered KPIs and insights, company drill-down,
//! search, engagement timing, report generation and forecasting.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{error, info_span};

use crate::analyzers::aggregate::author_summary;
use crate::analyzers::types::{AuthorSummary, Heatmap, SumEntry};
use crate::dashboard::views::{
    ArticleHit, ArticleInsights, CompanyDeepDive, ForecastView, Kpis, ReaderHit, ReaderInsights,
    SearchResults, article_insights, company_deep_dive, engagement_heatmap, kpis,
    predictive_insights, reader_insights, top_authors,
};
use crate::error::{PipelineError, Result};
use crate::filter::{
    FilterParams, FilteredView, companies, company_readers, search_articles, search_readers,
};
use crate::forecast::{DEFAULT_HORIZON, Forecaster, HoltLinear};
use crate::loader::Dataset;
use crate::output::{author_summary_csv, company_readers_csv};
use crate::report::{Download, report_download};
use crate::session::Session;

/// One renderable tab of the master dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MasterTab {
    Kpis,
    Readers,
    Articles,
    Authors,
    Companies,
    Company(String),
    SearchArticles(String),
    SearchReaders(String),
    Heatmap,
    Forecast { periods: usize },
}

impl MasterTab {
    pub fn name(&self) -> &'static str {
        match self {
            MasterTab::Kpis => "kpis",
            MasterTab::Readers => "reader_insights",
            MasterTab::Articles => "article_insights",
            MasterTab::Authors => "author_insights",
            MasterTab::Companies => "companies",
            MasterTab::Company(_) => "company_deep_dive",
            MasterTab::SearchArticles(_) => "article_search",
            MasterTab::SearchReaders(_) => "reader_search",
            MasterTab::Heatmap => "engagement_timing",
            MasterTab::Forecast { .. } => "predictive_insights",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorStats {
    pub top_authors: Vec<SumEntry>,
    pub summary: Vec<AuthorSummary>,
}

pub struct MasterDashboard {
    dataset: Arc<Dataset>,
    view: Arc<FilteredView>,
    params: FilterParams,
    top_n: usize,
}

impl MasterDashboard {
    /// Builds the dashboard over the session's view for `params`.
    pub fn new(session: &mut Session, params: FilterParams, top_n: usize) -> Self {
        Self {
            dataset: Arc::clone(session.dataset()),
            view: session.filtered(&params),
            params,
            top_n,
        }
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    pub fn kpis(&self) -> Result<Kpis> {
        kpis(&self.view.articles, &self.view.readers)
    }

    pub fn readers(&self) -> ReaderInsights {
        reader_insights(&self.view.readers, self.top_n)
    }

    pub fn articles(&self) -> ArticleInsights {
        article_insights(&self.view.articles, self.top_n)
    }

    pub fn authors(&self) -> AuthorStats {
        AuthorStats {
            top_authors: top_authors(&self.view.articles, self.top_n),
            summary: author_summary(&self.view.articles),
        }
    }

    pub fn author_summary_download(&self) -> Result<Download> {
        author_summary_csv(&author_summary(&self.view.articles))
    }

    /// Every company in the reader table, sorted.
    pub fn companies(&self) -> Vec<String> {
        companies(&self.dataset.readers)
    }

    pub fn company(&self, name: &str) -> Result<CompanyDeepDive> {
        company_deep_dive(name, &company_readers(&self.dataset.readers, name))
    }

    /// The company's readers as CSV. Fails with
    /// [`PipelineError::EmptyResult`] when the company has no readers.
    pub fn company_download(&self, name: &str) -> Result<Download> {
        let readers = company_readers(&self.dataset.readers, name);
        if readers.is_empty() {
            return Err(PipelineError::EmptyResult("company export"));
        }
        company_readers_csv(name, &readers)
    }

    /// Title search across all articles, ignoring the filters.
    pub fn search_articles(&self, query: &str) -> SearchResults<ArticleHit> {
        let hits = search_articles(&self.dataset.articles, query);
        SearchResults::new(query, hits.iter().map(ArticleHit::from).collect())
    }

    /// Name, email and company search across all readers, ignoring the filters.
    pub fn search_readers(&self, query: &str) -> SearchResults<ReaderHit> {
        let hits = search_readers(&self.dataset.readers, query);
        SearchResults::new(query, hits.iter().map(ReaderHit::from).collect())
    }

    pub fn heatmap(&self) -> Heatmap {
        engagement_heatmap(&self.dataset.readers)
    }

    /// The spreadsheet report over the filtered selection.
    pub fn report(&self) -> Result<Download> {
        report_download(&self.view)
    }

    /// Forecast over the full article history.
    pub fn forecast(&self, forecaster: &impl Forecaster, periods: usize) -> ForecastView {
        predictive_insights(&self.dataset.articles, forecaster, periods)
    }

    /// Renders one tab as JSON.
    pub fn render(&self, tab: &MasterTab) -> Result<Value> {
        let _span = info_span!("render_tab", tab = tab.name()).entered();
        let value = match tab {
            MasterTab::Kpis => serde_json::to_value(self.kpis()?)?,
            MasterTab::Readers => serde_json::to_value(self.readers())?,
            MasterTab::Articles => serde_json::to_value(self.articles())?,
            MasterTab::Authors => serde_json::to_value(self.authors())?,
            MasterTab::Companies => serde_json::to_value(self.companies())?,
            MasterTab::Company(name) => serde_json::to_value(self.company(name)?)?,
            MasterTab::SearchArticles(q) => serde_json::to_value(self.search_articles(q))?,
            MasterTab::SearchReaders(q) => serde_json::to_value(self.search_readers(q))?,
            MasterTab::Heatmap => serde_json::to_value(self.heatmap())?,
            MasterTab::Forecast { periods } => {
                serde_json::to_value(self.forecast(&HoltLinear::default(), *periods))?
            }
        };
        Ok(value)
    }

    /// Renders every parameter-free tab. A tab that fails is logged and
    /// reported in place; the others still render.
    pub fn render_all(&self) -> Map<String, Value> {
        let tabs = [
            MasterTab::Kpis,
            MasterTab::Readers,
            MasterTab::Articles,
            MasterTab::Authors,
            MasterTab::Heatmap,
            MasterTab::Forecast {
                periods: DEFAULT_HORIZON,
            },
        ];

        let mut out = Map::new();
        for tab in &tabs {
            let value = self.render(tab).unwrap_or_else(|e| {
                error!(tab = tab.name(), error = %e, "View failed to render");
                json!({ "error": e.to_string() })
            });
            out.insert(tab.name().to_string(), value);
        }
        out
    }
}
