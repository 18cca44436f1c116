//! CLI entry point for the readership analytics dashboards.
//!
//! `overview` renders the unfiltered overview dashboard. `master` renders
//! one view of the master dashboard under the given filters, or writes
//! its downloads (spreadsheet report, CSV exports).

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use readership_analytics::config::{DEFAULT_TOP_N, DashboardConfig, log_file_path};
use readership_analytics::dashboard::{MasterDashboard, MasterTab, OverviewDashboard};
use readership_analytics::filter::FilterParams;
use readership_analytics::forecast::DEFAULT_HORIZON;
use readership_analytics::loader::DatasetCache;
use readership_analytics::output::{print_json, save_download};
use readership_analytics::session::Session;
use serde_json::json;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "readership_analytics")]
#[command(about = "Reader, article and author analytics over CSV exports", long_about = None)]
struct Cli {
    /// Directory holding the three CSV exports under their default names
    #[arg(long, env = "DATA_DIR", default_value = ".", global = true)]
    data_dir: PathBuf,

    /// Reader export (overrides --data-dir)
    #[arg(long, env = "READERS_CSV", global = true)]
    readers: Option<PathBuf>,

    /// Article export (overrides --data-dir)
    #[arg(long, env = "ARTICLES_CSV", global = true)]
    articles: Option<PathBuf>,

    /// Author export (overrides --data-dir)
    #[arg(long, env = "AUTHORS_CSV", global = true)]
    authors: Option<PathBuf>,

    /// Number of entries in top-N charts and tables
    #[arg(long, env = "TOP_N", default_value_t = DEFAULT_TOP_N, global = true)]
    top_n: usize,

    /// Directory downloads are written to
    #[arg(long, env = "OUTPUT_DIR", default_value = ".", global = true)]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the overview dashboard over all data
    Overview {
        #[arg(value_enum, default_value_t = OverviewTab::All)]
        tab: OverviewTab,
    },
    /// Render the master dashboard under the given filters
    Master {
        /// First publication date to include (defaults to the earliest article)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last publication date to include (defaults to the latest article)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Allowed reader country; repeat for several (defaults to all)
        #[arg(long = "country")]
        countries: Vec<String>,

        /// Allowed reader industry; repeat for several (defaults to all)
        #[arg(long = "industry")]
        industries: Vec<String>,

        #[command(subcommand)]
        view: MasterView,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OverviewTab {
    Readers,
    Articles,
    Authors,
    All,
}

#[derive(Subcommand)]
enum MasterView {
    /// Headline KPIs
    Kpis,
    /// Top countries, industries and positions
    Readers,
    /// Top articles and monthly reads
    Articles,
    /// Top authors and the author summary table
    Authors,
    /// List every company
    Companies,
    /// Drill down into one company
    Company {
        name: String,

        /// Also write the company's readers as CSV
        #[arg(long)]
        export: bool,
    },
    /// Search articles by title
    SearchArticles { query: String },
    /// Search readers by name, email or company
    SearchReaders { query: String },
    /// Reads by day of week and hour of day
    Heatmap,
    /// Write the spreadsheet report
    Report {
        /// Output file (defaults to the report's name under --output-dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the author summary CSV
    ExportAuthors {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Monthly reads with a forecast
    Forecast {
        #[arg(short, long, default_value_t = DEFAULT_HORIZON)]
        periods: usize,
    },
    /// Every parameter-free view
    All,
}

fn init_tracing() -> WorkerGuard {
    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = log_file_path();
    let log_dir = log_file_path.parent().unwrap_or(Path::new("logs"));
    let log_file_name = log_file_path
        .file_name()
        .unwrap_or(OsStr::new("readership_analytics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        );

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::try_from_env("RUST_LOG_JSON").unwrap_or_else(|_| EnvFilter::new("debug")),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    guard
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    let _log_guard = init_tracing();

    let cli = Cli::parse();

    let mut config = DashboardConfig::in_dir(&cli.data_dir).with_sources(
        cli.readers,
        cli.articles,
        cli.authors,
    );
    config.top_n = cli.top_n;
    config.output_dir = cli.output_dir;

    let mut cache = DatasetCache::new();
    let mut session =
        Session::open(&mut cache, &config.sources).context("Failed to load source data")?;

    match cli.command {
        Commands::Overview { tab } => {
            let dashboard = OverviewDashboard::new(session.dataset(), config.top_n);
            match tab {
                OverviewTab::Readers => print_json(&dashboard.readers())?,
                OverviewTab::Articles => print_json(&dashboard.articles())?,
                OverviewTab::Authors => print_json(&dashboard.authors())?,
                OverviewTab::All => print_json(&json!({
                    "reader_insights": dashboard.readers(),
                    "article_insights": dashboard.articles(),
                    "author_insights": dashboard.authors(),
                }))?,
            }
        }
        Commands::Master {
            start,
            end,
            countries,
            industries,
            view,
        } => {
            let params = filter_params(&session, start, end, countries, industries);
            let dashboard = MasterDashboard::new(&mut session, params, config.top_n);
            let params = dashboard.params();
            info!(
                start = %params.start,
                end = %params.end,
                countries = params.countries.len(),
                industries = params.industries.len(),
                "Filters applied"
            );
            run_master_view(&dashboard, view, &config)?;
        }
    }

    Ok(())
}

/// Combines explicit filter flags with the dashboard defaults.
fn filter_params(
    session: &Session,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    countries: Vec<String>,
    industries: Vec<String>,
) -> FilterParams {
    let defaults = match session.default_filters() {
        Some(d) => d,
        None => {
            warn!("No article has a parseable date; date range defaults to today");
            let today = chrono::Local::now().date_naive();
            FilterParams {
                start: today,
                end: today,
                countries: BTreeSet::new(),
                industries: BTreeSet::new(),
            }
        }
    };

    let or_default = |given: Vec<String>, fallback: BTreeSet<String>| {
        if given.is_empty() {
            fallback
        } else {
            given.into_iter().collect()
        }
    };

    FilterParams {
        start: start.unwrap_or(defaults.start),
        end: end.unwrap_or(defaults.end),
        countries: or_default(countries, defaults.countries),
        industries: or_default(industries, defaults.industries),
    }
}

fn run_master_view(
    dashboard: &MasterDashboard,
    view: MasterView,
    config: &DashboardConfig,
) -> Result<()> {
    let tab = match view {
        MasterView::Kpis => MasterTab::Kpis,
        MasterView::Readers => MasterTab::Readers,
        MasterView::Articles => MasterTab::Articles,
        MasterView::Authors => MasterTab::Authors,
        MasterView::Companies => MasterTab::Companies,
        MasterView::Company { name, export } => {
            if export {
                let download = dashboard.company_download(&name)?;
                save_download(&download, &config.output_dir, None)?;
            }
            MasterTab::Company(name)
        }
        MasterView::SearchArticles { query } => MasterTab::SearchArticles(query),
        MasterView::SearchReaders { query } => MasterTab::SearchReaders(query),
        MasterView::Heatmap => MasterTab::Heatmap,
        MasterView::Forecast { periods } => MasterTab::Forecast { periods },
        MasterView::Report { output } => {
            let download = dashboard.report()?;
            let written = save_download(&download, &config.output_dir, output.as_deref())?;
            return print_json(&json!({ "report": written, "mime": download.mime }));
        }
        MasterView::ExportAuthors { output } => {
            let download = dashboard.author_summary_download()?;
            let written = save_download(&download, &config.output_dir, output.as_deref())?;
            return print_json(&json!({ "export": written, "mime": download.mime }));
        }
        MasterView::All => return print_json(&dashboard.render_all()),
    };

    print_json(&dashboard.render(&tab)?)
}
