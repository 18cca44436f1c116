//! Spreadsheet report generation.
//!
//! The workbook has four sheets in fixed order, each a plain header row
//! followed by data rows.

use rust_xlsxwriter::Workbook;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::aggregate::{distinct_count, frequency_counts, sum_top_n, top_titles};
use crate::analyzers::types::{CountEntry, SumEntry, SummaryMetrics, TitleAggregate};
use crate::error::Result;
use crate::filter::FilteredView;

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const REPORT_FILE_NAME: &str = "Mondaq_Analytics_Report.xlsx";

/// Sheet names in workbook order.
pub const SHEET_NAMES: [&str; 4] = ["Summary", "Top Articles", "Top Authors", "Country Breakdown"];

/// Number of rows on the top articles and top authors sheets.
pub const REPORT_TOP_N: usize = 10;

/// A generated file ready to hand to the user.
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// The four tables that make up the report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub summary: SummaryMetrics,
    pub top_articles: Vec<TitleAggregate>,
    pub top_authors: Vec<SumEntry>,
    pub country_breakdown: Vec<CountEntry>,
}

impl ReportData {
    /// Aggregates a filtered view into report tables.
    pub fn from_view(view: &FilteredView) -> Self {
        let articles = &view.articles;
        Self {
            summary: SummaryMetrics {
                total_reads: articles.iter().map(|a| a.article_reads).sum(),
                unique_articles: distinct_count(articles, |a| a.article_id.as_deref()),
                unique_readers: distinct_count(&view.readers, |r| r.user_id.as_deref()),
            },
            top_articles: top_titles(articles, REPORT_TOP_N),
            top_authors: sum_top_n(
                articles,
                |a| a.author_name.as_deref(),
                |a| a.article_reads,
                REPORT_TOP_N,
            ),
            country_breakdown: frequency_counts(&view.readers, |r| r.country.as_deref()),
        }
    }
}

/// One cell of a report sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Blank,
}

impl From<Option<&str>> for Cell {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Cell::Blank, |v| Cell::Text(v.to_string()))
    }
}

/// A worksheet before it is written: name, header row and data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: &'static str,
    pub headers: &'static [&'static str],
    pub rows: Vec<Vec<Cell>>,
}

/// Lays the report out as sheets, in workbook order.
pub fn sheet_layout(report: &ReportData) -> Vec<Sheet> {
    let [summary, articles, authors, countries] = SHEET_NAMES;
    let s = &report.summary;

    vec![
        Sheet {
            name: summary,
            headers: &["Total Reads", "Unique Articles", "Unique Readers"],
            rows: vec![vec![
                Cell::Number(s.total_reads as f64),
                Cell::Number(s.unique_articles as f64),
                Cell::Number(s.unique_readers as f64),
            ]],
        },
        Sheet {
            name: articles,
            headers: &["Title", "Article Reads", "Date", "Author Name"],
            rows: report
                .top_articles
                .iter()
                .map(|t| {
                    vec![
                        Cell::Text(t.title.clone()),
                        Cell::Number(t.article_reads as f64),
                        t.earliest_date.map_or(Cell::Blank, |d| {
                            Cell::Text(d.format("%Y-%m-%d %H:%M:%S").to_string())
                        }),
                        Cell::from(t.author_name.as_deref()),
                    ]
                })
                .collect(),
        },
        Sheet {
            name: authors,
            headers: &["Author Name", "Article Reads"],
            rows: report
                .top_authors
                .iter()
                .map(|a| vec![Cell::Text(a.key.clone()), Cell::Number(a.total as f64)])
                .collect(),
        },
        Sheet {
            name: countries,
            headers: &["Country", "Reader Count"],
            rows: report
                .country_breakdown
                .iter()
                .map(|c| vec![Cell::Text(c.key.clone()), Cell::Number(c.count as f64)])
                .collect(),
        },
    ]
}

fn write_sheet(workbook: &mut Workbook, sheet: &Sheet) -> Result<()> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet.name)?;

    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (r, row) in sheet.rows.iter().enumerate() {
        let r = r as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(text) => {
                    worksheet.write_string(r, col, text)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(r, col, *n)?;
                }
                Cell::Blank => {}
            }
        }
    }

    debug!(sheet = sheet.name, rows = sheet.rows.len(), "Sheet written");
    Ok(())
}

/// Serializes the report as an xlsx workbook.
pub fn render_workbook(report: &ReportData) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    for sheet in sheet_layout(report) {
        write_sheet(&mut workbook, &sheet)?;
    }

    let bytes = workbook.save_to_buffer()?;
    info!(bytes = bytes.len(), "Report workbook rendered");
    Ok(bytes)
}

/// Builds the downloadable report for a filtered view.
pub fn report_download(view: &FilteredView) -> Result<Download> {
    let report = ReportData::from_view(view);
    Ok(Download {
        file_name: REPORT_FILE_NAME.to_string(),
        mime: XLSX_MIME,
        bytes: render_workbook(&report)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{article_on, reader};

    fn view() -> FilteredView {
        let mut a = article_on("a1", "2024-01-10", 10);
        a.author_name = Some("Ann".into());
        let mut b = article_on("a2", "2024-02-10", 30);
        b.author_name = Some("Bo".into());
        let c = article_on("a1", "2024-03-10", 5);

        let mut r1 = reader("US", Some("Tech"), 1);
        r1.user_id = Some("u1".into());
        let mut r2 = reader("US", Some("Tech"), 1);
        r2.user_id = Some("u1".into());
        let mut r3 = reader("UK", Some("Law"), 1);
        r3.user_id = Some("u2".into());

        FilteredView {
            articles: vec![a, b, c],
            readers: vec![r1, r2, r3],
        }
    }

    #[test]
    fn test_report_data_from_view() {
        let report = ReportData::from_view(&view());

        assert_eq!(report.summary.total_reads, 45);
        assert_eq!(report.summary.unique_articles, 2);
        assert_eq!(report.summary.unique_readers, 2);
        assert_eq!(report.top_authors[0].key, "Bo");
        assert_eq!(report.country_breakdown[0].key, "US");
        assert_eq!(report.country_breakdown[0].count, 2);
    }

    #[test]
    fn test_workbook_is_zip_container() {
        let download = report_download(&view()).unwrap();

        assert_eq!(download.mime, XLSX_MIME);
        assert_eq!(download.file_name, REPORT_FILE_NAME);
        assert!(download.bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_sheet_layout_order_and_headers() {
        let sheets = sheet_layout(&ReportData::from_view(&view()));

        let names: Vec<_> = sheets.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            ["Summary", "Top Articles", "Top Authors", "Country Breakdown"]
        );
        assert_eq!(
            sheets[0].headers,
            ["Total Reads", "Unique Articles", "Unique Readers"]
        );
        assert_eq!(
            sheets[1].headers,
            ["Title", "Article Reads", "Date", "Author Name"]
        );
        assert_eq!(sheets[2].headers, ["Author Name", "Article Reads"]);
        assert_eq!(sheets[3].headers, ["Country", "Reader Count"]);

        assert_eq!(sheets[0].rows.len(), 1);
        assert_eq!(sheets[0].rows[0][0], Cell::Number(45.0));
        assert_eq!(sheets[2].rows.len(), 2);
        assert_eq!(sheets[2].rows[0][0], Cell::Text("Bo".into()));
        assert_eq!(sheets[3].rows.len(), 2);
    }

    #[test]
    fn test_workbook_for_empty_view() {
        let bytes = render_workbook(&ReportData::from_view(&FilteredView::default())).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
