//! Output formatting and persistence for dashboard views.
//!
//! Supports JSON printing of any view and the two CSV exports (author
//! summary and per-company readers).

use std::fs;
use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::{AUTHOR_SUMMARY_COLUMNS, AuthorSummary};
use crate::error::Result;
use crate::records::{READER_COLUMNS, Reader};
use crate::report::Download;

pub const CSV_MIME: &str = "text/csv";
pub const AUTHOR_SUMMARY_FILE_NAME: &str = "author_summary.csv";

/// Writes a view to stdout as pretty-printed JSON.
pub fn print_json(view: &impl Serialize) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), view)?;
    println!();
    Ok(())
}

/// Serializes rows as CSV with a header row and no index column.
///
/// `headers` must match the serialized field names of `T`; it is written
/// on its own when there are no rows.
pub fn to_csv_bytes<T: Serialize>(rows: &[T], headers: &[&str]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    if rows.is_empty() {
        writer.write_record(headers)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    writer.into_inner().map_err(|e| e.into_error().into())
}

/// The author summary as a downloadable CSV.
pub fn author_summary_csv(summary: &[AuthorSummary]) -> Result<Download> {
    Ok(Download {
        file_name: AUTHOR_SUMMARY_FILE_NAME.to_string(),
        mime: CSV_MIME,
        bytes: to_csv_bytes(summary, &AUTHOR_SUMMARY_COLUMNS)?,
    })
}

/// One company's readers as a downloadable CSV.
pub fn company_readers_csv(company: &str, readers: &[Reader]) -> Result<Download> {
    Ok(Download {
        file_name: format!("{}_readers.csv", file_stem(company)),
        mime: CSV_MIME,
        bytes: to_csv_bytes(readers, &READER_COLUMNS)?,
    })
}

/// `name` with path separators replaced, safe to use as a file name.
fn file_stem(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// Saves a download under `dir` (or at `path` when given) and returns the
/// written location.
pub fn save_download(download: &Download, dir: &Path, path: Option<&Path>) -> Result<String> {
    let target = match path {
        Some(p) => p.to_path_buf(),
        None => dir.join(&download.file_name),
    };
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    debug!(path = %target.display(), mime = download.mime, "Writing download");
    fs::write(&target, &download.bytes)?;
    info!(path = %target.display(), bytes = download.bytes.len(), "Saved file");

    Ok(target.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::reader;
    use std::env;

    fn summary() -> Vec<AuthorSummary> {
        vec![AuthorSummary {
            author_name: "Ann".into(),
            articles: 2,
            article_reads: 15,
            historic_reads: 100,
            profile_views: 7,
        }]
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&summary()).unwrap();
    }

    #[test]
    fn test_author_summary_csv_has_no_index_column() {
        let download = author_summary_csv(&summary()).unwrap();
        let content = String::from_utf8(download.bytes).unwrap();
        let lines: Vec<_> = content.lines().collect();

        assert_eq!(download.file_name, "author_summary.csv");
        assert_eq!(download.mime, "text/csv");
        assert_eq!(
            lines[0],
            "Author Name,Articles,Article Reads,Historic Reads,Profile Views"
        );
        assert_eq!(lines[1], "Ann,2,15,100,7");
    }

    #[test]
    fn test_company_readers_csv() {
        let mut r = reader("US", Some("Tech"), 4);
        r.company = Some("Acme".into());
        r.full_name = Some("Ann Lee".into());
        r.last_access = crate::parser::parse_timestamp("2024-01-01 10:30:00");

        let download = company_readers_csv("Acme", &[r]).unwrap();
        let content = String::from_utf8(download.bytes).unwrap();

        assert_eq!(download.file_name, "Acme_readers.csv");
        assert!(content.starts_with(
            "User Id,Full Name,Email,Company Name,Country,Industry,Position,Reads,Last Access Date"
        ));
        assert!(content.contains(",Ann Lee,,Acme,US,Tech,,4,2024-01-01 10:30:00"));
    }

    #[test]
    fn test_empty_exports_keep_header_row() {
        let authors = author_summary_csv(&[]).unwrap();
        assert_eq!(
            String::from_utf8(authors.bytes).unwrap().trim_end(),
            "Author Name,Articles,Article Reads,Historic Reads,Profile Views"
        );

        let readers = company_readers_csv("Acme", &[]).unwrap();
        assert_eq!(
            String::from_utf8(readers.bytes).unwrap().trim_end(),
            "User Id,Full Name,Email,Company Name,Country,Industry,Position,Reads,Last Access Date"
        );
    }

    #[test]
    fn test_company_file_name_stays_in_output_dir() {
        let r = reader("US", None, 1);

        let nested = company_readers_csv("a/b", &[r.clone()]).unwrap();
        let parent = company_readers_csv("../x", &[r.clone()]).unwrap();
        let windows = company_readers_csv("c\\d", &[r]).unwrap();

        assert_eq!(nested.file_name, "a_b_readers.csv");
        assert_eq!(parent.file_name, ".._x_readers.csv");
        assert_eq!(windows.file_name, "c_d_readers.csv");
        assert_eq!(Path::new(&parent.file_name).components().count(), 1);
    }

    #[test]
    fn test_save_download_writes_file() {
        let dir = env::temp_dir().join("readership_analytics_output_test");
        let download = author_summary_csv(&summary()).unwrap();

        let written = save_download(&download, &dir, None).unwrap();

        let content = fs::read_to_string(&written).unwrap();
        assert!(content.starts_with("Author Name"));
        fs::remove_file(&written).unwrap();
    }
}
