//! CSV ingestion for the reader, article and author exports.
//!
//! Header labels are trimmed on read. Date and count cells that cannot be
//! parsed are coerced (to `None` and `0` respectively) and reported as a
//! warning instead of failing the load. Loaded datasets are memoized in a
//! [`DatasetCache`] keyed on the identity of the three source files.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};
use crate::join::join_authors;
use crate::parser::{parse_count, parse_tags, parse_text, parse_timestamp};
use crate::records::{Article, Author, MergedArticle, Reader};

/// Locations of the three CSV exports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourcePaths {
    pub readers: PathBuf,
    pub articles: PathBuf,
    pub authors: PathBuf,
}

/// Identity of one source file at load time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileFingerprint {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl FileFingerprint {
    fn of(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)
            .map_err(|_| PipelineError::MissingFile(path.to_path_buf()))?;
        Ok(Self {
            path: path.to_path_buf(),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Identity of a full source triple. Two loads with equal versions read
/// the same bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceVersion {
    pub readers: FileFingerprint,
    pub articles: FileFingerprint,
    pub authors: FileFingerprint,
}

impl SourceVersion {
    pub fn of(paths: &SourcePaths) -> Result<Self> {
        Ok(Self {
            readers: FileFingerprint::of(&paths.readers)?,
            articles: FileFingerprint::of(&paths.articles)?,
            authors: FileFingerprint::of(&paths.authors)?,
        })
    }
}

/// The reader table and the joined article/author table of one session.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub version: SourceVersion,
    pub readers: Vec<Reader>,
    pub articles: Vec<MergedArticle>,
}

/// Memoizes loaded datasets on their [`SourceVersion`].
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<SourceVersion, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached dataset for `paths`, reading the files only when
    /// their fingerprint changed since the last load.
    pub fn get_or_load(&mut self, paths: &SourcePaths) -> Result<Arc<Dataset>> {
        let version = SourceVersion::of(paths)?;
        if let Some(hit) = self.entries.get(&version) {
            debug!("Dataset cache hit");
            return Ok(Arc::clone(hit));
        }

        let dataset = Arc::new(load_dataset(paths)?);
        self.entries.insert(version, Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reads all three sources and joins articles to authors.
#[tracing::instrument(skip_all, fields(readers = %paths.readers.display()))]
pub fn load_dataset(paths: &SourcePaths) -> Result<Dataset> {
    let version = SourceVersion::of(paths)?;

    let readers = load_readers(&paths.readers)?;
    let articles = load_articles(&paths.articles)?;
    let authors = load_authors(&paths.authors)?;
    let articles = join_authors(&articles, &authors);

    info!(
        readers = readers.len(),
        articles = articles.len(),
        authors = authors.len(),
        "Dataset loaded"
    );

    Ok(Dataset {
        version,
        readers,
        articles,
    })
}

/// Resolves column labels to positions for one table.
struct Columns {
    table: &'static str,
    headers: StringRecord,
}

impl Columns {
    fn index(&self, column: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| PipelineError::Schema {
                table: self.table,
                column: column.to_string(),
            })
    }
}

/// Counts cells that had to be coerced while reading one table.
#[derive(Default)]
struct Coercions {
    dates: usize,
    counts: usize,
}

impl Coercions {
    fn timestamp(&mut self, raw: &str) -> Option<chrono::NaiveDateTime> {
        let parsed = parse_timestamp(raw);
        if parsed.is_none() && !raw.trim().is_empty() {
            self.dates += 1;
        }
        parsed
    }

    fn count(&mut self, raw: &str) -> u64 {
        parse_count(raw).unwrap_or_else(|| {
            self.counts += 1;
            0
        })
    }

    fn report(&self, table: &'static str) {
        if self.dates > 0 {
            warn!(table, cells = self.dates, "Unparsable dates coerced to missing");
        }
        if self.counts > 0 {
            warn!(table, cells = self.counts, "Non-numeric counts coerced to zero");
        }
    }
}

fn open_table(path: &Path, table: &'static str) -> Result<(Columns, csv::Reader<File>)> {
    if !path.exists() {
        return Err(PipelineError::MissingFile(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::Headers)
        .flexible(true)
        .from_reader(file);
    let headers = rdr.headers()?.clone();
    debug!(table, columns = headers.len(), "Opened source table");

    Ok((Columns { table, headers }, rdr))
}

fn cell<'r>(record: &'r StringRecord, idx: usize) -> &'r str {
    record.get(idx).unwrap_or("")
}

/// Loads the reader export.
pub fn load_readers(path: &Path) -> Result<Vec<Reader>> {
    let (cols, mut rdr) = open_table(path, "reader")?;

    let user_id = cols.index("User Id")?;
    let full_name = cols.index("Full Name")?;
    let email = cols.index("Email")?;
    let company = cols.index("Company Name")?;
    let country = cols.index("Country")?;
    let industry = cols.index("Industry")?;
    let position = cols.index("Position")?;
    let reads = cols.index("Reads")?;
    let last_access = cols.index("Last Access Date")?;

    let mut coerced = Coercions::default();
    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result?;
        rows.push(Reader {
            user_id: parse_text(cell(&record, user_id)),
            full_name: parse_text(cell(&record, full_name)),
            email: parse_text(cell(&record, email)),
            company: parse_text(cell(&record, company)),
            country: parse_text(cell(&record, country)),
            industry: parse_text(cell(&record, industry)),
            position: parse_text(cell(&record, position)),
            reads: coerced.count(cell(&record, reads)),
            last_access: coerced.timestamp(cell(&record, last_access)),
        });
    }

    coerced.report(cols.table);
    Ok(rows)
}

/// Loads the article export.
pub fn load_articles(path: &Path) -> Result<Vec<Article>> {
    let (cols, mut rdr) = open_table(path, "article")?;

    let article_id = cols.index("Article Id")?;
    let title = cols.index("Title")?;
    let author_id = cols.index("Author Id")?;
    let date = cols.index("Date")?;
    let reads = cols.index("Reads")?;
    let historic_reads = cols.index("Historic Reads")?;
    let profile_views = cols.index("Profile Views")?;
    let tags = cols.index("Mondaq Tags")?;

    let mut coerced = Coercions::default();
    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result?;
        rows.push(Article {
            article_id: parse_text(cell(&record, article_id)),
            title: parse_text(cell(&record, title)),
            author_id: parse_text(cell(&record, author_id)),
            date: coerced.timestamp(cell(&record, date)),
            reads: coerced.count(cell(&record, reads)),
            historic_reads: coerced.count(cell(&record, historic_reads)),
            profile_views: coerced.count(cell(&record, profile_views)),
            tags: parse_tags(cell(&record, tags)),
        });
    }

    coerced.report(cols.table);
    Ok(rows)
}

/// Loads the author export. Rows without an author id cannot match any
/// article and are skipped.
pub fn load_authors(path: &Path) -> Result<Vec<Author>> {
    let (cols, mut rdr) = open_table(path, "author")?;

    let author_id = cols.index("Author Id")?;
    let author_name = cols.index("Author Name")?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let Some(id) = parse_text(cell(&record, author_id)) else {
            continue;
        };
        rows.push(Author {
            author_id: id,
            author_name: parse_text(cell(&record, author_name)),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_csv(name: &str, content: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("readership_analytics_loader_{name}.csv"));
        fs::write(&path, content).unwrap();
        path
    }

    const READERS: &str = " User Id , Full Name,Email,Company Name,Country , Industry,Position,Reads,Last Access Date\n\
        1,Ann Lee,ann@a.com,Acme,US,Tech,CTO,5,2024-01-01 10:00:00\n\
        2,Bo Chan,bo@b.com,Beta,UK,,Analyst,3,garbage\n";

    #[test]
    fn test_load_readers_trims_headers() {
        let path = temp_csv("readers_trim", READERS);
        let readers = load_readers(&path).unwrap();

        assert_eq!(readers.len(), 2);
        assert_eq!(readers[0].user_id.as_deref(), Some("1"));
        assert_eq!(readers[0].country.as_deref(), Some("US"));
        assert_eq!(readers[0].reads, 5);
        assert!(readers[0].last_access.is_some());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_unparsable_date_becomes_missing() {
        let path = temp_csv("readers_bad_date", READERS);
        let readers = load_readers(&path).unwrap();

        assert!(readers[1].last_access.is_none());
        assert!(readers[1].industry.is_none());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let path = temp_csv("authors_no_name", "Author Id,Reads\n1,4\n");
        let err = load_authors(&path).unwrap_err();

        match err {
            PipelineError::Schema { table, column } => {
                assert_eq!(table, "author");
                assert_eq!(column, "Author Name");
            }
            other => panic!("unexpected error: {other}"),
        }

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_reported() {
        let path = env::temp_dir().join("readership_analytics_definitely_absent.csv");
        let err = load_readers(&path).unwrap_err();
        assert!(matches!(err, PipelineError::MissingFile(p) if p == path));
    }

    #[test]
    fn test_authors_without_id_are_skipped() {
        let path = temp_csv("authors_blank_id", "Author Id,Author Name\n,Ghost\n7,Real\n");
        let authors = load_authors(&path).unwrap();

        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].author_id, "7");

        fs::remove_file(&path).unwrap();
    }
}
