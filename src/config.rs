//! Runtime configuration.
//!
//! Values come from command-line flags, which fall back to environment
//! variables (optionally loaded from a `.env` file), which fall back to
//! the defaults below.

use std::path::{Path, PathBuf};

use crate::loader::SourcePaths;

pub const DEFAULT_READERS_CSV: &str = "Reader-MondaqAnalytics.csv";
pub const DEFAULT_ARTICLES_CSV: &str = "Article-MondaqAnalytics.csv";
pub const DEFAULT_AUTHORS_CSV: &str = "Author-MondaqAnalytics.csv";
pub const DEFAULT_LOG_FILE: &str = "logs/readership_analytics.log";
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub sources: SourcePaths,
    /// Rows shown in the top-N charts and tables.
    pub top_n: usize,
    /// Where downloads are written when no explicit path is given.
    pub output_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::in_dir(Path::new("."))
    }
}

impl DashboardConfig {
    /// The default file names resolved against `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            sources: SourcePaths {
                readers: dir.join(DEFAULT_READERS_CSV),
                articles: dir.join(DEFAULT_ARTICLES_CSV),
                authors: dir.join(DEFAULT_AUTHORS_CSV),
            },
            top_n: DEFAULT_TOP_N,
            output_dir: PathBuf::from("."),
        }
    }

    /// Replaces any source path that was given explicitly.
    pub fn with_sources(
        mut self,
        readers: Option<PathBuf>,
        articles: Option<PathBuf>,
        authors: Option<PathBuf>,
    ) -> Self {
        if let Some(p) = readers {
            self.sources.readers = p;
        }
        if let Some(p) = articles {
            self.sources.articles = p;
        }
        if let Some(p) = authors {
            self.sources.authors = p;
        }
        self
    }
}

/// Path of the JSON log file, from `LOG_FILE_PATH`.
pub fn log_file_path() -> PathBuf {
    std::env::var("LOG_FILE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_dir_uses_default_file_names() {
        let config = DashboardConfig::in_dir(Path::new("data"));

        assert_eq!(config.sources.readers, Path::new("data/Reader-MondaqAnalytics.csv"));
        assert_eq!(config.sources.authors, Path::new("data/Author-MondaqAnalytics.csv"));
        assert_eq!(config.top_n, 10);
    }

    #[test]
    fn test_explicit_sources_override_defaults() {
        let config = DashboardConfig::default().with_sources(
            None,
            Some(PathBuf::from("/tmp/articles.csv")),
            None,
        );

        assert_eq!(config.sources.articles, Path::new("/tmp/articles.csv"));
        assert_eq!(config.sources.readers, Path::new("./Reader-MondaqAnalytics.csv"));
    }
}
