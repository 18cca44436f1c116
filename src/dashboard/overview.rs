//! The overview dashboard: unfiltered reader, article and author insights.

use serde::Serialize;

use crate::analyzers::aggregate::frequency_counts;
use crate::analyzers::types::{CountEntry, SumEntry};
use crate::dashboard::views::{
    ArticleInsights, ReaderInsights, article_insights, reader_insights, top_authors,
};
use crate::loader::Dataset;

#[derive(Debug, Clone, Serialize)]
pub struct AuthorInsights {
    pub top_authors: Vec<SumEntry>,
    pub video_authors: Vec<CountEntry>,
}

pub struct OverviewDashboard<'a> {
    dataset: &'a Dataset,
    top_n: usize,
}

impl<'a> OverviewDashboard<'a> {
    pub fn new(dataset: &'a Dataset, top_n: usize) -> Self {
        Self { dataset, top_n }
    }

    pub fn readers(&self) -> ReaderInsights {
        reader_insights(&self.dataset.readers, self.top_n)
    }

    pub fn articles(&self) -> ArticleInsights {
        article_insights(&self.dataset.articles, self.top_n)
    }

    /// Top authors by reads, and how many video-tagged articles each
    /// author has written.
    pub fn authors(&self) -> AuthorInsights {
        let videos: Vec<_> = self
            .dataset
            .articles
            .iter()
            .filter(|a| a.is_video())
            .cloned()
            .collect();

        AuthorInsights {
            top_authors: top_authors(&self.dataset.articles, self.top_n),
            video_authors: frequency_counts(&videos, |a| a.author_name.as_deref()),
        }
    }
}
