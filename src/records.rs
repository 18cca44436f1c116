//! Typed rows for the three source tables and the merged article view.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// Tag marking an article as a video piece.
pub const VIDEO_TAG: &str = "Video";

/// Header of the reader table as written to CSV.
pub const READER_COLUMNS: [&str; 9] = [
    "User Id",
    "Full Name",
    "Email",
    "Company Name",
    "Country",
    "Industry",
    "Position",
    "Reads",
    "Last Access Date",
];

/// One row of the reader export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reader {
    #[serde(rename = "User Id")]
    pub user_id: Option<String>,
    #[serde(rename = "Full Name")]
    pub full_name: Option<String>,
    #[serde(rename = "Email")]
    pub email: Option<String>,
    #[serde(rename = "Company Name")]
    pub company: Option<String>,
    #[serde(rename = "Country")]
    pub country: Option<String>,
    #[serde(rename = "Industry")]
    pub industry: Option<String>,
    #[serde(rename = "Position")]
    pub position: Option<String>,
    #[serde(rename = "Reads")]
    pub reads: u64,
    #[serde(rename = "Last Access Date", serialize_with = "serialize_timestamp")]
    pub last_access: Option<NaiveDateTime>,
}

/// One row of the article export, before the author join.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub article_id: Option<String>,
    pub title: Option<String>,
    pub author_id: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub reads: u64,
    pub historic_reads: u64,
    pub profile_views: u64,
    pub tags: Vec<String>,
}

/// One row of the author export.
#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub author_id: String,
    pub author_name: Option<String>,
}

/// An article joined to its author. `author_name` is `None` when the
/// article's author id has no match in the author table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedArticle {
    #[serde(rename = "Article Id")]
    pub article_id: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Author Id")]
    pub author_id: Option<String>,
    #[serde(rename = "Author Name")]
    pub author_name: Option<String>,
    #[serde(rename = "Date", serialize_with = "serialize_timestamp")]
    pub date: Option<NaiveDateTime>,
    #[serde(rename = "Article Reads")]
    pub article_reads: u64,
    #[serde(rename = "Historic Reads")]
    pub historic_reads: u64,
    #[serde(rename = "Profile Views")]
    pub profile_views: u64,
    #[serde(rename = "Mondaq Tags", serialize_with = "serialize_tags")]
    pub tags: Vec<String>,
}

impl MergedArticle {
    /// True when any of the article's tags is exactly `Video`.
    pub fn is_video(&self) -> bool {
        self.tags.iter().any(|t| t == VIDEO_TAG)
    }
}

/// Writes timestamps as `YYYY-MM-DD HH:MM:SS`, and missing ones as an empty cell.
pub fn serialize_timestamp<S>(value: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(ts) => s.serialize_str(&ts.format("%Y-%m-%d %H:%M:%S").to_string()),
        None => s.serialize_str(""),
    }
}

fn serialize_tags<S>(tags: &[String], s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&tags.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_tags;
    use crate::test_support::authored;

    #[test]
    fn test_is_video_checks_each_tag() {
        let mut article = authored("Ann", 1);

        article.tags = parse_tags("Video, Employment");
        assert!(article.is_video());

        article.tags = parse_tags("Videos; Employment");
        assert!(!article.is_video());

        article.tags = Vec::new();
        assert!(!article.is_video());
    }
}
