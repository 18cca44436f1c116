//! Left join of articles onto authors.
//!
//! The output schema is fixed by [`MergedArticle`]: the article's `Reads`
//! column becomes `Article Reads` and the author's name becomes
//! `Author Name`. Columns of the author table other than the key and the
//! name are not carried into the merged view.

use std::collections::HashMap;

use crate::records::{Article, Author, MergedArticle};

/// Joins every article to its author by `Author Id`.
///
/// The output has exactly one row per input article, in input order.
/// When the author table repeats an id, the first row for that id wins.
pub fn join_authors(articles: &[Article], authors: &[Author]) -> Vec<MergedArticle> {
    let mut by_id: HashMap<&str, &Author> = HashMap::with_capacity(authors.len());
    for author in authors {
        by_id.entry(author.author_id.as_str()).or_insert(author);
    }

    articles
        .iter()
        .map(|article| {
            let author_name = article
                .author_id
                .as_deref()
                .and_then(|id| by_id.get(id))
                .and_then(|author| author.author_name.clone());

            MergedArticle {
                article_id: article.article_id.clone(),
                title: article.title.clone(),
                author_id: article.author_id.clone(),
                author_name,
                date: article.date,
                article_reads: article.reads,
                historic_reads: article.historic_reads,
                profile_views: article.profile_views,
                tags: article.tags.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: &str, author_id: Option<&str>, reads: u64) -> Article {
        Article {
            article_id: Some(id.to_string()),
            title: Some(format!("Title {id}")),
            author_id: author_id.map(str::to_string),
            date: None,
            reads,
            historic_reads: 0,
            profile_views: 0,
            tags: Vec::new(),
        }
    }

    fn author(id: &str, name: &str) -> Author {
        Author {
            author_id: id.to_string(),
            author_name: Some(name.to_string()),
        }
    }

    #[test]
    fn test_join_preserves_every_article() {
        let articles = vec![
            article("a1", Some("1"), 10),
            article("a2", Some("99"), 5),
            article("a3", None, 1),
            article("a4", Some("1"), 2),
        ];
        let authors = vec![author("1", "Ann"), author("2", "Bo")];

        let merged = join_authors(&articles, &authors);

        assert_eq!(merged.len(), articles.len());
        assert_eq!(merged[0].author_name.as_deref(), Some("Ann"));
        assert_eq!(merged[1].author_name, None);
        assert_eq!(merged[2].author_name, None);
        assert_eq!(merged[3].author_name.as_deref(), Some("Ann"));
        assert_eq!(merged[0].article_reads, 10);
    }

    #[test]
    fn test_duplicate_author_ids_do_not_multiply_rows() {
        let articles = vec![article("a1", Some("1"), 10)];
        let authors = vec![author("1", "First"), author("1", "Second")];

        let merged = join_authors(&articles, &authors);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].author_name.as_deref(), Some("First"));
    }

    #[test]
    fn test_join_with_empty_author_table() {
        let articles = vec![article("a1", Some("1"), 10), article("a2", Some("2"), 3)];
        let merged = join_authors(&articles, &[]);

        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|m| m.author_name.is_none()));
    }
}
