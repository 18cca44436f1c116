//! Row builders shared by unit tests.

use crate::parser::parse_timestamp;
use crate::records::{MergedArticle, Reader};

pub fn reader(country: &str, industry: Option<&str>, reads: u64) -> Reader {
    Reader {
        user_id: None,
        full_name: None,
        email: None,
        company: None,
        country: Some(country.to_string()),
        industry: industry.map(str::to_string),
        position: None,
        reads,
        last_access: None,
    }
}

pub fn reader_at(timestamp: &str, reads: u64) -> Reader {
    Reader {
        last_access: parse_timestamp(timestamp),
        ..reader("US", Some("Tech"), reads)
    }
}

pub fn article_on(id: &str, date: &str, reads: u64) -> MergedArticle {
    MergedArticle {
        article_id: Some(id.to_string()),
        title: Some(format!("Article {id}")),
        author_id: Some("1".to_string()),
        author_name: Some("Ann".to_string()),
        date: parse_timestamp(date),
        article_reads: reads,
        historic_reads: 0,
        profile_views: 0,
        tags: Vec::new(),
    }
}

pub fn authored(author: &str, reads: u64) -> MergedArticle {
    MergedArticle {
        author_name: Some(author.to_string()),
        ..article_on(author, "2024-01-01", reads)
    }
}
