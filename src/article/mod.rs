//! Article parsing
//!
//! The parser turns raw HTML into the four article fields. The pipeline only
//! sees the [`ArticleParser`] trait; [`HtmlArticleParser`] is the default
//! implementation, driven by document metadata and paragraph content.

mod parser;

pub use parser::HtmlArticleParser;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::Serialize;
use thiserror::Error;
use url::Url;

/// Errors that can occur while parsing a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty content: no HTML to parse")]
    EmptyContent,

    #[error("Malformed document: {0}")]
    MalformedDocument(String),
}

impl ParseError {
    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyContent => "empty_content",
            Self::MalformedDocument(_) => "malformed_document",
        }
    }
}

/// Fields produced by a parser, before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArticle {
    pub title: String,
    pub authors: Vec<String>,
    pub publish_date: Option<DateTime<FixedOffset>>,
    pub text: String,
}

/// A parsing collaborator
pub trait ArticleParser: Send + Sync {
    /// Parses `html` fetched from `url`
    fn parse(&self, html: &str, url: &Url) -> Result<ParsedArticle, ParseError>;
}

/// Normalized article, as returned to callers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    pub title: String,

    /// Author names in document order, without duplicates
    pub authors: Vec<String>,

    /// RFC 3339 timestamp, absent when the date could not be determined
    pub publish_date: Option<String>,

    pub text: String,
}

impl From<ParsedArticle> for ArticleRecord {
    fn from(parsed: ParsedArticle) -> Self {
        let mut authors: Vec<String> = Vec::with_capacity(parsed.authors.len());
        for author in parsed.authors {
            let author = author.trim();
            if !author.is_empty() && !authors.iter().any(|a| a == author) {
                authors.push(author.to_string());
            }
        }

        Self {
            title: parsed.title.trim().to_string(),
            authors,
            publish_date: parsed
                .publish_date
                .map(|date| date.to_rfc3339_opts(SecondsFormat::Secs, true)),
            text: parsed.text.trim().to_string(),
        }
    }
}
