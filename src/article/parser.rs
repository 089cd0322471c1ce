//! HTML article parser
//!
//! This module extracts the article fields from a document:
//! - Title (Open Graph title, first heading, or `<title>`)
//! - Authors (meta tags, JSON-LD, byline markup)
//! - Publish date (meta tags, JSON-LD, `<time>` elements)
//! - Body text (paragraphs of the `<article>` element or the whole body)

use crate::article::{ArticleParser, ParseError, ParsedArticle};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

/// Meta tags carrying author names, in priority order
const AUTHOR_META: &[&str] = &[
    r#"meta[name="author"]"#,
    r#"meta[property="article:author"]"#,
    r#"meta[name="parsely-author"]"#,
    r#"meta[name="byl"]"#,
];

/// Elements whose text is an author name or byline
const AUTHOR_ELEMENTS: &[&str] = &[
    r#"[rel="author"]"#,
    r#"[itemprop="author"]"#,
    ".byline",
    ".author",
];

/// Meta tags carrying the publish date, in priority order
const DATE_META: &[&str] = &[
    r#"meta[property="article:published_time"]"#,
    r#"meta[name="pubdate"]"#,
    r#"meta[name="publishdate"]"#,
    r#"meta[name="date"]"#,
    r#"meta[itemprop="datePublished"]"#,
];

/// Author names longer than this are assumed to be prose, not a name
const MAX_AUTHOR_LEN: usize = 80;

/// Default parser working on document metadata and paragraph content
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlArticleParser;

impl HtmlArticleParser {
    pub fn new() -> Self {
        Self
    }
}

impl ArticleParser for HtmlArticleParser {
    fn parse(&self, html: &str, url: &Url) -> Result<ParsedArticle, ParseError> {
        if html.trim().is_empty() {
            return Err(ParseError::EmptyContent);
        }

        if !html.contains('<') {
            return Err(ParseError::MalformedDocument(format!(
                "content from {} contains no markup",
                url
            )));
        }

        let document = Html::parse_document(html);
        let json_ld = extract_json_ld(&document);

        Ok(ParsedArticle {
            title: extract_title(&document),
            authors: extract_authors(&document, &json_ld),
            publish_date: extract_publish_date(&document, &json_ld),
            text: extract_text(&document),
        })
    }
}

/// Extracts the title, preferring the Open Graph title over headings
fn extract_title(document: &Html) -> String {
    if let Some(title) = meta_contents(document, r#"meta[property="og:title"]"#).next() {
        return title;
    }

    for selector in ["h1", "title"] {
        if let Some(text) = select_first_text(document, selector) {
            return text;
        }
    }

    String::new()
}

/// Collects author names from every known source, in document order per source
fn extract_authors(document: &Html, json_ld: &[Value]) -> Vec<String> {
    let mut candidates = Vec::new();

    for selector in AUTHOR_META {
        candidates.extend(meta_contents(document, selector));
    }

    for value in json_ld {
        collect_json_ld_authors(value, &mut candidates);
    }

    for selector in AUTHOR_ELEMENTS {
        if let Ok(selector) = Selector::parse(selector) {
            candidates.extend(document.select(&selector).map(element_text));
        }
    }

    let mut authors: Vec<String> = Vec::new();
    for candidate in candidates {
        for name in split_byline(&candidate) {
            if !authors.iter().any(|a| a.eq_ignore_ascii_case(&name)) {
                authors.push(name);
            }
        }
    }

    authors
}

/// Splits a byline such as "By Jane Doe and John Roe" into names
fn split_byline(byline: &str) -> Vec<String> {
    let trimmed = byline.trim();
    let without_prefix = trimmed
        .strip_prefix("By ")
        .or_else(|| trimmed.strip_prefix("by "))
        .or_else(|| trimmed.strip_prefix("BY "))
        .unwrap_or(trimmed);

    without_prefix
        .split(',')
        .flat_map(|part| part.split(" and "))
        .map(|name| name.trim().to_string())
        .filter(|name| {
            !name.is_empty()
                && name.len() <= MAX_AUTHOR_LEN
                && !name.starts_with("http://")
                && !name.starts_with("https://")
        })
        .collect()
}

/// Finds the publish date in meta tags, JSON-LD or `<time>` elements
fn extract_publish_date(document: &Html, json_ld: &[Value]) -> Option<DateTime<FixedOffset>> {
    let mut candidates: Vec<String> = Vec::new();

    for selector in DATE_META {
        candidates.extend(meta_contents(document, selector));
    }

    for value in json_ld {
        collect_json_ld_dates(value, &mut candidates);
    }

    if let Ok(selector) = Selector::parse(r#"[itemprop="datePublished"], time[datetime]"#) {
        for element in document.select(&selector) {
            let attrs = element.value();
            if let Some(value) = attrs.attr("datetime").or_else(|| attrs.attr("content")) {
                candidates.push(value.to_string());
            }
        }
    }

    candidates.iter().find_map(|candidate| parse_date(candidate))
}

/// Parses the date formats commonly found in article metadata
fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date);
    }

    let utc = FixedOffset::east_opt(0)?;

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive).with_timezone(&utc));
        }
    }

    let date_part = raw.get(..10)?;
    let naive = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    Some(
        Utc.from_utc_datetime(&naive.and_hms_opt(0, 0, 0)?)
            .with_timezone(&utc),
    )
}

/// Extracts body text from paragraphs, preferring the `<article>` element
fn extract_text(document: &Html) -> String {
    let scope = Selector::parse("article")
        .ok()
        .and_then(|selector| document.select(&selector).next());

    let Ok(paragraph) = Selector::parse("p") else {
        return String::new();
    };

    let paragraphs: Vec<String> = match scope {
        Some(article) => article.select(&paragraph).map(element_text).collect(),
        None => document.select(&paragraph).map(element_text).collect(),
    };

    paragraphs
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Parses every JSON-LD block, skipping ones that are not valid JSON
fn extract_json_ld(document: &Html) -> Vec<Value> {
    let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|script| {
            let raw = script.text().collect::<String>();
            match serde_json::from_str::<Value>(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::debug!("Ignoring invalid JSON-LD block: {}", e);
                    None
                }
            }
        })
        .collect()
}

/// Walks a JSON-LD value collecting `author` names
fn collect_json_ld_authors(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_json_ld_authors(item, out);
            }
        }
        Value::Object(map) => {
            if let Some(author) = map.get("author") {
                collect_author_names(author, out);
            }
            if let Some(graph) = map.get("@graph") {
                collect_json_ld_authors(graph, out);
            }
        }
        _ => {}
    }
}

fn collect_author_names(author: &Value, out: &mut Vec<String>) {
    match author {
        Value::String(name) => out.push(name.clone()),
        Value::Object(map) => {
            if let Some(Value::String(name)) = map.get("name") {
                out.push(name.clone());
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_author_names(item, out);
            }
        }
        _ => {}
    }
}

/// Walks a JSON-LD value collecting `datePublished` values
fn collect_json_ld_dates(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_json_ld_dates(item, out);
            }
        }
        Value::Object(map) => {
            if let Some(Value::String(date)) = map.get("datePublished") {
                out.push(date.clone());
            }
            if let Some(graph) = map.get("@graph") {
                collect_json_ld_dates(graph, out);
            }
        }
        _ => {}
    }
}

/// Non-empty `content` attributes of the elements matching `selector`
fn meta_contents<'a>(document: &'a Html, selector: &str) -> impl Iterator<Item = String> + 'a {
    let selector = Selector::parse(selector).ok();

    selector
        .into_iter()
        .flat_map(move |selector| {
            document
                .select(&selector)
                .filter_map(|element| element.value().attr("content"))
                .map(|content| content.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|content| !content.is_empty())
}

fn select_first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;

    document
        .select(&selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

/// Element text with runs of whitespace collapsed
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
