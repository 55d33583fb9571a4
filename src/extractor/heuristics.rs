//! Ordered extraction strategies. Each chain is tried front to back and the
//! first strategy that yields something wins; new heuristics are added by
//! inserting an entry, not by branching.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::extractor::model::collapse_whitespace;

/// How to read one scalar field (title, image, date) from a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStrategy {
    /// `content` attribute of the first matching `<meta>`.
    Meta(&'static str),
    /// Text of the first matching element with non-blank text.
    Text(&'static str),
    /// Named attribute of the first matching element.
    Attr(&'static str, &'static str),
}

pub const TITLE_CHAIN: &[FieldStrategy] = &[
    FieldStrategy::Meta("meta[property='og:title']"),
    FieldStrategy::Meta("meta[name='twitter:title']"),
    FieldStrategy::Text("h1.entry-title"),
    FieldStrategy::Text("h1.article-title"),
    FieldStrategy::Text("h1.post-title"),
    FieldStrategy::Text(".article-header h1"),
    FieldStrategy::Text("article h1"),
    FieldStrategy::Text(".headline"),
    FieldStrategy::Text("h1"),
    FieldStrategy::Text("title"),
];

pub const IMAGE_CHAIN: &[FieldStrategy] = &[
    FieldStrategy::Meta("meta[property='og:image']"),
    FieldStrategy::Meta("meta[name='twitter:image']"),
    FieldStrategy::Meta("meta[name='twitter:image:src']"),
];

pub const DATE_CHAIN: &[FieldStrategy] = &[
    FieldStrategy::Meta("meta[property='article:published_time']"),
    FieldStrategy::Attr("time[datetime]", "datetime"),
];

impl FieldStrategy {
    fn selector(&self) -> &'static str {
        match self {
            Self::Meta(s) | Self::Text(s) | Self::Attr(s, _) => *s,
        }
    }

    pub fn apply(&self, document: &Html) -> Option<String> {
        let selector = Selector::parse(self.selector()).ok()?;
        document.select(&selector).find_map(|element| {
            let value = match self {
                Self::Meta(_) => element.value().attr("content").map(collapse_whitespace),
                Self::Attr(_, attr) => element.value().attr(attr).map(collapse_whitespace),
                Self::Text(_) => Some(element_text(&element)),
            }?;
            (!value.is_empty()).then_some(value)
        })
    }
}

pub fn first_match(document: &Html, chain: &[FieldStrategy]) -> Option<String> {
    chain.iter().find_map(|strategy| {
        let value = strategy.apply(document)?;
        debug!(selector = strategy.selector(), "field strategy matched");
        Some(value)
    })
}

/// Paragraph selector plus the minimum length, in characters, a paragraph
/// must exceed to count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyStrategy {
    pub selector: &'static str,
    pub min_len: usize,
}

const fn body(selector: &'static str) -> BodyStrategy {
    BodyStrategy {
        selector,
        min_len: PARAGRAPH_MIN_LEN,
    }
}

pub const PARAGRAPH_MIN_LEN: usize = 50;
pub const FALLBACK_PARAGRAPH_MIN_LEN: usize = 100;
pub const FALLBACK_PARAGRAPH_CAP: usize = 10;

pub const BODY_CHAIN: &[BodyStrategy] = &[
    body(".entry-content p"),
    body(".article-body p"),
    body(".article-content p"),
    body("[itemprop='articleBody'] p"),
    body(".post-content p"),
    body(".story-body p"),
    body("article p"),
];

impl BodyStrategy {
    pub fn collect(&self, document: &Html) -> Vec<String> {
        let Ok(selector) = Selector::parse(self.selector) else {
            return Vec::new();
        };
        document
            .select(&selector)
            .map(|element| element_text(&element))
            .filter(|text| text.chars().count() > self.min_len)
            .collect()
    }
}

/// Runs [`BODY_CHAIN`], then falls back to any long `<p>` on the page,
/// capped at [`FALLBACK_PARAGRAPH_CAP`] paragraphs.
pub fn extract_body(document: &Html) -> Option<String> {
    for strategy in BODY_CHAIN {
        let paragraphs = strategy.collect(document);
        if !paragraphs.is_empty() {
            debug!(
                selector = strategy.selector,
                paragraphs = paragraphs.len(),
                "body strategy matched"
            );
            return Some(paragraphs.join("\n\n"));
        }
    }

    let fallback = BodyStrategy {
        selector: "p",
        min_len: FALLBACK_PARAGRAPH_MIN_LEN,
    };
    let paragraphs: Vec<String> = fallback
        .collect(document)
        .into_iter()
        .take(FALLBACK_PARAGRAPH_CAP)
        .collect();

    if paragraphs.is_empty() {
        debug!("no body strategy matched");
        return None;
    }
    debug!(paragraphs = paragraphs.len(), "body taken from page-wide paragraphs");
    Some(paragraphs.join("\n\n"))
}

fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long(prefix: &str, len: usize) -> String {
        let mut s = prefix.to_string();
        while s.chars().count() < len {
            s.push_str(" lorem");
        }
        s
    }

    #[test]
    fn test_title_prefers_open_graph() {
        let doc = Html::parse_document(
            r#"<html><head><title>Doc title</title><meta property="og:title" content="OG title"></head><body><h1>Heading</h1></body></html>"#,
        );
        assert_eq!(first_match(&doc, TITLE_CHAIN).as_deref(), Some("OG title"));
    }

    #[test]
    fn test_title_skips_blank_candidates() {
        let doc = Html::parse_document(
            r#"<html><head><title>Doc title</title><meta property="og:title" content="  "></head><body><h1>  </h1><h1> Real   heading </h1></body></html>"#,
        );
        assert_eq!(first_match(&doc, TITLE_CHAIN).as_deref(), Some("Real heading"));
    }

    #[test]
    fn test_title_falls_back_to_document_title() {
        let doc = Html::parse_document("<html><head><title>Only title</title></head><body></body></html>");
        assert_eq!(first_match(&doc, TITLE_CHAIN).as_deref(), Some("Only title"));
    }

    #[test]
    fn test_image_and_date_chains() {
        let doc = Html::parse_document(
            r#"<html><head>
                <meta name="twitter:image" content="https://cdn.example.com/t.jpg">
                </head><body><time datetime="2024-05-01T10:00:00Z">May 1</time></body></html>"#,
        );
        assert_eq!(
            first_match(&doc, IMAGE_CHAIN).as_deref(),
            Some("https://cdn.example.com/t.jpg")
        );
        assert_eq!(first_match(&doc, DATE_CHAIN).as_deref(), Some("2024-05-01T10:00:00Z"));

        let doc = Html::parse_document(
            r#"<html><head><meta property="article:published_time" content="2024-06-02"></head>
               <body><time datetime="2020-01-01">old</time></body></html>"#,
        );
        assert_eq!(first_match(&doc, DATE_CHAIN).as_deref(), Some("2024-06-02"));
    }

    #[test]
    fn test_body_uses_first_matching_container() {
        let p1 = long("Entry paragraph one", 60);
        let p2 = long("Entry paragraph two", 60);
        let other = long("Article paragraph", 60);
        let html = format!(
            r#"<html><body>
                <div class="entry-content"><p>{p1}</p><p>short</p><p>{p2}</p></div>
                <article><p>{other}</p></article>
            </body></html>"#
        );
        let doc = Html::parse_document(&html);
        assert_eq!(extract_body(&doc).unwrap(), format!("{p1}\n\n{p2}"));
    }

    #[test]
    fn test_body_skips_containers_without_qualifying_paragraphs() {
        let para = long("Story text", 60);
        let html = format!(
            r#"<html><body>
                <div class="entry-content"><p>too short</p></div>
                <div itemprop="articleBody"><p>{para}</p></div>
            </body></html>"#
        );
        let doc = Html::parse_document(&html);
        assert_eq!(extract_body(&doc).unwrap(), para);
    }

    #[test]
    fn test_body_fallback_requires_longer_paragraphs_and_caps_count() {
        let medium = long("Medium", 70);
        let mut html = format!("<html><body><div><p>{medium}</p>");
        for i in 0..15 {
            html.push_str(&format!("<p>{}</p>", long(&format!("Paragraph {i}"), 120)));
        }
        html.push_str("</div></body></html>");

        let doc = Html::parse_document(&html);
        let body = extract_body(&doc).unwrap();
        let paragraphs: Vec<&str> = body.split("\n\n").collect();
        assert_eq!(paragraphs.len(), FALLBACK_PARAGRAPH_CAP);
        assert!(paragraphs[0].starts_with("Paragraph 0"));
        assert!(!body.contains("Medium"));
    }

    #[test]
    fn test_body_lengths_count_characters_not_bytes() {
        // 30 Arabic letters are 60 bytes but only 30 characters.
        let arabic = "ب".repeat(30);
        let html = format!("<html><body><article><p>{arabic}</p></article></body></html>");
        let doc = Html::parse_document(&html);
        assert!(extract_body(&doc).is_none());
    }

    #[test]
    fn test_no_body() {
        let doc = Html::parse_document("<html><body><nav>menu</nav></body></html>");
        assert!(extract_body(&doc).is_none());
    }
}
