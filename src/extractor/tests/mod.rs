use std::fs;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::browser::{MockPageRenderer, RenderError, RenderOptions, RenderedPage};
use crate::extractor::{ExtractionFailure, PageExtractor, extract_from_html};
use crate::gate::{TrustGate, ValidatedUrl};
use crate::sources::SourceRegistry;

const ARTICLE_URL: &str = "https://www.reuters.com/world/middle-east/vaccine-campaign-2024-05-14/";

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}

fn validated(url: &str) -> ValidatedUrl {
    let registry = Arc::new(SourceRegistry::builtin().unwrap());
    TrustGate::with_system_resolver(registry).validate(url).unwrap()
}

fn extractor_returning(
    result: impl Fn() -> Result<RenderedPage, RenderError> + Send + Sync + 'static,
) -> PageExtractor {
    let mut renderer = MockPageRenderer::new();
    renderer
        .expect_render()
        .times(1)
        .returning(move |_, _| result());
    PageExtractor::new(Arc::new(renderer), RenderOptions::default())
}

#[test]
fn test_extract_article_fixture() {
    let page_url = Url::parse(ARTICLE_URL).unwrap();
    let result = extract_from_html(&fixture("article.html"), &page_url).unwrap();

    assert_eq!(result.title, "وزارة الصحة تطلق حملة تطعيم وطنية جديدة");
    assert!(result.body.starts_with("أعلنت وزارة الصحة اليوم الثلاثاء"));
    assert_eq!(result.body.split("\n\n").count(), 3);
    assert!(!result.body.contains("صورة\n"));
    assert!(!result.body.contains("جميع الحقوق محفوظة"));
    assert!(!result.body.contains("analytics"));
    assert_eq!(
        result.image_url.as_deref(),
        Some("https://www.reuters.com/resizer/images/vaccine-campaign.jpg")
    );
    assert_eq!(result.published_at.as_deref(), Some("2024-05-14T08:30:00Z"));
    assert_eq!(result.language.as_deref(), Some("ar"));
    assert_eq!(result.source_url, page_url);
}

#[test]
fn test_thin_page_is_insufficient_content() {
    let page_url = Url::parse("https://www.reuters.com/paywalled").unwrap();
    let err = extract_from_html(&fixture("thin.html"), &page_url).unwrap_err();
    assert!(matches!(err, ExtractionFailure::InsufficientContent { .. }));
}

#[test]
fn test_title_falls_back_to_host() {
    let body = "نص طويل بما يكفي لتجاوز الحد الأدنى من طول الفقرة في استخراج المحتوى. ".repeat(3);
    let html = format!("<html><body><article><p>{body}</p></article></body></html>");
    let page_url = Url::parse("https://www.aljazeera.net/news/1").unwrap();

    let result = extract_from_html(&html, &page_url).unwrap();
    assert_eq!(result.title, "www.aljazeera.net");
    assert!(result.image_url.is_none());
    assert!(result.published_at.is_none());
}

#[test]
fn test_malformed_html() {
    let html = format!(
        "<html><head><title>Broken</title><body><article><p>{}<div>More content",
        "Unclosed tags keep going without ever closing the paragraph element. ".repeat(3)
    );
    let page_url = Url::parse("https://www.bbc.com/news/broken").unwrap();

    let result = extract_from_html(&html, &page_url).unwrap();
    assert_eq!(result.title, "Broken");
    assert!(result.body.contains("Unclosed tags"));
}

#[tokio::test]
async fn test_page_extractor_keeps_validated_source_url() {
    let extractor = extractor_returning(|| {
        Ok(RenderedPage {
            final_url: Url::parse("https://www.reuters.com/amp/vaccine-campaign").unwrap(),
            html: fixture("article.html"),
        })
    });

    let url = validated(ARTICLE_URL);
    let result = extractor.extract(&url).await.unwrap();

    assert_eq!(result.source_url.as_str(), ARTICLE_URL);
    assert_eq!(
        result.image_url.as_deref(),
        Some("https://www.reuters.com/resizer/images/vaccine-campaign.jpg")
    );
}

#[tokio::test]
async fn test_page_extractor_maps_timeouts() {
    let extractor =
        extractor_returning(|| Err(RenderError::NavigationTimeout(Duration::from_secs(30))));
    let err = extractor.extract(&validated(ARTICLE_URL)).await.unwrap_err();
    assert_eq!(err, ExtractionFailure::NavigationTimeout);

    let extractor = extractor_returning(|| Err(RenderError::DomTimeout(Duration::from_secs(10))));
    let err = extractor.extract(&validated(ARTICLE_URL)).await.unwrap_err();
    assert_eq!(err, ExtractionFailure::DomTimeout);
}

#[tokio::test]
async fn test_page_extractor_maps_service_errors() {
    let extractor = extractor_returning(|| {
        Err(RenderError::Service {
            status: 500,
            message: "browser crashed".to_string(),
        })
    });
    let err = extractor.extract(&validated(ARTICLE_URL)).await.unwrap_err();
    assert_eq!(err.as_str(), "render-failed");
}

#[tokio::test]
async fn test_page_extractor_rejects_thin_render() {
    let extractor = extractor_returning(|| {
        Ok(RenderedPage {
            final_url: Url::parse(ARTICLE_URL).unwrap(),
            html: fixture("thin.html"),
        })
    });
    let err = extractor.extract(&validated(ARTICLE_URL)).await.unwrap_err();
    assert_eq!(err.as_str(), "insufficient-content");
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(
            html in ".*",
            url in "https://[a-z]+\\.com/[a-z]*"
        ) {
            let page_url = Url::parse(&url).unwrap();
            let _ = extract_from_html(&html, &page_url);
        }

        #[test]
        fn test_successful_extraction_meets_floor(html in ".*") {
            let page_url = Url::parse("https://www.reuters.com/").unwrap();
            if let Ok(result) = extract_from_html(&html, &page_url) {
                prop_assert!(result.body.trim().chars().count() >= crate::extractor::reject::MIN_CONTENT_LENGTH);
                prop_assert!(!result.title.is_empty());
            }
        }
    }
}
