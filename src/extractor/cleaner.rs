use url::Url;

/// Resolves a possibly relative media reference against the page URL.
/// Only http(s) results are kept; `data:` and `javascript:` URLs are dropped.
pub fn resolve_media_url(base_url: &Url, raw: &str) -> Option<String> {
    let resolved = base_url.join(raw.trim()).ok()?;
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

/// True when `text` contains tags, comments or a doctype. Bare `&`, `<` and
/// `>` in prose do not count.
pub fn contains_markup(text: &str) -> bool {
    ammonia::is_html(text)
}
