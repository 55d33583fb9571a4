use crate::fetcher::{errors::FetchError, pipeline::process_response, types::PageResponse};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::instrument;
use url::Url;

pub const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
pub const MAX_REDIRECTS: usize = 10;

/// Result of a single request.
#[derive(Debug)]
pub enum Hop {
    Page(PageResponse),
    /// Raw `Location` value, not yet resolved against the request URL.
    Redirect(String),
}

/// Shared defaults for page fetches: browser-like headers, no cookie store,
/// bounded connect and total time. Redirects are returned to the caller
/// instead of being followed.
pub fn client_builder(user_agent: &str, timeout: Duration) -> ClientBuilder {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ar,en;q=0.8"));

    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .timeout(timeout)
        .user_agent(user_agent)
        .default_headers(headers)
        .redirect(Policy::none())
}

#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_hop(client: &Client, url: Url) -> Result<Hop, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(FetchError::from_reqwest_error)?;

    let status = response.status();

    if status.is_redirection() {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(FetchError::Http { status })?;
        return Ok(Hop::Redirect(location.to_string()));
    }

    // Check content length before downloading
    if let Some(content_length) = response.content_length()
        && content_length > MAX_BODY_SIZE
    {
        return Err(FetchError::BodyTooLarge(content_length));
    }

    let final_url = response.url().clone();

    if !status.is_success() {
        return Err(FetchError::Http { status });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or("text/html")
        .to_string();

    if !content_type.contains("text/html") && !content_type.contains("application/xhtml") {
        return Err(FetchError::UnsupportedContentType(content_type));
    }

    let body_bytes = response
        .bytes()
        .await
        .map_err(FetchError::from_reqwest_error)?;

    // Content-Length may be missing or wrong
    if body_bytes.len() as u64 > MAX_BODY_SIZE {
        return Err(FetchError::BodyTooLarge(body_bytes.len() as u64));
    }

    Ok(Hop::Page(process_response(
        final_url,
        status,
        body_bytes,
        &content_type,
    )))
}
