use async_trait::async_trait;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::browser::{PageRenderer, RenderError, RenderOptions, RenderedPage, SessionTracker};
use crate::gate::ValidatedUrl;

const DEFAULT_GRACE: Duration = Duration::from_secs(5);

/// Requests the remote browser must not make, matched against each request
/// URL: loopback, private, link-local and unique-local hosts, written the
/// way Chrome canonicalizes them.
pub const PRIVATE_REQUEST_PATTERNS: &[&str] = &[
    r"^[a-z][a-z0-9+.-]*://([^/@]*@)?(localhost|[^/:@]*\.localhost)(:\d+)?(/|$)",
    r"^[a-z][a-z0-9+.-]*://([^/@]*@)?(0|10|127)\.\d+\.\d+\.\d+(:\d+)?(/|$)",
    r"^[a-z][a-z0-9+.-]*://([^/@]*@)?169\.254\.\d+\.\d+(:\d+)?(/|$)",
    r"^[a-z][a-z0-9+.-]*://([^/@]*@)?172\.(1[6-9]|2\d|3[01])\.\d+\.\d+(:\d+)?(/|$)",
    r"^[a-z][a-z0-9+.-]*://([^/@]*@)?192\.168\.\d+\.\d+(:\d+)?(/|$)",
    r"^[a-z][a-z0-9+.-]*://([^/@]*@)?\[(::1?|::ffff:[^\]]*|f[cd][0-9a-f]*:[^\]]*|fe[89ab][0-9a-f]*:[^\]]*)\](:\d+)?(/|$)",
];

/// Renders pages in a remote headless Chrome exposed by a Browserless
/// `/content` endpoint. One request is one browser session.
pub struct BrowserlessRenderer {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    sessions: SessionTracker,
    grace: Duration,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest<'a> {
    url: &'a str,
    user_agent: &'a str,
    set_java_script_enabled: bool,
    reject_resource_types: Vec<&'static str>,
    reject_request_pattern: &'static [&'static str],
    goto_options: GotoOptions,
    wait_for_selector: WaitForSelector<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GotoOptions {
    timeout: u64,
    wait_until: &'static str,
}

#[derive(Serialize)]
struct WaitForSelector<'a> {
    selector: &'a str,
    timeout: u64,
}

impl BrowserlessRenderer {
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self, RenderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| RenderError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
            sessions: SessionTracker::new(),
            grace: DEFAULT_GRACE,
        })
    }

    /// Extra time allowed on top of the navigation and DOM-ready bounds for
    /// the service round trip.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn open_sessions(&self) -> usize {
        self.sessions.open_sessions()
    }

    fn endpoint(&self) -> String {
        match &self.token {
            Some(token) => format!(
                "{}/content?token={}",
                self.base_url,
                utf8_percent_encode(token, NON_ALPHANUMERIC)
            ),
            None => format!("{}/content", self.base_url),
        }
    }

    async fn request_content(
        &self,
        url: &ValidatedUrl,
        options: &RenderOptions,
    ) -> Result<RenderedPage, RenderError> {
        let body = ContentRequest {
            url: url.as_str(),
            user_agent: &options.user_agent,
            set_java_script_enabled: true,
            reject_resource_types: options.blocked_resources.iter().map(|r| r.as_str()).collect(),
            reject_request_pattern: PRIVATE_REQUEST_PATTERNS,
            goto_options: GotoOptions {
                timeout: options.navigation_timeout.as_millis() as u64,
                wait_until: "domcontentloaded",
            },
            wait_for_selector: WaitForSelector {
                selector: &options.ready_selector,
                timeout: options.dom_ready_timeout.as_millis() as u64,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RenderError::NavigationTimeout(options.navigation_timeout)
                } else {
                    RenderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, message, options));
        }

        let html = response
            .text()
            .await
            .map_err(|e| RenderError::Network(e.to_string()))?;

        debug!(status = %status, bytes = html.len(), "browser session rendered page");

        Ok(RenderedPage {
            final_url: url.url().clone(),
            html,
        })
    }
}

fn classify_failure(status: StatusCode, message: String, options: &RenderOptions) -> RenderError {
    let lower = message.to_lowercase();
    let timed_out = status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::GATEWAY_TIMEOUT
        || lower.contains("timeout")
        || lower.contains("timed out");

    if timed_out && lower.contains("selector") {
        RenderError::DomTimeout(options.dom_ready_timeout)
    } else if timed_out {
        RenderError::NavigationTimeout(options.navigation_timeout)
    } else {
        RenderError::Service {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl PageRenderer for BrowserlessRenderer {
    #[instrument(skip_all, fields(url = %url.as_str()))]
    async fn render(
        &self,
        url: &ValidatedUrl,
        options: &RenderOptions,
    ) -> Result<RenderedPage, RenderError> {
        let _session = self.sessions.open(url.as_str());
        let budget = options.navigation_timeout + options.dom_ready_timeout + self.grace;

        match tokio::time::timeout(budget, self.request_content(url, options)).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::NavigationTimeout(options.navigation_timeout)),
        }
    }
}
