use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::browser::{PageRenderer, RenderError, RenderOptions, RenderedPage};
use crate::fetcher::client::{Hop, MAX_REDIRECTS, client_builder, fetch_hop};
use crate::fetcher::errors::FetchError;
use crate::gate::{TrustGate, ValidatedUrl};

/// Performs one request for a URL that already passed the gate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HopTransport: Send + Sync {
    async fn fetch(&self, url: &ValidatedUrl, options: &RenderOptions) -> Result<Hop, FetchError>;
}

/// Connects only to the addresses the gate resolved for the URL.
pub struct PinnedTransport;

#[async_trait]
impl HopTransport for PinnedTransport {
    async fn fetch(&self, url: &ValidatedUrl, options: &RenderOptions) -> Result<Hop, FetchError> {
        if url.resolved().is_empty() {
            return Err(FetchError::Unpinned(url.host().to_string()));
        }
        let client = client_builder(&options.user_agent, options.navigation_timeout)
            .resolve_to_addrs(url.host(), url.resolved())
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        fetch_hop(&client, url.url().clone()).await
    }
}

/// Plain HTTP fetch of the page HTML, without running page scripts.
///
/// Redirects are followed here, one hop at a time. Each target goes through
/// [`TrustGate::validate_resolved`] and is fetched pinned to the addresses
/// that check resolved, so a redirect can never reach a host the gate did
/// not vet.
pub struct StaticRenderer {
    gate: TrustGate,
    transport: Arc<dyn HopTransport>,
}

impl StaticRenderer {
    pub fn new(gate: TrustGate) -> Self {
        Self::with_transport(gate, Arc::new(PinnedTransport))
    }

    pub fn with_transport(gate: TrustGate, transport: Arc<dyn HopTransport>) -> Self {
        Self { gate, transport }
    }

    async fn follow(
        &self,
        url: &ValidatedUrl,
        options: &RenderOptions,
    ) -> Result<RenderedPage, FetchError> {
        let mut current = if url.resolved().is_empty() {
            self.admit(url.as_str()).await?
        } else {
            url.clone()
        };

        for _ in 0..=MAX_REDIRECTS {
            match self.transport.fetch(&current, options).await? {
                Hop::Page(page) => {
                    return Ok(RenderedPage {
                        final_url: current.url().clone(),
                        html: page.body_utf8,
                    });
                }
                Hop::Redirect(location) => {
                    let next = current.url().join(&location)?;
                    debug!(from = %current.as_str(), to = %next, "following redirect");
                    current = self.admit(next.as_str()).await?;
                }
            }
        }

        Err(FetchError::TooManyRedirects(MAX_REDIRECTS))
    }

    async fn admit(&self, url: &str) -> Result<ValidatedUrl, FetchError> {
        self.gate
            .validate_resolved(url)
            .await
            .map_err(|reason| FetchError::Untrusted {
                url: url.to_string(),
                reason,
            })
    }
}

#[async_trait]
impl PageRenderer for StaticRenderer {
    #[instrument(skip_all, fields(url = %url.as_str()))]
    async fn render(
        &self,
        url: &ValidatedUrl,
        options: &RenderOptions,
    ) -> Result<RenderedPage, RenderError> {
        let budget = options.navigation_timeout;
        match tokio::time::timeout(budget, self.follow(url, options)).await {
            Err(_) => Err(RenderError::NavigationTimeout(budget)),
            Ok(Ok(page)) => Ok(page),
            Ok(Err(e)) if e.is_timeout() => Err(RenderError::NavigationTimeout(budget)),
            Ok(Err(e)) => Err(RenderError::Fetch(e)),
        }
    }
}
