//! Rendering capability used by the page extractor.
//!
//! A renderer turns a [`ValidatedUrl`] into the HTML of the loaded page.
//! Each call owns exactly one session and releases it before returning, on
//! every path.

pub mod browserless;
pub mod errors;
pub mod session;

pub use browserless::BrowserlessRenderer;
pub use errors::RenderError;
pub use session::{SessionGuard, SessionTracker};

use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::gate::ValidatedUrl;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Resource types a session never loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Stylesheet,
    Font,
    Media,
    Image,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stylesheet => "stylesheet",
            Self::Font => "font",
            Self::Media => "media",
            Self::Image => "image",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub user_agent: String,
    /// Bound on reaching document-ready.
    pub navigation_timeout: Duration,
    /// Bound on `ready_selector` appearing after navigation.
    pub dom_ready_timeout: Duration,
    pub ready_selector: String,
    pub blocked_resources: Vec<ResourceType>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            navigation_timeout: Duration::from_secs(30),
            dom_ready_timeout: Duration::from_secs(10),
            ready_selector: "body".to_string(),
            blocked_resources: vec![
                ResourceType::Stylesheet,
                ResourceType::Font,
                ResourceType::Media,
                ResourceType::Image,
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub final_url: Url,
    pub html: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(
        &self,
        url: &ValidatedUrl,
        options: &RenderOptions,
    ) -> Result<RenderedPage, RenderError>;
}
