#![allow(dead_code)]

use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sourcegate::attribution::AttributionResolver;
use sourcegate::browser::{PageRenderer, RenderError, RenderOptions, RenderedPage};
use sourcegate::extractor::PageExtractor;
use sourcegate::gate::{StaticResolver, TrustGate, ValidatedUrl};
use sourcegate::pipeline::Pipeline;
use sourcegate::rewrite::{RewriteOrchestrator, RewriteRequest, RewriteService};
use sourcegate::sources::{SourceEntry, SourceRegistry, StableCitation};

pub const PUBLIC_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 10));
pub const PRIVATE_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5));

pub fn paragraph(seed: &str) -> String {
    format!(
        "{seed} أعلنت وزارة الصحة اليوم عن إطلاق حملة وطنية جديدة للتطعيم تستهدف الأطفال في جميع المناطق."
    )
}

pub fn article_html(title: &str, paragraphs: &[String]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
    format!(
        r#"<html><head><meta property="og:title" content="{title}"></head>
           <body><article>{body}</article></body></html>"#
    )
}

/// Small registry: reuters.com plus a generic trusted domain.
pub fn fixture_registry() -> Arc<SourceRegistry> {
    Arc::new(
        SourceRegistry::new(vec![
            SourceEntry::new(
                "reuters.com",
                "رويترز",
                "Reuters",
                vec![
                    "وفقاً لوكالة رويترز".to_string(),
                    "بحسب ما نقلته وكالة رويترز".to_string(),
                    "أفادت رويترز".to_string(),
                ],
            )
            .unwrap(),
            SourceEntry::new(
                "example-trusted.com",
                "المصدر الموثوق",
                "Example Trusted",
                vec!["نقلاً عن المصدر الموثوق".to_string()],
            )
            .unwrap(),
        ])
        .unwrap(),
    )
}

pub fn fixture_resolver() -> StaticResolver {
    StaticResolver::new()
        .with_host("www.reuters.com", PUBLIC_IP)
        .with_host("reuters.com", PUBLIC_IP)
        .with_host("news.example-trusted.com", PUBLIC_IP)
        .with_host("rebind.reuters.com", PRIVATE_IP)
}

pub fn fixture_gate() -> TrustGate {
    TrustGate::new(fixture_registry(), Arc::new(fixture_resolver()))
}

#[derive(Clone)]
pub enum RenderBehavior {
    Html(String),
    NavigationTimeout,
    DomTimeout,
}

/// Renderer double that counts calls and records the URLs it was given.
pub struct FakeRenderer {
    behavior: RenderBehavior,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl FakeRenderer {
    pub fn new(behavior: RenderBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn html(html: String) -> Arc<Self> {
        Self::new(RenderBehavior::Html(html))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn render(
        &self,
        url: &ValidatedUrl,
        options: &RenderOptions,
    ) -> Result<RenderedPage, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.as_str().to_string());
        match &self.behavior {
            RenderBehavior::Html(html) => Ok(RenderedPage {
                final_url: url.url().clone(),
                html: html.clone(),
            }),
            RenderBehavior::NavigationTimeout => {
                Err(RenderError::NavigationTimeout(options.navigation_timeout))
            }
            RenderBehavior::DomTimeout => Err(RenderError::DomTimeout(options.dom_ready_timeout)),
        }
    }
}

/// Rewrite double returning a canned response or error.
pub struct FakeRewriter {
    response: Result<String, String>,
    requests: Mutex<Vec<RewriteRequest>>,
}

impl FakeRewriter {
    pub fn ok(body: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(body.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<RewriteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RewriteService for FakeRewriter {
    async fn complete(&self, request: &RewriteRequest) -> anyhow::Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.response.clone().map_err(anyhow::Error::msg)
    }
}

pub fn pipeline_with(
    renderer: Arc<FakeRenderer>,
    rewriter: Option<Arc<FakeRewriter>>,
) -> Pipeline {
    let registry = fixture_registry();
    let rewriter = match rewriter {
        Some(service) => RewriteOrchestrator::new(service, Duration::from_secs(5)),
        None => RewriteOrchestrator::disabled(),
    };
    Pipeline::new(
        TrustGate::new(registry.clone(), Arc::new(fixture_resolver())),
        PageExtractor::new(renderer, RenderOptions::default()),
        AttributionResolver::new(registry, Arc::new(StableCitation)),
        rewriter,
    )
}
