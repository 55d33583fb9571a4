pub mod api;
pub mod app_state;
pub mod attribution;
pub mod browser;
pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod gate;
pub mod health;
pub mod middleware;
pub mod pipeline;
pub mod rewrite;
pub mod scanner;
pub mod sources;

use std::sync::Arc;
use tracing::info;

use crate::attribution::AttributionResolver;
use crate::browser::{BrowserlessRenderer, PageRenderer, RenderOptions};
use crate::config::Config;
use crate::extractor::PageExtractor;
use crate::fetcher::StaticRenderer;
use crate::gate::TrustGate;
use crate::pipeline::Pipeline;
use crate::rewrite::{ChatCompletionsClient, RewriteOrchestrator};
use crate::sources::{RegistryError, SourceRegistry};

/// The configured registry file, or the built-in source list.
pub fn load_registry(config: &Config) -> Result<SourceRegistry, RegistryError> {
    match config.sources_path() {
        Some(path) => SourceRegistry::from_path(path),
        None => SourceRegistry::builtin(),
    }
}

/// Wires a [`Pipeline`] from configuration. Pages go through the browser
/// service when one is configured and are fetched statically otherwise;
/// rewriting is enabled only with an API key.
pub fn build_pipeline(config: &Config) -> anyhow::Result<Pipeline> {
    let registry = Arc::new(load_registry(config)?);
    info!(sources = registry.len(), "source registry loaded");

    let gate = TrustGate::with_system_resolver(registry.clone());

    let options = RenderOptions {
        navigation_timeout: config.navigation_timeout(),
        dom_ready_timeout: config.dom_ready_timeout(),
        ..RenderOptions::default()
    };

    let renderer: Arc<dyn PageRenderer> = match config.browserless_url() {
        Some(base_url) => {
            info!(base_url, "rendering through browser service");
            Arc::new(BrowserlessRenderer::new(base_url, config.browserless_token())?)
        }
        None => {
            info!("no browser service configured, fetching static HTML");
            Arc::new(StaticRenderer::new(gate.clone()))
        }
    };

    let rewriter = match config.llm_api_key() {
        Some(api_key) => {
            let client = ChatCompletionsClient::new(api_key, config.llm_model(), config.llm_timeout())?
                .with_base_url(config.llm_base_url());
            info!(model = config.llm_model(), "rewrite service enabled");
            RewriteOrchestrator::new(Arc::new(client), config.llm_timeout())
        }
        None => {
            info!("no rewrite service configured, drafts use the fallback format");
            RewriteOrchestrator::disabled()
        }
    };

    Ok(Pipeline::new(
        gate,
        PageExtractor::new(renderer, options),
        AttributionResolver::with_random_citation(registry),
        rewriter,
    ))
}

/// `RUST_LOG` filtering; JSON lines when `LOG_FORMAT=json`. Logs go to
/// stderr so stdout stays clean for results.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}
