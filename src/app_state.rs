use std::sync::Arc;

use crate::pipeline::Pipeline;
use crate::sources::SourceRegistry;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub registry: Arc<SourceRegistry>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        let registry = pipeline.gate().registry().clone();
        Self { pipeline, registry }
    }
}
