use std::time::Duration;
use thiserror::Error;

use crate::fetcher::FetchError;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("navigation timed out after {0:?}")]
    NavigationTimeout(Duration),

    #[error("page not ready after {0:?}")]
    DomTimeout(Duration),

    #[error("browser service error {status}: {message}")]
    Service { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
