use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("invalid source configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid domain '{0}': expected a lower-case hostname without scheme or www.")]
    InvalidDomain(String),

    #[error("duplicate domain: {0}")]
    DuplicateDomain(String),

    #[error("source {0} has no citation phrases")]
    NoCitations(String),

    #[error("source {0} has a blank citation phrase")]
    BlankCitation(String),

    #[error("source {0} has a blank display name")]
    BlankDisplayName(String),
}
