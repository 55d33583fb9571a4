use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Why the trust gate refused a URL.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    #[error("link could not be parsed as a URL")]
    InvalidUrl,

    #[error("link must use https")]
    NonHttps,

    #[error("link points at a private or local network address")]
    PrivateAddress,

    #[error("link is not from a recognized news source")]
    DomainNotAllowlisted,

    #[error("link host could not be resolved")]
    UnresolvableHost,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid-url",
            Self::NonHttps => "non-https",
            Self::PrivateAddress => "private-address",
            Self::DomainNotAllowlisted => "domain-not-allowlisted",
            Self::UnresolvableHost => "unresolvable-host",
        }
    }
}
