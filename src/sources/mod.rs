pub mod citation;
pub mod errors;
pub mod registry;

pub use citation::{CitationStrategy, RandomCitation, RoundRobinCitation, StableCitation};
pub use errors::RegistryError;
pub use registry::{SourceEntry, SourceRegistry};
