pub mod client;
pub mod errors;
pub mod pipeline;
pub mod renderer;
pub mod types;

pub use client::{Hop, fetch_hop};
pub use errors::FetchError;
pub use renderer::{HopTransport, PinnedTransport, StaticRenderer};
pub use types::{Charset, PageResponse};
