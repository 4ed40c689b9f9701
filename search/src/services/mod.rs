pub mod fallback;
pub mod search_service;

pub use fallback::{FallbackChain, LookupStrategy};
pub use search_service::{Collections, SearchOptions, SearchService};
