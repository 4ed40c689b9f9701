//! Search facade over a Neo4j graph and its MongoDB document mirror.
//!
//! A single query fans out to the graph (property and label match), the
//! mirrored `nodes` collection (text search with a substring fallback) and
//! the `rels` collection. Results come back in one envelope, with graph
//! entities flattened into plain JSON objects by [`normalizer`].

pub mod document_db;
pub mod errors;
pub mod graph_db;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod services;
pub mod state;

pub use errors::{ApiError, StoreError};
pub use state::AppState;
