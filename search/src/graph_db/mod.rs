pub mod cypher;
pub mod neo4j_client;
pub mod offline;

pub use neo4j_client::Neo4jClient;
pub use offline::OfflineGraphStore;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::StoreResult;
use crate::models::GraphRow;

/// Named query parameters
pub type QueryParams = BTreeMap<String, Value>;

/// Graph store gateway
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Run a parameterized Cypher statement and return every row.
    ///
    /// Fails with `StoreUnavailable` on connectivity problems and `QuerySyntax`
    /// when the store rejects the statement.
    async fn run_query(&self, cypher: &str, params: QueryParams) -> StoreResult<Vec<GraphRow>>;
}
