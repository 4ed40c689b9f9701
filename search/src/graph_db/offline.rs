use async_trait::async_trait;

use super::{GraphStore, QueryParams};
use crate::errors::{StoreError, StoreResult};
use crate::models::GraphRow;

/// Stand-in used when the graph store could not be reached at startup.
/// Every query fails with `StoreUnavailable`.
pub struct OfflineGraphStore {
    reason: String,
}

impl OfflineGraphStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl GraphStore for OfflineGraphStore {
    async fn run_query(&self, _cypher: &str, _params: QueryParams) -> StoreResult<Vec<GraphRow>> {
        Err(StoreError::StoreUnavailable(format!(
            "Neo4j is not connected: {}",
            self.reason
        )))
    }
}
