use serde_json::Value;

use crate::document_db::{DocumentFilter, DocumentStore, FindOptions};
use crate::errors::{StoreError, StoreResult};

/// One way of answering a document lookup
#[derive(Clone)]
pub struct LookupStrategy {
    pub name: &'static str,
    pub filter: DocumentFilter,
    /// Errors that hand over to the next strategy. Any other error ends the chain.
    pub falls_through: fn(&StoreError) -> bool,
}

impl LookupStrategy {
    pub fn new(name: &'static str, filter: DocumentFilter, falls_through: fn(&StoreError) -> bool) -> Self {
        Self {
            name,
            filter,
            falls_through,
        }
    }

    /// Strategy whose failure always ends the chain
    pub fn terminal(name: &'static str, filter: DocumentFilter) -> Self {
        Self::new(name, filter, |_| false)
    }
}

/// Ordered strategies tried until one succeeds.
#[derive(Clone)]
pub struct FallbackChain {
    strategies: Vec<LookupStrategy>,
}

impl FallbackChain {
    pub fn new(strategies: Vec<LookupStrategy>) -> Self {
        Self { strategies }
    }

    /// Result of the first successful strategy, tagged with its name.
    /// When every strategy fails, the last error is returned.
    pub async fn run(
        &self,
        store: &dyn DocumentStore,
        collection: &str,
        options: &FindOptions,
    ) -> StoreResult<(&'static str, Vec<Value>)> {
        let mut last_error = StoreError::InvalidInput("no lookup strategy configured".to_string());

        for strategy in &self.strategies {
            match store.find(collection, &strategy.filter, options).await {
                Ok(documents) => return Ok((strategy.name, documents)),
                Err(err) => {
                    tracing::debug!(
                        collection = collection,
                        strategy = strategy.name,
                        kind = err.kind(),
                        error = %err,
                        "Lookup strategy failed"
                    );
                    let proceed = (strategy.falls_through)(&err);
                    last_error = err;
                    if !proceed {
                        break;
                    }
                }
            }
        }

        Err(last_error)
    }
}
