use serde::Serialize;
use std::collections::BTreeMap;

use super::{DocumentNode, DocumentRel, NormalizedNode};
use crate::errors::StoreError;

/// Response of `GET /search`
#[derive(Debug, Clone, Serialize)]
pub struct SearchResultEnvelope {
    /// The query exactly as received
    pub query: String,
    pub neo4j_results: Vec<GraphHit>,
    pub mongo_nodes: Vec<DocumentNode>,
    pub mongo_rels: Vec<DocumentRel>,
    /// Lookups that degraded to an empty list, keyed by slot name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, LookupFailure>,
}

/// A matching graph node plus its one-hop neighbourhood
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GraphHit {
    pub node: NormalizedNode,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<RelatedSummary>,
    /// Mirror record from the `nodes` collection, when requested and found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirror: Option<DocumentNode>,
}

/// Outgoing relationship of a hit: neighbour label and relationship type
#[derive(Debug, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct RelatedSummary {
    pub label: Option<String>,
    pub rel: Option<String>,
    pub node_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LookupFailure {
    pub kind: &'static str,
    pub message: String,
}

impl From<&StoreError> for LookupFailure {
    fn from(err: &StoreError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Collects the three independent lookup results into one envelope.
///
/// A failed slot contributes an empty list and a [`LookupFailure`] entry.
#[derive(Debug)]
pub struct EnvelopeBuilder {
    query: String,
    neo4j_results: Vec<GraphHit>,
    mongo_nodes: Vec<DocumentNode>,
    mongo_rels: Vec<DocumentRel>,
    errors: BTreeMap<String, LookupFailure>,
}

pub const NEO4J_SLOT: &str = "neo4j";
pub const MONGO_NODES_SLOT: &str = "mongo_nodes";
pub const MONGO_RELS_SLOT: &str = "mongo_rels";

impl EnvelopeBuilder {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            neo4j_results: Vec::new(),
            mongo_nodes: Vec::new(),
            mongo_rels: Vec::new(),
            errors: BTreeMap::new(),
        }
    }

    pub fn graph_hits(mut self, result: Result<Vec<GraphHit>, StoreError>) -> Self {
        self.neo4j_results = self.take_slot(NEO4J_SLOT, result);
        self
    }

    pub fn mongo_nodes(mut self, result: Result<Vec<DocumentNode>, StoreError>) -> Self {
        self.mongo_nodes = self.take_slot(MONGO_NODES_SLOT, result);
        self
    }

    pub fn mongo_rels(mut self, result: Result<Vec<DocumentRel>, StoreError>) -> Self {
        self.mongo_rels = self.take_slot(MONGO_RELS_SLOT, result);
        self
    }

    fn take_slot<T>(&mut self, slot: &str, result: Result<Vec<T>, StoreError>) -> Vec<T> {
        match result {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(
                    slot = slot,
                    kind = err.kind(),
                    error = %err,
                    "Search lookup degraded to empty result"
                );
                self.errors.insert(slot.to_string(), LookupFailure::from(&err));
                Vec::new()
            }
        }
    }

    pub fn build(self) -> SearchResultEnvelope {
        SearchResultEnvelope {
            query: self.query,
            neo4j_results: self.neo4j_results,
            mongo_nodes: self.mongo_nodes,
            mongo_rels: self.mongo_rels,
            errors: self.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_slot_is_empty_and_marked() {
        let envelope = EnvelopeBuilder::new("apple")
            .graph_hits(Err(StoreError::StoreUnavailable("connection refused".into())))
            .mongo_nodes(Ok(Vec::new()))
            .mongo_rels(Ok(Vec::new()))
            .build();

        assert!(envelope.neo4j_results.is_empty());
        assert_eq!(envelope.errors[NEO4J_SLOT].kind, "store_unavailable");

        let json = serde_json::to_value(&envelope).unwrap();
        for field in ["query", "neo4j_results", "mongo_nodes", "mongo_rels", "errors"] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
    }

    #[test]
    fn test_errors_omitted_when_all_succeed() {
        let envelope = EnvelopeBuilder::new("apple")
            .graph_hits(Ok(Vec::new()))
            .mongo_nodes(Ok(Vec::new()))
            .mongo_rels(Ok(Vec::new()))
            .build();

        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("errors").is_none());
        assert_eq!(json["neo4j_results"], serde_json::json!([]));
    }
}
