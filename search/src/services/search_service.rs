use kgbridge_config::SearchSettings;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::fallback::{FallbackChain, LookupStrategy};
use crate::document_db::{DocumentFilter, DocumentStore, FindOptions};
use crate::errors::{StoreError, StoreResult};
use crate::graph_db::cypher::{NodeSearch, NODE_COLUMN, RELATED_COLUMN};
use crate::graph_db::GraphStore;
use crate::models::{
    id_key, DocumentNode, DocumentRel, EnvelopeBuilder, GraphHit, GraphRow, GraphValue, RelatedSummary,
    SearchParams, SearchResultEnvelope,
};
use crate::normalizer::normalize_node;

/// Names of the mirror collections
#[derive(Debug, Clone)]
pub struct Collections {
    pub nodes: String,
    pub rels: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            nodes: "nodes".to_string(),
            rels: "rels".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum results per lookup
    pub limit: usize,
    pub with_related: bool,
    pub join_mirror: bool,
}

/// Cross-store search.
///
/// Runs the graph lookup and both document lookups concurrently and folds them
/// into one [`SearchResultEnvelope`]. Only an empty query is an error; a failing
/// lookup leaves its slot empty.
pub struct SearchService {
    graph: Arc<dyn GraphStore>,
    documents: Arc<dyn DocumentStore>,
    collections: Collections,
    settings: SearchSettings,
}

impl SearchService {
    pub fn new(
        graph: Arc<dyn GraphStore>,
        documents: Arc<dyn DocumentStore>,
        collections: Collections,
        settings: SearchSettings,
    ) -> Self {
        Self {
            graph,
            documents,
            collections,
            settings,
        }
    }

    pub fn default_options(&self) -> SearchOptions {
        SearchOptions {
            limit: self.settings.default_limit,
            with_related: true,
            join_mirror: false,
        }
    }

    /// Options for an HTTP request, with the limit clamped to the configured range.
    pub fn options_for(&self, params: &SearchParams) -> SearchOptions {
        SearchOptions {
            limit: self.settings.clamp_limit(params.limit),
            with_related: params.related.unwrap_or(true),
            join_mirror: params.mirror.unwrap_or(false),
        }
    }

    pub async fn search(&self, query: &str, options: SearchOptions) -> StoreResult<SearchResultEnvelope> {
        let term = query.trim();
        if term.is_empty() {
            return Err(StoreError::InvalidInput("Query must not be empty".to_string()));
        }

        let (graph, nodes, rels) = tokio::join!(
            self.search_graph(term, &options),
            self.search_document_nodes(term, options.limit),
            self.search_document_rels(term, options.limit),
        );

        let graph = match graph {
            Ok(mut hits) if options.join_mirror => {
                self.attach_mirrors(&mut hits).await;
                Ok(hits)
            }
            other => other,
        };

        let envelope = EnvelopeBuilder::new(query)
            .graph_hits(graph)
            .mongo_nodes(nodes)
            .mongo_rels(rels)
            .build();

        tracing::info!(
            query = %term,
            neo4j = envelope.neo4j_results.len(),
            mongo_nodes = envelope.mongo_nodes.len(),
            mongo_rels = envelope.mongo_rels.len(),
            degraded = envelope.errors.len(),
            "🔍 Search completed"
        );

        Ok(envelope)
    }

    async fn search_graph(&self, term: &str, options: &SearchOptions) -> StoreResult<Vec<GraphHit>> {
        let (cypher, params) = NodeSearch::new(options.limit)
            .with_related(options.with_related)
            .build(term);

        let rows = self.graph.run_query(&cypher, params).await?;

        Ok(rows.iter().filter_map(hit_from_row).collect())
    }

    /// Full-text search first; any failure (typically a missing text index)
    /// falls back to a substring match on `labels`.
    async fn search_document_nodes(&self, term: &str, limit: usize) -> StoreResult<Vec<DocumentNode>> {
        let chain = FallbackChain::new(vec![
            LookupStrategy::new("text", DocumentFilter::text(term), |_| true),
            LookupStrategy::terminal("labels_substring", DocumentFilter::contains("labels", term)),
        ]);

        let options = FindOptions::default().limit(limit as i64);
        let (strategy, documents) = chain
            .run(self.documents.as_ref(), &self.collections.nodes, &options)
            .await?;

        tracing::debug!(strategy, count = documents.len(), "Mongo node lookup answered");

        Ok(documents.into_iter().filter_map(DocumentNode::from_document).collect())
    }

    async fn search_document_rels(&self, term: &str, limit: usize) -> StoreResult<Vec<DocumentRel>> {
        let documents = self
            .documents
            .find(
                &self.collections.rels,
                &DocumentFilter::contains("type", term),
                &FindOptions::default().limit(limit as i64),
            )
            .await?;

        Ok(documents.into_iter().filter_map(DocumentRel::from_document).collect())
    }

    /// Pair each hit with the `nodes` record whose `neo4j_id` equals the hit id.
    /// The mirror may be stale, so missing pairs are normal.
    async fn attach_mirrors(&self, hits: &mut [GraphHit]) {
        let mut seen = BTreeSet::new();
        let ids: Vec<Value> = hits
            .iter()
            .filter_map(|hit| hit.node.id.clone())
            .filter(|id| id_key(id).map(|key| seen.insert(key)).unwrap_or(false))
            .collect();

        if ids.is_empty() {
            return;
        }

        let documents = match self
            .documents
            .find(
                &self.collections.nodes,
                &DocumentFilter::any_of("neo4j_id", ids),
                &FindOptions::default(),
            )
            .await
        {
            Ok(documents) => documents,
            Err(err) => {
                tracing::warn!(kind = err.kind(), error = %err, "Mirror join skipped");
                return;
            }
        };

        let by_id: HashMap<String, DocumentNode> = documents
            .into_iter()
            .filter_map(DocumentNode::from_document)
            .filter_map(|node| {
                let key = node.neo4j_id.as_ref().and_then(id_key)?;
                Some((key, node))
            })
            .collect();

        for hit in hits.iter_mut() {
            hit.mirror = hit
                .node
                .id
                .as_ref()
                .and_then(id_key)
                .and_then(|key| by_id.get(&key).cloned());
        }
    }
}

fn hit_from_row(row: &GraphRow) -> Option<GraphHit> {
    let Some(node) = row.get(NODE_COLUMN).and_then(normalize_node) else {
        tracing::warn!(columns = ?row.keys().collect::<Vec<_>>(), "Graph row without a node, skipped");
        return None;
    };

    let related = row
        .get(RELATED_COLUMN)
        .map(related_summaries)
        .unwrap_or_default();

    Some(GraphHit {
        node,
        related,
        mirror: None,
    })
}

fn related_summaries(value: &GraphValue) -> Vec<RelatedSummary> {
    let GraphValue::List(items) = value else {
        return Vec::new();
    };

    let mut summaries: Vec<RelatedSummary> = items
        .iter()
        .filter_map(|item| match item {
            GraphValue::Map(fields) => Some(RelatedSummary {
                label: fields.get("label").and_then(GraphValue::as_str).map(String::from),
                rel: fields.get("rel").and_then(GraphValue::as_str).map(String::from),
                node_id: fields.get("node_id").and_then(GraphValue::as_i64),
            }),
            _ => None,
        })
        .collect();

    summaries.sort();
    summaries.dedup();
    summaries
}
