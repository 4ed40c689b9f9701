//! In-memory store doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use regex::RegexBuilder;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use kgbridge_config::SearchSettings;
use kgbridge_search::document_db::{DocumentFilter, DocumentStore, FindOptions};
use kgbridge_search::errors::{StoreError, StoreResult};
use kgbridge_search::graph_db::{cypher, GraphStore, QueryParams};
use kgbridge_search::models::{GraphNode, GraphRow, GraphValue};
use kgbridge_search::services::{Collections, SearchService};
use kgbridge_search::AppState;

/// Node stored by [`MemoryGraph`], with its outgoing one-hop summaries
#[derive(Clone)]
pub struct StoredNode {
    pub value: GraphValue,
    pub related: Vec<GraphValue>,
}

/// Graph store answering the statements the service issues.
///
/// Anything that is not a ping, a node listing or a node search gets the
/// configured `canned_rows`.
#[derive(Default)]
pub struct MemoryGraph {
    nodes: Vec<StoredNode>,
    canned_rows: Vec<GraphRow>,
    failure: Option<StoreError>,
    calls: Mutex<Vec<(String, QueryParams)>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, value: GraphValue) -> Self {
        self.nodes.push(StoredNode {
            value,
            related: Vec::new(),
        });
        self
    }

    pub fn with_related_node(mut self, value: GraphValue, related: Vec<GraphValue>) -> Self {
        self.nodes.push(StoredNode { value, related });
        self
    }

    pub fn with_rows(mut self, rows: Vec<GraphRow>) -> Self {
        self.canned_rows = rows;
        self
    }

    pub fn unreachable() -> Self {
        Self::failing_with(StoreError::StoreUnavailable("connection refused".to_string()))
    }

    /// Every statement fails with `err`
    pub fn failing_with(err: StoreError) -> Self {
        Self {
            failure: Some(err),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(String, QueryParams)> {
        self.calls.lock().unwrap().clone()
    }

    fn matches(node: &GraphValue, term: &str) -> bool {
        let (labels, properties): (Vec<String>, Vec<&GraphValue>) = match node {
            GraphValue::Node(node) => (node.labels.clone(), node.properties.values().collect()),
            GraphValue::Map(fields) => {
                let labels = match fields.get("labels") {
                    Some(GraphValue::List(items)) => {
                        items.iter().filter_map(|l| l.as_str().map(String::from)).collect()
                    }
                    _ => Vec::new(),
                };
                let props = fields
                    .iter()
                    .filter(|(k, _)| k.as_str() != "labels")
                    .map(|(_, v)| v)
                    .collect();
                (labels, props)
            }
            _ => return false,
        };

        labels.iter().any(|l| l.to_lowercase().contains(term))
            || properties.iter().any(|value| match value {
                GraphValue::Scalar(Value::String(s)) => s.to_lowercase().contains(term),
                GraphValue::Scalar(Value::Number(n)) => n.to_string().contains(term),
                GraphValue::Scalar(Value::Bool(b)) => b.to_string().contains(term),
                _ => false,
            })
    }
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn run_query(&self, statement: &str, params: QueryParams) -> StoreResult<Vec<GraphRow>> {
        self.calls
            .lock()
            .unwrap()
            .push((statement.to_string(), params.clone()));

        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        let limit = params
            .get("limit")
            .and_then(Value::as_i64)
            .map(|l| l.max(0) as usize)
            .unwrap_or(usize::MAX);

        if statement == cypher::PING {
            return Ok(vec![GraphRow::from([("ok".to_string(), GraphValue::Scalar(json!(1)))])]);
        }

        if statement == cypher::LIST_NODES {
            return Ok(self
                .nodes
                .iter()
                .take(limit)
                .map(|stored| GraphRow::from([(cypher::NODE_COLUMN.to_string(), stored.value.clone())]))
                .collect());
        }

        if statement.contains("$term") {
            let term = params.get("term").and_then(Value::as_str).unwrap_or_default();
            let with_related = statement.contains(&format!("AS {}", cypher::RELATED_COLUMN));

            return Ok(self
                .nodes
                .iter()
                .filter(|stored| Self::matches(&stored.value, term))
                .take(limit)
                .map(|stored| {
                    let mut row = GraphRow::from([(cypher::NODE_COLUMN.to_string(), stored.value.clone())]);
                    if with_related {
                        row.insert(
                            cypher::RELATED_COLUMN.to_string(),
                            GraphValue::List(stored.related.clone()),
                        );
                    }
                    row
                })
                .collect());
        }

        Ok(self.canned_rows.clone())
    }
}

/// Document store evaluating [`DocumentFilter`] over in-memory collections.
///
/// Collections without a text index answer `Text` filters with `IndexMissing`,
/// the way the server does.
#[derive(Default)]
pub struct MemoryDocuments {
    collections: HashMap<String, Vec<Value>>,
    text_indexed: HashSet<String>,
    text_failure: Option<StoreError>,
    failing: HashSet<String>,
    calls: Mutex<Vec<(String, DocumentFilter)>>,
}

impl MemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(mut self, collection: &str, documents: Vec<Value>) -> Self {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
        self
    }

    pub fn with_text_index(mut self, collection: &str) -> Self {
        self.text_indexed.insert(collection.to_string());
        self
    }

    /// `Text` filters fail with `err` on every collection; other filters still answer.
    pub fn text_failing_with(mut self, err: StoreError) -> Self {
        self.text_failure = Some(err);
        self
    }

    pub fn failing(mut self, collection: &str) -> Self {
        self.failing.insert(collection.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn filters_for(&self, collection: &str) -> Vec<DocumentFilter> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c == collection)
            .map(|(_, f)| f.clone())
            .collect()
    }

    fn evaluate(&self, collection: &str, filter: &DocumentFilter, doc: &Map<String, Value>) -> StoreResult<bool> {
        Ok(match filter {
            DocumentFilter::All => true,
            DocumentFilter::Eq { field, value } => doc.get(field) == Some(value),
            DocumentFilter::In { field, values } => doc.get(field).map(|v| values.contains(v)).unwrap_or(false),
            DocumentFilter::Regex {
                field,
                pattern,
                case_insensitive,
            } => {
                let re = RegexBuilder::new(pattern)
                    .case_insensitive(*case_insensitive)
                    .build()
                    .map_err(|e| StoreError::QuerySyntax(e.to_string()))?;
                match doc.get(field) {
                    Some(Value::String(s)) => re.is_match(s),
                    Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).any(|s| re.is_match(s)),
                    _ => false,
                }
            }
            DocumentFilter::Text { search } => {
                if let Some(err) = &self.text_failure {
                    return Err(err.clone());
                }
                if !self.text_indexed.contains(collection) {
                    return Err(StoreError::IndexMissing("text index required for $text query".to_string()));
                }
                let words: Vec<String> = search.split_whitespace().map(str::to_lowercase).collect();
                let haystack = Value::Object(doc.clone()).to_string().to_lowercase();
                words.iter().any(|w| haystack.contains(w))
            }
        })
    }
}

#[async_trait]
impl DocumentStore for MemoryDocuments {
    async fn find(&self, collection: &str, filter: &DocumentFilter, options: &FindOptions) -> StoreResult<Vec<Value>> {
        self.calls
            .lock()
            .unwrap()
            .push((collection.to_string(), filter.clone()));

        if self.failing.contains(collection) {
            return Err(StoreError::StoreUnavailable("server selection timeout".to_string()));
        }

        let limit = options.limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        let mut found = Vec::new();

        for doc in self.collections.get(collection).into_iter().flatten() {
            let Value::Object(fields) = doc else { continue };
            if found.len() >= limit {
                break;
            }
            if self.evaluate(collection, filter, fields)? {
                let mut fields = fields.clone();
                for excluded in &options.exclude_fields {
                    fields.remove(excluded);
                }
                found.push(Value::Object(fields));
            }
        }

        Ok(found)
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        if !self.failing.is_empty() {
            return Err(StoreError::StoreUnavailable("server selection timeout".to_string()));
        }
        let mut names: Vec<String> = self.collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

pub fn typed_node(id: i64, labels: &[&str], properties: Value) -> GraphValue {
    let properties = match GraphValue::from_json(properties) {
        GraphValue::Map(fields) => fields,
        _ => BTreeMap::new(),
    };
    GraphValue::Node(GraphNode {
        id,
        labels: labels.iter().map(|l| l.to_string()).collect(),
        properties,
    })
}

/// Node in the shape returned by deployments without typed entities
pub fn flat_node(fields: Value) -> GraphValue {
    GraphValue::from_json(fields)
}

pub fn related(label: &str, rel: &str, node_id: i64) -> GraphValue {
    GraphValue::from_json(json!({"label": label, "rel": rel, "node_id": node_id}))
}

/// Graph and mirror seeded with a small fruit catalogue
pub fn fruit_graph() -> MemoryGraph {
    MemoryGraph::new()
        .with_related_node(
            typed_node(1, &["Fruit"], json!({"rdfs__label": "Bưởi Da Xanh", "origin": "Bến Tre"})),
            vec![related("Province", "GROWN_IN", 10)],
        )
        .with_node(typed_node(2, &["Fruit"], json!({"rdfs__label": "Green Apple"})))
        .with_node(typed_node(10, &["Province"], json!({"rdfs__label": "Bến Tre"})))
}

pub fn fruit_documents() -> MemoryDocuments {
    MemoryDocuments::new()
        .with_documents(
            "nodes",
            vec![
                json!({"_id": {"$oid": "65f1"}, "neo4j_id": 1, "labels": ["Fruit"], "props": {"rdfs__label": "Bưởi Da Xanh"}}),
                json!({"_id": {"$oid": "65f2"}, "neo4j_id": 2, "labels": ["Fruit", "Apple"], "props": {"rdfs__label": "Green Apple"}}),
            ],
        )
        .with_documents(
            "rels",
            vec![json!({"_id": {"$oid": "66a1"}, "start_neo4j_id": 1, "end_neo4j_id": 10, "type": "GROWN_IN"})],
        )
        .with_documents(
            "products",
            vec![
                json!({"_id": {"$oid": "67b1"}, "name": "Bưởi box", "price": 12.5}),
                json!({"_id": {"$oid": "67b2"}, "name": "Apple crate", "price": 30}),
            ],
        )
}

pub fn service(graph: Arc<MemoryGraph>, documents: Arc<MemoryDocuments>) -> SearchService {
    SearchService::new(graph, documents, Collections::default(), SearchSettings::default())
}

pub fn app_state(graph: Arc<MemoryGraph>, documents: Arc<MemoryDocuments>) -> AppState {
    AppState::new(graph, documents, Collections::default(), SearchSettings::default())
}
