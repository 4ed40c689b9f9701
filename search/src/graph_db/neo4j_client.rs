use async_trait::async_trait;
use kgbridge_config::Neo4jSettings;
use neo4rs::{query, BoltList, BoltMap, BoltNull, BoltString, BoltType, ConfigBuilder, Graph};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::{cypher, GraphStore, QueryParams};
use crate::errors::{StoreError, StoreResult};
use crate::models::{GraphNode, GraphRelationship, GraphRow, GraphValue};

/// Neo4j client compatible with both local Neo4j and Neo4j AuraDB
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

impl Neo4jClient {
    /// Connect and verify the connection with a trivial query.
    ///
    /// Supports `bolt://localhost:7687` as well as AuraDB `neo4j+s://xxxxx.databases.neo4j.io`.
    pub async fn connect(settings: &Neo4jSettings) -> StoreResult<Self> {
        tracing::info!(uri = %settings.uri, aura = settings.is_aura(), "🔷 Connecting to Neo4j");

        let config = ConfigBuilder::default()
            .uri(settings.uri.as_str())
            .user(settings.user.as_str())
            .password(settings.password.as_str())
            .db(settings.database.as_str())
            .fetch_size(500)
            .max_connections(settings.max_connections)
            .build()
            .map_err(|e| StoreError::StoreUnavailable(format!("Failed to build Neo4j config: {}", e)))?;

        let graph = Graph::connect(config)
            .await
            .map_err(|e| StoreError::StoreUnavailable(format!("Failed to connect to Neo4j: {}", e)))?;

        let client = Self {
            graph: Arc::new(graph),
        };

        client.run_query(cypher::PING, QueryParams::new()).await?;
        tracing::info!("✅ Neo4j connection established");

        Ok(client)
    }
}

#[async_trait]
impl GraphStore for Neo4jClient {
    async fn run_query(&self, cypher: &str, params: QueryParams) -> StoreResult<Vec<GraphRow>> {
        let mut q = query(cypher);
        for (name, value) in params {
            q = q.param(&name, json_to_bolt(value));
        }

        let mut result = self.graph.execute(q).await.map_err(classify_error)?;

        let mut rows = Vec::new();
        while let Some(row) = result.next().await.map_err(classify_error)? {
            let cells: HashMap<String, BoltType> = row
                .to()
                .map_err(|e| StoreError::Serialization(format!("Failed to decode Neo4j row: {}", e)))?;

            rows.push(
                cells
                    .into_iter()
                    .map(|(column, value)| (column, bolt_to_graph(value)))
                    .collect(),
            );
        }

        tracing::debug!(rows = rows.len(), "Neo4j query completed");
        Ok(rows)
    }
}

/// Statement errors reported by the server are the caller's fault; everything
/// else (I/O, auth, pool exhaustion) means the store is unavailable.
fn classify_error(err: neo4rs::Error) -> StoreError {
    let detail = err.to_string();
    if detail.contains("Neo.ClientError.Statement") || detail.contains("SyntaxError") {
        StoreError::QuerySyntax(detail)
    } else {
        StoreError::StoreUnavailable(detail)
    }
}

fn json_to_bolt(value: Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => BoltType::from(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => BoltType::from(i),
            None => BoltType::from(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => BoltType::from(s),
        Value::Array(items) => {
            let mut list = BoltList::new();
            for item in items {
                list.push(json_to_bolt(item));
            }
            BoltType::List(list)
        }
        Value::Object(fields) => {
            let mut map = BoltMap::new();
            for (key, item) in fields {
                map.put(BoltString::from(key), json_to_bolt(item));
            }
            BoltType::Map(map)
        }
    }
}

/// Decode a Bolt value. Temporal and spatial values become their debug text.
fn bolt_to_graph(value: BoltType) -> GraphValue {
    match value {
        BoltType::Null(_) => GraphValue::null(),
        BoltType::Boolean(b) => GraphValue::Scalar(Value::Bool(b.value)),
        BoltType::Integer(i) => GraphValue::Scalar(Value::from(i.value)),
        BoltType::Float(f) => GraphValue::Scalar(
            serde_json::Number::from_f64(f.value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        ),
        BoltType::String(s) => GraphValue::Scalar(Value::String(s.value)),
        BoltType::List(list) => GraphValue::List(list.value.into_iter().map(bolt_to_graph).collect()),
        BoltType::Map(map) => GraphValue::Map(bolt_properties(map)),
        BoltType::Node(node) => GraphValue::Node(GraphNode {
            id: node.id.value,
            labels: node
                .labels
                .value
                .into_iter()
                .filter_map(|label| match label {
                    BoltType::String(s) => Some(s.value),
                    _ => None,
                })
                .collect(),
            properties: bolt_properties(node.properties),
        }),
        BoltType::Relation(rel) => GraphValue::Relationship(GraphRelationship {
            id: rel.id.value,
            rel_type: rel.typ.value,
            start_node_id: Some(rel.start_node_id.value),
            end_node_id: Some(rel.end_node_id.value),
            properties: bolt_properties(rel.properties),
        }),
        BoltType::UnboundedRelation(rel) => GraphValue::Relationship(GraphRelationship {
            id: rel.id.value,
            rel_type: rel.typ.value,
            start_node_id: None,
            end_node_id: None,
            properties: bolt_properties(rel.properties),
        }),
        other => GraphValue::string(format!("{:?}", other)),
    }
}

fn bolt_properties(map: BoltMap) -> BTreeMap<String, GraphValue> {
    map.value
        .into_iter()
        .map(|(key, value)| (key.value, bolt_to_graph(value)))
        .collect()
}
