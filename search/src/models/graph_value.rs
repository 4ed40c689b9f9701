//! Values returned by the graph store, before normalization.
//!
//! A row cell is either a typed entity (node / relationship, as decoded from the
//! Bolt protocol), an untyped map, a list, or a scalar. Typed entities that were
//! serialized to JSON keep their type in the [`ENTITY_MARKER`] key so they can be
//! told apart from flat property maps after crossing a process boundary.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Key carrying the entity kind on serialized typed entities
pub const ENTITY_MARKER: &str = "__entity";
pub const NODE_KIND: &str = "node";
pub const RELATIONSHIP_KIND: &str = "relationship";

/// One result row keyed by the query's return-variable names
pub type GraphRow = BTreeMap<String, GraphValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum GraphValue {
    Node(GraphNode),
    Relationship(GraphRelationship),
    /// Untyped mapping. Reduced-capability deployments return nodes in this shape.
    Map(BTreeMap<String, GraphValue>),
    List(Vec<GraphValue>),
    /// String, number, boolean or null
    Scalar(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: i64,
    pub labels: Vec<String>,
    pub properties: BTreeMap<String, GraphValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphRelationship {
    pub id: i64,
    pub rel_type: String,
    /// Absent for unbounded relationships (inside paths)
    pub start_node_id: Option<i64>,
    pub end_node_id: Option<i64>,
    pub properties: BTreeMap<String, GraphValue>,
}

impl GraphValue {
    pub fn null() -> Self {
        GraphValue::Scalar(Value::Null)
    }

    pub fn string(value: impl Into<String>) -> Self {
        GraphValue::Scalar(Value::String(value.into()))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GraphValue::Scalar(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GraphValue::Scalar(v) => v.as_i64(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, GraphValue::Scalar(Value::Null))
    }

    /// Classify a JSON value.
    ///
    /// Objects carrying a well-formed [`ENTITY_MARKER`] become typed entities; every
    /// other object is an untyped map. A marker on a malformed object is dropped and
    /// the object is treated as untyped.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(mut map) => {
                let marker = map.remove(ENTITY_MARKER);
                let marker = marker.as_ref().and_then(Value::as_str);

                match marker {
                    Some(NODE_KIND) => match node_from_json(&map) {
                        Some(node) => GraphValue::Node(node),
                        None => Self::map_from_json(map),
                    },
                    Some(RELATIONSHIP_KIND) => match relationship_from_json(&map) {
                        Some(rel) => GraphValue::Relationship(rel),
                        None => Self::map_from_json(map),
                    },
                    _ => Self::map_from_json(map),
                }
            }
            Value::Array(items) => {
                GraphValue::List(items.into_iter().map(GraphValue::from_json).collect())
            }
            scalar => GraphValue::Scalar(scalar),
        }
    }

    fn map_from_json(map: Map<String, Value>) -> Self {
        GraphValue::Map(
            map.into_iter()
                .map(|(k, v)| (k, GraphValue::from_json(v)))
                .collect(),
        )
    }

    /// Serialize with entity markers, the inverse of [`GraphValue::from_json`].
    pub fn to_tagged_json(&self) -> Value {
        match self {
            GraphValue::Node(node) => json!({
                ENTITY_MARKER: NODE_KIND,
                "id": node.id,
                "labels": node.labels,
                "properties": properties_to_tagged_json(&node.properties),
            }),
            GraphValue::Relationship(rel) => json!({
                ENTITY_MARKER: RELATIONSHIP_KIND,
                "id": rel.id,
                "type": rel.rel_type,
                "start_node_id": rel.start_node_id,
                "end_node_id": rel.end_node_id,
                "properties": properties_to_tagged_json(&rel.properties),
            }),
            GraphValue::Map(map) => Value::Object(properties_to_tagged_json(map)),
            GraphValue::List(items) => {
                Value::Array(items.iter().map(GraphValue::to_tagged_json).collect())
            }
            GraphValue::Scalar(v) => v.clone(),
        }
    }
}

fn properties_to_tagged_json(properties: &BTreeMap<String, GraphValue>) -> Map<String, Value> {
    properties
        .iter()
        .map(|(k, v)| (k.clone(), v.to_tagged_json()))
        .collect()
}

fn properties_from_json(map: &Map<String, Value>) -> Option<BTreeMap<String, GraphValue>> {
    match map.get("properties") {
        None | Some(Value::Null) => Some(BTreeMap::new()),
        Some(Value::Object(props)) => Some(
            props
                .iter()
                .map(|(k, v)| (k.clone(), GraphValue::from_json(v.clone())))
                .collect(),
        ),
        Some(_) => None,
    }
}

fn node_from_json(map: &Map<String, Value>) -> Option<GraphNode> {
    let id = map.get("id")?.as_i64()?;
    let labels = match map.get("labels") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|l| l.as_str().map(String::from))
            .collect::<Option<Vec<_>>>()?,
        Some(_) => return None,
    };

    Some(GraphNode {
        id,
        labels,
        properties: properties_from_json(map)?,
    })
}

fn relationship_from_json(map: &Map<String, Value>) -> Option<GraphRelationship> {
    Some(GraphRelationship {
        id: map.get("id")?.as_i64()?,
        rel_type: map.get("type")?.as_str()?.to_string(),
        start_node_id: map.get("start_node_id").and_then(Value::as_i64),
        end_node_id: map.get("end_node_id").and_then(Value::as_i64),
        properties: properties_from_json(map)?,
    })
}
