use serde::Serialize;
use serde_json::{Map, Value};

/// Canonical node shape returned to clients regardless of the store's representation
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NormalizedNode {
    /// `null` when the source carried no identifier
    pub id: Option<Value>,
    pub labels: Vec<String>,
    pub properties: Map<String, Value>,
}

/// Canonical relationship shape
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NormalizedRelationship {
    pub id: i64,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub start_node_id: Option<i64>,
    pub end_node_id: Option<i64>,
    pub properties: Map<String, Value>,
}
