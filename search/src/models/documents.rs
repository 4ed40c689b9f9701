use serde::Serialize;
use serde_json::{Map, Value};

/// Mirror of a graph node stored in the `nodes` collection
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DocumentNode {
    /// Id of the graph node this record was copied from
    pub neo4j_id: Option<Value>,
    pub labels: Vec<String>,
    pub props: Map<String, Value>,
    /// Any other fields of the stored record
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Mirror of a graph relationship stored in the `rels` collection
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DocumentRel {
    pub start_neo4j_id: Option<Value>,
    pub end_neo4j_id: Option<Value>,
    #[serde(rename = "type")]
    pub rel_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentNode {
    /// Build from a stored record. Returns `None` when the record is not an object.
    ///
    /// `labels` may be stored as an array or a single string; a non-object `props`
    /// is kept under `extra`.
    pub fn from_document(doc: Value) -> Option<Self> {
        let Value::Object(mut fields) = doc else {
            return None;
        };

        let neo4j_id = fields.remove("neo4j_id").filter(|v| !v.is_null());
        let labels = labels_from_value(fields.remove("labels"));
        let props = match fields.remove("props") {
            Some(Value::Object(props)) => props,
            Some(Value::Null) | None => Map::new(),
            Some(other) => {
                fields.insert("props".to_string(), other);
                Map::new()
            }
        };

        Some(Self {
            neo4j_id,
            labels,
            props,
            extra: fields,
        })
    }
}

impl DocumentRel {
    pub fn from_document(doc: Value) -> Option<Self> {
        let Value::Object(mut fields) = doc else {
            return None;
        };

        let start_neo4j_id = fields.remove("start_neo4j_id").filter(|v| !v.is_null());
        let end_neo4j_id = fields.remove("end_neo4j_id").filter(|v| !v.is_null());
        let rel_type = match fields.remove("type") {
            Some(Value::String(t)) => Some(t),
            Some(Value::Null) | None => None,
            Some(other) => {
                fields.insert("type".to_string(), other);
                None
            }
        };

        Some(Self {
            start_neo4j_id,
            end_neo4j_id,
            rel_type,
            extra: fields,
        })
    }
}

fn labels_from_value(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Some(Value::String(label)) => vec![label],
        _ => Vec::new(),
    }
}

/// Join key for graph ids: integral numbers compare equal whether stored as
/// int32, int64 or double.
pub fn id_key(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .map(|i| i.to_string())
            .or_else(|| Some(n.to_string())),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_from_document() {
        let node = DocumentNode::from_document(json!({
            "neo4j_id": 12,
            "labels": ["Fruit"],
            "props": {"rdfs__label": "Bưởi Da Xanh"},
            "source": "ontology"
        }))
        .unwrap();

        assert_eq!(node.neo4j_id, Some(json!(12)));
        assert_eq!(node.labels, vec!["Fruit"]);
        assert_eq!(node.props["rdfs__label"], "Bưởi Da Xanh");
        assert_eq!(node.extra["source"], "ontology");

        let out = serde_json::to_value(&node).unwrap();
        assert_eq!(out["source"], "ontology");
        assert_eq!(out["labels"], json!(["Fruit"]));
    }

    #[test]
    fn test_lenient_fields() {
        let node = DocumentNode::from_document(json!({"labels": "Fruit", "props": "broken"})).unwrap();
        assert_eq!(node.labels, vec!["Fruit"]);
        assert!(node.props.is_empty());
        assert_eq!(node.extra["props"], "broken");
        assert!(node.neo4j_id.is_none());

        assert!(DocumentNode::from_document(json!("scalar")).is_none());
    }

    #[test]
    fn test_rel_serializes_type_field() {
        let rel = DocumentRel::from_document(json!({
            "start_neo4j_id": 1,
            "end_neo4j_id": 2,
            "type": "GROWS_IN"
        }))
        .unwrap();

        let out = serde_json::to_value(&rel).unwrap();
        assert_eq!(out["type"], "GROWS_IN");
        assert_eq!(out["start_neo4j_id"], 1);
    }

    #[test]
    fn test_id_key() {
        assert_eq!(id_key(&json!(5)), Some("5".to_string()));
        assert_eq!(id_key(&json!(5.0)), Some("5".to_string()));
        assert_eq!(id_key(&json!("abc")), Some("abc".to_string()));
        assert_eq!(id_key(&json!(null)), None);
    }
}
