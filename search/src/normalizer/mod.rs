//! Graph result normalization.
//!
//! The graph store hands back nodes either as typed entities or, on reduced
//! deployments, as flat maps with an inline `labels` key. Both end up as
//! [`NormalizedNode`]. The variant of [`GraphValue`] decides the branch: the flat
//! heuristic only ever sees values that are not typed entities.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::models::{GraphNode, GraphRelationship, GraphRow, GraphValue, NormalizedNode, NormalizedRelationship};

const LABELS_KEY: &str = "labels";
const ID_KEY: &str = "id";

/// Canonical JSON for any graph value. Never fails.
pub fn normalize(value: &GraphValue) -> Value {
    match value {
        GraphValue::Node(node) => to_json(normalize_typed_node(node)),
        GraphValue::Relationship(rel) => to_json(normalize_relationship(rel)),
        GraphValue::Map(map) => to_json(normalize_flat(map)),
        GraphValue::List(items) => Value::Array(items.iter().map(normalize).collect()),
        GraphValue::Scalar(v) => v.clone(),
    }
}

/// Normalize a value that already crossed a JSON boundary.
pub fn normalize_json(value: Value) -> Value {
    normalize(&GraphValue::from_json(value))
}

/// Normalize every cell of a result row.
pub fn normalize_row(row: &GraphRow) -> Map<String, Value> {
    row.iter().map(|(k, v)| (k.clone(), normalize(v))).collect()
}

/// Node view of a value: typed nodes and flat maps qualify, anything else does not.
pub fn normalize_node(value: &GraphValue) -> Option<NormalizedNode> {
    match value {
        GraphValue::Node(node) => Some(normalize_typed_node(node)),
        GraphValue::Map(map) => Some(normalize_flat(map)),
        _ => None,
    }
}

fn normalize_typed_node(node: &GraphNode) -> NormalizedNode {
    NormalizedNode {
        id: Some(Value::from(node.id)),
        labels: node.labels.clone(),
        properties: property_map(node.properties.iter().filter(|(k, _)| k.as_str() != LABELS_KEY)),
    }
}

fn normalize_relationship(rel: &GraphRelationship) -> NormalizedRelationship {
    NormalizedRelationship {
        id: rel.id,
        rel_type: rel.rel_type.clone(),
        start_node_id: rel.start_node_id,
        end_node_id: rel.end_node_id,
        properties: property_map(rel.properties.iter()),
    }
}

/// Flat shape: `labels` is the label set, every other key is a property, and a
/// property named `id` doubles as the node id.
fn normalize_flat(map: &BTreeMap<String, GraphValue>) -> NormalizedNode {
    let labels = map.get(LABELS_KEY).map(flat_labels).unwrap_or_default();
    let properties = property_map(map.iter().filter(|(k, _)| k.as_str() != LABELS_KEY));
    let id = properties.get(ID_KEY).filter(|v| !v.is_null()).cloned();

    NormalizedNode { id, labels, properties }
}

fn flat_labels(value: &GraphValue) -> Vec<String> {
    match value {
        GraphValue::List(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(String::from))
            .collect(),
        GraphValue::Scalar(Value::String(label)) => vec![label.clone()],
        _ => Vec::new(),
    }
}

fn property_map<'a, I>(entries: I) -> Map<String, Value>
where
    I: Iterator<Item = (&'a String, &'a GraphValue)>,
{
    entries.map(|(k, v)| (k.clone(), property_value(v))).collect()
}

/// Property values are emitted unchanged; only nested entities get normalized.
fn property_value(value: &GraphValue) -> Value {
    match value {
        GraphValue::Node(_) | GraphValue::Relationship(_) => normalize(value),
        GraphValue::Map(map) => Value::Object(property_map(map.iter())),
        GraphValue::List(items) => Value::Array(items.iter().map(property_value).collect()),
        GraphValue::Scalar(v) => v.clone(),
    }
}

fn to_json<T: serde::Serialize>(shape: T) -> Value {
    // Plain structs of JSON values and integers always serialize.
    serde_json::to_value(shape).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ENTITY_MARKER;
    use serde_json::json;

    fn typed_fruit() -> GraphValue {
        GraphValue::Node(GraphNode {
            id: 42,
            labels: vec!["Resource".into(), "Fruit".into()],
            properties: BTreeMap::from([
                ("rdfs__label".to_string(), GraphValue::string("Bưởi Da Xanh")),
                ("labels".to_string(), GraphValue::string("shadowed")),
                ("weight_kg".to_string(), GraphValue::Scalar(json!(1.5))),
            ]),
        })
    }

    #[test]
    fn test_typed_node() {
        let out = normalize(&typed_fruit());

        assert_eq!(out["id"], 42);
        assert_eq!(out["labels"], json!(["Resource", "Fruit"]));
        assert_eq!(out["properties"]["rdfs__label"], "Bưởi Da Xanh");
        assert_eq!(out["properties"]["weight_kg"], 1.5);
        assert!(out["properties"].get("labels").is_none());
    }

    #[test]
    fn test_typed_relationship() {
        let rel = GraphValue::Relationship(GraphRelationship {
            id: 9,
            rel_type: "GROWS_IN".into(),
            start_node_id: Some(42),
            end_node_id: Some(77),
            properties: BTreeMap::from([("since".to_string(), GraphValue::Scalar(json!(1990)))]),
        });

        assert_eq!(
            normalize(&rel),
            json!({
                "id": 9,
                "type": "GROWS_IN",
                "start_node_id": 42,
                "end_node_id": 77,
                "properties": {"since": 1990}
            })
        );
    }

    #[test]
    fn test_flat_row_with_labels_and_id() {
        let flat = GraphValue::from_json(json!({
            "labels": ["Fruit"],
            "id": "fruit-001",
            "rdfs__label": "Bưởi Da Xanh"
        }));

        let node = normalize_node(&flat).unwrap();
        assert_eq!(node.id, Some(json!("fruit-001")));
        assert_eq!(node.labels, vec!["Fruit"]);
        assert_eq!(node.properties["rdfs__label"], "Bưởi Da Xanh");
        assert_eq!(node.properties["id"], "fruit-001");
        assert!(!node.properties.contains_key("labels"));
    }

    #[test]
    fn test_flat_row_without_labels() {
        let out = normalize_json(json!({"name": "Cam Sành", "origin": "Vĩnh Long"}));

        assert_eq!(out["labels"], json!([]));
        assert_eq!(out["id"], Value::Null);
        assert_eq!(out["properties"], json!({"name": "Cam Sành", "origin": "Vĩnh Long"}));
    }

    #[test]
    fn test_serialized_typed_node_is_not_treated_as_flat() {
        let wire = typed_fruit().to_tagged_json();
        assert!(wire.get(ENTITY_MARKER).is_some());

        let out = normalize_json(wire);
        assert_eq!(out["id"], 42);
        assert_eq!(out["properties"]["rdfs__label"], "Bưởi Da Xanh");
        // A flat reading would have produced a nested `properties` property.
        assert!(out["properties"].get("properties").is_none());
    }

    #[test]
    fn test_scalars_pass_through() {
        for value in [json!(null), json!(true), json!(3), json!(2.5), json!("bưởi")] {
            assert_eq!(normalize_json(value.clone()), value);
        }
    }

    #[test]
    fn test_lists_normalized_elementwise() {
        let out = normalize(&GraphValue::List(vec![typed_fruit(), GraphValue::Scalar(json!(1))]));
        assert_eq!(out[0]["labels"], json!(["Resource", "Fruit"]));
        assert_eq!(out[1], 1);
    }

    #[test]
    fn test_non_node_values_have_no_node_view() {
        assert!(normalize_node(&GraphValue::string("x")).is_none());
        assert!(normalize_node(&GraphValue::List(Vec::new())).is_none());
    }

    #[test]
    fn test_row() {
        let row = GraphRow::from([
            ("n".to_string(), typed_fruit()),
            ("score".to_string(), GraphValue::Scalar(json!(0.9))),
        ]);

        let out = normalize_row(&row);
        assert_eq!(out["n"]["id"], 42);
        assert_eq!(out["score"], 0.9);
    }
}
