use serde::Deserialize;
use serde_json::{Map, Value};

/// Query string of `GET /search`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub limit: Option<usize>,
    /// Collect one-hop related summaries (default true)
    pub related: Option<bool>,
    /// Pair graph hits with their `nodes` mirror records (default false)
    pub mirror: Option<bool>,
}

/// Query string of `GET /neo4j/nodes`
#[derive(Debug, Deserialize)]
pub struct NodeListParams {
    pub limit: Option<i64>,
}

/// Query string of `GET /mongo/products`
#[derive(Debug, Deserialize)]
pub struct CollectionParams {
    pub limit: Option<i64>,
    pub collection: Option<String>,
}

/// Body of `POST /neo4j/query`
#[derive(Debug, Default, Deserialize)]
pub struct CypherRequest {
    pub query: Option<String>,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
}
