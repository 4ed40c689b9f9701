use actix_web::{web, HttpResponse};
use serde_json::{json, Value};

use crate::errors::{ApiError, ApiResult};
use crate::graph_db::{cypher, QueryParams};
use crate::models::{CypherRequest, NodeListParams};
use crate::normalizer::{normalize, normalize_row};
use crate::state::AppState;

const DEFAULT_NODE_LIMIT: i64 = 20;

/// `GET /neo4j/test`
pub async fn neo4j_test(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let rows = state.graph.run_query(cypher::PING, QueryParams::new()).await?;
    let data: Vec<_> = rows.iter().map(normalize_row).collect();

    Ok(HttpResponse::Ok().json(json!({"ok": true, "data": data})))
}

/// `GET /neo4j/nodes?limit=20`
pub async fn list_nodes(
    state: web::Data<AppState>,
    params: web::Query<NodeListParams>,
) -> ApiResult<HttpResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_NODE_LIMIT).max(0);
    let params = QueryParams::from([("limit".to_string(), Value::from(limit))]);

    let rows = state.graph.run_query(cypher::LIST_NODES, params).await?;
    let data: Vec<Value> = rows
        .iter()
        .filter_map(|row| row.get(cypher::NODE_COLUMN))
        .map(normalize)
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "ok": true,
        "count": data.len(),
        "data": data
    })))
}

/// `POST /neo4j/query` with `{"query": "...", "params": {...}}`
///
/// Read-only statements only; every cell of every row is normalized.
pub async fn run_query(
    state: web::Data<AppState>,
    body: Option<web::Json<CypherRequest>>,
) -> ApiResult<HttpResponse> {
    let request = body.map(web::Json::into_inner).unwrap_or_default();

    let query = request
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing 'query' in body".to_string()))?;

    cypher::ensure_read_only(query)
        .map_err(|clause| ApiError::BadRequest(format!("Write clause '{}' is not allowed", clause)))?;

    let params: QueryParams = request.params.unwrap_or_default().into_iter().collect();
    let rows = state.graph.run_query(query, params).await?;
    let data: Vec<_> = rows.iter().map(normalize_row).collect();

    Ok(HttpResponse::Ok().json(json!({
        "ok": true,
        "count": data.len(),
        "data": data
    })))
}
