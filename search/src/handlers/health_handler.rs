use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::graph_db::{cypher, QueryParams};
use crate::normalizer::normalize_row;
use crate::state::AppState;

pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Neo4j + MongoDB search API is running"
    }))
}

/// Connectivity of both stores. Always 200; `ok` is true only if both answer.
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let (mongo, neo4j) = tokio::join!(
        state.documents.list_collections(),
        state.graph.run_query(cypher::PING, QueryParams::new()),
    );

    let mongo_status = match mongo {
        Ok(collections) => json!({"ok": true, "collections": collections}),
        Err(e) => {
            tracing::warn!(error = %e, "MongoDB health check failed");
            json!({"ok": false, "error": e.to_string()})
        }
    };

    let neo4j_status = match neo4j {
        Ok(rows) => {
            let rows: Vec<_> = rows.iter().map(normalize_row).collect();
            json!({"ok": true, "result": rows})
        }
        Err(e) => {
            tracing::warn!(error = %e, "Neo4j health check failed");
            json!({"ok": false, "error": e.to_string()})
        }
    };

    let overall_ok = mongo_status["ok"] == true && neo4j_status["ok"] == true;

    HttpResponse::Ok().json(json!({
        "ok": overall_ok,
        "details": {
            "mongo": mongo_status,
            "neo4j": neo4j_status,
        }
    }))
}
