pub mod health_handler;
pub mod mongo_handler;
pub mod neo4j_handler;
pub mod search_handler;

use actix_web::{error, web};

use crate::errors::ApiError;

pub use health_handler::{health, index};
pub use mongo_handler::list_documents;
pub use neo4j_handler::{list_nodes, neo4j_test, run_query};
pub use search_handler::search;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(query_config())
        .app_data(json_config())
        .route("/", web::get().to(index))
        .route("/health", web::get().to(health))
        .route("/search", web::get().to(search))
        .service(
            web::scope("/neo4j")
                .route("/test", web::get().to(neo4j_test))
                .route("/nodes", web::get().to(list_nodes))
                .route("/query", web::post().to(run_query)),
        )
        .route("/mongo/products", web::get().to(list_documents))
        .route("/products", web::get().to(list_documents));
}

/// Malformed query strings get the same `{"ok": false, "error": ...}` body as
/// every other client error.
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| error::Error::from(ApiError::BadRequest(err.to_string())))
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| error::Error::from(ApiError::BadRequest(err.to_string())))
}
