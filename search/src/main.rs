use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;

use kgbridge_config::AppConfig;
use kgbridge_observability::{init_tracing_for, request_logging};
use kgbridge_search::document_db::{DocumentStore, MongoStore};
use kgbridge_search::graph_db::{GraphStore, Neo4jClient, OfflineGraphStore};
use kgbridge_search::handlers;
use kgbridge_search::services::Collections;
use kgbridge_search::AppState;

const SERVICE_NAME: &str = "kgbridge-search";

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing_for(SERVICE_NAME);

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        e
    })?;

    let graph: Arc<dyn GraphStore> = match Neo4jClient::connect(&config.neo4j).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to Neo4j");
            tracing::warn!("Graph lookups will report the store as unavailable");
            Arc::new(OfflineGraphStore::new(e.to_string()))
        }
    };

    let mongo = MongoStore::connect(&config.mongo)
        .await
        .context("Failed to create MongoDB client")?;
    if let Err(e) = mongo.ping().await {
        tracing::warn!(error = %e, "MongoDB did not answer ping; document lookups may fail");
    }
    let documents: Arc<dyn DocumentStore> = Arc::new(mongo);

    let collections = Collections {
        nodes: config.mongo.nodes_collection.clone(),
        rels: config.mongo.rels_collection.clone(),
    };
    let state = web::Data::new(AppState::new(graph, documents, collections, config.search.clone()));

    let (host, port) = (config.server.host.clone(), config.server.port);
    tracing::info!("🚀 [Search Service] Starting on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(request_logging(SERVICE_NAME))
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))
    .with_context(|| format!("Failed to bind {}:{}", host, port))?
    .run()
    .await?;

    Ok(())
}
