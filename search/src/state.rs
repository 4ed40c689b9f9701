use std::sync::Arc;

use kgbridge_config::SearchSettings;

use crate::document_db::DocumentStore;
use crate::graph_db::GraphStore;
use crate::services::{Collections, SearchService};

/// Process-wide handles shared by every request.
///
/// Built once at startup; the store clients pool their own connections.
pub struct AppState {
    pub graph: Arc<dyn GraphStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub search: SearchService,
}

impl AppState {
    pub fn new(
        graph: Arc<dyn GraphStore>,
        documents: Arc<dyn DocumentStore>,
        collections: Collections,
        settings: SearchSettings,
    ) -> Self {
        let search = SearchService::new(graph.clone(), documents.clone(), collections, settings);
        Self {
            graph,
            documents,
            search,
        }
    }
}
