use async_trait::async_trait;
use futures::TryStreamExt;
use kgbridge_config::MongoSettings;
use mongodb::{
    bson::{doc, Bson, Document},
    error::ErrorKind,
    options, Client, Database,
};
use serde_json::Value;

use super::{DocumentFilter, DocumentStore, FindOptions};
use crate::errors::{StoreError, StoreResult};

/// Server error code for a `$text` query on a collection without a text index
const INDEX_NOT_FOUND: i32 = 27;

/// MongoDB gateway (Atlas or local, chosen by the URI)
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    /// Build the client. The driver connects lazily, so an unreachable server
    /// only shows up on the first operation.
    pub async fn connect(settings: &MongoSettings) -> StoreResult<Self> {
        let client = Client::with_uri_str(&settings.uri)
            .await
            .map_err(|e| StoreError::StoreUnavailable(format!("Invalid MongoDB configuration: {}", e)))?;
        let db = client.database(&settings.database);

        tracing::info!(database = %settings.database, "🍃 MongoDB client ready");

        Ok(Self { client, db })
    }

    pub async fn ping(&self) -> StoreResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(classify_error)?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(&self, collection: &str, filter: &DocumentFilter, find: &FindOptions) -> StoreResult<Vec<Value>> {
        let collection = self.db.collection::<Document>(collection);

        let mut options = options::FindOptions::default();
        if !find.exclude_fields.is_empty() {
            let mut projection = Document::new();
            for field in &find.exclude_fields {
                projection.insert(field.clone(), 0);
            }
            options.projection = Some(projection);
        }
        options.limit = find.limit;

        let cursor = collection
            .find(to_bson_filter(filter)?, options)
            .await
            .map_err(classify_error)?;
        let documents: Vec<Document> = cursor.try_collect().await.map_err(classify_error)?;

        Ok(documents
            .into_iter()
            .map(|d| Bson::Document(d).into_relaxed_extjson())
            .collect())
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        self.db
            .list_collection_names(None)
            .await
            .map_err(classify_error)
    }
}

fn to_bson_filter(filter: &DocumentFilter) -> StoreResult<Document> {
    let document = match filter {
        DocumentFilter::All => Document::new(),
        DocumentFilter::Eq { field, value } => doc! { field.as_str(): to_bson(value)? },
        DocumentFilter::In { field, values } => {
            let values = values.iter().map(to_bson).collect::<StoreResult<Vec<Bson>>>()?;
            doc! { field.as_str(): { "$in": values } }
        }
        DocumentFilter::Regex {
            field,
            pattern,
            case_insensitive,
        } => {
            let flags = if *case_insensitive { "i" } else { "" };
            doc! { field.as_str(): { "$regex": pattern.as_str(), "$options": flags } }
        }
        DocumentFilter::Text { search } => doc! { "$text": { "$search": search.as_str() } },
    };

    Ok(document)
}

fn to_bson(value: &Value) -> StoreResult<Bson> {
    mongodb::bson::to_bson(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn classify_error(err: mongodb::error::Error) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::Command(command)
            if command.code == INDEX_NOT_FOUND || command.message.contains("text index required") =>
        {
            StoreError::IndexMissing(command.message.clone())
        }
        ErrorKind::Command(command) => {
            StoreError::QuerySyntax(format!("{} ({})", command.message, command.code_name))
        }
        _ => StoreError::StoreUnavailable(err.to_string()),
    }
}
