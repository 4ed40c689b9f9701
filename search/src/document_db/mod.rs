pub mod mongo_client;

pub use mongo_client::MongoStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::StoreResult;

/// Predicate language understood by every [`DocumentStore`]
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentFilter {
    /// Every document
    All,
    Eq { field: String, value: Value },
    /// Field equals any of the values (`$in`)
    In { field: String, values: Vec<Value> },
    /// Regular-expression match on a string field (or any element of an array field)
    Regex {
        field: String,
        pattern: String,
        case_insensitive: bool,
    },
    /// Full-text search; needs a text index on the collection
    Text { search: String },
}

impl DocumentFilter {
    /// Case-insensitive substring match; `term` is matched literally.
    pub fn contains(field: impl Into<String>, term: &str) -> Self {
        DocumentFilter::Regex {
            field: field.into(),
            pattern: regex::escape(term),
            case_insensitive: true,
        }
    }

    pub fn text(search: impl Into<String>) -> Self {
        DocumentFilter::Text {
            search: search.into(),
        }
    }

    pub fn any_of(field: impl Into<String>, values: Vec<Value>) -> Self {
        DocumentFilter::In {
            field: field.into(),
            values,
        }
    }
}

/// Projection and limit for a lookup
#[derive(Debug, Clone, PartialEq)]
pub struct FindOptions {
    /// Fields removed from every returned document
    pub exclude_fields: Vec<String>,
    pub limit: Option<i64>,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            exclude_fields: vec!["_id".to_string()],
            limit: None,
        }
    }
}

impl FindOptions {
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Document store gateway
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents of `collection` matching `filter`, as relaxed extended JSON.
    ///
    /// Fails with `IndexMissing` when a text search hits an unindexed collection
    /// and `StoreUnavailable` when the store cannot be reached.
    async fn find(&self, collection: &str, filter: &DocumentFilter, options: &FindOptions) -> StoreResult<Vec<Value>>;

    async fn list_collections(&self) -> StoreResult<Vec<String>>;
}
