use serde::Serialize;

use crate::{ConfigError, EnvReader};

/// Connection settings for the Neo4j graph store
#[derive(Clone, Serialize)]
pub struct Neo4jSettings {
    /// `bolt://`, `neo4j://` or AuraDB `neo4j+s://` URI
    pub uri: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub database: String,
    pub max_connections: usize,
}

impl std::fmt::Debug for Neo4jSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Neo4jSettings")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl Neo4jSettings {
    pub(crate) fn from_reader(vars: &EnvReader<'_>) -> Result<Self, ConfigError> {
        let uri = vars.get("NEO4J_URI");
        let password = vars.get("NEO4J_PASSWORD");

        let missing: Vec<String> = [("NEO4J_URI", &uri), ("NEO4J_PASSWORD", &password)]
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name.to_string())
            .collect();

        match (uri, password) {
            (Some(uri), Some(password)) => Ok(Self {
                uri,
                user: vars.string_or("NEO4J_USER", "neo4j"),
                password,
                database: vars.string_or("NEO4J_DATABASE", "neo4j"),
                max_connections: vars.parsed_or("NEO4J_MAX_CONNECTIONS", 10)?,
            }),
            _ => Err(ConfigError::MissingVars(missing)),
        }
    }

    /// AuraDB deployments are reached over `neo4j+s://` / `neo4j+ssc://`
    pub fn is_aura(&self) -> bool {
        self.uri.contains("neo4j.io")
            || self.uri.starts_with("neo4j+s://")
            || self.uri.starts_with("neo4j+ssc://")
    }
}

/// Connection settings for the MongoDB document store
#[derive(Clone, Serialize)]
pub struct MongoSettings {
    #[serde(skip_serializing)]
    pub uri: String,
    pub database: String,
    pub nodes_collection: String,
    pub rels_collection: String,
}

impl std::fmt::Debug for MongoSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoSettings")
            .field("uri", &"***")
            .field("database", &self.database)
            .field("nodes_collection", &self.nodes_collection)
            .field("rels_collection", &self.rels_collection)
            .finish()
    }
}

impl MongoSettings {
    pub(crate) fn from_reader(vars: &EnvReader<'_>) -> Result<Self, ConfigError> {
        let uri = vars
            .get("MONGO_URI")
            .ok_or_else(|| ConfigError::MissingVars(vec!["MONGO_URI".to_string()]))?;

        let database = vars
            .get("MONGO_DATABASE")
            .unwrap_or_else(|| database_from_uri(&uri));

        Ok(Self {
            uri,
            database,
            nodes_collection: vars.string_or("MONGO_NODES_COLLECTION", "nodes"),
            rels_collection: vars.string_or("MONGO_RELS_COLLECTION", "rels"),
        })
    }
}

/// Database name from the path segment of a MongoDB URI, `test` when the URI has none.
pub fn database_from_uri(uri: &str) -> String {
    let without_scheme = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);

    without_scheme
        .split_once('/')
        .map(|(_, path)| path)
        .and_then(|path| path.split('?').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("test")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_from_uri() {
        assert_eq!(database_from_uri("mongodb://localhost:27017/shop"), "shop");
        assert_eq!(
            database_from_uri("mongodb+srv://u:p@cluster0.abc.mongodb.net/kg?retryWrites=true&w=majority"),
            "kg"
        );
        assert_eq!(database_from_uri("mongodb://localhost:27017/"), "test");
        assert_eq!(database_from_uri("mongodb://localhost:27017"), "test");
        assert_eq!(database_from_uri("mongodb://localhost:27017/?tls=true"), "test");
    }

    #[test]
    fn test_debug_hides_secrets() {
        let settings = Neo4jSettings {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "hunter2".to_string(),
            database: "neo4j".to_string(),
            max_connections: 10,
        };

        let printed = format!("{settings:?}");
        assert!(!printed.contains("hunter2"));
        assert!(!settings.is_aura());
    }
}
