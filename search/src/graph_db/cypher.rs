//! Cypher statements issued by the service.

use serde_json::Value;

use super::QueryParams;

pub const PING: &str = "RETURN 1 AS ok";
pub const LIST_NODES: &str = "MATCH (n) RETURN n LIMIT $limit";

/// Column holding the matched node in [`NodeSearch`] rows
pub const NODE_COLUMN: &str = "n";
/// Column holding the list of one-hop summaries in [`NodeSearch`] rows
pub const RELATED_COLUMN: &str = "related";

/// Case-insensitive substring search over node labels and property values.
#[derive(Debug, Clone)]
pub struct NodeSearch {
    pub limit: usize,
    /// Collect `{label, rel, node_id}` for each outgoing relationship
    pub with_related: bool,
}

impl NodeSearch {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            with_related: true,
        }
    }

    pub fn with_related(mut self, with_related: bool) -> Self {
        self.with_related = with_related;
        self
    }

    /// Statement and parameters for `term`. The term is lower-cased here so the
    /// statement only lowers the stored side.
    pub fn build(&self, term: &str) -> (String, QueryParams) {
        let mut cypher = String::from(
            "MATCH (n)\n\
             WHERE any(label IN labels(n) WHERE toLower(label) CONTAINS $term)\n\
             \x20  OR any(key IN keys(n) WHERE toLower(toStringOrNull(n[key])) CONTAINS $term)\n\
             WITH n LIMIT $limit\n",
        );

        if self.with_related {
            cypher.push_str(
                "OPTIONAL MATCH (n)-[r]->(m)\n\
                 RETURN n, collect(DISTINCT CASE WHEN m IS NULL THEN NULL \
                 ELSE {label: head(labels(m)), rel: type(r), node_id: id(m)} END) AS related",
            );
        } else {
            cypher.push_str("RETURN n");
        }

        let params = QueryParams::from([
            ("term".to_string(), Value::from(term.to_lowercase())),
            ("limit".to_string(), Value::from(self.limit as i64)),
        ]);

        (cypher, params)
    }
}

/// Clauses that modify the graph
const WRITE_CLAUSES: &[&str] = &["CREATE", "MERGE", "DELETE", "DETACH", "SET", "REMOVE", "DROP", "FOREACH"];

/// Procedures that only read, matched on the upper-cased qualified name
const READ_PROCEDURES: &[&str] = &[
    "DB.LABELS",
    "DB.RELATIONSHIPTYPES",
    "DB.PROPERTYKEYS",
    "DB.INDEXES",
    "DB.CONSTRAINTS",
    "DB.INFO",
    "DB.PING",
    "DBMS.COMPONENTS",
    "DBMS.PROCEDURES",
    "DBMS.FUNCTIONS",
];

/// Procedure namespaces whose members only read
const READ_PROCEDURE_PREFIXES: &[&str] = &["DB.SCHEMA.", "APOC.META."];

/// Reject statements that write to the graph. Returns the offending clause.
///
/// String literals, backtick-quoted names and comments are skipped so that
/// `WHERE n.name = 'Set menu'` is not mistaken for a `SET` clause. `CALL`
/// subqueries are checked like any other clause; procedure calls must name a
/// known read-only procedure.
pub fn ensure_read_only(cypher: &str) -> Result<(), String> {
    let words = keywords(cypher);

    for (i, word) in words.iter().enumerate() {
        if WRITE_CLAUSES.contains(&word.as_str()) {
            return Err(word.clone());
        }
        let next = words.get(i + 1).map(String::as_str);
        if word == "LOAD" && next == Some("CSV") {
            return Err("LOAD CSV".to_string());
        }
        if word == "CALL" {
            match next {
                // `CALL { ... }` and `CALL (x) { ... }` subqueries
                Some("{") | Some("(") => {}
                Some(procedure) if is_read_procedure(procedure) => {}
                Some(procedure) => return Err(format!("CALL {}", procedure)),
                None => return Err("CALL".to_string()),
            }
        }
    }

    Ok(())
}

fn is_read_procedure(name: &str) -> bool {
    READ_PROCEDURES.contains(&name) || READ_PROCEDURE_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// Upper-cased bare words of a statement, outside literals and comments.
/// Dotted names (`n.name`, `db.labels`) stay one word; `{` and `(` are kept
/// as words of their own.
fn keywords(cypher: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = cypher.chars().peekable();

    let flush = |current: &mut String, words: &mut Vec<String>| {
        if !current.is_empty() {
            words.push(current.to_uppercase());
            current.clear();
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                flush(&mut current, &mut words);
                let quote = c;
                while let Some(inner) = chars.next() {
                    if inner == '\\' {
                        chars.next();
                    } else if inner == quote {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                flush(&mut current, &mut words);
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                flush(&mut current, &mut words);
                chars.next();
                let mut prev = ' ';
                for inner in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
            }
            c if c.is_alphanumeric() || c == '_' => current.push(c),
            '.' if !current.is_empty() => current.push('.'),
            // Property access on an expression (`(n).set`, `m[k].set`) is not a clause.
            '.' => {
                while matches!(chars.peek(), Some(p) if p.is_alphanumeric() || *p == '_') {
                    chars.next();
                }
            }
            // Labels, relationship types and map values (`:Call`, `[:SET]`) are not clauses.
            ':' => {
                flush(&mut current, &mut words);
                while matches!(chars.peek(), Some(p) if p.is_whitespace()) {
                    chars.next();
                }
                while matches!(chars.peek(), Some(p) if p.is_alphanumeric() || *p == '_') {
                    chars.next();
                }
            }
            '{' | '(' => {
                flush(&mut current, &mut words);
                words.push(c.to_string());
            }
            _ => flush(&mut current, &mut words),
        }
    }
    flush(&mut current, &mut words);

    words
}
