//! Storage layer for catchlog.
//!
//! Records live in a local document store: named collections of JSON
//! documents, each with a string `id` primary key. Callers receive the store
//! as a [`DocumentStore`] value and never reach for a global handle.

pub mod collection;
pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};

pub use collection::{Collection, Document};

/// The operations a local document store offers per collection.
pub trait DocumentStore {
    /// Documents in `collection` whose top-level fields equal every
    /// condition in `filter`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored body is not valid JSON.
    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>>;

    /// The document with primary key `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Insert a document. It must carry a string `id` field.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is missing or already taken.
    fn create(&self, collection: &str, document: &Value) -> Result<()>;

    /// Merge the fields of `partial` into the document with primary key `id`.
    /// An `id` field in `partial` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentNotFound`] if there is no such document.
    fn update(&self, collection: &str, id: &str, partial: &Value) -> Result<()>;

    /// Delete a document. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    fn remove(&self, collection: &str, id: &str) -> Result<bool>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>> {
        (**self).find(collection, filter)
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        (**self).get(collection, id)
    }

    fn create(&self, collection: &str, document: &Value) -> Result<()> {
        (**self).create(collection, document)
    }

    fn update(&self, collection: &str, id: &str, partial: &Value) -> Result<()> {
        (**self).update(collection, id, partial)
    }

    fn remove(&self, collection: &str, id: &str) -> Result<bool> {
        (**self).remove(collection, id)
    }
}

/// Equality conditions on top-level document fields.
///
/// ```
/// use catchlog::storage::Filter;
///
/// let filter = Filter::new().eq("tripId", "a1b2");
/// assert_eq!(filter.conditions().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    /// An empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A filter matching every document.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    /// The conditions, in the order they were added.
    #[must_use]
    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }
}

/// `SQLite`-backed document store.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Count the documents in a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self, collection: &str) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            [collection],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT collection, COUNT(*) FROM documents
            GROUP BY collection ORDER BY collection
            ",
        )?;
        let collections = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<(String, i64)>, _>>()?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            collections,
            db_size_bytes,
        })
    }
}

/// JSON path addressing a top-level field.
fn json_path(field: &str) -> String {
    format!("$.\"{field}\"")
}

/// Convert a scalar JSON value to an SQL parameter comparable with
/// `json_extract` output.
fn scalar_param(field: &str, value: &Value) -> Result<SqlValue> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(b) => Ok(SqlValue::Integer(i64::from(*b))),
        Value::Number(n) => n
            .as_i64()
            .map(SqlValue::Integer)
            .or_else(|| n.as_f64().map(SqlValue::Real))
            .ok_or_else(|| Error::internal(format!("unsupported number in filter on '{field}'"))),
        Value::String(s) => Ok(SqlValue::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(Error::internal(format!(
            "filter on '{field}' must compare a scalar value"
        ))),
    }
}

fn parse_body(body: &str) -> Result<Value> {
    Ok(serde_json::from_str(body)?)
}

impl DocumentStore for Storage {
    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>> {
        let mut sql = String::from("SELECT body FROM documents WHERE collection = ?1");
        let mut params = vec![SqlValue::Text(collection.to_string())];

        for (field, value) in filter.conditions() {
            params.push(SqlValue::Text(json_path(field)));
            let path_index = params.len();
            if value.is_null() {
                sql.push_str(&format!(" AND json_extract(body, ?{path_index}) IS NULL"));
            } else {
                params.push(scalar_param(field, value)?);
                sql.push_str(&format!(
                    " AND json_extract(body, ?{path_index}) = ?{}",
                    path_index + 1
                ));
            }
        }
        sql.push_str(" ORDER BY created_at, rowid");

        let mut stmt = self.conn.prepare(&sql)?;
        let bodies = stmt
            .query_map(params_from_iter(params.iter()), |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        bodies.iter().map(String::as_str).map(parse_body).collect()
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;
        body.as_deref().map(parse_body).transpose()
    }

    fn create(&self, collection: &str, document: &Value) -> Result<()> {
        let id = document
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::internal(format!("document for '{collection}' has no string id")))?;
        let body = serde_json::to_string(document)?;

        self.conn.execute(
            "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)",
            params![collection, id, body],
        )?;

        debug!("Created {}/{}", collection, id);
        Ok(())
    }

    fn update(&self, collection: &str, id: &str, partial: &Value) -> Result<()> {
        let Some(fields) = partial.as_object() else {
            return Err(Error::internal(format!(
                "update of {collection}/{id} expects a JSON object"
            )));
        };
        let mut fields = fields.clone();
        fields.remove("id");
        let patch = serde_json::to_string(&fields)?;

        let affected = self.conn.execute(
            r"
            UPDATE documents
            SET body = json_patch(body, ?3),
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE collection = ?1 AND id = ?2
            ",
            params![collection, id, patch],
        )?;

        if affected == 0 {
            return Err(Error::document_not_found(collection, id));
        }
        debug!("Updated {}/{}", collection, id);
        Ok(())
    }

    fn remove(&self, collection: &str, id: &str) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        if affected > 0 {
            debug!("Removed {}/{}", collection, id);
        }
        Ok(affected > 0)
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Document count per collection, sorted by collection name.
    pub collections: Vec<(String, i64)>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

impl StorageStats {
    /// Total documents across all collections.
    #[must_use]
    pub fn total_documents(&self) -> i64 {
        self.collections.iter().map(|(_, count)| count).sum()
    }
}
