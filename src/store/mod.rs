//! Document store abstraction.
//!
//! Records live in named collections as JSON objects keyed by opaque string
//! ids. Backends only provide CRUD, a single equality filter, ordering by one
//! field and cursor pagination; everything relational happens above this layer.

pub mod memory;
pub mod postgres;

use std::cmp::Ordering;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Document body.
pub type Fields = serde_json::Map<String, Value>;

/// A stored record together with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Fields) -> Self {
        Self { id: id.into(), data }
    }

    /// Deserialize the body into a record type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.data.clone()))?)
    }

    /// Text used to order documents by `field`. Missing fields sort first.
    pub fn sort_text(&self, field: &str) -> String {
        match self.data.get(field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Encode a record as a document body.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(<serde_json::Error as serde::ser::Error>::custom("record must serialize to an object").into()),
    }
}

/// List query: optional equality filter, ordering and cursor.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filter: Option<(String, Value)>,
    pub order_by: Option<String>,
    pub limit: Option<usize>,
    pub start_after: Option<Document>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter = Some((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resume after the last document of the previous page.
    pub fn start_after(mut self, last_seen: Document) -> Self {
        self.start_after = Some(last_seen);
        self
    }

    /// Whether `doc` passes the equality filter.
    pub fn matches(&self, doc: &Document) -> bool {
        match &self.filter {
            Some((field, value)) => doc.data.get(field) == Some(value),
            None => true,
        }
    }

    /// Total order used by every backend: order field text, then id.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        match &self.order_by {
            Some(field) => a
                .sort_text(field)
                .cmp(&b.sort_text(field))
                .then_with(|| a.id.cmp(&b.id)),
            None => a.id.cmp(&b.id),
        }
    }
}

/// Collection-oriented CRUD over a remote document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document and return its generated id.
    async fn create(&self, collection: &str, data: Fields) -> Result<String>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>>;

    /// Merge `patch` into an existing document. Fails with `NotFound` if absent.
    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<()>;

    /// Remove a document. Removing a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;

    /// Remove several documents in one call.
    async fn batch_delete(&self, collection: &str, ids: &[String]) -> Result<()>;
}
