use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Errors from the document store and the typed repository on top of it
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{label} {id} not found")]
    NotFound { label: &'static str, id: String },

    #[error("Invalid {label}: {message}")]
    InvalidDocument { label: &'static str, message: String },

    #[error("Stored {label} {id} could not be decoded: {message}")]
    Corrupt {
        label: &'static str,
        id: Uuid,
        message: String,
    },

    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// One stored record: the schema-flexible body plus the server-managed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    /// Top-level field of the document body
    Field(String),
    CreatedAt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub direction: Direction,
}

/// Equality filter on top-level body fields plus an ordered sort list.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filter: Map<String, Value>,
    pub sort: Vec<Sort>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filter.insert(field.to_string(), value.into());
        self
    }

    pub fn sort_asc(mut self, field: &str) -> Self {
        self.sort.push(Sort {
            key: SortKey::Field(field.to_string()),
            direction: Direction::Asc,
        });
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.sort.push(Sort {
            key: SortKey::CreatedAt,
            direction: Direction::Desc,
        });
        self
    }

    /// Field names that need binding as sort parameters, in ORDER BY order.
    pub fn sort_fields(&self) -> impl Iterator<Item = &str> {
        self.sort.iter().filter_map(|s| match &s.key {
            SortKey::Field(name) => Some(name.as_str()),
            SortKey::CreatedAt => None,
        })
    }

    pub fn matches(&self, data: &Value) -> bool {
        self.filter
            .iter()
            .all(|(field, expected)| data.get(field) == Some(expected))
    }
}

/// One row of a grouped count. Serialized as `{ "_id": key, "count": n }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    #[serde(rename = "_id")]
    pub key: Option<String>,
    pub count: i64,
}

/// Persistence seam. One collection per entity; nothing is shared across
/// collections and no operation spans more than one.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create the collection if it does not exist yet.
    async fn ensure_collection(&self, collection: &str) -> Result<(), StoreError>;

    async fn insert(&self, collection: &str, doc: Document) -> Result<(), StoreError>;

    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError>;

    /// Read-modify-write one document body as a single step: concurrent
    /// callers on the same id are serialized. `mutate` returns whether it
    /// changed anything; unchanged documents keep their `updated_at`.
    /// `None` when no document has `id`.
    async fn modify(
        &self,
        collection: &str,
        id: Uuid,
        updated_at: DateTime<Utc>,
        mutate: &mut (dyn for<'v> FnMut(&'v mut Value) -> Result<bool, StoreError> + Send),
    ) -> Result<Option<Document>, StoreError>;

    async fn delete(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError>;

    async fn delete_all(&self, collection: &str) -> Result<u64, StoreError>;

    async fn count(&self, collection: &str, query: &Query) -> Result<i64, StoreError>;

    /// Count documents grouped by the string form of one body field,
    /// largest group first.
    async fn group_count(&self, collection: &str, field: &str) -> Result<Vec<GroupCount>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Collection names are interpolated into SQL, so only `[a-z_]+` is accepted.
pub fn is_valid_collection_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_lowercase() || c == '_')
}
