//! Record store contract.
//!
//! The store persists schemaless [`Document`]s in named collections and
//! exposes exactly three primitives: create, read and update. Implementations
//! live in `repairdesk-db`.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;
use crate::query::{BuiltQuery, Conditions};
use crate::types::DbId;

/// A stored record: JSON object keyed by field name.
pub type Document = serde_json::Map<String, Value>;

pub const USERS: &str = "users";
pub const TICKETS: &str = "tickets";

/// Failure reported by a store implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A unique field already holds this value.
    #[error("Duplicate value for unique field '{field}'")]
    Duplicate { field: String },

    /// Fields handed to the store were not a JSON object.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Anything the backend itself reported.
    #[error("Store failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Store failures always surface as controller errors.
impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::Controller(err.to_string())
    }
}

/// Raw outcome of a read: either the records or, in count mode, their number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReadOutcome {
    Records(Vec<Document>),
    Count { count: u64 },
}

impl ReadOutcome {
    /// Matched record count regardless of mode.
    pub fn len(&self) -> u64 {
        match self {
            ReadOutcome::Records(records) => records.len() as u64,
            ReadOutcome::Count { count } => *count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume into the first record, if any.
    pub fn into_first(self) -> Option<Document> {
        match self {
            ReadOutcome::Records(records) => records.into_iter().next(),
            ReadOutcome::Count { .. } => None,
        }
    }
}

/// Raw outcome of an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    /// The store acknowledged the write.
    pub ok: bool,
    /// Records whose content actually changed.
    pub n_modified: u64,
}

/// Update request: every record matching `conditions` gets `data` merged in.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateSpec {
    pub conditions: Conditions,
    pub data: Document,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert `fields` into `collection`, assigning a fresh numeric `id`.
    /// Returns the stored record.
    async fn create_record(&self, collection: &str, fields: Document) -> StoreResult<Document>;

    /// Execute a built query against `collection`.
    async fn read_records(&self, collection: &str, query: &BuiltQuery) -> StoreResult<ReadOutcome>;

    /// Merge `update.data` into every matching record.
    async fn update_records(&self, collection: &str, update: &UpdateSpec)
        -> StoreResult<UpdateOutcome>;
}

/// Serialize a value into a [`Document`].
pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::InvalidRecord(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(StoreError::InvalidRecord(e.to_string())),
    }
}

/// The numeric `id` of a document, if it carries one.
pub fn document_id(doc: &Document) -> Option<DbId> {
    doc.get("id").and_then(Value::as_i64)
}
