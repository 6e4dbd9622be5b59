//! In-memory record store.
//!
//! Collections are vectors of documents behind a single `RwLock`. Ids come
//! from one counter shared by all collections. Unique fields are declared up
//! front and checked on insert.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use repairdesk_core::query::BuiltQuery;
use repairdesk_core::store::{
    Document, ReadOutcome, RecordStore, StoreError, StoreResult, UpdateOutcome, UpdateSpec, USERS,
};
use serde_json::Value;
use tokio::sync::RwLock;

pub struct MemoryRecordStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    next_id: AtomicI64,
    /// `(collection, field)` pairs whose values must be unique.
    unique_fields: Vec<(String, String)>,
}

impl MemoryRecordStore {
    /// Empty store with the same unique constraints as the SQL schema.
    pub fn new() -> Self {
        Self::with_unique_fields(vec![(USERS.to_string(), "email".to_string())])
    }

    pub fn with_unique_fields(unique_fields: Vec<(String, String)>) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(0),
            unique_fields,
        }
    }

    fn unique_fields_for<'a>(&'a self, collection: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.unique_fields
            .iter()
            .filter(move |(c, _)| c == collection)
            .map(|(_, f)| f.as_str())
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create_record(&self, collection: &str, mut fields: Document) -> StoreResult<Document> {
        let mut collections = self.collections.write().await;
        let records = collections.entry(collection.to_string()).or_default();

        for field in self.unique_fields_for(collection) {
            let Some(value) = fields.get(field) else {
                continue;
            };
            if records.iter().any(|r| r.get(field) == Some(value)) {
                return Err(StoreError::Duplicate {
                    field: field.to_string(),
                });
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        fields.insert("id".to_string(), Value::from(id));
        records.push(fields.clone());
        Ok(fields)
    }

    async fn read_records(&self, collection: &str, query: &BuiltQuery) -> StoreResult<ReadOutcome> {
        let collections = self.collections.read().await;
        let mut matched: Vec<&Document> = collections
            .get(collection)
            .map(|records| records.iter().filter(|r| query.matches(r)).collect())
            .unwrap_or_default();

        if query.count {
            return Ok(ReadOutcome::Count {
                count: matched.len() as u64,
            });
        }

        if !query.sort_condition.is_empty() {
            matched.sort_by(|a, b| query.sort_condition.compare(a, b));
        }

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(usize::MAX);

        let records = matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| query.fields_to_return.apply(doc))
            .collect();
        Ok(ReadOutcome::Records(records))
    }

    async fn update_records(
        &self,
        collection: &str,
        update: &UpdateSpec,
    ) -> StoreResult<UpdateOutcome> {
        let mut collections = self.collections.write().await;
        let Some(records) = collections.get_mut(collection) else {
            return Ok(UpdateOutcome {
                ok: true,
                n_modified: 0,
            });
        };

        let mut n_modified = 0;
        for record in records.iter_mut() {
            let matches = update
                .conditions
                .iter()
                .all(|(field, expected)| record.get(field) == Some(expected));
            if !matches {
                continue;
            }
            let changed = update
                .data
                .iter()
                .any(|(field, value)| record.get(field) != Some(value));
            if changed {
                for (field, value) in &update.data {
                    record.insert(field.clone(), value.clone());
                }
                n_modified += 1;
            }
        }

        Ok(UpdateOutcome {
            ok: true,
            n_modified,
        })
    }
}
