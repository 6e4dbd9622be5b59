//! Generic resource operations shared by the domain services.
//!
//! [`ResourceOps`] bundles the record store, the event sink and the
//! deployment posture. Domain services hold one and call into it for reads,
//! writes, outcome classification and error formatting.

use std::sync::Arc;

use repairdesk_core::envelope::{self, classify_update, ResponseEnvelope, UpdateKind};
use repairdesk_core::error::{format_error, CoreError, Environment, FormattedError};
use repairdesk_core::query::{build_query, Conditions, QueryOptions};
use repairdesk_core::store::{
    to_document, Document, ReadOutcome, RecordStore, UpdateOutcome, UpdateSpec,
};
use repairdesk_events::{DomainEvent, EventBus};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone)]
pub struct ResourceOps {
    store: Arc<dyn RecordStore>,
    events: Arc<EventBus>,
    environment: Environment,
}

impl ResourceOps {
    pub fn new(store: Arc<dyn RecordStore>, events: Arc<EventBus>, environment: Environment) -> Self {
        Self {
            store,
            events,
            environment,
        }
    }

    // -- store access -------------------------------------------------------

    /// Build `options`, merge `extra` conditions over them and read.
    ///
    /// The raw outcome is returned; callers pick the envelope processor.
    pub async fn handle_database_read(
        &self,
        collection: &str,
        options: &QueryOptions,
        extra: Conditions,
    ) -> Result<ReadOutcome, CoreError> {
        let query = build_query(options).with_extra_conditions(extra);
        Ok(self.store.read_records(collection, &query).await?)
    }

    pub async fn create_record<T: Serialize>(
        &self,
        collection: &str,
        record: &T,
    ) -> Result<Document, CoreError> {
        let fields = to_document(record)?;
        Ok(self.store.create_record(collection, fields).await?)
    }

    pub async fn update_records(
        &self,
        collection: &str,
        update: &UpdateSpec,
    ) -> Result<UpdateOutcome, CoreError> {
        Ok(self.store.update_records(collection, update).await?)
    }

    /// Mark matching records deleted and inactive.
    pub async fn soft_delete(
        &self,
        collection: &str,
        conditions: Conditions,
    ) -> Result<ResponseEnvelope, CoreError> {
        let mut data = Document::new();
        data.insert("isDeleted".into(), Value::Bool(true));
        data.insert("isActive".into(), Value::Bool(false));
        data.insert("updatedOn".into(), serde_json::to_value(chrono::Utc::now()).unwrap_or_default());

        let result = self
            .update_records(collection, &UpdateSpec { conditions, data })
            .await?;
        Ok(envelope::process_delete_result(Some(&result)))
    }

    // -- outcome classification ---------------------------------------------

    /// Classify an update; when records changed and `event` is given, emit it
    /// carrying the outcome.
    pub fn process_update_result(
        &self,
        result: Option<&UpdateOutcome>,
        event: Option<DomainEvent>,
    ) -> ResponseEnvelope {
        if let (UpdateKind::Modified, Some(outcome), Some(event)) =
            (classify_update(result), result, event)
        {
            let data = serde_json::to_value(outcome).unwrap_or_default();
            self.events.emit(event.with_data(data));
        }
        envelope::process_update_result(result)
    }

    // -- errors ---------------------------------------------------------------

    pub fn format_error(&self, service: &str, operation: &str, error: &CoreError) -> FormattedError {
        format_error(service, operation, error, self.environment)
    }

    /// Log and convert a failed operation into its envelope.
    pub fn fail(
        &self,
        service: &str,
        operation: &str,
        error: CoreError,
        default_status: u16,
    ) -> ResponseEnvelope {
        match &error {
            CoreError::Controller(msg) => {
                tracing::error!(service, operation, error = %msg, "Store failure");
            }
            other => tracing::debug!(service, operation, error = %other, "Operation rejected"),
        }
        ResponseEnvelope::from_error(self.format_error(service, operation, &error), default_status)
    }
}

/// Decode a stored document into a typed view.
pub fn decode<T: DeserializeOwned>(doc: Document) -> Result<T, CoreError> {
    serde_json::from_value(Value::Object(doc))
        .map_err(|e| CoreError::Controller(format!("Malformed record: {e}")))
}

/// Single-entry condition map.
pub fn condition(field: &str, value: impl Into<Value>) -> Conditions {
    let mut conditions = Conditions::new();
    conditions.insert(field.to_string(), value.into());
    conditions
}
