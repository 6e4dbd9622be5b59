//! Ticket lifecycle: creation under quota, resolution by technicians, and
//! owner-scoped lookups.

use std::sync::Arc;

use dashmap::DashMap;
use repairdesk_core::envelope::{self, ResponseEnvelope};
use repairdesk_core::error::{CoreError, STATUS_BAD_REQUEST};
use repairdesk_core::query::{Conditions, QueryOptions};
use repairdesk_core::store::{Document, UpdateSpec, TICKETS};
use repairdesk_core::ticket::{
    check_quota, TicketDraft, TicketPatch, TicketStatus, EVENT_TICKET_RESOLVED,
    TICKET_STATUS_FIELDS, TICKET_SUMMARY_FIELDS,
};
use repairdesk_core::types::DbId;
use repairdesk_events::DomainEvent;
use serde_json::Value;
use tokio::sync::Mutex;

use super::resource::{condition, decode, ResourceOps};
use crate::middleware::auth::AuthUser;

const SERVICE_NAME: &str = "TicketService";

#[derive(Clone)]
pub struct TicketService {
    ops: ResourceOps,
    /// One lock per owner email; held across the quota count and the insert.
    owner_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl TicketService {
    pub fn new(ops: ResourceOps) -> Self {
        Self {
            ops,
            owner_locks: Arc::new(DashMap::new()),
        }
    }

    fn owner_lock(&self, owner: &str) -> Arc<Mutex<()>> {
        Arc::clone(self.owner_locks.entry(owner.to_string()).or_default().value())
    }

    /// Drop the owner's entry once no other request holds or awaits it.
    /// The map's shard lock makes the check and the removal atomic against
    /// [`Self::owner_lock`].
    fn release_owner_lock(&self, owner: &str) {
        self.owner_locks
            .remove_if(owner, |_, lock| Arc::strong_count(lock) == 1);
    }

    fn fail(&self, operation: &str, error: CoreError) -> ResponseEnvelope {
        self.ops.fail(SERVICE_NAME, operation, error, STATUS_BAD_REQUEST)
    }

    // -----------------------------------------------------------------------
    // createTicket
    // -----------------------------------------------------------------------

    /// Register a device for repair on behalf of `caller`.
    pub async fn create_ticket(&self, caller: &AuthUser, payload: &Value) -> ResponseEnvelope {
        match self.try_create_ticket(caller, payload).await {
            Ok(created) => {
                tracing::info!(owner = %caller.email, ticket_id = ?created.get("id"), "Ticket created");
                envelope::process_single_read(Some(created))
            }
            Err(e) => self.fail("createTicket", e),
        }
    }

    async fn try_create_ticket(&self, caller: &AuthUser, payload: &Value) -> Result<Document, CoreError> {
        let draft = TicketDraft::from_payload(payload)?;

        let lock = self.owner_lock(&caller.email);
        let result = {
            let _guard = lock.lock().await;
            self.insert_under_quota(caller, draft).await
        };
        drop(lock);
        self.release_owner_lock(&caller.email);
        result
    }

    async fn insert_under_quota(&self, caller: &AuthUser, draft: TicketDraft) -> Result<Document, CoreError> {
        let existing = self
            .ops
            .handle_database_read(
                TICKETS,
                &QueryOptions::new().with_count(true),
                condition("ownerEmail", caller.email.as_str()),
            )
            .await?;
        if let Err(e) = check_quota(existing.len()) {
            tracing::warn!(owner = %caller.email, existing = existing.len(), "Ticket quota reached");
            return Err(e);
        }

        self.ops
            .create_record(TICKETS, &draft.into_new_ticket(&caller.email))
            .await
    }

    // -----------------------------------------------------------------------
    // updateTicket
    // -----------------------------------------------------------------------

    /// Mark a ticket fixed. Resolution is one-way.
    pub async fn update_ticket(&self, ticket_id: Option<DbId>, payload: &Value) -> ResponseEnvelope {
        match self.try_update_ticket(ticket_id, payload).await {
            Ok(envelope) => envelope,
            Err(e) => self.fail("updateTicket", e),
        }
    }

    async fn try_update_ticket(
        &self,
        ticket_id: Option<DbId>,
        payload: &Value,
    ) -> Result<ResponseEnvelope, CoreError> {
        let id = ticket_id
            .ok_or_else(|| CoreError::Validation("Please supply ticket id".into()))?;
        let patch = TicketPatch::from_payload(payload)?;

        let current = self
            .ops
            .handle_database_read(
                TICKETS,
                &QueryOptions::new().with_fields(TICKET_STATUS_FIELDS),
                condition("id", id),
            )
            .await?
            .into_first()
            .ok_or_else(|| {
                CoreError::Validation(format!("This device with id {id} is not registered with us"))
            })?;
        let current: TicketStatus = decode(current)?;
        if current.is_fixed {
            return Err(CoreError::Validation(format!("Device with id {id} already fixed")));
        }

        let mut data = Document::new();
        data.insert("isFixed".into(), Value::Bool(patch.is_fixed));
        data.insert(
            "updatedOn".into(),
            serde_json::to_value(chrono::Utc::now()).unwrap_or_default(),
        );
        let result = self
            .ops
            .update_records(TICKETS, &UpdateSpec { conditions: condition("id", id), data })
            .await?;

        let event = patch
            .is_fixed
            .then(|| DomainEvent::new(EVENT_TICKET_RESOLVED).with_record(TICKETS, id));
        tracing::info!(ticket_id = id, n_modified = result.n_modified, "Ticket updated");
        Ok(self.ops.process_update_result(Some(&result), event))
    }

    // -----------------------------------------------------------------------
    // checkTicket
    // -----------------------------------------------------------------------

    /// Fetch one of the caller's own tickets, succeeding only once it is fixed.
    pub async fn check_ticket(&self, ticket_id: Option<DbId>, caller: &AuthUser) -> ResponseEnvelope {
        match self.try_check_ticket(ticket_id, caller).await {
            Ok(doc) => envelope::process_single_read(Some(doc)),
            Err(e) => self.fail("checkTicket", e),
        }
    }

    async fn try_check_ticket(
        &self,
        ticket_id: Option<DbId>,
        caller: &AuthUser,
    ) -> Result<Document, CoreError> {
        let id = ticket_id
            .ok_or_else(|| CoreError::Validation("Please supply ticket id".into()))?;

        let mut scope = Conditions::new();
        scope.insert("id".into(), id.into());
        scope.insert("ownerEmail".into(), caller.email.as_str().into());

        let doc = self
            .ops
            .handle_database_read(TICKETS, &QueryOptions::new(), scope)
            .await?
            .into_first()
            .ok_or_else(|| {
                CoreError::NotFound(format!("You did not register a device with id {id} with us"))
            })?;

        let status: TicketStatus = decode(doc.clone())?;
        if !status.is_fixed {
            return Err(CoreError::Rejected(format!(
                "Device with id {id} is not fixed, please wait awhile"
            )));
        }
        Ok(doc)
    }

    // -----------------------------------------------------------------------
    // checkUserTickets
    // -----------------------------------------------------------------------

    /// List the tickets registered under `owner_email`.
    ///
    /// The email comes from the request, not the caller's identity.
    pub async fn check_user_tickets(
        &self,
        owner_email: Option<&str>,
        options: QueryOptions,
    ) -> ResponseEnvelope {
        match self.try_check_user_tickets(owner_email, options).await {
            Ok(envelope) => envelope,
            Err(e) => self.fail("checkUserTickets", e),
        }
    }

    async fn try_check_user_tickets(
        &self,
        owner_email: Option<&str>,
        options: QueryOptions,
    ) -> Result<ResponseEnvelope, CoreError> {
        let email = owner_email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| CoreError::Validation("Please supply user email".into()))?;

        let options = options.with_fields(TICKET_SUMMARY_FIELDS);
        let outcome = self
            .ops
            .handle_database_read(TICKETS, &options, condition("ownerEmail", email))
            .await?;

        // An empty page is only "no devices" when the owner has none at all.
        if outcome.is_empty() && self.count_owner_tickets(email).await? == 0 {
            return Err(CoreError::Rejected(
                "User has not registered any device with us".into(),
            ));
        }
        Ok(envelope::process_multiple_read_results(Some(outcome)))
    }

    async fn count_owner_tickets(&self, email: &str) -> Result<u64, CoreError> {
        let total = self
            .ops
            .handle_database_read(
                TICKETS,
                &QueryOptions::new().with_count(true),
                condition("ownerEmail", email),
            )
            .await?;
        Ok(total.len())
    }
}
