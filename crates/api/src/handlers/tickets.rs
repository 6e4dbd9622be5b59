//! Handlers for the `/tickets` resource.

use std::collections::HashMap;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use repairdesk_core::query::QueryOptions;
use repairdesk_core::ticket::parse_ticket_id;
use serde_json::Value;

use super::body_or_null;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireClient, RequireTechnician};
use crate::response::EnvelopeResponse;
use crate::state::AppState;

/// Query parameters for `GET /tickets/all`.
///
/// Parsed field by field: a malformed value falls back to its default
/// instead of rejecting the request.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListTicketsParams {
    pub email: Option<String>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    /// Space-delimited sort keys, `-` prefix for descending.
    pub sort: Option<String>,
    pub count: Option<bool>,
}

impl ListTicketsParams {
    pub fn from_raw(raw: &HashMap<String, String>) -> Self {
        let number = |key: &str| raw.get(key).and_then(|v| v.trim().parse().ok());
        Self {
            email: raw.get("email").cloned(),
            skip: number("skip"),
            limit: number("limit"),
            sort: raw.get("sort").cloned(),
            count: raw.get("count").and_then(|v| parse_flag(v)),
        }
    }

    fn query_options(&self) -> QueryOptions {
        QueryOptions {
            sort_condition: self.sort.clone(),
            skip: self.skip,
            limit: self.limit,
            count: self.count,
            ..QueryOptions::default()
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// POST /tickets (clients only)
pub async fn create(
    State(state): State<AppState>,
    RequireClient(user): RequireClient,
    body: Result<Json<Value>, JsonRejection>,
) -> EnvelopeResponse {
    state.tickets.create_ticket(&user, &body_or_null(body)).await.into()
}

/// PUT /tickets/{id} (technicians only)
pub async fn update(
    State(state): State<AppState>,
    RequireTechnician(user): RequireTechnician,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> EnvelopeResponse {
    tracing::debug!(technician = %user.email, ticket_id = %id, "Ticket update requested");
    state
        .tickets
        .update_ticket(parse_ticket_id(&id), &body_or_null(body))
        .await
        .into()
}

/// GET /tickets/{id}
pub async fn check(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> EnvelopeResponse {
    state.tickets.check_ticket(parse_ticket_id(&id), &user).await.into()
}

/// GET /tickets/all?email=...
pub async fn list_all(
    State(state): State<AppState>,
    _user: AuthUser,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> EnvelopeResponse {
    let params = match query {
        Ok(Query(raw)) => ListTicketsParams::from_raw(&raw),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Unreadable query string");
            ListTicketsParams::default()
        }
    };
    state
        .tickets
        .check_user_tickets(params.email.as_deref(), params.query_options())
        .await
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn well_formed_params() {
        let params = ListTicketsParams::from_raw(&raw(&[
            ("email", "ada@example.com"),
            ("skip", "2"),
            ("limit", "10"),
            ("sort", "-id"),
            ("count", "true"),
        ]));
        assert_eq!(
            params,
            ListTicketsParams {
                email: Some("ada@example.com".into()),
                skip: Some(2),
                limit: Some(10),
                sort: Some("-id".into()),
                count: Some(true),
            }
        );
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let params = ListTicketsParams::from_raw(&raw(&[
            ("email", "ada@example.com"),
            ("skip", "abc"),
            ("limit", "-3"),
            ("count", "yes"),
        ]));
        assert_eq!(params.email.as_deref(), Some("ada@example.com"));
        assert_eq!(params.skip, None);
        assert_eq!(params.limit, None);
        assert_eq!(params.count, None);

        assert_eq!(ListTicketsParams::from_raw(&raw(&[("count", "1")])).count, Some(true));
    }
}
