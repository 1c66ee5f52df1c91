//! Platform hook intake and raw event log reading.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use stock_ledger_core::{EventId, EventPayload, StockEvent};
use stock_ledger_store::Store;

use crate::crypto::verify_hook_signature;
use crate::error::ApiError;
use crate::recorder;
use crate::state::AppState;

/// Events returned when the request does not say.
const DEFAULT_EVENT_LIMIT: usize = 100;

/// Hard ceiling on events per listing.
const MAX_EVENT_LIMIT: usize = 1000;

/// Acknowledgement for an accepted hook.
#[derive(Debug, Serialize)]
pub struct HookResponse {
    /// Whether the event was accepted for recording.
    pub recorded: bool,

    /// The id assigned to the recorded event.
    pub event_id: EventId,
}

/// Receive one stock event from the host platform.
///
/// The raw body is taken as a string so the signature covers exactly the
/// bytes the platform signed; parsing happens after verification. The
/// response is unconditional on storage success: recording swallows
/// storage errors so hooks stay cheap for the platform to deliver.
pub async fn platform_hook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<HookResponse>, ApiError> {
    if let Some(secret) = &state.config.hook_secret {
        let provided = headers
            .get("x-hook-signature")
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        if !verify_hook_signature(secret, &body, provided) {
            tracing::warn!("hook signature mismatch");
            return Err(ApiError::Unauthorized);
        }
    }

    let payload: EventPayload = serde_json::from_str(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid event payload: {e}")))?;

    let event = recorder::record(state.store.as_ref(), payload);

    Ok(Json(HookResponse {
        recorded: true,
        event_id: event.id,
    }))
}

/// Query parameters for the event log listing.
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Maximum events to return.
    pub limit: Option<usize>,
}

/// Raw event log listing, newest first.
#[derive(Debug, Serialize)]
pub struct EventsResponse {
    /// The most recent raw events.
    pub events: Vec<StockEvent>,
}

/// List the most recent raw events.
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_EVENT_LIMIT)
        .clamp(1, MAX_EVENT_LIMIT);

    let events = state.store.recent_events(limit)?;
    Ok(Json(EventsResponse { events }))
}
