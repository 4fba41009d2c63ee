//! HTTP surface of the Shiplog server.
//!
//! User identity arrives as an `x-user-id` header asserted by the fronting
//! managed-auth layer; a request without it is rejected before any
//! entitlement state is touched. Webhook deliveries carry the processor's
//! signature header, checked against the configured shared secret before the
//! payload is decoded (the real cryptographic verification lives in the
//! processor's tooling at the edge; this check is the fixed contract the
//! core relies on).

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shiplog_core::{
    billing::{self, BillingEvent},
    entitlement::PlanCatalog,
    gate::{LimitCheck, LimitGate},
    profile::{Profile, UserId},
    store::{MemoryStore, ProfileStore},
    streak::{self, StreakTracker},
};
use tracing::info;

use crate::error::ApiError;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Backing store.
    pub store: Arc<MemoryStore>,
    /// Limit gate over the injected plan catalog.
    pub gate: LimitGate,
    /// Shared secret for webhook deliveries.
    pub webhook_secret: String,
}

impl AppState {
    /// Creates state over a fresh in-memory store.
    #[must_use]
    pub fn new(webhook_secret: String) -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            gate: LimitGate::new(PlanCatalog::default()),
            webhook_secret,
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/api/users", post(create_user))
        .route("/api/limits", get(check_limits))
        .route("/api/projects", post(create_project))
        .route("/api/updates", post(create_update))
        .route("/api/billing/webhook", post(billing_webhook))
        .with_state(state)
}

fn require_user(headers: &HeaderMap) -> Result<UserId, ApiError> {
    let raw = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthenticated)?;
    Ok(UserId::new(raw)?)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    user_id: String,
    handle: String,
}

async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = UserId::new(body.user_id)?;
    if body.handle.trim().is_empty() {
        return Err(ApiError::Validation("handle cannot be empty".to_owned()));
    }
    if state.store.load_profile(&user).await?.is_some() {
        return Err(ApiError::Conflict("user already exists".to_owned()));
    }

    state
        .store
        .create_profile(&Profile::new(user.clone(), body.handle))
        .await?;
    info!(user = %user, "profile created");
    Ok((StatusCode::CREATED, Json(json!({ "user_id": user.as_str() }))))
}

#[derive(Debug, Deserialize)]
struct LimitsQuery {
    #[serde(rename = "type")]
    kind: String,
}

async fn check_limits(
    State(state): State<AppState>,
    Query(query): Query<LimitsQuery>,
    headers: HeaderMap,
) -> Result<Json<LimitCheck>, ApiError> {
    let user = require_user(&headers)?;
    let now = Utc::now();

    let check = match query.kind.as_str() {
        "project" => state.gate.can_create_project(state.store.as_ref(), &user, now).await?,
        "update" => state.gate.can_create_update(state.store.as_ref(), &user, now).await?,
        other => {
            return Err(ApiError::Validation(format!(
                "unknown limit type: {other} (expected \"project\" or \"update\")"
            )));
        }
    };
    Ok(Json(check))
}

#[derive(Debug, Deserialize)]
struct CreateProjectRequest {
    name: String,
}

async fn create_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = require_user(&headers)?;
    if body.name.trim().is_empty() {
        return Err(ApiError::Validation("project name cannot be empty".to_owned()));
    }

    let check = state
        .gate
        .can_create_project(state.store.as_ref(), &user, Utc::now())
        .await?;
    if !check.allowed {
        return Err(ApiError::LimitExceeded(
            check.reason.unwrap_or_else(|| "project limit reached".to_owned()),
        ));
    }

    let id = state.store.insert_project(&user, body.name.trim()).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

#[derive(Debug, Deserialize)]
struct CreateUpdateRequest {
    content: String,
}

#[derive(Debug, Serialize)]
struct StreakResponse {
    current: u32,
    longest: u32,
    flair: &'static str,
}

async fn create_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = require_user(&headers)?;
    if body.content.trim().is_empty() {
        return Err(ApiError::Validation("update content cannot be empty".to_owned()));
    }

    let now = Utc::now();
    let check = state
        .gate
        .can_create_update(state.store.as_ref(), &user, now)
        .await?;
    if !check.allowed {
        return Err(ApiError::LimitExceeded(
            check.reason.unwrap_or_else(|| "daily update limit reached".to_owned()),
        ));
    }

    let id = state.store.insert_update(&user, body.content.trim(), now).await?;

    // Exactly one streak advance per accepted update.
    let streak =
        StreakTracker::record_activity(state.store.as_ref(), &user, now.date_naive()).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": id,
            "streak": StreakResponse {
                current: streak.current,
                longest: streak.longest,
                flair: streak::flair(streak.current),
            },
        })),
    ))
}

async fn billing_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get("x-webhook-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::InvalidSignature)?;
    if signature != state.webhook_secret {
        return Err(ApiError::InvalidSignature);
    }

    let event: BillingEvent = serde_json::from_str(&body)
        .map_err(|e| ApiError::Validation(format!("undecodable event payload: {e}")))?;

    let outcome = billing::apply(state.store.as_ref(), event, Utc::now()).await?;
    info!(?outcome, "webhook processed");

    // No-op branches still acknowledge with 200 so the provider stops
    // retrying.
    Ok(Json(json!({ "received": true })))
}
