//! Billing routes (§6 "Plans & usage"): the plan catalogue, per-tenant
//! usage/limit queries, subscription changes, and the payment provider
//! webhook. The quota-enforcement middleware used to gate execution
//! triggers also lives here, wrapping [`nebula_billing::decide`] in an
//! axum `from_fn` layer.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use axum::{extract::Request, Json};
use chrono::Utc;
use nebula_billing::{catalogue, EnforcementDecision, Plan, PlanId};
use nebula_core::TenantId;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::ApiState;

/// `GET /billing/plans` — the fixed plan catalogue (§3 "Plan").
pub async fn list_plans() -> Json<Vec<Plan>> {
    Json(catalogue())
}

#[derive(Deserialize)]
pub struct UsageQuery {
    pub tenant_id: String,
    pub period: Option<String>,
}

#[derive(Serialize)]
pub struct UsageResponse {
    pub execution_count: i64,
    pub pipeline_count: usize,
    pub period: String,
    pub allowed: bool,
    pub remaining: i64,
}

/// `GET /billing/usage?tenant_id=&period=YYYY-MM` (§4.9 `GetUsage`,
/// scenario 1).
pub async fn get_usage(State(state): State<ApiState>, Query(query): Query<UsageQuery>) -> Result<Json<UsageResponse>, ApiError> {
    let tenant_id = TenantId::parse(&query.tenant_id).map_err(|_| ApiError::bad_request("invalid tenant_id"))?;
    let any_time_in_period = match query.period {
        Some(period) => period.parse::<nebula_core::Period>().map_err(|_| ApiError::bad_request("invalid period, expected YYYY-MM"))?.start(),
        None => Utc::now(),
    };
    let usage = state.meter.get_usage(tenant_id, any_time_in_period);
    let check = state.meter.check_limit(tenant_id).map_err(|err| ApiError::bad_request(err.to_string()))?;
    Ok(Json(UsageResponse {
        execution_count: usage.execution_count,
        pipeline_count: usage.pipeline_count,
        period: usage.period.key(),
        allowed: check.allowed,
        remaining: check.remaining,
    }))
}

#[derive(Deserialize)]
pub struct SubscribeRequest {
    pub tenant_id: String,
    pub plan_id: PlanId,
}

/// `POST /billing/subscribe` — assign a tenant's plan.
pub async fn subscribe(State(state): State<ApiState>, Json(req): Json<SubscribeRequest>) -> Result<Json<serde_json::Value>, ApiError> {
    let tenant_id = TenantId::parse(&req.tenant_id).map_err(|_| ApiError::bad_request("invalid tenant_id"))?;
    state.meter.set_plan(tenant_id, req.plan_id);
    Ok(Json(crate::error::message("subscribed")))
}

#[derive(Deserialize)]
pub struct UnsubscribeQuery {
    pub tenant_id: String,
}

/// `DELETE /billing/subscribe?tenant_id=` — downgrade a tenant back to
/// the free plan. There is no "no plan" state once a tenant has been
/// seen (§4.9 "default `free` if none set"), so cancellation is
/// modeled as an explicit re-subscription to `free`.
pub async fn unsubscribe(State(state): State<ApiState>, Query(query): Query<UnsubscribeQuery>) -> Result<Json<serde_json::Value>, ApiError> {
    let tenant_id = TenantId::parse(&query.tenant_id).map_err(|_| ApiError::bad_request("invalid tenant_id"))?;
    state.meter.set_plan(tenant_id, PlanId::Free);
    Ok(Json(crate::error::message("unsubscribed")))
}

/// `POST /billing/webhook` — requires a provider signature header
/// (§6 "webhook signature header required"). The concrete payment
/// provider is an external collaborator (§1); this handler only verifies
/// the header is present and acknowledges receipt, matching the scope of
/// §1's "only the interfaces the core exposes to or consumes from them
/// are contractual".
pub async fn webhook(headers: HeaderMap, body: String) -> Result<Json<serde_json::Value>, ApiError> {
    if !headers.contains_key("x-webhook-signature") {
        return Err(ApiError::Unauthorized);
    }
    tracing::info!(bytes = body.len(), "billing webhook received");
    Ok(Json(crate::error::message("accepted")))
}

/// Quota enforcement middleware (§4.9 "Enforcement middleware"): extracts
/// a tenant id from the `x-tenant-id` header. An empty/absent header
/// bypasses the check; otherwise `CheckLimit` is consulted and the
/// request rejected with `402` if the tenant is over quota.
pub async fn enforce_quota(State(state): State<ApiState>, request: Request, next: Next) -> Result<Response, ApiError> {
    let tenant_id = request.headers().get("x-tenant-id").and_then(|v| v.to_str().ok()).unwrap_or_default();
    match nebula_billing::decide(&state.meter, tenant_id) {
        EnforcementDecision::Bypass | EnforcementDecision::Allow => Ok(next.run(request).await),
        EnforcementDecision::Reject { remaining } => Err(ApiError::QuotaExceeded { remaining }),
        EnforcementDecision::CheckFailed { message } => Err(ApiError::Internal { message }),
    }
}
