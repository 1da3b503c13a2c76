//! # Nebula API
//!
//! The admin HTTP surface (C12, §6): billing, workflow CRUD and
//! deployment, execution/step/log queries, audit, bundle import/export,
//! and the ingest endpoints remote engine replicas report back through.
//! Grounded on the teacher family's control-plane server
//! (`everruns-everruns/crates/control-plane/src/main.rs`): one `Router`
//! per resource module, merged under a versioned prefix, with auth and
//! quota enforcement applied as `axum::middleware::from_fn_with_state`
//! layers rather than per-handler checks.

pub mod audit;
pub mod auth;
pub mod billing;
pub mod bundles;
pub mod error;
pub mod executions;
pub mod ingest;
pub mod state;
pub mod workflows;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

pub use state::ApiState;

/// Builds the full `/api/v1/...` router (§6). Bearer-token auth
/// ([`auth::require_bearer_token`]) guards every route; quota
/// enforcement ([`billing::enforce_quota`]) additionally guards the one
/// route that starts a billable execution.
#[must_use]
pub fn router(state: ApiState) -> Router {
    let trigger_routes = Router::new()
        .route("/workflows/{id}/trigger", post(workflows::trigger_workflow))
        .layer(middleware::from_fn_with_state(state.clone(), billing::enforce_quota));

    let api_routes = Router::new()
        .route("/billing/plans", get(billing::list_plans))
        .route("/billing/usage", get(billing::get_usage))
        .route("/billing/subscribe", post(billing::subscribe).delete(billing::unsubscribe))
        .route("/billing/webhook", post(billing::webhook))
        .route("/workflows", get(workflows::list_workflows).post(workflows::create_workflow))
        .route("/workflows/{id}", get(workflows::get_workflow).put(workflows::update_workflow).delete(workflows::delete_workflow))
        .route("/workflows/{id}/deploy", post(workflows::deploy_workflow))
        .merge(trigger_routes)
        .route("/executions", get(executions::list_executions))
        .route("/executions/{id}", get(executions::get_execution))
        .route("/executions/{id}/steps", get(executions::list_steps))
        .route("/executions/{id}/logs", get(executions::list_logs))
        .route("/audit", get(audit::list_audit))
        .route("/bundles/import", post(bundles::import_bundle))
        .route("/bundles/{workflow_id}/export", get(bundles::export_bundle))
        .route("/admin/ingest/executions", post(ingest::ingest_execution))
        .route("/admin/ingest/logs", post(ingest::ingest_logs))
        .route("/admin/ingest/events", post(ingest::ingest_events))
        .route("/admin/instances/register", post(ingest::register_instance))
        .route("/admin/instances/heartbeat", post(ingest::heartbeat_instance))
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}
