//! Quota enforcement decision (§4.9 "Enforcement middleware").
//!
//! The HTTP wiring (tenant id extraction, the actual 402/500 responses)
//! lives in the admin API crate; this module only decides what to do,
//! framework-agnostically, so it can be unit tested without an HTTP
//! stack.

use nebula_core::TenantId;

use crate::meter::TenantUsageMeter;

/// What the caller should do after a quota check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnforcementDecision {
    /// Tenant id was empty: bypass the check entirely.
    Bypass,
    /// Forward to the wrapped handler.
    Allow,
    /// Reject with HTTP 402 and `{error, remaining}`.
    Reject { remaining: i64 },
    /// The limit check itself failed: reject with HTTP 500.
    CheckFailed { message: String },
}

/// Decide how to handle a request for `tenant_id` (empty string bypasses,
/// per §4.9).
pub fn decide(meter: &TenantUsageMeter, tenant_id: &str) -> EnforcementDecision {
    if tenant_id.is_empty() {
        return EnforcementDecision::Bypass;
    }
    let Ok(tenant_id) = TenantId::parse(tenant_id) else {
        return EnforcementDecision::CheckFailed { message: format!("invalid tenant id `{tenant_id}`") };
    };
    match meter.check_limit(tenant_id) {
        Ok(check) if check.allowed => EnforcementDecision::Allow,
        Ok(check) => EnforcementDecision::Reject { remaining: check.remaining },
        Err(err) => EnforcementDecision::CheckFailed { message: err.to_string() },
    }
}
