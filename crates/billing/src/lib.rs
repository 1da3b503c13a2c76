//! # Nebula Billing
//!
//! Plan catalogue, tenant usage metering, and quota enforcement decisions
//! (C10, C11 overlap, §4.9).

mod enforcement;
mod meter;
mod plan;

pub use enforcement::{decide, EnforcementDecision};
pub use meter::{LimitCheck, TenantUsageMeter, UsageSnapshot};
pub use plan::{catalogue, Plan, PlanId};
