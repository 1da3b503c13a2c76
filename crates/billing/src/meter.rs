//! Tenant usage meter (C10, §4.9).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use nebula_core::{Period, TenantId};
use nebula_error::EnforcementError;
use parking_lot::RwLock;

use crate::plan::{catalogue, Plan, PlanId};

#[derive(Debug, Default)]
struct TenantUsage {
    plan_id: Option<PlanId>,
    executions_by_period: RwLock<std::collections::HashMap<Period, i64>>,
    distinct_pipelines: RwLock<HashSet<String>>,
}

/// `{executionCount, pipelineCount, period}` (§4.9 `GetUsage`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub execution_count: i64,
    pub pipeline_count: usize,
    pub period: Period,
}

/// Result of a quota check: `(allowed, remaining, err)` collapsed to a
/// `Result` — `remaining = -1` for unlimited plans (§4.9, P5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitCheck {
    pub allowed: bool,
    pub remaining: i64,
}

/// Records executions per tenant per period and answers plan-aware limit
/// checks (§4.9). Plan assignment defaults to `free` when unset.
#[derive(Default)]
pub struct TenantUsageMeter {
    plans: DashMap<PlanId, Plan>,
    tenants: DashMap<TenantId, TenantUsage>,
}

impl TenantUsageMeter {
    #[must_use]
    pub fn new() -> Self {
        let plans = DashMap::new();
        for plan in catalogue() {
            plans.insert(plan.id, plan);
        }
        Self { plans, tenants: DashMap::new() }
    }

    pub fn set_plan(&self, tenant_id: TenantId, plan_id: PlanId) {
        let mut entry = self.tenants.entry(tenant_id).or_default();
        entry.plan_id = Some(plan_id);
    }

    fn plan_for(&self, tenant_id: TenantId) -> Result<Plan, EnforcementError> {
        let plan_id = self.tenants.get(&tenant_id).and_then(|t| t.plan_id).unwrap_or(PlanId::Free);
        self.plans.get(&plan_id).map(|p| p.clone()).ok_or(EnforcementError::UnknownPlan { plan_id: plan_id.as_str().to_owned() })
    }

    /// Record one execution for `tenant_id` against `pipeline_key`, at
    /// `at` (defaults the bucket to `at`'s UTC year-month).
    pub fn record_execution(&self, tenant_id: TenantId, pipeline_key: &str, at: DateTime<Utc>) {
        let entry = self.tenants.entry(tenant_id).or_default();
        let period = Period::containing(at);
        *entry.executions_by_period.write().entry(period).or_insert(0) += 1;
        entry.distinct_pipelines.write().insert(pipeline_key.to_owned());
    }

    /// `{executionCount, pipelineCount, period}` for the period containing
    /// `any_time_in_period` (§4.9 `GetUsage`).
    #[must_use]
    pub fn get_usage(&self, tenant_id: TenantId, any_time_in_period: DateTime<Utc>) -> UsageSnapshot {
        let period = Period::containing(any_time_in_period);
        let Some(entry) = self.tenants.get(&tenant_id) else {
            return UsageSnapshot { execution_count: 0, pipeline_count: 0, period };
        };
        let execution_count = entry.executions_by_period.read().get(&period).copied().unwrap_or(0);
        let pipeline_count = entry.distinct_pipelines.read().len();
        UsageSnapshot { execution_count, pipeline_count, period }
    }

    /// `CheckLimit` against the tenant's current-period execution count
    /// (P5).
    pub fn check_limit(&self, tenant_id: TenantId) -> Result<LimitCheck, EnforcementError> {
        let plan = self.plan_for(tenant_id)?;
        if plan.is_unlimited() {
            return Ok(LimitCheck { allowed: true, remaining: -1 });
        }
        let usage = self.get_usage(tenant_id, Utc::now());
        let remaining = (plan.executions_per_month - usage.execution_count).max(0);
        Ok(LimitCheck { allowed: usage.execution_count < plan.executions_per_month, remaining })
    }
}
