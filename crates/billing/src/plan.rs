//! Plan catalogue (§3 "Plan").

use serde::{Deserialize, Serialize};

/// `{id, executionsPerMonth (0 = unlimited), maxPipelines,
/// maxStepsPerPipeline, retentionDays, maxWorkers, features}` (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub executions_per_month: i64,
    pub max_pipelines: u32,
    pub max_steps_per_pipeline: u32,
    pub retention_days: u32,
    pub max_workers: u32,
    pub features: Vec<String>,
}

impl Plan {
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.executions_per_month == 0
    }
}

/// Fixed enumeration of plan tiers (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanId {
    Free,
    Starter,
    Professional,
    Enterprise,
}

impl PlanId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PlanId::Free => "free",
            PlanId::Starter => "starter",
            PlanId::Professional => "professional",
            PlanId::Enterprise => "enterprise",
        }
    }
}

impl std::str::FromStr for PlanId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(PlanId::Free),
            "starter" => Ok(PlanId::Starter),
            "professional" => Ok(PlanId::Professional),
            "enterprise" => Ok(PlanId::Enterprise),
            _ => Err(()),
        }
    }
}

/// The fixed plan catalogue (§3: `free.executionsPerMonth=1000`,
/// `enterprise` unlimited). Starter/professional caps are not spelled out
/// by the spec; chosen as a reasonable middle ground between free and
/// enterprise (see the grounding ledger).
#[must_use]
pub fn catalogue() -> Vec<Plan> {
    vec![
        Plan {
            id: PlanId::Free,
            executions_per_month: 1000,
            max_pipelines: 3,
            max_steps_per_pipeline: 10,
            retention_days: 7,
            max_workers: 1,
            features: vec![],
        },
        Plan {
            id: PlanId::Starter,
            executions_per_month: 10_000,
            max_pipelines: 20,
            max_steps_per_pipeline: 25,
            retention_days: 30,
            max_workers: 4,
            features: vec!["webhooks".to_owned()],
        },
        Plan {
            id: PlanId::Professional,
            executions_per_month: 100_000,
            max_pipelines: 200,
            max_steps_per_pipeline: 100,
            retention_days: 90,
            max_workers: 16,
            features: vec!["webhooks".to_owned(), "cross_workflow_routing".to_owned()],
        },
        Plan {
            id: PlanId::Enterprise,
            executions_per_month: 0,
            max_pipelines: 0,
            max_steps_per_pipeline: 0,
            retention_days: 365,
            max_workers: 64,
            features: vec!["webhooks".to_owned(), "cross_workflow_routing".to_owned(), "sso".to_owned()],
        },
    ]
}
