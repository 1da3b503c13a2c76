//! Blue/green deployment strategy (§4.8 "Blue/Green", P8, scenario 5).

use async_trait::async_trait;
use dashmap::DashMap;
use nebula_core::WorkflowId;
use nebula_error::DeploymentError;
use parking_lot::Mutex;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::strategy::{DeploymentResult, DeploymentStrategy, HealthCheck, Plan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Env {
    A,
    B,
}

impl Env {
    fn other(self) -> Self {
        match self {
            Env::A => Env::B,
            Env::B => Env::A,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct State {
    active_env: Env,
    active_version: u32,
    standby_version: u32,
}

/// Per-workflow active/standby tracking with an atomic swap under a
/// per-workflow lock (§9 "Deployment state maps use per-workflow
/// locking... correctness requires the swap be done under the lock").
pub struct BlueGreenStrategy {
    health: Box<dyn HealthCheck>,
    states: DashMap<WorkflowId, Mutex<State>>,
}

impl BlueGreenStrategy {
    #[must_use]
    pub fn new(health: Box<dyn HealthCheck>) -> Self {
        Self { states: DashMap::new(), health }
    }
}

impl Default for BlueGreenStrategy {
    fn default() -> Self {
        Self::new(Box::new(crate::strategy::AlwaysHealthy))
    }
}

#[async_trait]
impl DeploymentStrategy for BlueGreenStrategy {
    fn name(&self) -> &'static str {
        "blue_green"
    }

    fn validate(&self, _config: &Value) -> Result<(), DeploymentError> {
        Ok(())
    }

    async fn execute(&self, _cancel: CancellationToken, plan: Plan) -> Result<DeploymentResult, DeploymentError> {
        let entry = self
            .states
            .entry(plan.workflow_id)
            .or_insert_with(|| Mutex::new(State { active_env: Env::A, active_version: plan.from_version, standby_version: 0 }));
        let mut state = entry.lock();

        let error_rate = self.health.error_rate(plan.workflow_id, plan.to_version).await;
        if error_rate > 0.0 {
            return Err(DeploymentError::HealthCheckFailed { reason: format!("standby health check reported {error_rate}% errors") });
        }

        let new_active_env = state.active_env.other();
        let new_standby_version = state.active_version;
        state.active_env = new_active_env;
        state.active_version = plan.to_version;
        state.standby_version = new_standby_version;

        let mut result = DeploymentResult::success();
        result.active_version = Some(state.active_version);
        Ok(result)
    }

    async fn rollback(&self, workflow_id: WorkflowId) -> Result<DeploymentResult, DeploymentError> {
        let Some(entry) = self.states.get(&workflow_id) else {
            return Err(DeploymentError::NoPreviousVersion { workflow_id: workflow_id.to_string() });
        };
        let mut state = entry.lock();
        if state.standby_version == 0 {
            return Err(DeploymentError::NoPreviousVersion { workflow_id: workflow_id.to_string() });
        }

        let new_active_env = state.active_env.other();
        let new_active_version = state.standby_version;
        let new_standby_version = state.active_version;
        state.active_env = new_active_env;
        state.active_version = new_active_version;
        state.standby_version = new_standby_version;

        let mut result = DeploymentResult::success();
        result.active_version = Some(state.active_version);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scenario_5_blue_green_sequence() {
        let strategy = BlueGreenStrategy::default();
        let workflow_id = WorkflowId::v4();

        let r1 = strategy
            .execute(CancellationToken::new(), Plan { workflow_id, from_version: 1, to_version: 2, rollback_on_failure: false })
            .await
            .unwrap();
        assert_eq!(r1.active_version, Some(2));
        assert_eq!(strategy.states.get(&workflow_id).unwrap().lock().active_env, Env::B);

        let r2 = strategy
            .execute(CancellationToken::new(), Plan { workflow_id, from_version: 2, to_version: 3, rollback_on_failure: false })
            .await
            .unwrap();
        assert_eq!(r2.active_version, Some(3));
        assert_eq!(strategy.states.get(&workflow_id).unwrap().lock().active_env, Env::A);

        let r3 = strategy.rollback(workflow_id).await.unwrap();
        assert_eq!(r3.active_version, Some(2));
        assert_eq!(strategy.states.get(&workflow_id).unwrap().lock().active_env, Env::B);
    }

    #[tokio::test]
    async fn p8_active_env_toggles_starting_from_a() {
        let strategy = BlueGreenStrategy::default();
        let workflow_id = WorkflowId::v4();

        strategy.execute(CancellationToken::new(), Plan { workflow_id, from_version: 1, to_version: 2, rollback_on_failure: false }).await.unwrap();
        assert_eq!(strategy.states.get(&workflow_id).unwrap().lock().active_env, Env::B);

        strategy.execute(CancellationToken::new(), Plan { workflow_id, from_version: 2, to_version: 3, rollback_on_failure: false }).await.unwrap();
        assert_eq!(strategy.states.get(&workflow_id).unwrap().lock().active_env, Env::A);

        strategy.rollback(workflow_id).await.unwrap();
        assert_eq!(strategy.states.get(&workflow_id).unwrap().lock().active_env, Env::B);
    }

    #[tokio::test]
    async fn rollback_of_a_never_deployed_workflow_fails() {
        let strategy = BlueGreenStrategy::default();
        let workflow_id = WorkflowId::v4();

        let err = strategy.rollback(workflow_id).await.unwrap_err();
        assert!(matches!(err, DeploymentError::NoPreviousVersion { .. }));
    }
}
