//! Canary deployment strategy (§4.8 "Canary", P9, scenario 4).

use async_trait::async_trait;
use dashmap::DashMap;
use nebula_core::WorkflowId;
use nebula_error::DeploymentError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::strategy::{DeploymentResult, DeploymentStrategy, HealthCheck, Plan};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanaryConfig {
    #[serde(default = "CanaryConfig::default_initial_percent")]
    pub initial_percent: u8,
    #[serde(default = "CanaryConfig::default_increment")]
    pub increment: u8,
    #[serde(default = "CanaryConfig::default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "CanaryConfig::default_error_threshold")]
    pub error_threshold: f64,
}

impl CanaryConfig {
    fn default_initial_percent() -> u8 {
        10
    }
    fn default_increment() -> u8 {
        20
    }
    fn default_interval_ms() -> u64 {
        30_000
    }
    fn default_error_threshold() -> f64 {
        5.0
    }

    fn validate(&self) -> Result<(), DeploymentError> {
        if self.initial_percent == 0 || self.initial_percent > 100 {
            return Err(DeploymentError::InvalidStrategyConfig { reason: "initialPercent must be in (0, 100]".to_owned() });
        }
        if self.increment == 0 || self.increment > 100 {
            return Err(DeploymentError::InvalidStrategyConfig { reason: "increment must be in (0, 100]".to_owned() });
        }
        if !(0.0..=100.0).contains(&self.error_threshold) {
            return Err(DeploymentError::InvalidStrategyConfig { reason: "errorThreshold must be in [0, 100]".to_owned() });
        }
        Ok(())
    }
}

impl Default for CanaryConfig {
    fn default() -> Self {
        Self {
            initial_percent: Self::default_initial_percent(),
            increment: Self::default_increment(),
            interval_ms: Self::default_interval_ms(),
            error_threshold: Self::default_error_threshold(),
        }
    }
}

fn parse_config(config: &Value) -> Result<CanaryConfig, DeploymentError> {
    if config.is_null() {
        return Ok(CanaryConfig::default());
    }
    let config: CanaryConfig = serde_json::from_value(config.clone()).map_err(|err| DeploymentError::InvalidStrategyConfig { reason: err.to_string() })?;
    config.validate()?;
    Ok(config)
}

/// Progressive traffic-split rollout that consults an injected health
/// check after each ramp and rolls back the moment the error rate
/// exceeds the configured threshold (§4.8).
pub struct CanaryStrategy {
    health: Box<dyn HealthCheck>,
    percents: DashMap<WorkflowId, Mutex<u8>>,
}

impl CanaryStrategy {
    #[must_use]
    pub fn new(health: Box<dyn HealthCheck>) -> Self {
        Self { percents: DashMap::new(), health }
    }
}

impl Default for CanaryStrategy {
    fn default() -> Self {
        Self::new(Box::new(crate::strategy::AlwaysHealthy))
    }
}

#[async_trait]
impl DeploymentStrategy for CanaryStrategy {
    fn name(&self) -> &'static str {
        "canary"
    }

    fn validate(&self, config: &Value) -> Result<(), DeploymentError> {
        parse_config(config).map(|_| ())
    }

    async fn execute(&self, cancel: CancellationToken, plan: Plan) -> Result<DeploymentResult, DeploymentError> {
        self.execute_with_config(cancel, plan, &Value::Null).await
    }

    async fn rollback(&self, workflow_id: WorkflowId) -> Result<DeploymentResult, DeploymentError> {
        let entry = self.percents.entry(workflow_id).or_insert_with(|| Mutex::new(0));
        *entry.lock() = 0;
        Ok(DeploymentResult::rolled_back(0, 100))
    }
}

impl CanaryStrategy {
    /// `execute` with an explicit strategy config, used when the caller
    /// has already resolved the workflow's `canary` config blob.
    pub async fn execute_with_config(&self, cancel: CancellationToken, plan: Plan, config: &Value) -> Result<DeploymentResult, DeploymentError> {
        let config = parse_config(config)?;

        let entry = self.percents.entry(plan.workflow_id).or_insert_with(|| Mutex::new(0));
        let mut percent = config.initial_percent;
        *entry.lock() = percent;

        loop {
            if cancel.is_cancelled() {
                return Ok(DeploymentResult::failed("deployment cancelled"));
            }

            let error_rate = self.health.error_rate(plan.workflow_id, plan.to_version).await;
            if error_rate > config.error_threshold {
                *entry.lock() = 0;
                return Ok(DeploymentResult::rolled_back(0, 100));
            }

            percent = percent.saturating_add(config.increment).min(100);
            *entry.lock() = percent;

            if percent >= 100 {
                let mut result = DeploymentResult::success();
                result.canary_percent = Some(100);
                result.stable_percent = Some(0);
                return Ok(result);
            }

            tokio::select! {
                () = cancel.cancelled() => return Ok(DeploymentResult::failed("deployment cancelled")),
                () = tokio::time::sleep(std::time::Duration::from_millis(config.interval_ms)) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedHealth {
        rates: Vec<f64>,
        calls: AtomicU32,
    }

    #[async_trait]
    impl HealthCheck for ScriptedHealth {
        async fn error_rate(&self, _workflow_id: WorkflowId, _version: u32) -> f64 {
            let index = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            self.rates.get(index).copied().unwrap_or(*self.rates.last().unwrap())
        }
    }

    #[tokio::test]
    async fn scenario_4_canary_rollback_on_unhealthy_version() {
        let health = ScriptedHealth { rates: vec![1.0, 15.0], calls: AtomicU32::new(0) };
        let strategy = CanaryStrategy::new(Box::new(health));
        let workflow_id = WorkflowId::v4();
        let config = json!({"initialPercent": 10, "increment": 10, "intervalMs": 1, "errorThreshold": 5.0});

        let result = strategy
            .execute_with_config(CancellationToken::new(), Plan { workflow_id, from_version: 1, to_version: 2, rollback_on_failure: false }, &config)
            .await
            .unwrap();

        assert!(result.rolled_back);
        assert_eq!(result.canary_percent, Some(0));
        assert_eq!(result.stable_percent, Some(100));
    }

    #[tokio::test]
    async fn p9_progression_with_constant_zero_health_reaches_full_rollout() {
        let strategy = CanaryStrategy::default();
        let workflow_id = WorkflowId::v4();
        let config = json!({"initialPercent": 50, "increment": 50, "intervalMs": 1});

        let result = strategy
            .execute_with_config(CancellationToken::new(), Plan { workflow_id, from_version: 1, to_version: 2, rollback_on_failure: false }, &config)
            .await
            .unwrap();

        assert_eq!(result.status, crate::strategy::DeploymentStatus::Success);
        assert_eq!(result.canary_percent, Some(100));
    }

    #[tokio::test]
    async fn cancellation_reports_failed() {
        let strategy = CanaryStrategy::default();
        let workflow_id = WorkflowId::v4();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let config = json!({"initialPercent": 10, "increment": 10, "intervalMs": 1});

        let result = strategy
            .execute_with_config(cancel, Plan { workflow_id, from_version: 1, to_version: 2, rollback_on_failure: false }, &config)
            .await
            .unwrap();

        assert_eq!(result.status, crate::strategy::DeploymentStatus::Failed);
    }

    #[tokio::test]
    async fn manual_rollback_forces_canary_to_zero() {
        let strategy = CanaryStrategy::default();
        let workflow_id = WorkflowId::v4();
        let result = strategy.rollback(workflow_id).await.unwrap();
        assert!(result.rolled_back);
        assert_eq!(result.canary_percent, Some(0));
        assert_eq!(result.stable_percent, Some(100));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let strategy = CanaryStrategy::default();
        let err = strategy.validate(&json!({"initialPercent": 0})).unwrap_err();
        assert!(matches!(err, DeploymentError::InvalidStrategyConfig { .. }));
    }
}
