//! Rolling deployment strategy (§4.8 "Rolling").

use async_trait::async_trait;
use nebula_core::WorkflowId;
use nebula_error::DeploymentError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::strategy::{DeploymentResult, DeploymentStrategy, Plan};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingConfig {
    #[serde(default = "RollingConfig::default_batch_size")]
    pub batch_size: u32,
    #[serde(default = "RollingConfig::default_delay_ms")]
    pub delay_ms: u64,
    pub instances: Option<u32>,
}

impl RollingConfig {
    fn default_batch_size() -> u32 {
        1
    }
    fn default_delay_ms() -> u64 {
        5_000
    }

    fn instances_or_default(&self) -> u32 {
        self.instances.unwrap_or(self.batch_size * 3)
    }

    fn validate(&self) -> Result<(), DeploymentError> {
        if self.batch_size == 0 {
            return Err(DeploymentError::InvalidStrategyConfig { reason: "batchSize must be at least 1".to_owned() });
        }
        Ok(())
    }
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self { batch_size: Self::default_batch_size(), delay_ms: Self::default_delay_ms(), instances: None }
    }
}

fn parse_config(config: &Value) -> Result<RollingConfig, DeploymentError> {
    if config.is_null() {
        return Ok(RollingConfig::default());
    }
    let config: RollingConfig = serde_json::from_value(config.clone()).map_err(|err| DeploymentError::InvalidStrategyConfig { reason: err.to_string() })?;
    config.validate()?;
    Ok(config)
}

/// Updates instances in fixed-size batches with a delay between batches
/// (never after the last one), failing outright on cancellation mid-batch
/// (§4.8).
#[derive(Default)]
pub struct RollingStrategy;

#[async_trait]
impl DeploymentStrategy for RollingStrategy {
    fn name(&self) -> &'static str {
        "rolling"
    }

    fn validate(&self, config: &Value) -> Result<(), DeploymentError> {
        parse_config(config).map(|_| ())
    }

    async fn execute(&self, cancel: CancellationToken, plan: Plan) -> Result<DeploymentResult, DeploymentError> {
        self.execute_with_config(cancel, plan, &Value::Null).await
    }

    async fn rollback(&self, workflow_id: WorkflowId) -> Result<DeploymentResult, DeploymentError> {
        Err(DeploymentError::NoPreviousVersion { workflow_id: workflow_id.to_string() })
    }
}

impl RollingStrategy {
    pub async fn execute_with_config(&self, cancel: CancellationToken, _plan: Plan, config: &Value) -> Result<DeploymentResult, DeploymentError> {
        let config = parse_config(config)?;
        let instances = config.instances_or_default();
        let mut updated = 0u32;

        while updated < instances {
            if cancel.is_cancelled() {
                return Ok(DeploymentResult::failed("deployment cancelled"));
            }

            updated = (updated + config.batch_size).min(instances);

            if updated < instances {
                tokio::select! {
                    () = cancel.cancelled() => return Ok(DeploymentResult::failed("deployment cancelled")),
                    () = tokio::time::sleep(std::time::Duration::from_millis(config.delay_ms)) => {}
                }
            }
        }

        Ok(DeploymentResult::success())
    }
}
