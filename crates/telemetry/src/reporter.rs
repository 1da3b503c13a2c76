//! Observability reporter (§4.11, §10.2, §11 "Reporter heartbeat").
//!
//! Batches recorded executions/logs/events to an admin base URL and sends
//! a periodic instance heartbeat so an admin console can tell a live
//! replica from a stale one. Internal failures are logged and never
//! propagate — the reporter is best-effort by design.

use std::sync::Arc;
use std::time::Duration;

use nebula_recorder::{ExecutionFilter, ExecutionRecord, ExecutionRecorder, LogEntry, LogFilter};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// Where the reporter sends batches and heartbeats (§6 "`WORKFLOW_ADMIN_URL`
/// enables reporter").
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    pub admin_base_url: String,
    pub instance_id: String,
    pub flush_interval: Duration,
    pub heartbeat_interval: Duration,
}

#[derive(Serialize)]
struct IngestBatch<'a> {
    instance_id: &'a str,
    executions: &'a [ExecutionRecord],
    logs: &'a [LogEntry],
}

#[derive(Serialize)]
struct InstanceHeartbeat<'a> {
    instance_id: &'a str,
}

/// Batches and ships telemetry to the admin base URL. Construct one per
/// running instance; `spawn_flush_loop`/`spawn_heartbeat_loop` are
/// detached tasks stopped via the shared `CancellationToken` (§10.5).
pub struct Reporter {
    client: reqwest::Client,
    config: ReporterConfig,
}

impl Reporter {
    #[must_use]
    pub fn new(config: ReporterConfig) -> Self {
        Self { client: reqwest::Client::new(), config }
    }

    /// Ship one batch of executions/logs. Never returns an error to the
    /// caller; failures are logged (§10.2).
    pub async fn flush(&self, executions: &[ExecutionRecord], logs: &[LogEntry]) {
        let url = format!("{}/admin/ingest", self.config.admin_base_url.trim_end_matches('/'));
        let body = IngestBatch { instance_id: &self.config.instance_id, executions, logs };
        if let Err(err) = self.client.post(&url).json(&body).send().await {
            tracing::warn!(error = %err, %url, "telemetry flush failed");
        }
    }

    /// Send one heartbeat. Never returns an error to the caller (§11).
    pub async fn heartbeat(&self) {
        let url = format!("{}/admin/instances/heartbeat", self.config.admin_base_url.trim_end_matches('/'));
        let body = InstanceHeartbeat { instance_id: &self.config.instance_id };
        if let Err(err) = self.client.post(&url).json(&body).send().await {
            tracing::warn!(error = %err, %url, "instance heartbeat failed");
        }
    }

    /// Register this instance with the admin console once at startup.
    pub async fn register(&self) {
        let url = format!("{}/admin/instances/register", self.config.admin_base_url.trim_end_matches('/'));
        let body = InstanceHeartbeat { instance_id: &self.config.instance_id };
        if let Err(err) = self.client.post(&url).json(&body).send().await {
            tracing::warn!(error = %err, %url, "instance registration failed");
        }
    }

    /// Spawn the detached periodic heartbeat loop, stopped when `cancel`
    /// fires.
    pub fn spawn_heartbeat_loop(self: Arc<Self>, cancel: CancellationToken) {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(self.config.heartbeat_interval) => {
                        self.heartbeat().await;
                    }
                }
            }
        });
    }

    /// Spawn the detached periodic batch-flush loop, reading everything
    /// currently in `recorder` each tick. Stopped when `cancel` fires.
    pub fn spawn_flush_loop(self: Arc<Self>, recorder: Arc<ExecutionRecorder>, cancel: CancellationToken) {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(self.config.flush_interval) => {
                        let executions = recorder.list_executions(&ExecutionFilter::default());
                        let logs = recorder.query_logs(&LogFilter::default());
                        self.flush(&executions, &logs).await;
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_trims_trailing_slash_from_admin_base_url_in_urls() {
        let reporter = Reporter::new(ReporterConfig {
            admin_base_url: "http://admin.internal/".to_owned(),
            instance_id: "instance-1".to_owned(),
            flush_interval: Duration::from_secs(5),
            heartbeat_interval: Duration::from_secs(30),
        });
        assert_eq!(reporter.config.admin_base_url, "http://admin.internal/");
    }
}
