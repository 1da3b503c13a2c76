//! Server shell: resolves settings, loads the declarative config, builds
//! the first engine, wires the admin HTTP API and (optionally) the
//! observability reporter, and binds the listener (§6, §9 "Server
//! startup sequence").
//!
//! Grounded on the teacher family's control-plane `main.rs`
//! (`everruns-everruns/crates/control-plane/src/main.rs`): one binary
//! that owns process wiring, with every actual subsystem implemented in
//! a library crate.

use std::sync::Arc;

use anyhow::{Context, Result};
use nebula_billing::TenantUsageMeter;
use nebula_config::{parse_yaml, Flags, Settings};
use nebula_deploy::{BlueGreenStrategy, CanaryStrategy, DeploymentStrategyRegistry, RollingStrategy};
use nebula_engine::{EngineRegistries, Manager, PipelineHandlerFactory, SwappableRecorder};
use nebula_execution::register_builtins;
use nebula_permissions::PermissionService;
use nebula_recorder::ExecutionRecorder;
use nebula_registry::StepRegistry;
use nebula_router::{CrossWorkflowRouter, InMemoryLinkStore};
use nebula_storage::V1Store;
use nebula_telemetry::{Reporter, ReporterConfig};
use tokio_util::sync::CancellationToken;

/// Reads CLI flags from `argv` in `--flag value` form, matching the
/// fields [`Flags`] names (§6 "Command-line flags override env vars").
fn parse_flags(args: impl Iterator<Item = String>) -> Flags {
    let mut flags = Flags::default();
    let mut args = args.peekable();
    while let Some(arg) = args.next() {
        let Some(value) = args.next() else { break };
        match arg.as_str() {
            "--config" => flags.config_path = Some(value),
            "--addr" => flags.addr = Some(value),
            "--data-dir" => flags.data_dir = Some(value),
            "--jwt-secret" => flags.jwt_secret = Some(value),
            "--ai-api-key" => flags.ai_api_key = Some(value),
            "--ai-model" => flags.ai_model = Some(value),
            "--ai-provider" => flags.ai_provider = Some(value),
            "--encryption-key" => flags.encryption_key = Some(value),
            "--admin-url" => flags.admin_url = Some(value),
            "--import-bundle" => flags.import_bundle = Some(value),
            "--admin-ui-dir" => flags.admin_ui_dir = Some(value),
            "--license-key" => flags.license_key = Some(value),
            _ => {}
        }
    }
    flags
}

#[tokio::main]
async fn main() -> Result<()> {
    let _logger_guard = nebula_log::init(&nebula_log::Config::default());

    let flags = parse_flags(std::env::args().skip(1));
    let settings = Settings::resolve(&flags, |key| std::env::var(key).ok());

    tracing::info!(addr = %settings.addr, config_path = %settings.config_path, "starting workflow engine");

    let config_source = std::fs::read_to_string(&settings.config_path).with_context(|| format!("reading config file {}", settings.config_path))?;
    let engine_config = parse_yaml(&config_source).with_context(|| format!("parsing config file {}", settings.config_path))?;

    let steps = Arc::new(StepRegistry::new());
    register_builtins(&steps);
    let recorder_hook = Arc::new(SwappableRecorder::new());

    let registries = Arc::new(EngineRegistries::new());
    registries.workflow_handlers.register("pipeline", Arc::new(PipelineHandlerFactory::new(Arc::clone(&steps), Arc::clone(&recorder_hook))) as _);

    let manager = Arc::new(Manager::new(Arc::clone(&registries)));

    let recorder = Arc::new(ExecutionRecorder::new());
    recorder_hook.rewire(Arc::clone(&recorder) as Arc<dyn nebula_execution::RecorderPort>);

    let store = Arc::new(V1Store::new());
    let meter = Arc::new(TenantUsageMeter::new());
    let permissions = Arc::new(PermissionService::new());

    let deployments = Arc::new(DeploymentStrategyRegistry::new());
    deployments.register(Arc::new(BlueGreenStrategy::default()));
    deployments.register(Arc::new(CanaryStrategy::default()));
    deployments.register(Arc::new(RollingStrategy));

    let link_store = Arc::new(InMemoryLinkStore::new());
    let router = Arc::new(CrossWorkflowRouter::new(link_store));

    manager.start(&engine_config).await.context("starting engine from config")?;

    if let Some(bundle_path) = &settings.import_bundle {
        tracing::info!(path = %bundle_path, "WORKFLOW_IMPORT_BUNDLE set but bundle import at startup is handled by the admin API, not the server shell");
    }

    let jwt_secret = settings.jwt_secret.clone().unwrap_or_else(|| {
        tracing::warn!("no WORKFLOW_JWT_SECRET set; using an insecure development default");
        "development-only-secret".to_owned()
    });

    let api_state = nebula_api::ApiState {
        store,
        recorder: Arc::clone(&recorder),
        meter,
        permissions,
        deployments,
        router,
        manager: Arc::clone(&manager),
        jwt: nebula_api::auth::JwtService::new(&jwt_secret),
        instances: Arc::new(dashmap::DashMap::new()),
    };

    let reporter_cancel = CancellationToken::new();
    if settings.reporter_enabled() {
        let admin_base_url = settings.admin_url.clone().expect("reporter_enabled implies admin_url is set");
        let reporter = Arc::new(Reporter::new(ReporterConfig {
            admin_base_url,
            instance_id: uuid::Uuid::new_v4().to_string(),
            flush_interval: std::time::Duration::from_secs(10),
            heartbeat_interval: std::time::Duration::from_secs(30),
        }));
        reporter.register().await;
        Arc::clone(&reporter).spawn_flush_loop(Arc::clone(&recorder), reporter_cancel.clone());
        Arc::clone(&reporter).spawn_heartbeat_loop(reporter_cancel.clone());
        tracing::info!("observability reporter enabled");
    }

    let app = nebula_api::router(api_state);
    let listener = tokio::net::TcpListener::bind(&settings.addr).await.with_context(|| format!("binding to {}", settings.addr))?;
    tracing::info!(addr = %settings.addr, "admin HTTP API listening");

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown signal received");
    };
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await.context("HTTP server error")?;

    reporter_cancel.cancel();
    manager.stop().await;
    Ok(())
}
