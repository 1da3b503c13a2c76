//! Environment / flag precedence (§6 "Environment variables").
//!
//! Precedence: command-line flags > environment variables > built-in
//! defaults. [`Settings::resolve`] applies that order field by field.

/// Where a [`Settings`] value came from, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvSource {
    Flag,
    Env,
    Default,
}

/// Process-wide settings assembled from CLI flags, `WORKFLOW_*` env vars,
/// and built-in defaults (§6).
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: String,
    pub addr: String,
    pub data_dir: String,
    pub jwt_secret: Option<String>,
    pub ai_api_key: Option<String>,
    pub ai_model: Option<String>,
    pub ai_provider: Option<String>,
    pub encryption_key: Option<String>,
    pub admin_url: Option<String>,
    pub import_bundle: Option<String>,
    pub admin_ui_dir: Option<String>,
    pub license_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_path: "workflow.yaml".to_owned(),
            addr: "0.0.0.0:8080".to_owned(),
            data_dir: "./data".to_owned(),
            jwt_secret: None,
            ai_api_key: None,
            ai_model: None,
            ai_provider: None,
            encryption_key: None,
            admin_url: None,
            import_bundle: None,
            admin_ui_dir: None,
            license_key: None,
        }
    }
}

impl Settings {
    /// Resolve settings from CLI flags and an environment lookup function,
    /// falling back to defaults. `flags` and `env` both return `None` for
    /// keys they don't carry; `env` is a closure so tests can stub it
    /// instead of mutating the real process environment.
    pub fn resolve(flags: &Flags, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let pick = |flag: Option<&String>, key: &str, default: String| -> String {
            flag.cloned()
                .or_else(|| env(key))
                .unwrap_or(default)
        };
        let pick_opt = |flag: Option<&String>, key: &str| -> Option<String> {
            flag.cloned().or_else(|| env(key))
        };

        Self {
            config_path: pick(flags.config_path.as_ref(), "WORKFLOW_CONFIG", defaults.config_path),
            addr: pick(flags.addr.as_ref(), "WORKFLOW_ADDR", defaults.addr),
            data_dir: pick(flags.data_dir.as_ref(), "WORKFLOW_DATA_DIR", defaults.data_dir),
            jwt_secret: pick_opt(flags.jwt_secret.as_ref(), "WORKFLOW_JWT_SECRET"),
            ai_api_key: pick_opt(flags.ai_api_key.as_ref(), "WORKFLOW_AI_API_KEY"),
            ai_model: pick_opt(flags.ai_model.as_ref(), "WORKFLOW_AI_MODEL"),
            ai_provider: pick_opt(flags.ai_provider.as_ref(), "WORKFLOW_AI_PROVIDER"),
            encryption_key: pick_opt(flags.encryption_key.as_ref(), "WORKFLOW_ENCRYPTION_KEY"),
            admin_url: pick_opt(flags.admin_url.as_ref(), "WORKFLOW_ADMIN_URL"),
            import_bundle: pick_opt(flags.import_bundle.as_ref(), "WORKFLOW_IMPORT_BUNDLE"),
            admin_ui_dir: pick_opt(flags.admin_ui_dir.as_ref(), "ADMIN_UI_DIR"),
            license_key: pick_opt(flags.license_key.as_ref(), "WORKFLOW_LICENSE_KEY"),
        }
    }

    /// Whether the observability reporter should be enabled (§4.11).
    #[must_use]
    pub fn reporter_enabled(&self) -> bool {
        self.admin_url.is_some()
    }
}

/// Command-line flags, parsed by the CLI binary. Every field overrides the
/// corresponding environment variable when set.
#[derive(Debug, Clone, Default)]
pub struct Flags {
    pub config_path: Option<String>,
    pub addr: Option<String>,
    pub data_dir: Option<String>,
    pub jwt_secret: Option<String>,
    pub ai_api_key: Option<String>,
    pub ai_model: Option<String>,
    pub ai_provider: Option<String>,
    pub encryption_key: Option<String>,
    pub admin_url: Option<String>,
    pub import_bundle: Option<String>,
    pub admin_ui_dir: Option<String>,
    pub license_key: Option<String>,
}
