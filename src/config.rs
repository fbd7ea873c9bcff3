use anyhow::Result;
use relay::{JobRunner, RunnerConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, trace, warn};

use crate::assistant::AssistantClient;
use crate::schemas::AppState;

/// Default port, overridable with `PORT` as well as `SECTORLENS_PORT`.
pub const DEFAULT_PORT: u16 = 5000;

/// Application settings.
///
/// Sources, lowest precedence first: built-in defaults, an optional TOML
/// file, `SECTORLENS_*` environment variables (nested keys use `__`, e.g.
/// `SECTORLENS_ASSISTANT__API_KEY`), then command line flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// The single origin allowed to make cross-origin requests
    pub allowed_origin: String,
    /// Directory holding the job scripts
    pub scripts_dir: PathBuf,
    /// Root of the per-request job directories
    pub work_dir: PathBuf,
    /// Where generated images are published (served under /assets)
    pub assets_dir: PathBuf,
    /// Program used to run scripts; empty runs them directly
    pub interpreter: String,
    pub job_timeout_secs: u64,
    pub max_concurrent_jobs: usize,
    pub keep_job_dirs: bool,
    pub assistant: AssistantSettings,
}

/// Chat-completion API used for event explanations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    pub endpoint: String,
    pub model: String,
    /// Explanations are disabled while this is unset
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        Self {
            host: "0.0.0.0".to_string(),
            port,
            allowed_origin: "http://localhost:3000".to_string(),
            scripts_dir: PathBuf::from("scripts"),
            work_dir: std::env::temp_dir().join("sectorlens-jobs"),
            assets_dir: PathBuf::from("assets"),
            interpreter: "python".to_string(),
            job_timeout_secs: 300,
            max_concurrent_jobs: 4,
            keep_job_dirs: false,
            assistant: AssistantSettings::default(),
        }
    }
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.asi1.ai/v1/chat/completions".to_string(),
            model: "asi1-mini".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl Settings {
    /// Load settings from defaults, the optional file and the environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        trace!("Loading settings");

        let defaults = config::Config::try_from(&Settings::default())?;
        let file = match config_file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("sectorlens").required(false),
        };
        let settings: Settings = config::Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("SECTORLENS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        debug!("Settings loaded: {:?}", settings.redacted());
        Ok(settings)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }

    pub fn script_path(&self, script: &str) -> PathBuf {
        self.scripts_dir.join(script)
    }

    pub fn runner_config(&self) -> RunnerConfig {
        let interpreter = self.interpreter.trim();
        RunnerConfig {
            interpreter: (!interpreter.is_empty()).then(|| interpreter.to_string()),
            work_root: self.work_dir.clone(),
            default_timeout: self.job_timeout(),
            max_concurrent_jobs: self.max_concurrent_jobs,
            keep_job_dirs: self.keep_job_dirs,
        }
    }

    /// Copy safe to log.
    pub fn redacted(&self) -> Settings {
        let mut settings = self.clone();
        if settings.assistant.api_key.is_some() {
            settings.assistant.api_key = Some("***".to_string());
        }
        settings
    }
}

/// Initialize application state from settings
pub fn initialize_app_state(settings: Settings) -> Result<AppState> {
    info!("Scripts directory: {}", settings.scripts_dir.display());
    info!("Job directories under: {}", settings.work_dir.display());

    let runner = JobRunner::new(settings.runner_config());

    let assistant = AssistantClient::from_settings(&settings.assistant)?;
    if assistant.is_none() {
        warn!("No assistant API key configured; event explanations are disabled");
    }

    Ok(AppState {
        settings: Arc::new(settings),
        runner,
        assistant,
        latest_result: Arc::new(RwLock::new(None)),
    })
}
