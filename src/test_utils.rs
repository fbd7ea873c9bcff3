#[cfg(test)]
pub mod test_utils {
    use crate::config::{Settings, initialize_app_state};
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use std::path::PathBuf;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    pub const TEST_ORIGIN: &str = "http://dashboard.test";

    /// Scratch directory with `scripts/`, `work/` and `assets/`, removed on drop.
    ///
    /// Scripts are shell scripts run with `sh`, named like the real jobs.
    pub struct TestEnv {
        root: PathBuf,
    }

    impl TestEnv {
        pub fn new() -> Self {
            let root = std::env::temp_dir().join(format!("sectorlens-test-{}", uuid::Uuid::new_v4()));
            for dir in ["scripts", "work", "assets"] {
                std::fs::create_dir_all(root.join(dir)).expect("Failed to create test directory");
            }
            Self { root }
        }

        pub fn scripts_dir(&self) -> PathBuf {
            self.root.join("scripts")
        }

        pub fn work_dir(&self) -> PathBuf {
            self.root.join("work")
        }

        pub fn assets_dir(&self) -> PathBuf {
            self.root.join("assets")
        }

        /// Install a job script.
        pub fn script(&self, name: &str, body: &str) -> &Self {
            std::fs::write(self.scripts_dir().join(name), body).expect("Failed to write script");
            self
        }

        /// Number of job directories left behind.
        pub fn leftover_jobs(&self) -> usize {
            std::fs::read_dir(self.work_dir())
                .map(|entries| entries.count())
                .unwrap_or(0)
        }

        pub fn settings(&self) -> Settings {
            Settings {
                host: "127.0.0.1".to_string(),
                allowed_origin: TEST_ORIGIN.to_string(),
                scripts_dir: self.scripts_dir(),
                work_dir: self.work_dir(),
                assets_dir: self.assets_dir(),
                interpreter: "sh".to_string(),
                job_timeout_secs: 5,
                max_concurrent_jobs: 4,
                keep_job_dirs: false,
                ..Settings::default()
            }
        }
    }

    impl Drop for TestEnv {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.root);
        }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is taken from RUST_LOG, defaulting to WARN.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| level.parse::<Level>().ok())
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create AppState for testing
    pub fn setup_test_app_state(settings: Settings) -> AppState {
        initialize_app_state(settings).expect("Failed to initialize test state")
    }

    /// Create axum app for testing
    pub fn setup_test_app(settings: Settings) -> Router {
        let _guard = init_test_tracing();
        create_router(setup_test_app_state(settings)).expect("Failed to create test router")
    }
}
