use crate::env;
use crate::error::{RelayError, Result};
use crate::job::{JobOutcome, JobSpec};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, trace, warn};
use uuid::Uuid;

/// Runner configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Program used to execute scripts (e.g. "python"); `None` executes the
    /// script directly
    pub interpreter: Option<String>,
    /// Directory under which per-job directories are created
    pub work_root: PathBuf,
    /// Timeout for jobs that do not set their own
    pub default_timeout: Duration,
    /// Maximum number of jobs running at once; further jobs wait their turn
    pub max_concurrent_jobs: usize,
    /// Leave job directories on disk after completion
    pub keep_job_dirs: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interpreter: Some("python".to_string()),
            work_root: std::env::temp_dir().join("sectorlens-jobs"),
            default_timeout: Duration::from_secs(300),
            max_concurrent_jobs: 4,
            keep_job_dirs: false,
        }
    }
}

/// Executes jobs, one process per call.
#[derive(Debug, Clone)]
pub struct JobRunner {
    config: Arc<RunnerConfig>,
    permits: Arc<Semaphore>,
}

impl JobRunner {
    pub fn new(config: RunnerConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1)));
        Self {
            config: Arc::new(config),
            permits,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run a job to completion and return its output file.
    ///
    /// The job's timeout covers the wait for a free slot as well as the run
    /// itself. Dropping the returned future kills the job's process group and
    /// removes its directory.
    #[instrument(skip(self, spec), fields(job = %spec.name, job_id = tracing::field::Empty))]
    pub async fn run(&self, spec: &JobSpec) -> Result<JobOutcome> {
        let limit = spec.timeout.unwrap_or(self.config.default_timeout);
        let deadline = tokio::time::Instant::now() + limit;

        trace!("Resolving script {}", spec.script.display());
        let script = fs::canonicalize(&spec.script)
            .await
            .map_err(|_| RelayError::ScriptNotFound(spec.script.clone()))?;

        debug!("Waiting for a job slot");
        // The semaphore is never closed, so only the deadline can end the wait.
        let _permit = match tokio::time::timeout_at(deadline, self.permits.acquire()).await {
            Ok(Ok(permit)) => permit,
            _ => {
                warn!("Job {} found no free slot within {:?}", spec.name, limit);
                return Err(RelayError::TimedOut { after: limit });
            }
        };

        let job_id = Uuid::new_v4();
        tracing::Span::current().record("job_id", tracing::field::display(job_id));

        let mut guard = self.prepare_job_dir(&spec.name, job_id).await?;
        debug!("Created job directory {}", guard.dir.display());

        self.run_in(job_id, &mut guard, &script, spec, limit, deadline)
            .await
    }

    async fn prepare_job_dir(&self, name: &str, job_id: Uuid) -> Result<JobGuard> {
        let job_dir = self.config.work_root.join(format!("{}-{}", name, job_id));
        fs::create_dir_all(&job_dir)
            .await
            .map_err(|source| RelayError::Io {
                action: "create job directory",
                path: job_dir.clone(),
                source,
            })?;
        let mut guard = JobGuard {
            dir: job_dir,
            keep: self.config.keep_job_dirs,
            pgid: None,
        };
        // Scripts receive absolute paths regardless of where the server was started.
        guard.dir = fs::canonicalize(&guard.dir)
            .await
            .map_err(|source| RelayError::Io {
                action: "resolve job directory",
                path: guard.dir.clone(),
                source,
            })?;
        Ok(guard)
    }

    async fn run_in(
        &self,
        job_id: Uuid,
        guard: &mut JobGuard,
        script: &Path,
        spec: &JobSpec,
        limit: Duration,
        deadline: tokio::time::Instant,
    ) -> Result<JobOutcome> {
        let job_dir = guard.dir.clone();
        let output_path = job_dir.join(&spec.output_file);
        let mut command = self.command_for(script);
        command
            .current_dir(&job_dir)
            .env(env::JOB_ID, job_id.to_string())
            .env(env::JOB_DIR, &job_dir)
            .env(env::JOB_OUTPUT, &output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(input) = &spec.input {
            let input_path = job_dir.join(&input.file_name);
            trace!("Writing {} bytes of input to {}", input.contents.len(), input_path.display());
            fs::write(&input_path, &input.contents)
                .await
                .map_err(|source| RelayError::Io {
                    action: "write job input",
                    path: input_path.clone(),
                    source,
                })?;
            command.env(env::JOB_INPUT, &input_path);
        }

        let mut command = Command::from(command);
        command.kill_on_drop(true);

        info!("Starting job {} ({}) with timeout {:?}", spec.name, script.display(), limit);
        let started = Instant::now();

        let child = command.spawn().map_err(|source| {
            error!("Failed to start {}: {}", script.display(), source);
            RelayError::Spawn {
                script: script.to_path_buf(),
                source,
            }
        })?;
        guard.pgid = child.id();

        let output = match tokio::time::timeout_at(deadline, child.wait_with_output()).await {
            Ok(waited) => waited.map_err(|source| RelayError::Io {
                action: "wait for job",
                path: script.to_path_buf(),
                source,
            })?,
            Err(_) => {
                // The direct child is killed on drop; the guard takes the rest of its group.
                warn!("Job {} timed out after {:?}", spec.name, limit);
                return Err(RelayError::TimedOut { after: limit });
            }
        };

        let elapsed = started.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        trace!("Job stdout: {}", stdout);

        if !output.status.success() {
            error!(
                "Job {} exited with {} after {:?}: {}",
                spec.name,
                output.status,
                elapsed,
                stderr.trim()
            );
            return Err(RelayError::Failed {
                code: output.status.code(),
                stderr,
            });
        }
        info!("Job {} finished in {:?}", spec.name, elapsed);

        if !fs::try_exists(&output_path).await.unwrap_or(false) {
            error!("Job {} did not produce {}", spec.name, output_path.display());
            return Err(RelayError::MissingOutput {
                file: spec.output_file.clone(),
            });
        }

        let contents = fs::read(&output_path)
            .await
            .map_err(|source| RelayError::Io {
                action: "read job output",
                path: output_path.clone(),
                source,
            })?;
        debug!("Read {} bytes from {}", contents.len(), output_path.display());

        Ok(JobOutcome {
            job_id,
            output_file: spec.output_file.clone(),
            contents,
            stdout,
            stderr,
            elapsed,
        })
    }

    fn command_for(&self, script: &Path) -> std::process::Command {
        let interpreter = self
            .config
            .interpreter
            .as_deref()
            .map(str::trim)
            .filter(|program| !program.is_empty());

        let mut command = match interpreter {
            Some(program) => {
                let mut command = std::process::Command::new(program);
                command.arg(script);
                command
            }
            None => std::process::Command::new(script),
        };

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own process group, so a timeout can take down grandchildren too.
            command.process_group(0);
        }

        command
    }
}

/// Owns a job's directory and process group for the lifetime of one run.
///
/// Dropping it, on completion or when the run is cancelled, kills whatever is
/// left of the process group and removes the directory unless it is kept.
#[derive(Debug)]
struct JobGuard {
    dir: PathBuf,
    keep: bool,
    pgid: Option<u32>,
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        kill_process_group(self.pgid);

        if self.keep {
            debug!("Keeping job directory {}", self.dir.display());
        } else if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            warn!("Failed to remove job directory {}: {}", self.dir.display(), e);
        } else {
            trace!("Removed job directory {}", self.dir.display());
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(pid) = pid else {
        return;
    };
    match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(errno) => warn!("Failed to kill process group {}: {}", pid, errno),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
