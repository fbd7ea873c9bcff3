use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Settings;

pub mod commands;

use commands::{check, serve};

#[derive(Parser)]
#[command(name = "sectorlens")]
#[command(about = "Portfolio sector-risk analysis server")]
#[command(version)]
pub struct Cli {
    /// Settings file (TOML); `sectorlens.toml` is read when present
    #[arg(short, long, global = true, env = "SECTORLENS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve(Overrides),
    /// Report the resolved settings and which job scripts are present
    Check(Overrides),
}

/// Command line overrides of the loaded settings.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// Interface to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory holding the job scripts
    #[arg(short, long)]
    pub scripts_dir: Option<PathBuf>,

    /// Origin allowed to call the API from a browser
    ///
    /// Example: https://dashboard.example.com
    #[arg(long)]
    pub allowed_origin: Option<String>,

    /// Job timeout in seconds
    #[arg(long)]
    pub job_timeout: Option<u64>,

    /// Keep job directories after completion, for debugging scripts
    #[arg(long)]
    pub keep_job_dirs: bool,
}

impl Overrides {
    pub fn apply(self, mut settings: Settings) -> Settings {
        if let Some(host) = self.host {
            settings.host = host;
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(scripts_dir) = self.scripts_dir {
            settings.scripts_dir = scripts_dir;
        }
        if let Some(allowed_origin) = self.allowed_origin {
            settings.allowed_origin = allowed_origin;
        }
        if let Some(job_timeout) = self.job_timeout {
            settings.job_timeout_secs = job_timeout;
        }
        if self.keep_job_dirs {
            settings.keep_job_dirs = true;
        }
        settings
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let settings = Settings::load(self.config.as_deref())?;
        match self.command {
            Commands::Serve(overrides) => {
                serve(overrides.apply(settings)).await?;
            }
            Commands::Check(overrides) => {
                check(&overrides.apply(settings))?;
            }
        }
        Ok(())
    }
}
