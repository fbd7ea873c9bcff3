use anyhow::{Result, bail};
use tracing::{debug, error, info, trace, warn};

use crate::config::Settings;
use crate::jobs;

/// Log the resolved settings and fail if any job script is missing.
pub fn check(settings: &Settings) -> Result<()> {
    trace!("Entering check function");
    info!("Checking SectorLens configuration");
    debug!("Resolved settings: {:?}", settings.redacted());

    info!("Bind address: {}", settings.bind_address());
    info!("Allowed origin: {}", settings.allowed_origin);
    info!("Job timeout: {}s", settings.job_timeout_secs);

    let mut missing = Vec::new();
    for endpoint in jobs::ALL {
        let path = settings.script_path(endpoint.script);
        if endpoint.script_exists(settings) {
            info!("Found {} ({})", endpoint.script, path.display());
        } else {
            error!("Missing {} (expected at {})", endpoint.script, path.display());
            missing.push(endpoint.script);
        }
    }

    if settings.assistant.api_key.is_none() {
        warn!("No assistant API key set; /api/explain will answer 503");
    }

    if !missing.is_empty() {
        bail!("Missing job scripts: {}", missing.join(", "));
    }
    info!("Configuration check passed");
    Ok(())
}
