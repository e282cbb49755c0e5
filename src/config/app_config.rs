use std::env;
use std::path::{Path, PathBuf};

use crate::error::{ReconError, Result};

use super::probe_config::{CrtShSettings, FileConfig, ProbeSettings};

pub const DEFAULT_CONFIG_FILE: &str = "bbt.yml";

pub struct AppConfig {
    pub output_dir: PathBuf,
    pub probe: ProbeSettings,
    pub crtsh: CrtShSettings,
}

/// Load the application configuration from a YAML file and environment variables.
/// This function reads the configuration file specified by the `CONFIG_FILE` environment variable
/// (`bbt.yml` when unset), parses it into a `FileConfig` and overrides certain values with
/// environment variables. A `.env` file in the working directory is honoured.
/// A missing configuration file is not an error; the defaults are used instead.
pub fn load_config() -> Result<AppConfig> {
    let _ = dotenvy::dotenv();

    let config_file_location =
        env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

    load_config_from(Path::new(&config_file_location), |key| env::var(key).ok())
}

/// Same as [`load_config`], with the file location and the environment lookup supplied by the caller.
pub fn load_config_from<F>(config_file: &Path, lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let file_config = if config_file.exists() {
        let config_str = std::fs::read_to_string(config_file)?;
        log::info!("Loaded config from {}", config_file.display());
        serde_yaml::from_str::<FileConfig>(&config_str)?
    } else {
        log::debug!("No config file at {}, using defaults", config_file.display());
        FileConfig::default()
    };

    let mut output_dir = file_config.output_dir;
    let mut probe = file_config.probe;
    let mut crtsh = file_config.crtsh;

    if let Some(dir) = lookup("BBT_OUTPUT_DIR") {
        output_dir = dir;
    }
    if let Some(workers) = lookup("BBT_MAX_WORKERS") {
        probe.max_workers = workers.trim().parse().map_err(|_| {
            ReconError::Config(format!("BBT_MAX_WORKERS is not a number: {workers}"))
        })?;
    }
    if let Some(prefer_http) = lookup("BBT_PREFER_HTTP") {
        probe.prefer_http = parse_flag(&prefer_http).ok_or_else(|| {
            ReconError::Config(format!("BBT_PREFER_HTTP is not a boolean: {prefer_http}"))
        })?;
    }
    if let Some(user_agent) = lookup("BBT_USER_AGENT") {
        probe.user_agent = user_agent;
    }
    if let Some(crtsh_url) = lookup("CRTSH_URL") {
        crtsh.base_url = crtsh_url;
    }

    log::debug!(
        "Probe settings: {} workers, prefer_http={}, timeout={}s",
        probe.max_workers,
        probe.prefer_http,
        probe.timeout_seconds
    );

    Ok(AppConfig {
        output_dir: PathBuf::from(output_dir),
        probe: probe.normalized(),
        crtsh,
    })
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
