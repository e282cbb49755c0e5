use thiserror::Error;

/// Errors raised by the library outside of an individual liveness attempt.
///
/// Probe failures never surface here: they are folded into
/// [`ProbeResult::error`](crate::http_probe::result::ProbeResult).
#[derive(Debug, Error)]
pub enum ReconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid domain name for an output file: {0:?}")]
    InvalidDomain(String),
}

pub type Result<T> = std::result::Result<T, ReconError>;
