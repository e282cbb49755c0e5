use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header::SERVER, redirect::Policy};
use thiserror::Error;

use crate::config::probe_config::ProbeSettings;

use super::report;

/// What a liveness attempt learned from a host that answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivenessResponse {
    pub status: u16,
    pub server: Option<String>,
    /// URL after redirects were followed.
    pub final_url: String,
}

/// A failed liveness attempt. The display form is the bare failure message,
/// which ends up verbatim in `ProbeResult::error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Connect(String),

    #[error("{0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let message = report(&err);
        if err.is_timeout() {
            TransportError::Timeout(message)
        } else if err.is_connect() {
            TransportError::Connect(message)
        } else {
            TransportError::Request(message)
        }
    }
}

/// Hands out one [`Session`] per probed host.
///
/// Both attempts against a host go through the same session, so a pooled
/// client may be shared between them, but never between hosts.
pub trait Transport: Send + Sync + 'static {
    type Session: Session;

    fn session(&self) -> Result<Self::Session, TransportError>;
}

#[async_trait]
pub trait Session: Send + Sync {
    /// Issue a HEAD request, following redirects.
    async fn head(&self, url: &str) -> Result<LivenessResponse, TransportError>;
}

/// reqwest backed transport used outside of tests.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    timeout: Duration,
    user_agent: String,
    max_redirects: usize,
    accept_invalid_certs: bool,
}

impl ReqwestTransport {
    pub fn new(settings: &ProbeSettings) -> Self {
        Self {
            timeout: settings.timeout(),
            user_agent: settings.user_agent.clone(),
            max_redirects: settings.max_redirects,
            accept_invalid_certs: settings.accept_invalid_certs,
        }
    }
}

impl Transport for ReqwestTransport {
    type Session = ReqwestSession;

    fn session(&self) -> Result<ReqwestSession, TransportError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .redirect(Policy::limited(self.max_redirects))
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()?;
        Ok(ReqwestSession { client })
    }
}

pub struct ReqwestSession {
    client: Client,
}

#[async_trait]
impl Session for ReqwestSession {
    async fn head(&self, url: &str) -> Result<LivenessResponse, TransportError> {
        let response = self.client.head(url).send().await?;

        let server = response
            .headers()
            .get(SERVER)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        Ok(LivenessResponse {
            status: response.status().as_u16(),
            server,
            final_url: response.url().to_string(),
        })
    }
}
