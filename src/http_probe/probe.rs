use tokio::time::timeout;

use crate::config::probe_config::ProbeSettings;

use super::result::ProbeResult;
use super::transport::{Session, Transport, TransportError};

/// The URLs tried for `host`, in attempt order.
pub fn candidate_urls(host: &str, prefer_http: bool) -> [String; 2] {
    let https = format!("https://{host}");
    let http = format!("http://{host}");
    if prefer_http { [http, https] } else { [https, http] }
}

/// Probe one host over a fresh session from `transport`.
///
/// Never fails: a session that cannot be created yields a degraded result with
/// nothing in `tried`.
pub async fn check_host<T: Transport + ?Sized>(
    transport: &T,
    host: &str,
    settings: &ProbeSettings,
) -> ProbeResult {
    match transport.session() {
        Ok(session) => probe_host(&session, host, settings).await,
        Err(e) => {
            log::warn!("Could not open a session for {host}: {e}");
            ProbeResult::degraded(host, e.to_string())
        }
    }
}

/// Try each candidate URL in turn and stop at the first one that answers.
///
/// Any HTTP status counts as an answer. Transport failures, including the
/// per-attempt timeout, move on to the next candidate; when every candidate
/// fails the last failure message is kept in `error`.
pub async fn probe_host<S: Session + ?Sized>(
    session: &S,
    host: &str,
    settings: &ProbeSettings,
) -> ProbeResult {
    let mut result = ProbeResult::new(host);
    let limit = settings.timeout();

    for url in candidate_urls(host, settings.prefer_http) {
        result.tried.push(url.clone());

        let attempt = match timeout(limit, session.head(&url)).await {
            Ok(attempt) => attempt,
            Err(_) => Err(TransportError::Timeout(format!(
                "request to {url} timed out after {}s",
                limit.as_secs()
            ))),
        };

        match attempt {
            Ok(response) => {
                log::debug!("{url} answered with {}", response.status);
                result.status_code = Some(response.status);
                result.server = response.server;
                result.final_url = Some(response.final_url);
                result.error = None;
                return result;
            }
            Err(e) => {
                log::debug!("{url} failed: {e}");
                result.error = Some(e.to_string());
            }
        }
    }

    result
}
