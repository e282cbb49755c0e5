use std::collections::BTreeSet;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::config::probe_config::CrtShSettings;
use crate::error::Result;

/// The only part of a crt.sh record we care about.
#[derive(Debug, Deserialize)]
pub struct CrtShEntry {
    #[serde(default)]
    pub name_value: Option<String>,
}

/// Build the HTTP client used for certificate transparency queries.
pub fn crtsh_client(settings: &CrtShSettings, user_agent: &str) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(settings.timeout_seconds))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// `{base}?q=%.{domain}&output=json`, with the query properly encoded.
pub fn crtsh_query_url(base_url: &str, domain: &str) -> Result<Url> {
    let query = format!("%.{domain}");
    let url = Url::parse_with_params(base_url, &[("q", query.as_str()), ("output", "json")])?;
    Ok(url)
}

/// Query crt.sh for certificates issued under `domain` and return the
/// subdomains named in them.
///
/// This is passive reconnaissance only: a single request against public
/// records. A non-200 answer is logged and yields an empty set; transport and
/// decoding failures are returned to the caller.
pub async fn fetch_crtsh_subdomains(
    client: &Client,
    settings: &CrtShSettings,
    domain: &str,
) -> Result<BTreeSet<String>> {
    let url = crtsh_query_url(&settings.base_url, domain)?;
    log::info!("Querying crt.sh for domain: {domain}");

    let response = client.get(url).send().await?;
    if response.status() != StatusCode::OK {
        log::warn!("crt.sh returned status {}", response.status());
        return Ok(BTreeSet::new());
    }

    let entries: Vec<CrtShEntry> = response.json().await?;
    let subdomains = extract_subdomains(&entries, domain);
    log::info!("crt.sh returned {} entries, {} unique names", entries.len(), subdomains.len());

    if settings.pause_millis > 0 {
        tokio::time::sleep(Duration::from_millis(settings.pause_millis)).await;
    }

    Ok(subdomains)
}

/// Collect the names under `domain` from crt.sh records.
///
/// `name_value` may hold several newline separated names. Wildcards are
/// skipped and names are lowercased.
pub fn extract_subdomains(entries: &[CrtShEntry], domain: &str) -> BTreeSet<String> {
    let domain = domain.trim().to_lowercase();
    let suffix = format!(".{domain}");

    entries
        .iter()
        .filter_map(|entry| entry.name_value.as_deref())
        .flat_map(str::lines)
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.contains('*'))
        .filter(|name| *name == domain || name.ends_with(&suffix))
        .collect()
}
