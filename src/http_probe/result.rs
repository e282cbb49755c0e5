use serde::{Deserialize, Serialize};

/// Outcome of probing a single host.
///
/// A host is alive when `status_code` is set; any HTTP status counts, including
/// 4xx/5xx responses. A dead host has no `status_code` and carries the message of
/// its last failed attempt in `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub host: String,
    /// URLs attempted, in the order they were tried.
    #[serde(default)]
    pub tried: Vec<String>,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub final_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ProbeResult {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            tried: Vec::new(),
            status_code: None,
            server: None,
            final_url: None,
            error: None,
        }
    }

    /// A result for a host whose probe could not run to completion.
    pub fn degraded(host: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(host)
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status_code.is_some()
    }
}

/// One result per probed host, in the order the hosts were supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbeResultSet {
    results: Vec<ProbeResult>,
}

impl ProbeResultSet {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProbeResult> {
        self.results.iter()
    }

    /// First result recorded for `host`. Duplicate input hosts yield several
    /// results; use [`iter`](Self::iter) to see all of them.
    pub fn get(&self, host: &str) -> Option<&ProbeResult> {
        self.results.iter().find(|r| r.host == host)
    }

    pub fn alive(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|r| r.is_alive())
    }

    pub fn dead(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|r| !r.is_alive())
    }

    pub fn into_vec(self) -> Vec<ProbeResult> {
        self.results
    }
}

impl From<Vec<ProbeResult>> for ProbeResultSet {
    fn from(results: Vec<ProbeResult>) -> Self {
        Self { results }
    }
}

impl FromIterator<ProbeResult> for ProbeResultSet {
    fn from_iter<I: IntoIterator<Item = ProbeResult>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ProbeResultSet {
    type Item = ProbeResult;
    type IntoIter = std::vec::IntoIter<ProbeResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a ProbeResultSet {
    type Item = &'a ProbeResult;
    type IntoIter = std::slice::Iter<'a, ProbeResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_absent_fields_as_null() {
        let result = ProbeResult::degraded("b.example", "connection refused");
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "host": "b.example",
                "tried": [],
                "status_code": null,
                "server": null,
                "final_url": null,
                "error": "connection refused",
            })
        );
    }

    #[test]
    fn test_result_set_is_a_plain_array() {
        let mut alive = ProbeResult::new("a.example");
        alive.tried.push("https://a.example".to_string());
        alive.status_code = Some(200);
        alive.final_url = Some("https://a.example/".to_string());

        let set = ProbeResultSet::from(vec![alive, ProbeResult::degraded("b.example", "boom")]);
        let json = serde_json::to_string(&set).expect("serialize");
        assert!(json.starts_with('['));

        let back: ProbeResultSet = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, set);
        assert_eq!(back.alive().count(), 1);
        assert_eq!(back.dead().count(), 1);
        assert_eq!(back.get("a.example").and_then(|r| r.status_code), Some(200));
        assert!(back.get("c.example").is_none());
    }

    #[test]
    fn test_sparse_records_deserialize() {
        // Records written for hosts whose probe crashed carry only host and error.
        let result: ProbeResult =
            serde_json::from_str(r#"{"host":"x.example","error":"worker crashed"}"#)
                .expect("deserialize");
        assert!(result.tried.is_empty());
        assert!(!result.is_alive());
        assert_eq!(result.error.as_deref(), Some("worker crashed"));
    }
}
