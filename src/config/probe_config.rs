use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_AGENT: &str = "bbt-livecheck/0.1 (ethical; authorized testing only)";

/// The file-level configuration of the toolkit, as read from YAML.
/// Every section is optional; missing values fall back to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    /// Directory scope and live-check files are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default)]
    pub probe: ProbeSettings,

    #[serde(default)]
    pub crtsh: CrtShSettings,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            probe: ProbeSettings::default(),
            crtsh: CrtShSettings::default(),
        }
    }
}

/// Settings consumed by the liveness prober.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Upper bound on hosts probed at the same time.
    /// Kept low on purpose to stay polite to target infrastructure.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Try `http://` before `https://`.
    #[serde(default)]
    pub prefer_http: bool,

    /// Timeout for a single attempt against one URL.
    #[serde(default = "default_probe_timeout")]
    pub timeout_seconds: u64,

    /// User agent sent with every probe so operators can attribute the traffic.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            prefer_http: false,
            timeout_seconds: default_probe_timeout(),
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
            accept_invalid_certs: false,
        }
    }
}

impl ProbeSettings {
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_prefer_http(mut self, prefer_http: bool) -> Self {
        self.prefer_http = prefer_http;
        self
    }

    /// The timeout has whole-second precision. Fractions round up, so a
    /// requested timeout is never shortened.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let partial = u64::from(timeout.subsec_nanos() > 0);
        self.timeout_seconds = (timeout.as_secs() + partial).max(1);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Clamp values that would make the prober misbehave.
    /// A worker budget of zero becomes one.
    pub fn normalized(mut self) -> Self {
        if self.max_workers < 1 {
            log::warn!("max_workers must be at least 1, clamping 0 to 1");
            self.max_workers = 1;
        }
        if self.timeout_seconds == 0 {
            log::warn!("probe timeout of 0s is not usable, falling back to {}s", default_probe_timeout());
            self.timeout_seconds = default_probe_timeout();
        }
        self
    }
}

/// Settings for certificate transparency lookups against crt.sh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrtShSettings {
    #[serde(default = "default_crtsh_url")]
    pub base_url: String,

    #[serde(default = "default_crtsh_timeout")]
    pub timeout_seconds: u64,

    /// Pause after a successful query.
    #[serde(default = "default_crtsh_pause")]
    pub pause_millis: u64,
}

impl Default for CrtShSettings {
    fn default() -> Self {
        Self {
            base_url: default_crtsh_url(),
            timeout_seconds: default_crtsh_timeout(),
            pause_millis: default_crtsh_pause(),
        }
    }
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_max_workers() -> usize {
    6
}

fn default_probe_timeout() -> u64 {
    8
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_max_redirects() -> usize {
    10
}

fn default_crtsh_url() -> String {
    "https://crt.sh/".to_string()
}

fn default_crtsh_timeout() -> u64 {
    20
}

fn default_crtsh_pause() -> u64 {
    500
}
