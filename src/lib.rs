//! bbt - a small, polite reconnaissance toolkit.
//!
//! Discovers subdomains through certificate transparency and checks which of
//! them answer over HTTP(S) with a bounded number of concurrent probes.

pub mod config;
pub mod error;
pub mod http_probe;
pub mod recon;
pub mod store;

pub use config::app_config::{AppConfig, load_config};
pub use config::probe_config::{CrtShSettings, ProbeSettings};
pub use error::{ReconError, Result};
pub use http_probe::driver::Prober;
pub use http_probe::result::{ProbeResult, ProbeResultSet};
