//! JSON persistence for scope files and live-check results.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ReconError, Result};
use crate::http_probe::result::ProbeResultSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassiveRecon {
    #[serde(default)]
    pub crtsh_subdomains: Vec<String>,
}

/// What is in scope for a target and what passive recon found for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub main_domain: String,
    #[serde(default)]
    pub in_scope: Vec<String>,
    #[serde(default)]
    pub passive: PassiveRecon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl Scope {
    pub fn new(main_domain: impl Into<String>, in_scope: Vec<String>) -> Self {
        Self {
            main_domain: main_domain.into(),
            in_scope,
            passive: PassiveRecon::default(),
            generated_at: Some(Utc::now()),
        }
    }

    /// Hosts found by passive recon, in the order they were saved.
    pub fn probe_targets(&self) -> &[String] {
        &self.passive.crtsh_subdomains
    }
}

/// Writes and reads the files of one output directory.
#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    /// Creates the directory if it does not exist yet.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn scope_path(&self, domain: &str) -> Result<PathBuf> {
        let domain = checked_file_stem(domain)?;
        Ok(self.dir.join(format!("{domain}_scope.json")))
    }

    pub fn livecheck_path(&self, domain: &str) -> Result<PathBuf> {
        let domain = checked_file_stem(domain)?;
        Ok(self.dir.join(format!("{domain}_livecheck.json")))
    }

    pub fn save_scope(&self, scope: &Scope) -> Result<PathBuf> {
        let path = self.scope_path(&scope.main_domain)?;
        write_json(&path, scope)?;
        log::info!("Scope saved to {}", path.display());
        Ok(path)
    }

    pub fn save_livecheck(&self, domain: &str, results: &ProbeResultSet) -> Result<PathBuf> {
        let path = self.livecheck_path(domain)?;
        write_json(&path, results)?;
        log::info!("Live-check results saved to {}", path.display());
        Ok(path)
    }

    pub fn load_livecheck(&self, domain: &str) -> Result<ProbeResultSet> {
        let content = fs::read_to_string(self.livecheck_path(domain)?)?;
        Ok(serde_json::from_str(&content)?)
    }
}

pub fn load_scope(path: &Path) -> Result<Scope> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Domains become part of file names, so they must stay a single plain path
/// component inside the output directory.
fn checked_file_stem(domain: &str) -> Result<&str> {
    let plain = !domain.is_empty()
        && !domain.contains(['/', '\\'])
        && !domain.starts_with('.')
        && Path::new(domain).file_name() == Some(OsStr::new(domain));
    if plain {
        Ok(domain)
    } else {
        Err(ReconError::InvalidDomain(domain.to_string()))
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}
