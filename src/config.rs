// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Settings loading.
//!
//! Settings live in a JSON file (`config.json` in the platform config dir, or
//! the path given with `--config`). A missing default file is not an error:
//! every field has a default and the remote store is simply left
//! unconfigured. Environment variables override the file:
//!
//! - `POCKETLOG_REMOTE_URL` / `POCKETLOG_REMOTE_KEY`: remote store endpoint and key
//! - `POCKETLOG_DB`: path of the local cache database

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::parse_month;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.pocketlog", "Pocketlog", "pocketlog"));

pub const ENV_REMOTE_URL: &str = "POCKETLOG_REMOTE_URL";
pub const ENV_REMOTE_KEY: &str = "POCKETLOG_REMOTE_KEY";
pub const ENV_DB: &str = "POCKETLOG_DB";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: Option<RemoteConfig>,
    /// Records with a reference month before this one are dropped on load.
    pub retain_from: Option<String>,
    pub projection_months: usize,
    pub max_installments: u32,
    pub currency: String,
    pub db_path: Option<PathBuf>,
}

fn default_timeout() -> u64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: None,
            retain_from: None,
            projection_months: 12,
            max_installments: 24,
            currency: "BRL".to_string(),
            db_path: None,
        }
    }
}

impl Config {
    fn validate(self) -> Result<Self> {
        if let Some(m) = &self.retain_from {
            parse_month(m).context("Invalid retain_from")?;
        }
        if self.max_installments == 0 {
            bail!("max_installments must be at least 1");
        }
        if let Some(r) = &self.remote {
            if r.url.trim().is_empty() {
                bail!("remote.url must not be empty");
            }
        }
        Ok(self)
    }

    /// Applies `POCKETLOG_*` overrides from a variable lookup.
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(ENV_REMOTE_URL).filter(|s| !s.trim().is_empty());
        let key = lookup(ENV_REMOTE_KEY).filter(|s| !s.trim().is_empty());
        match (&mut self.remote, url, key) {
            (Some(r), url, key) => {
                if let Some(u) = url {
                    r.url = u;
                }
                if let Some(k) = key {
                    r.api_key = k;
                }
            }
            (None, Some(url), Some(api_key)) => {
                self.remote = Some(RemoteConfig {
                    url,
                    api_key,
                    timeout_secs: default_timeout(),
                });
            }
            _ => {}
        }
        if let Some(db) = lookup(ENV_DB).filter(|s| !s.trim().is_empty()) {
            self.db_path = Some(PathBuf::from(db));
        }
        self
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(APP.0, APP.1, APP.2).context("Could not determine platform-specific dirs")
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.json"))
}

pub fn default_db_path() -> Result<PathBuf> {
    let proj = project_dirs()?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("pocketlog.sqlite"))
}

/// Loads settings from a JSON file.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading settings file: {}", path.display()))?;
    let cfg: Config = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing settings JSON in {}", path.display()))?;
    cfg.validate()
}

/// Resolves the effective configuration: an explicit path must exist, the
/// default path is optional. Environment overrides are applied last.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let cfg = match explicit {
        Some(p) => load_file(p)?,
        None => {
            let p = default_config_path()?;
            if p.exists() {
                load_file(&p)?
            } else {
                Config::default()
            }
        }
    };
    cfg.apply_env(|k| std::env::var(k).ok()).validate()
}
