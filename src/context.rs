// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::fmt;

use crate::config::{self, Config};
use crate::db::{self, LocalCache};
use crate::remote::{RemoteStore, RestClient};
use crate::storage::Storage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    NotConfigured,
    Available,
    Unavailable(String),
}

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteStatus::NotConfigured => write!(f, "not configured (local cache only)"),
            RemoteStatus::Available => write!(f, "available"),
            RemoteStatus::Unavailable(why) => write!(f, "unavailable: {}", why),
        }
    }
}

/// Everything a command handler needs, built once at startup.
pub struct AppContext {
    pub config: Config,
    pub storage: Storage,
    pub remote_status: RemoteStatus,
}

impl AppContext {
    /// Opens the local cache and resolves the remote store. A remote store
    /// that cannot be set up leaves the context in local-only mode.
    pub fn init(config: Config) -> Result<Self> {
        let db_path = match &config.db_path {
            Some(p) => p.clone(),
            None => config::default_db_path()?,
        };
        let conn = db::open_or_init(&db_path)?;
        tracing::debug!(path = %db_path.display(), "local cache opened");

        let (remote, remote_status): (Option<Box<dyn RemoteStore>>, RemoteStatus) =
            match &config.remote {
                None => (None, RemoteStatus::NotConfigured),
                Some(rc) => match RestClient::new(rc) {
                    Ok(client) => (Some(Box::new(client)), RemoteStatus::Available),
                    Err(e) => {
                        tracing::warn!(error = %e, "remote store disabled");
                        (None, RemoteStatus::Unavailable(e.to_string()))
                    }
                },
            };

        let storage = Storage::new(LocalCache::new(conn), remote, config.retain_from.clone());
        Ok(Self {
            config,
            storage,
            remote_status,
        })
    }

    /// Context over an existing cache and remote; used by tests and tools.
    pub fn with_storage(config: Config, storage: Storage) -> Self {
        let remote_status = if storage.has_remote() {
            RemoteStatus::Available
        } else {
            RemoteStatus::NotConfigured
        };
        Self {
            config,
            storage,
            remote_status,
        }
    }
}
