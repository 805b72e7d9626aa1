// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use once_cell::sync::Lazy;
use regex::RegexSet;
use thiserror::Error;

/// Message fragments that identify an unreachable remote store.
static CONNECTION_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"Failed to fetch",
        r"ERR_NAME_NOT_RESOLVED",
        r"NetworkError",
        r"Network request failed",
        r"ENOTFOUND",
        r"ECONNREFUSED",
        r"(?i)dns error",
        r"(?i)connection refused",
        r"(?i)failed to lookup address",
    ])
    .expect("static patterns compile")
});

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote store unreachable: {0}")]
    Connection(String),
    #[error("remote store returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("could not decode remote response: {0}")]
    Decode(String),
    #[error("remote store misconfigured: {0}")]
    Config(String),
}

impl RemoteError {
    pub fn is_connection(&self) -> bool {
        match self {
            RemoteError::Connection(_) => true,
            RemoteError::Api { message, .. } => looks_like_connection(message),
            RemoteError::Decode(_) | RemoteError::Config(_) => false,
        }
    }
}

pub fn looks_like_connection(message: &str) -> bool {
    CONNECTION_PATTERNS.is_match(message)
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            return RemoteError::Connection(e.to_string());
        }
        if e.is_decode() {
            return RemoteError::Decode(e.to_string());
        }
        if let Some(status) = e.status() {
            return RemoteError::Api {
                status: status.as_u16(),
                message: e.to_string(),
            };
        }
        let msg = e.to_string();
        if looks_like_connection(&msg) {
            RemoteError::Connection(msg)
        } else {
            RemoteError::Api {
                status: 0,
                message: msg,
            }
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(e: serde_json::Error) -> Self {
        RemoteError::Decode(e.to_string())
    }
}
