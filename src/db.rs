// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::models::{FinanceData, Workout};

pub const FINANCE_KEY: &str = "finance-data";
pub const WORKOUTS_KEY: &str = "workouts";

pub fn open_or_init(path: &Path) -> Result<Connection> {
    let mut conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory()?;
    init_schema(&mut conn)?;
    Ok(conn)
}

fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS cache(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    )?;
    Ok(())
}

/// Local key/value cache holding whole collections as JSON documents.
pub struct LocalCache {
    conn: Connection,
}

impl LocalCache {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    fn get<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM cache WHERE key=?1", params![key], |r| {
                r.get(0)
            })
            .optional()?;
        match raw {
            Some(s) => serde_json::from_str(&s)
                .with_context(|| format!("Corrupt cache entry '{}'", key)),
            None => Ok(T::default()),
        }
    }

    fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let s = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT INTO cache(key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=excluded.updated_at",
            params![key, s],
        )?;
        Ok(())
    }

    pub fn load_finance(&self) -> Result<FinanceData> {
        self.get(FINANCE_KEY)
    }

    pub fn save_finance(&self, data: &FinanceData) -> Result<()> {
        self.put(FINANCE_KEY, data)
    }

    pub fn load_workouts(&self) -> Result<Vec<Workout>> {
        self.get(WORKOUTS_KEY)
    }

    pub fn save_workouts(&self, workouts: &[Workout]) -> Result<()> {
        self.put(WORKOUTS_KEY, &workouts)
    }

    pub fn updated_at(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT updated_at FROM cache WHERE key=?1",
                params![key],
                |r| r.get(0),
            )
            .optional()?)
    }
}
