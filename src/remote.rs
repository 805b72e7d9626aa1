// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Remote store access.
//!
//! The hosted database is reached through its PostgREST-style REST API:
//! one path per table, filters as query parameters (`col=eq.v`,
//! `col=lt.v`, `col=in.(..)`), JSON bodies for writes.

use reqwest::Method;
use reqwest::blocking::{RequestBuilder, Response};
use serde_json::Value;

use crate::config::RemoteConfig;
use crate::error::RemoteError;
use crate::utils::http_client;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Incomes,
    CardInstallments,
    DebitExpenses,
    Workouts,
}

impl Table {
    pub const FINANCE: [Table; 3] = [Table::Incomes, Table::CardInstallments, Table::DebitExpenses];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Incomes => "incomes",
            Table::CardInstallments => "card_installments",
            Table::DebitExpenses => "debit_expenses",
            Table::Workouts => "workouts",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(&'static str, String),
    Lt(&'static str, String),
    In(&'static str, Vec<String>),
    And(Vec<Filter>),
}

impl Filter {
    pub fn id(id: impl ToString) -> Self {
        Filter::Eq("id", id.to_string())
    }

    /// Query parameters in PostgREST syntax.
    pub fn to_query(&self) -> Vec<(String, String)> {
        match self {
            Filter::Eq(col, v) => vec![(col.to_string(), format!("eq.{}", v))],
            Filter::Lt(col, v) => vec![(col.to_string(), format!("lt.{}", v))],
            Filter::In(col, vs) => {
                let quoted: Vec<String> = vs
                    .iter()
                    .map(|v| format!("\"{}\"", v.replace('"', "\\\"")))
                    .collect();
                vec![(col.to_string(), format!("in.({})", quoted.join(",")))]
            }
            Filter::And(fs) => fs.iter().flat_map(|f| f.to_query()).collect(),
        }
    }
}

/// Operations the application needs from the hosted database.
pub trait RemoteStore {
    /// Selects `columns` from every row, newest first by `order_desc` when given.
    fn select(
        &self,
        table: Table,
        columns: &str,
        order_desc: Option<&str>,
    ) -> Result<Vec<Value>, RemoteError>;
    fn insert(&self, table: Table, rows: &[Value]) -> Result<(), RemoteError>;
    /// Inserts or replaces rows keyed by `id`.
    fn upsert(&self, table: Table, rows: &[Value]) -> Result<(), RemoteError>;
    fn update(&self, table: Table, filter: &Filter, patch: &Value) -> Result<(), RemoteError>;
    fn delete(&self, table: Table, filter: &Filter) -> Result<(), RemoteError>;
    fn ping(&self) -> Result<(), RemoteError>;
}

pub struct RestClient {
    base: String,
    api_key: String,
    http: reqwest::blocking::Client,
}

impl RestClient {
    pub fn new(cfg: &RemoteConfig) -> Result<Self, RemoteError> {
        let base = cfg.url.trim().trim_end_matches('/').to_string();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(RemoteError::Config(format!(
                "url '{}' must start with http:// or https://",
                cfg.url
            )));
        }
        if cfg.api_key.trim().is_empty() {
            return Err(RemoteError::Config("api_key is empty".into()));
        }
        let http = http_client(cfg.timeout_secs).map_err(|e| RemoteError::Config(e.to_string()))?;
        Ok(Self {
            base,
            api_key: cfg.api_key.trim().to_string(),
            http,
        })
    }

    pub fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base, table.name())
    }

    fn request(&self, method: Method, table: Table) -> RequestBuilder {
        self.http
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn send(rb: RequestBuilder) -> Result<Response, RemoteError> {
        let resp = rb.send()?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().unwrap_or_default();
        Err(RemoteError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl RemoteStore for RestClient {
    fn select(
        &self,
        table: Table,
        columns: &str,
        order_desc: Option<&str>,
    ) -> Result<Vec<Value>, RemoteError> {
        let mut query = vec![("select".to_string(), columns.to_string())];
        if let Some(col) = order_desc {
            query.push(("order".to_string(), format!("{}.desc", col)));
        }
        let resp = Self::send(self.request(Method::GET, table).query(&query))?;
        let rows: Vec<Value> = resp.json()?;
        tracing::debug!(table = table.name(), rows = rows.len(), "remote select");
        Ok(rows)
    }

    fn insert(&self, table: Table, rows: &[Value]) -> Result<(), RemoteError> {
        Self::send(
            self.request(Method::POST, table)
                .header("Prefer", "return=minimal")
                .json(rows),
        )?;
        Ok(())
    }

    fn upsert(&self, table: Table, rows: &[Value]) -> Result<(), RemoteError> {
        Self::send(
            self.request(Method::POST, table)
                .query(&[("on_conflict", "id")])
                .header("Prefer", "resolution=merge-duplicates,return=minimal")
                .json(rows),
        )?;
        Ok(())
    }

    fn update(&self, table: Table, filter: &Filter, patch: &Value) -> Result<(), RemoteError> {
        Self::send(
            self.request(Method::PATCH, table)
                .query(&filter.to_query())
                .header("Prefer", "return=minimal")
                .json(patch),
        )?;
        Ok(())
    }

    fn delete(&self, table: Table, filter: &Filter) -> Result<(), RemoteError> {
        Self::send(self.request(Method::DELETE, table).query(&filter.to_query()))?;
        Ok(())
    }

    fn ping(&self) -> Result<(), RemoteError> {
        Self::send(
            self.request(Method::GET, Table::Incomes)
                .query(&[("select", "id"), ("limit", "1")]),
        )?;
        Ok(())
    }
}
