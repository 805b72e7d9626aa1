// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use pocketlog::config::Config;
use pocketlog::context::AppContext;
use pocketlog::db::{self, LocalCache};
use pocketlog::error::RemoteError;
use pocketlog::remote::{Filter, RemoteStore, Table};
use pocketlog::storage::Storage;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Connection,
    Api,
}

#[derive(Default)]
pub struct RemoteState {
    pub tables: HashMap<Table, Vec<Value>>,
    pub calls: Vec<String>,
    pub fail_reads: Option<Failure>,
    pub fail_writes: Option<Failure>,
}

impl RemoteState {
    pub fn rows(&self, t: Table) -> Vec<Value> {
        self.tables.get(&t).cloned().unwrap_or_default()
    }

    pub fn ids(&self, t: Table) -> Vec<String> {
        self.rows(t).iter().filter_map(field_str("id")).collect()
    }
}

fn field_str(name: &'static str) -> impl Fn(&Value) -> Option<String> {
    move |row| match row.get(name)? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn matches(row: &Value, f: &Filter) -> bool {
    match f {
        Filter::Eq(col, v) => field_str(col)(row).as_deref() == Some(v.as_str()),
        Filter::Lt(col, v) => field_str(col)(row).is_some_and(|x| x.as_str() < v.as_str()),
        Filter::In(col, vs) => field_str(col)(row).is_some_and(|x| vs.contains(&x)),
        Filter::And(fs) => fs.iter().all(|f| matches(row, f)),
    }
}

fn fail(kind: Option<Failure>) -> Result<(), RemoteError> {
    match kind {
        Some(Failure::Connection) => Err(RemoteError::Connection(
            "error sending request: dns error: failed to lookup address".into(),
        )),
        Some(Failure::Api) => Err(RemoteError::Api {
            status: 500,
            message: "internal error".into(),
        }),
        _ => Ok(()),
    }
}

/// In-memory stand-in for the hosted database.
#[derive(Clone, Default)]
pub struct FakeRemote {
    pub state: Rc<RefCell<RemoteState>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RemoteStore for FakeRemote {
    fn select(&self, table: Table, columns: &str, _order: Option<&str>) -> Result<Vec<Value>, RemoteError> {
        let mut s = self.state.borrow_mut();
        s.calls.push(format!("select {}", table.name()));
        fail(s.fail_reads)?;
        let rows = s.rows(table);
        if columns == "id" {
            return Ok(rows
                .iter()
                .map(|r| serde_json::json!({ "id": r.get("id").cloned().unwrap_or(Value::Null) }))
                .collect());
        }
        Ok(rows)
    }

    fn insert(&self, table: Table, rows: &[Value]) -> Result<(), RemoteError> {
        let mut s = self.state.borrow_mut();
        s.calls.push(format!("insert {}", table.name()));
        fail(s.fail_writes)?;
        s.tables.entry(table).or_default().extend(rows.iter().cloned());
        Ok(())
    }

    fn upsert(&self, table: Table, rows: &[Value]) -> Result<(), RemoteError> {
        let mut s = self.state.borrow_mut();
        s.calls.push(format!("upsert {}", table.name()));
        fail(s.fail_writes)?;
        let t = s.tables.entry(table).or_default();
        for r in rows {
            let id = r.get("id").cloned();
            t.retain(|x| x.get("id").cloned() != id);
            t.push(r.clone());
        }
        Ok(())
    }

    fn update(&self, table: Table, filter: &Filter, patch: &Value) -> Result<(), RemoteError> {
        let mut s = self.state.borrow_mut();
        s.calls.push(format!("update {}", table.name()));
        fail(s.fail_writes)?;
        for row in s.tables.entry(table).or_default().iter_mut() {
            if matches(row, filter) {
                if let (Some(obj), Some(p)) = (row.as_object_mut(), patch.as_object()) {
                    for (k, v) in p {
                        obj.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        Ok(())
    }

    fn delete(&self, table: Table, filter: &Filter) -> Result<(), RemoteError> {
        let mut s = self.state.borrow_mut();
        s.calls.push(format!("delete {}", table.name()));
        fail(s.fail_writes)?;
        s.tables.entry(table).or_default().retain(|r| !matches(r, filter));
        Ok(())
    }

    fn ping(&self) -> Result<(), RemoteError> {
        let mut s = self.state.borrow_mut();
        s.calls.push("ping".into());
        fail(s.fail_reads)
    }
}

pub fn local_ctx() -> AppContext {
    ctx_with(None, Config::default())
}

pub fn remote_ctx() -> (AppContext, FakeRemote) {
    let remote = FakeRemote::new();
    let ctx = ctx_with(Some(remote.clone()), Config::default());
    (ctx, remote)
}

pub fn ctx_with(remote: Option<FakeRemote>, config: Config) -> AppContext {
    let conn = db::open_in_memory().unwrap();
    let boxed: Option<Box<dyn RemoteStore>> = remote.map(|r| Box::new(r) as Box<dyn RemoteStore>);
    let storage = Storage::new(LocalCache::new(conn), boxed, config.retain_from.clone());
    AppContext::with_storage(config, storage)
}

/// Parses `args` (without the program name) and returns the leaf matches of
/// `<area> <action>`.
pub fn leaf(args: &[&str]) -> clap::ArgMatches {
    let mut full = vec!["pocketlog"];
    full.extend_from_slice(args);
    let m = pocketlog::cli::build_cli().get_matches_from(full);
    let (_, area) = m.subcommand().expect("area subcommand");
    let (_, action) = area.subcommand().expect("action subcommand");
    action.clone()
}

pub fn area(args: &[&str]) -> clap::ArgMatches {
    let mut full = vec!["pocketlog"];
    full.extend_from_slice(args);
    let m = pocketlog::cli::build_cli().get_matches_from(full);
    let (_, area) = m.subcommand().expect("area subcommand");
    area.clone()
}

pub fn d(s: &str) -> rust_decimal::Decimal {
    s.parse().unwrap()
}

pub fn date(s: &str) -> chrono::NaiveDate {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn income(id: &str, month: &str, amount: &str) -> pocketlog::models::Income {
    pocketlog::models::Income {
        id: id.into(),
        description: format!("income {}", id),
        amount: d(amount),
        date: date(&format!("{}-05", month)),
        month: month.into(),
        created_at: None,
    }
}

pub fn debit(id: &str, month: &str, amount: &str) -> pocketlog::models::DebitExpense {
    pocketlog::models::DebitExpense {
        id: id.into(),
        description: format!("debit {}", id),
        amount: d(amount),
        date: date(&format!("{}-10", month)),
        month: month.into(),
        created_at: None,
    }
}

pub fn card(id: &str, month: &str, amount: &str, paid: bool) -> pocketlog::models::CardInstallment {
    pocketlog::models::CardInstallment {
        id: id.into(),
        description: format!("card {}", id),
        total_amount: d(amount),
        installments: 1,
        installment_number: 1,
        installment_amount: d(amount),
        start_date: date(&format!("{}-15", month)),
        month: month.into(),
        paid,
        created_at: None,
    }
}

pub fn workout(id: i64, name: &str, on: &str, sets: u32, reps: u32, weight: f64) -> pocketlog::models::Workout {
    pocketlog::models::Workout {
        id,
        exercise_name: name.into(),
        sets,
        reps,
        weight,
        date: date(on),
    }
}
