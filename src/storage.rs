// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Remote-with-local-fallback storage.
//!
//! Reads go to the remote store when one is configured and fall back to the
//! local cache on any remote failure. Writes always land in the local cache
//! first; the remote write that follows is best effort and its failure is
//! only logged. There is no merge, no queue and no replay: a record whose
//! remote write failed reaches the remote side only when it is written again.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::db::LocalCache;
use crate::error::RemoteError;
use crate::finance::installments::same_purchase;
use crate::models::{CardInstallment, DebitExpense, FinanceData, Income, Workout};
use crate::remote::{Filter, RemoteStore, Table};

pub struct Storage {
    local: LocalCache,
    remote: Option<Box<dyn RemoteStore>>,
    retain_from: Option<String>,
}

fn log_remote_failure(op: &str, e: &RemoteError) {
    if e.is_connection() {
        tracing::warn!(op, error = %e, "remote store unreachable; kept local copy only");
    } else {
        tracing::error!(op, error = %e, "remote write failed; kept local copy only");
    }
}

fn to_row<T: Serialize>(record: &T) -> Result<Value, RemoteError> {
    Ok(serde_json::to_value(record)?)
}

/// Row for an update: every column but `id`, stamped with `updated_at`.
fn to_patch<T: Serialize>(record: &T) -> Result<Value, RemoteError> {
    let mut v = serde_json::to_value(record)?;
    if let Some(obj) = v.as_object_mut() {
        obj.remove("id");
        obj.remove("created_at");
        obj.insert("updated_at".into(), Value::String(Utc::now().to_rfc3339()));
    }
    Ok(v)
}

fn stamped_rows<T: Serialize>(records: &[T]) -> Result<Vec<Value>, RemoteError> {
    let now = Utc::now().to_rfc3339();
    records
        .iter()
        .map(|r| {
            let mut v = serde_json::to_value(r)?;
            if let Some(obj) = v.as_object_mut() {
                obj.insert("updated_at".into(), Value::String(now.clone()));
            }
            Ok(v)
        })
        .collect()
}

fn fetch<T: DeserializeOwned>(
    remote: &dyn RemoteStore,
    table: Table,
    order_desc: &str,
) -> Result<Vec<T>, RemoteError> {
    remote
        .select(table, "*", Some(order_desc))?
        .into_iter()
        .map(|row| serde_json::from_value(row).map_err(RemoteError::from))
        .collect()
}

fn fetch_finance(remote: &dyn RemoteStore) -> Result<FinanceData, RemoteError> {
    Ok(FinanceData {
        incomes: fetch(remote, Table::Incomes, "created_at")?,
        card_installments: fetch(remote, Table::CardInstallments, "created_at")?,
        debit_expenses: fetch(remote, Table::DebitExpenses, "created_at")?,
    })
}

fn row_id(row: &Value) -> Option<String> {
    match row.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl Storage {
    pub fn new(
        local: LocalCache,
        remote: Option<Box<dyn RemoteStore>>,
        retain_from: Option<String>,
    ) -> Self {
        Self {
            local,
            remote,
            retain_from,
        }
    }

    pub fn local(&self) -> &LocalCache {
        &self.local
    }

    pub fn remote(&self) -> Option<&dyn RemoteStore> {
        self.remote.as_deref()
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    fn remote_write<F>(&self, op: &str, f: F)
    where
        F: FnOnce(&dyn RemoteStore) -> Result<(), RemoteError>,
    {
        if let Some(r) = self.remote.as_deref() {
            match f(r) {
                Ok(()) => tracing::debug!(op, "remote write ok"),
                Err(e) => log_remote_failure(op, &e),
            }
        }
    }

    // ---- finance: reads ----

    pub fn load_finance(&self) -> Result<FinanceData> {
        let mut data = match self.remote.as_deref() {
            None => self.local.load_finance()?,
            Some(r) => match fetch_finance(r) {
                Ok(d) => d,
                Err(e) => {
                    if e.is_connection() {
                        tracing::warn!(error = %e, "remote store unreachable; using local cache");
                    } else {
                        tracing::error!(error = %e, "remote load failed; using local cache");
                    }
                    self.local.load_finance()?
                }
            },
        };
        if let Some(from) = self.retain_from.clone() {
            let dropped = data.retain_from(&from);
            if dropped > 0 {
                tracing::warn!(dropped, from = %from, "dropping records older than retention month");
                self.purge_before(&from)?;
            }
        }
        Ok(data)
    }

    // ---- finance: writes ----

    pub fn add_income(&self, income: &Income) -> Result<Income> {
        let mut income = income.clone();
        income.created_at.get_or_insert_with(Utc::now);
        let mut local = self.local.load_finance()?;
        local.incomes.push(income.clone());
        self.local.save_finance(&local)?;
        self.remote_write("add income", |r| {
            r.insert(Table::Incomes, &[to_row(&income)?])
        });
        Ok(income)
    }

    /// Persists one installment record.
    pub fn add_card_installment(&self, inst: &CardInstallment) -> Result<CardInstallment> {
        let mut inst = inst.clone();
        inst.created_at.get_or_insert_with(Utc::now);
        let mut local = self.local.load_finance()?;
        local.card_installments.push(inst.clone());
        self.local.save_finance(&local)?;
        self.remote_write("add card installment", |r| {
            r.insert(Table::CardInstallments, &[to_row(&inst)?])
        });
        Ok(inst)
    }

    /// Persists every installment of a purchase, one record at a time.
    pub fn add_card_purchase(&self, installments: &[CardInstallment]) -> Result<Vec<CardInstallment>> {
        installments
            .iter()
            .map(|i| self.add_card_installment(i))
            .collect()
    }

    pub fn add_debit(&self, debit: &DebitExpense) -> Result<DebitExpense> {
        let mut debit = debit.clone();
        debit.created_at.get_or_insert_with(Utc::now);
        let mut local = self.local.load_finance()?;
        local.debit_expenses.push(debit.clone());
        self.local.save_finance(&local)?;
        self.remote_write("add debit expense", |r| {
            r.insert(Table::DebitExpenses, &[to_row(&debit)?])
        });
        Ok(debit)
    }

    pub fn update_income(&self, income: &Income) -> Result<()> {
        let mut local = self.local.load_finance()?;
        for r in local.incomes.iter_mut().filter(|r| r.id == income.id) {
            *r = income.clone();
        }
        self.local.save_finance(&local)?;
        self.remote_write("update income", |r| {
            r.update(Table::Incomes, &Filter::id(&income.id), &to_patch(income)?)
        });
        Ok(())
    }

    pub fn update_card(&self, inst: &CardInstallment) -> Result<()> {
        let mut local = self.local.load_finance()?;
        for c in local.card_installments.iter_mut().filter(|c| c.id == inst.id) {
            *c = inst.clone();
        }
        self.local.save_finance(&local)?;
        self.remote_write("update card installment", |r| {
            r.update(Table::CardInstallments, &Filter::id(&inst.id), &to_patch(inst)?)
        });
        Ok(())
    }

    pub fn update_debit(&self, debit: &DebitExpense) -> Result<()> {
        let mut local = self.local.load_finance()?;
        for d in local.debit_expenses.iter_mut().filter(|d| d.id == debit.id) {
            *d = debit.clone();
        }
        self.local.save_finance(&local)?;
        self.remote_write("update debit expense", |r| {
            r.update(Table::DebitExpenses, &Filter::id(&debit.id), &to_patch(debit)?)
        });
        Ok(())
    }

    pub fn set_card_paid(&self, id: &str, paid: bool) -> Result<()> {
        let mut local = self.local.load_finance()?;
        for c in local.card_installments.iter_mut().filter(|c| c.id == id) {
            c.paid = paid;
        }
        self.local.save_finance(&local)?;
        self.remote_write("update paid status", |r| {
            let patch = serde_json::json!({ "paid": paid, "updated_at": Utc::now().to_rfc3339() });
            r.update(Table::CardInstallments, &Filter::id(id), &patch)
        });
        Ok(())
    }

    pub fn delete_income(&self, id: &str) -> Result<()> {
        let mut local = self.local.load_finance()?;
        local.incomes.retain(|r| r.id != id);
        self.local.save_finance(&local)?;
        self.remote_write("delete income", |r| r.delete(Table::Incomes, &Filter::id(id)));
        Ok(())
    }

    pub fn delete_card_installment(&self, id: &str) -> Result<()> {
        let mut local = self.local.load_finance()?;
        local.card_installments.retain(|c| c.id != id);
        self.local.save_finance(&local)?;
        self.remote_write("delete card installment", |r| {
            r.delete(Table::CardInstallments, &Filter::id(id))
        });
        Ok(())
    }

    /// Deletes every installment of the purchase `base`, as listed in
    /// `known` plus whatever the local cache holds for it.
    pub fn delete_card_purchase(&self, base: &str, known: &[CardInstallment]) -> Result<Vec<String>> {
        let mut ids: Vec<String> = known
            .iter()
            .filter(|c| same_purchase(&c.id, base))
            .map(|c| c.id.clone())
            .collect();
        let local = self.local.load_finance()?;
        for c in local.card_installments.iter().filter(|c| same_purchase(&c.id, base)) {
            if !ids.contains(&c.id) {
                ids.push(c.id.clone());
            }
        }
        for id in &ids {
            self.delete_card_installment(id)?;
        }
        Ok(ids)
    }

    pub fn delete_debit(&self, id: &str) -> Result<()> {
        let mut local = self.local.load_finance()?;
        local.debit_expenses.retain(|d| d.id != id);
        self.local.save_finance(&local)?;
        self.remote_write("delete debit expense", |r| {
            r.delete(Table::DebitExpenses, &Filter::id(id))
        });
        Ok(())
    }

    /// Removes every record whose reference month is before `month`.
    pub fn purge_before(&self, month: &str) -> Result<usize> {
        let mut local = self.local.load_finance()?;
        let dropped = local.retain_from(month);
        self.local.save_finance(&local)?;
        self.remote_write("purge old records", |r| {
            for t in Table::FINANCE {
                r.delete(t, &Filter::Lt("month", month.to_string()))?;
            }
            Ok(())
        });
        Ok(dropped)
    }

    /// Empties the local cache and deletes every remote finance row.
    pub fn clear_finance(&self) -> Result<()> {
        self.local.save_finance(&FinanceData::default())?;
        self.remote_write("clear all records", |r| {
            for t in Table::FINANCE {
                let ids: Vec<String> = r.select(t, "id", None)?.iter().filter_map(row_id).collect();
                if !ids.is_empty() {
                    r.delete(t, &Filter::In("id", ids))?;
                }
            }
            Ok(())
        });
        Ok(())
    }

    /// Replaces the local document and upserts every record remotely.
    pub fn save_finance(&self, data: &FinanceData) -> Result<()> {
        self.local.save_finance(data)?;
        self.remote_write("save all records", |r| {
            if !data.incomes.is_empty() {
                r.upsert(Table::Incomes, &stamped_rows(&data.incomes)?)?;
            }
            if !data.card_installments.is_empty() {
                r.upsert(Table::CardInstallments, &stamped_rows(&data.card_installments)?)?;
            }
            if !data.debit_expenses.is_empty() {
                r.upsert(Table::DebitExpenses, &stamped_rows(&data.debit_expenses)?)?;
            }
            Ok(())
        });
        Ok(())
    }

    // ---- workouts ----

    pub fn load_workouts(&self) -> Result<Vec<Workout>> {
        let mut log = match self.remote.as_deref() {
            None => self.local.load_workouts()?,
            Some(r) => match fetch::<Workout>(r, Table::Workouts, "date") {
                Ok(w) => w,
                Err(e) => {
                    if e.is_connection() {
                        tracing::warn!(error = %e, "remote store unreachable; using local workouts");
                    } else {
                        tracing::error!(error = %e, "remote workout load failed; using local workouts");
                    }
                    self.local.load_workouts()?
                }
            },
        };
        log.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(log)
    }

    pub fn add_workout(&self, entry: &Workout) -> Result<()> {
        let mut local = self.local.load_workouts()?;
        crate::workout::sessions::insert(&mut local, entry.clone());
        self.local.save_workouts(&local)?;
        self.remote_write("add workout", |r| r.insert(Table::Workouts, &[to_row(entry)?]));
        Ok(())
    }

    pub fn remove_workout_session(&self, exercise_name: &str, date: NaiveDate) -> Result<usize> {
        let mut local = self.local.load_workouts()?;
        let removed = crate::workout::sessions::remove_session(&mut local, exercise_name, date);
        self.local.save_workouts(&local)?;
        self.remote_write("delete workout session", |r| {
            r.delete(
                Table::Workouts,
                &Filter::And(vec![
                    Filter::Eq("exercise_name", exercise_name.to_string()),
                    Filter::Eq("date", date.to_string()),
                ]),
            )
        });
        Ok(removed)
    }
}
