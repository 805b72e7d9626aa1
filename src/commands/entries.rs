// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! `income` and `debit`: single-amount entries with a reference month.

use crate::context::AppContext;
use crate::models::{DebitExpense, Income};
use crate::utils::{
    ListFilter, current_month, fmt_money, maybe_print_json, new_id, parse_amount, parse_date,
    parse_month, pretty_table, required, yesterday,
};
use anyhow::{Result, bail};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Income,
    Debit,
}

impl Kind {
    fn label(&self) -> &'static str {
        match self {
            Kind::Income => "income",
            Kind::Debit => "debit expense",
        }
    }
}

pub fn handle(ctx: &AppContext, kind: Kind, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ctx, kind, sub)?,
        Some(("list", sub)) => list(ctx, kind, sub)?,
        Some(("edit", sub)) => edit(ctx, kind, sub)?,
        Some(("rm", sub)) => rm(ctx, kind, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryRow {
    pub id: String,
    pub date: NaiveDate,
    pub month: String,
    pub description: String,
    pub amount: Decimal,
}

impl From<&Income> for EntryRow {
    fn from(r: &Income) -> Self {
        Self {
            id: r.id.clone(),
            date: r.date,
            month: r.month.clone(),
            description: r.description.clone(),
            amount: r.amount,
        }
    }
}

impl From<&DebitExpense> for EntryRow {
    fn from(r: &DebitExpense) -> Self {
        Self {
            id: r.id.clone(),
            date: r.date,
            month: r.month.clone(),
            description: r.description.clone(),
            amount: r.amount,
        }
    }
}

fn add(ctx: &AppContext, kind: Kind, sub: &clap::ArgMatches) -> Result<()> {
    let description = required(sub, "description")?.trim().to_string();
    if description.is_empty() {
        bail!("Description must not be empty");
    }
    let amount = parse_amount(required(sub, "amount")?)?;
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => yesterday(),
    };
    let month = match sub.get_one::<String>("month") {
        Some(s) => parse_month(s)?,
        None => current_month(),
    };
    let id = new_id().to_string();
    match kind {
        Kind::Income => {
            ctx.storage.add_income(&Income {
                id: id.clone(),
                description: description.clone(),
                amount,
                date,
                month: month.clone(),
                created_at: None,
            })?;
        }
        Kind::Debit => {
            ctx.storage.add_debit(&DebitExpense {
                id: id.clone(),
                description: description.clone(),
                amount,
                date,
                month: month.clone(),
                created_at: None,
            })?;
        }
    }
    println!(
        "Recorded {} '{}' {} for {} (id {})",
        kind.label(),
        description,
        fmt_money(&amount, &ctx.config.currency),
        month,
        id
    );
    Ok(())
}

pub fn query_rows(ctx: &AppContext, kind: Kind, sub: &clap::ArgMatches) -> Result<Vec<EntryRow>> {
    let month = sub.get_one::<String>("month").map(|s| parse_month(s)).transpose()?;
    let filter = ListFilter::from_matches(sub)?;
    let data = ctx.storage.load_finance()?;
    let mut rows: Vec<EntryRow> = match kind {
        Kind::Income => data.incomes.iter().map(EntryRow::from).collect(),
        Kind::Debit => data.debit_expenses.iter().map(EntryRow::from).collect(),
    };
    rows.retain(|r| {
        month.as_ref().is_none_or(|m| &r.month == m) && filter.matches(&r.description, r.amount)
    });
    rows.sort_by(|a, b| b.month.cmp(&a.month).then(b.date.cmp(&a.date)));
    Ok(rows)
}

fn list(ctx: &AppContext, kind: Kind, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(ctx, kind, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let total: Decimal = data.iter().map(|r| r.amount).sum();
        let mut rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.month.clone(),
                    r.date.to_string(),
                    r.description.clone(),
                    format!("{:.2}", r.amount),
                ]
            })
            .collect();
        rows.push(vec![
            String::new(),
            String::new(),
            String::new(),
            "Total".into(),
            format!("{:.2}", total),
        ]);
        println!(
            "{}",
            pretty_table(&["Id", "Month", "Date", "Description", "Amount"], rows)
        );
    }
    Ok(())
}

struct Changes {
    description: Option<String>,
    amount: Option<Decimal>,
    date: Option<NaiveDate>,
    month: Option<String>,
}

fn changes(sub: &clap::ArgMatches) -> Result<Changes> {
    let c = Changes {
        description: sub
            .get_one::<String>("description")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        amount: sub.get_one::<String>("amount").map(|s| parse_amount(s)).transpose()?,
        date: sub.get_one::<String>("date").map(|s| parse_date(s)).transpose()?,
        month: sub.get_one::<String>("month").map(|s| parse_month(s)).transpose()?,
    };
    if c.description.is_none() && c.amount.is_none() && c.date.is_none() && c.month.is_none() {
        bail!("Nothing to change: pass --description, --amount, --date or --month");
    }
    Ok(c)
}

fn edit(ctx: &AppContext, kind: Kind, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let c = changes(sub)?;
    let data = ctx.storage.load_finance()?;
    match kind {
        Kind::Income => {
            let Some(mut r) = data.incomes.into_iter().find(|r| &r.id == id) else {
                bail!("Income '{}' not found", id);
            };
            if let Some(v) = c.description {
                r.description = v;
            }
            if let Some(v) = c.amount {
                r.amount = v;
            }
            if let Some(v) = c.date {
                r.date = v;
            }
            if let Some(v) = c.month {
                r.month = v;
            }
            ctx.storage.update_income(&r)?;
        }
        Kind::Debit => {
            let Some(mut r) = data.debit_expenses.into_iter().find(|r| &r.id == id) else {
                bail!("Debit expense '{}' not found", id);
            };
            if let Some(v) = c.description {
                r.description = v;
            }
            if let Some(v) = c.amount {
                r.amount = v;
            }
            if let Some(v) = c.date {
                r.date = v;
            }
            if let Some(v) = c.month {
                r.month = v;
            }
            ctx.storage.update_debit(&r)?;
        }
    }
    println!("Updated {} {}", kind.label(), id);
    Ok(())
}

fn rm(ctx: &AppContext, kind: Kind, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let data = ctx.storage.load_finance()?;
    match kind {
        Kind::Income => {
            if !data.incomes.iter().any(|r| &r.id == id) {
                bail!("Income '{}' not found", id);
            }
            ctx.storage.delete_income(id)?
        }
        Kind::Debit => {
            if !data.debit_expenses.iter().any(|r| &r.id == id) {
                bail!("Debit expense '{}' not found", id);
            }
            ctx.storage.delete_debit(id)?
        }
    }
    println!("Removed {} {}", kind.label(), id);
    Ok(())
}
