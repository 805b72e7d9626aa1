// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::AppContext;
use crate::finance::installments::{self, Purchase, base_id, installment_amount, schedule_drift};
use crate::finance::report::CardStatus;
use crate::models::CardInstallment;
use crate::utils::{
    ListFilter, fmt_money, maybe_print_json, new_id, parse_amount, parse_date, parse_month,
    pretty_table, required, yesterday,
};
use anyhow::{Result, bail};
use rust_decimal::Decimal;

pub fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            add(ctx, sub)?;
        }
        Some(("list", sub)) => list(ctx, sub)?,
        Some(("pay", sub)) => {
            toggle_paid(ctx, sub)?;
        }
        Some(("edit", sub)) => edit(ctx, sub)?,
        Some(("rm", sub)) => rm(ctx, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn add(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<Vec<CardInstallment>> {
    let purchase = Purchase {
        description: required(sub, "description")?.to_string(),
        total_amount: parse_amount(required(sub, "total")?)?,
        installments: *sub.get_one::<u32>("installments").unwrap_or(&1),
        start_date: match sub.get_one::<String>("start") {
            Some(s) => parse_date(s)?,
            None => yesterday(),
        },
    };
    let base = new_id().to_string();
    let schedule = installments::expand(&purchase, &base, ctx.config.max_installments)?;
    let saved = ctx.storage.add_card_purchase(&schedule)?;

    let ccy = &ctx.config.currency;
    println!(
        "Recorded '{}' {} in {} x {} (purchase {})",
        purchase.description.trim(),
        fmt_money(&purchase.total_amount, ccy),
        purchase.installments,
        fmt_money(&schedule[0].installment_amount, ccy),
        base
    );
    let first = &schedule[0].month;
    let last = &schedule[schedule.len() - 1].month;
    println!("Installments due {} .. {}", first, last);
    let drift = schedule_drift(&schedule);
    if !drift.is_zero() {
        println!("Note: installments sum differs from the total by {}", fmt_money(&drift, ccy));
    }
    Ok(saved)
}

pub fn query_rows(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<Vec<CardInstallment>> {
    let month = sub.get_one::<String>("month").map(|s| parse_month(s)).transpose()?;
    let status = match sub.get_one::<String>("status") {
        Some(s) => CardStatus::parse(s)?,
        None => CardStatus::All,
    };
    let filter = ListFilter::from_matches(sub)?;
    let data = ctx.storage.load_finance()?;
    let mut rows: Vec<CardInstallment> = data
        .card_installments
        .into_iter()
        .filter(|c| {
            month.as_ref().is_none_or(|m| &c.month == m)
                && status.matches(c)
                && filter.matches(&c.description, c.installment_amount)
        })
        .collect();
    rows.sort_by(|a, b| {
        a.month
            .cmp(&b.month)
            .then(a.description.cmp(&b.description))
            .then(a.installment_number.cmp(&b.installment_number))
    });
    Ok(rows)
}

fn list(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(ctx, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let total: Decimal = data.iter().map(|c| c.installment_amount).sum();
        let mut rows: Vec<Vec<String>> = data
            .iter()
            .map(|c| {
                vec![
                    c.id.clone(),
                    c.month.clone(),
                    c.description.clone(),
                    format!("{}/{}", c.installment_number, c.installments),
                    format!("{:.2}", c.installment_amount),
                    format!("{:.2}", c.total_amount),
                    if c.paid { "yes".into() } else { "no".into() },
                ]
            })
            .collect();
        rows.push(vec![
            String::new(),
            String::new(),
            "Total".into(),
            String::new(),
            format!("{:.2}", total),
            String::new(),
            String::new(),
        ]);
        println!(
            "{}",
            pretty_table(
                &["Id", "Month", "Description", "Parcel", "Amount", "Purchase", "Paid"],
                rows,
            )
        );
    }
    Ok(())
}

fn find(ctx: &AppContext, id: &str) -> Result<CardInstallment> {
    let data = ctx.storage.load_finance()?;
    data.card_installments
        .into_iter()
        .find(|c| c.id == id)
        .ok_or_else(|| anyhow::anyhow!("Card installment '{}' not found", id))
}

/// Flips the paid flag of exactly one installment and returns the new value.
pub fn toggle_paid(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<bool> {
    let id = required(sub, "id")?;
    let inst = find(ctx, id)?;
    let paid = !inst.paid;
    ctx.storage.set_card_paid(id, paid)?;
    println!(
        "{} {}/{} of '{}' ({})",
        if paid { "Paid" } else { "Reopened" },
        inst.installment_number,
        inst.installments,
        inst.description,
        inst.month
    );
    Ok(paid)
}

/// Changes only the selected installment; its reference month stays put.
fn edit(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let mut inst = find(ctx, id)?;
    let mut changed = false;
    if let Some(d) = sub.get_one::<String>("description").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        inst.description = d.to_string();
        changed = true;
    }
    if let Some(t) = sub.get_one::<String>("total") {
        inst.total_amount = parse_amount(t)?;
        changed = true;
    }
    if let Some(n) = sub.get_one::<u32>("installments") {
        if *n == 0 || *n > ctx.config.max_installments {
            bail!(
                "Installment count must be between 1 and {}, got {}",
                ctx.config.max_installments,
                n
            );
        }
        inst.installments = *n;
        changed = true;
    }
    if let Some(s) = sub.get_one::<String>("start") {
        inst.start_date = parse_date(s)?;
        changed = true;
    }
    if !changed {
        bail!("Nothing to change: pass --description, --total, --installments or --start");
    }
    inst.installment_amount = installment_amount(inst.total_amount, inst.installments);
    ctx.storage.update_card(&inst)?;
    println!(
        "Updated {}: {} per installment",
        id,
        fmt_money(&inst.installment_amount, &ctx.config.currency)
    );
    Ok(())
}

fn rm(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let data = ctx.storage.load_finance()?;
    let base = base_id(id);
    let removed = ctx.storage.delete_card_purchase(base, &data.card_installments)?;
    if removed.is_empty() {
        bail!("Card purchase '{}' not found", id);
    }
    println!("Removed purchase {} ({} installments)", base, removed.len());
    Ok(())
}
