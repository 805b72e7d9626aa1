// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::AppContext;
use crate::models::FinanceData;
use crate::utils::{max_amount, parse_month, required};
use anyhow::{Context, Result, bail};

pub fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("export", sub)) => export(ctx, sub),
        Some(("import", sub)) => {
            import(ctx, sub)?;
            Ok(())
        }
        Some(("purge", sub)) => purge(ctx, sub),
        Some(("clear", sub)) => clear(ctx, sub),
        _ => Ok(()),
    }
}

fn export(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required(sub, "format")?.to_lowercase();
    let out = required(sub, "out")?;
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }
    let data = ctx.storage.load_finance()?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "kind",
                "id",
                "month",
                "date",
                "description",
                "amount",
                "installment",
                "installments",
                "total_amount",
                "paid",
            ])?;
            for r in &data.incomes {
                wtr.write_record([
                    "income".to_string(),
                    r.id.clone(),
                    r.month.clone(),
                    r.date.to_string(),
                    r.description.clone(),
                    r.amount.to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                ])?;
            }
            for c in &data.card_installments {
                wtr.write_record([
                    "card".to_string(),
                    c.id.clone(),
                    c.month.clone(),
                    c.due_date().to_string(),
                    c.description.clone(),
                    c.installment_amount.to_string(),
                    c.installment_number.to_string(),
                    c.installments.to_string(),
                    c.total_amount.to_string(),
                    c.paid.to_string(),
                ])?;
            }
            for d in &data.debit_expenses {
                wtr.write_record([
                    "debit".to_string(),
                    d.id.clone(),
                    d.month.clone(),
                    d.date.to_string(),
                    d.description.clone(),
                    d.amount.to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            std::fs::write(out, serde_json::to_string_pretty(&data)?)?;
        }
    }
    println!("Exported {} records to {}", data.len(), out);
    Ok(())
}

/// Merges a JSON export into the current records; ids already present are
/// replaced. Returns the merged document.
pub fn import(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<FinanceData> {
    let path = required(sub, "path")?.trim();
    let raw = std::fs::read_to_string(path).with_context(|| format!("Open {}", path))?;
    let incoming: FinanceData =
        serde_json::from_str(&raw).with_context(|| format!("Parsing finance JSON in {}", path))?;
    for (m, amount) in incoming
        .incomes
        .iter()
        .map(|r| (&r.month, r.amount))
        .chain(
            incoming
                .card_installments
                .iter()
                .map(|c| (&c.month, c.total_amount)),
        )
        .chain(incoming.debit_expenses.iter().map(|d| (&d.month, d.amount)))
    {
        parse_month(m).with_context(|| format!("Bad record in {}", path))?;
        if amount > max_amount() {
            bail!("Bad record in {}: amount {} exceeds {}", path, amount, max_amount());
        }
    }

    let mut merged = ctx.storage.load_finance()?;
    let count = incoming.len();
    for r in incoming.incomes {
        merged.incomes.retain(|x| x.id != r.id);
        merged.incomes.push(r);
    }
    for c in incoming.card_installments {
        merged.card_installments.retain(|x| x.id != c.id);
        merged.card_installments.push(c);
    }
    for d in incoming.debit_expenses {
        merged.debit_expenses.retain(|x| x.id != d.id);
        merged.debit_expenses.push(d);
    }
    ctx.storage.save_finance(&merged)?;
    println!("Imported {} records from {}", count, path);
    Ok(merged)
}

fn purge(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let before = parse_month(required(sub, "before")?)?;
    let dropped = ctx.storage.purge_before(&before)?;
    println!("Removed {} local records older than {}", dropped, before);
    Ok(())
}

fn clear(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    if !sub.get_flag("yes") {
        bail!("Refusing to delete everything without --yes");
    }
    ctx.storage.clear_finance()?;
    println!("All finance records removed");
    Ok(())
}
