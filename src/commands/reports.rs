// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::AppContext;
use crate::finance::report::{
    self, BillAnalysis, CardStatus, ProjectedMonth, bill_analysis, installment_status,
    monthly_balance, projection, projection_window, totals, with_running_balance,
};
use crate::utils::{current_month, fmt_money, maybe_print_json, parse_month, pretty_table};
use anyhow::Result;

pub fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("month", sub)) => month(ctx, sub)?,
        Some(("projection", sub)) => projection_report(ctx, sub)?,
        Some(("compare", sub)) => compare(ctx, sub)?,
        Some(("bill", sub)) => bill(ctx, sub)?,
        Some(("installments", sub)) => installments(ctx, sub)?,
        _ => {}
    }
    Ok(())
}

fn month_arg(sub: &clap::ArgMatches, name: &str) -> Result<String> {
    match sub.get_one::<String>(name) {
        Some(s) => parse_month(s),
        None => Ok(current_month()),
    }
}

fn status_arg(sub: &clap::ArgMatches) -> Result<CardStatus> {
    match sub.get_one::<String>("status") {
        Some(s) => CardStatus::parse(s),
        None => Ok(CardStatus::All),
    }
}

fn money(d: &rust_decimal::Decimal) -> String {
    format!("{:.2}", d)
}

fn month(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let m = month_arg(sub, "month")?;
    let status = status_arg(sub)?;
    let data = ctx.storage.load_finance()?;
    let mb = monthly_balance(&m, &data, status);
    if !maybe_print_json(json_flag, jsonl_flag, &mb)? {
        println!(
            "{}",
            pretty_table(
                &["Month", "Income", "Card", "Debit", "Balance"],
                vec![vec![
                    mb.month.clone(),
                    money(&mb.income),
                    money(&mb.card),
                    money(&mb.debit),
                    money(&mb.balance),
                ]],
            )
        );
    }
    Ok(())
}

/// Projection window from `--from` (default current month) for `--months`
/// (default from config), with running balance.
pub fn projection_rows(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<Vec<ProjectedMonth>> {
    let from = month_arg(sub, "from")?;
    let n = *sub
        .get_one::<usize>("months")
        .unwrap_or(&ctx.config.projection_months);
    let status = status_arg(sub)?;
    let data = ctx.storage.load_finance()?;
    let window = projection_window(&from, n, &data)?;
    Ok(with_running_balance(projection(&window, &data, status)))
}

fn projection_report(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let months = projection_rows(ctx, sub)?;
    if maybe_print_json(json_flag, jsonl_flag, &months)? {
        return Ok(());
    }
    let sum = totals(&months);
    let mut rows: Vec<Vec<String>> = months
        .iter()
        .map(|p| {
            vec![
                p.balance.month.clone(),
                money(&p.balance.income),
                money(&p.balance.card),
                money(&p.balance.debit),
                money(&p.balance.balance),
                money(&p.cumulative),
            ]
        })
        .collect();
    rows.push(vec![
        "Total".into(),
        money(&sum.income),
        money(&sum.card),
        money(&sum.debit),
        String::new(),
        money(&sum.final_balance),
    ]);
    println!(
        "{}",
        pretty_table(
            &["Month", "Income", "Card", "Debit", "Balance", "Cumulative"],
            rows,
        )
    );
    let critical: Vec<&str> = months
        .iter()
        .filter(|p| p.balance.balance < rust_decimal::Decimal::ZERO)
        .map(|p| p.balance.month.as_str())
        .collect();
    if !critical.is_empty() {
        println!("Negative months: {}", critical.join(", "));
    }
    Ok(())
}

fn compare(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let mut wanted: Vec<String> = sub
        .get_many::<String>("month")
        .into_iter()
        .flatten()
        .map(|s| parse_month(s))
        .collect::<Result<_>>()?;
    wanted.sort();
    wanted.dedup();
    let data = ctx.storage.load_finance()?;
    let months = projection(&wanted, &data, CardStatus::All);
    if !maybe_print_json(json_flag, jsonl_flag, &months)? {
        let best = months.iter().max_by(|a, b| a.balance.cmp(&b.balance));
        let worst = months.iter().min_by(|a, b| a.balance.cmp(&b.balance));
        let rows = months
            .iter()
            .map(|mb| {
                vec![
                    mb.month.clone(),
                    money(&mb.income),
                    money(&mb.card),
                    money(&mb.debit),
                    money(&mb.balance),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Income", "Card", "Debit", "Balance"], rows)
        );
        if let (Some(b), Some(w)) = (best, worst) {
            println!("Best: {} ({}), worst: {} ({})", b.month, money(&b.balance), w.month, money(&w.balance));
        }
    }
    Ok(())
}

/// Bill analysis for `--month` over the configured projection window.
/// Returns the analysis and the window length.
pub fn bill_report(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<(BillAnalysis, usize)> {
    let m = month_arg(sub, "month")?;
    let data = ctx.storage.load_finance()?;
    let window = projection_window(&m, ctx.config.projection_months, &data)?;
    Ok((bill_analysis(&m, &data, &window), window.len()))
}

fn bill(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let (a, window_len) = bill_report(ctx, sub)?;
    if maybe_print_json(json_flag, jsonl_flag, &a)? {
        return Ok(());
    }
    let ccy = &ctx.config.currency;
    println!(
        "{}",
        pretty_table(
            &["Month", "Bill", "Income", "Available", "Coverage %"],
            vec![vec![
                a.month.clone(),
                money(&a.bill_total),
                money(&a.income),
                money(&a.available),
                a.coverage_pct.map(|p| format!("{:.1}", p)).unwrap_or_else(|| "-".into()),
            ]],
        )
    );
    if a.can_pay {
        println!("The bill can be paid in full from this month's income.");
    } else {
        let missing = a.bill_total - a.available;
        match a.months_to_payoff {
            Some(n) => println!(
                "Short by {}; following months cover it in {} month(s).",
                fmt_money(&missing, ccy),
                n
            ),
            None => println!(
                "Short by {}; the next {} months do not cover it.",
                fmt_money(&missing, ccy),
                window_len
            ),
        }
    }
    Ok(())
}

fn installments(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = ctx.storage.load_finance()?;
    let months = match sub.get_one::<usize>("months") {
        Some(n) => projection_window(&current_month(), *n, &data)?,
        None => report::months_with_data(&data),
    };
    let status = installment_status(&months, &data);
    if !maybe_print_json(json_flag, jsonl_flag, &status)? {
        let rows = status
            .iter()
            .map(|s| vec![s.month.clone(), money(&s.paid), money(&s.open)])
            .collect();
        println!("{}", pretty_table(&["Month", "Paid", "Open"], rows));
    }
    Ok(())
}
