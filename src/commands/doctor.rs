// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::{AppContext, RemoteStatus};
use crate::db::{FINANCE_KEY, WORKOUTS_KEY};
use crate::finance::installments::{base_id, schedule_drift};
use crate::models::{CardInstallment, FinanceData};
use crate::utils::{add_months, month_of, pretty_table};
use anyhow::Result;
use std::collections::BTreeMap;

pub fn handle(ctx: &AppContext) -> Result<()> {
    println!("Remote store: {}", ctx.remote_status);
    for (key, written) in cache_freshness(ctx)? {
        match written {
            Some(ts) => println!("Local cache '{}' last written {}", key, ts),
            None => println!("Local cache '{}' empty", key),
        }
    }

    let rows: Vec<Vec<String>> = issues(ctx)?
        .into_iter()
        .map(|(kind, detail)| vec![kind, detail])
        .collect();
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Last write time of each local cache document.
pub fn cache_freshness(ctx: &AppContext) -> Result<Vec<(&'static str, Option<String>)>> {
    [FINANCE_KEY, WORKOUTS_KEY]
        .into_iter()
        .map(|key| -> Result<_> { Ok((key, ctx.storage.local().updated_at(key)?)) })
        .collect()
}

/// Remote reachability problems followed by installment schedule issues.
pub fn issues(ctx: &AppContext) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();

    if let Some(remote) = ctx.storage.remote() {
        if let Err(e) = remote.ping() {
            let kind = if e.is_connection() {
                "remote_unreachable"
            } else {
                "remote_error"
            };
            out.push((kind.to_string(), e.to_string()));
        }
    } else if let RemoteStatus::Unavailable(why) = &ctx.remote_status {
        out.push(("remote_misconfigured".to_string(), why.clone()));
    }

    let data = ctx.storage.load_finance()?;
    out.extend(schedule_issues(&data));
    Ok(out)
}

/// Inconsistencies inside each purchase's installment group.
pub fn schedule_issues(data: &FinanceData) -> Vec<(String, String)> {
    let mut groups: BTreeMap<&str, Vec<&CardInstallment>> = BTreeMap::new();
    for c in &data.card_installments {
        groups.entry(base_id(&c.id)).or_default().push(c);
    }

    let mut out = Vec::new();
    for (base, mut group) in groups {
        group.sort_by_key(|c| c.installment_number);
        let expected = group[0].installments;
        let present: Vec<u32> = group.iter().map(|c| c.installment_number).collect();
        let missing: Vec<String> = (1..=expected)
            .filter(|n| !present.contains(n))
            .map(|n| n.to_string())
            .collect();
        if !missing.is_empty() {
            out.push((
                "installment_gap".to_string(),
                format!("{} missing {}/{}", base, missing.join(","), expected),
            ));
        }
        for c in &group {
            let first = month_of(c.start_date);
            let due = add_months(&first, c.installment_number.saturating_sub(1)).ok();
            if due.as_deref() != Some(c.month.as_str()) {
                out.push((
                    "month_mismatch".to_string(),
                    format!(
                        "{} is in {} but installment {} from {} falls in {}",
                        c.id,
                        c.month,
                        c.installment_number,
                        c.start_date,
                        due.unwrap_or_else(|| "?".into())
                    ),
                ));
            }
        }
        if missing.is_empty() {
            let owned: Vec<CardInstallment> = group.iter().map(|c| (*c).clone()).collect();
            let drift = schedule_drift(&owned);
            if !drift.is_zero() {
                out.push((
                    "rounding_drift".to_string(),
                    format!("{} total differs from installments by {:.2}", base, drift),
                ));
            }
        }
    }
    out
}
