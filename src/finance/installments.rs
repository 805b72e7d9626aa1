// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::CardInstallment;
use crate::utils::month_of;

/// A card purchase before it is split into installments.
#[derive(Debug, Clone)]
pub struct Purchase {
    pub description: String,
    pub total_amount: Decimal,
    pub installments: u32,
    pub start_date: NaiveDate,
}

pub fn round_cents(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `total / count` rounded to cents. The remainder is not redistributed.
pub fn installment_amount(total: Decimal, count: u32) -> Decimal {
    if count == 0 {
        return total;
    }
    round_cents(total / Decimal::from(count))
}

/// Splits a purchase into one record per month, starting at the month of
/// `start_date`. Installment `i` (1-based) falls in start month + (i - 1).
pub fn expand(purchase: &Purchase, base_id: &str, max_installments: u32) -> Result<Vec<CardInstallment>> {
    if purchase.description.trim().is_empty() {
        bail!("Description must not be empty");
    }
    if purchase.total_amount <= Decimal::ZERO {
        bail!("Total amount must be positive, got {}", purchase.total_amount);
    }
    if purchase.installments == 0 || purchase.installments > max_installments {
        bail!(
            "Installment count must be between 1 and {}, got {}",
            max_installments,
            purchase.installments
        );
    }
    let amount = installment_amount(purchase.total_amount, purchase.installments);
    let mut out = Vec::with_capacity(purchase.installments as usize);
    for i in 1..=purchase.installments {
        let due = purchase
            .start_date
            .checked_add_months(Months::new(i - 1))
            .ok_or_else(|| anyhow::anyhow!("Installment {} falls outside the calendar", i))?;
        out.push(CardInstallment {
            id: format!("{}-{}", base_id, i),
            description: purchase.description.trim().to_string(),
            total_amount: purchase.total_amount,
            installments: purchase.installments,
            installment_number: i,
            installment_amount: amount,
            start_date: purchase.start_date,
            month: month_of(due),
            paid: false,
            created_at: None,
        });
    }
    Ok(out)
}

/// Purchase identifier of an installment id (`<base>-<index>`).
pub fn base_id(id: &str) -> &str {
    match id.rsplit_once('-') {
        Some((base, idx)) if !base.is_empty() && idx.chars().all(|c| c.is_ascii_digit()) => base,
        _ => id,
    }
}

pub fn same_purchase(id: &str, base: &str) -> bool {
    id.strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|idx| !idx.is_empty() && idx.chars().all(|c| c.is_ascii_digit()))
}

/// Difference between the purchase total and the sum of its installments.
pub fn schedule_drift(installments: &[CardInstallment]) -> Decimal {
    let Some(first) = installments.first() else {
        return Decimal::ZERO;
    };
    let sum: Decimal = installments.iter().map(|i| i.installment_amount).sum();
    first.total_amount - sum
}
