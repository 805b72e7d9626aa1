// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Month-keyed aggregation.
//!
//! Every figure here is re-derived from the three collections on demand.
//! Months are matched by exact `YYYY-MM` string equality and a month with no
//! records always yields a zero-valued entry rather than being skipped.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::{CardInstallment, FinanceData, MonthlyBalance};
use crate::utils::next_months;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardStatus {
    #[default]
    All,
    Paid,
    Open,
}

impl CardStatus {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(CardStatus::All),
            "paid" => Ok(CardStatus::Paid),
            "open" => Ok(CardStatus::Open),
            other => anyhow::bail!("Unknown card status '{}' (use all|paid|open)", other),
        }
    }

    pub fn matches(&self, c: &CardInstallment) -> bool {
        match self {
            CardStatus::All => true,
            CardStatus::Paid => c.paid,
            CardStatus::Open => !c.paid,
        }
    }
}

pub fn monthly_balance(month: &str, data: &FinanceData, status: CardStatus) -> MonthlyBalance {
    let income: Decimal = data
        .incomes
        .iter()
        .filter(|r| r.month == month)
        .map(|r| r.amount)
        .sum();
    let card: Decimal = data
        .card_installments
        .iter()
        .filter(|c| c.month == month && status.matches(c))
        .map(|c| c.installment_amount)
        .sum();
    let debit: Decimal = data
        .debit_expenses
        .iter()
        .filter(|d| d.month == month)
        .map(|d| d.amount)
        .sum();
    MonthlyBalance {
        month: month.to_string(),
        income,
        card,
        debit,
        balance: income - card - debit,
    }
}

pub fn projection(months: &[String], data: &FinanceData, status: CardStatus) -> Vec<MonthlyBalance> {
    months
        .iter()
        .map(|m| monthly_balance(m, data, status))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedMonth {
    #[serde(flatten)]
    pub balance: MonthlyBalance,
    pub cumulative: Decimal,
}

pub fn with_running_balance(months: Vec<MonthlyBalance>) -> Vec<ProjectedMonth> {
    let mut acc = Decimal::ZERO;
    months
        .into_iter()
        .map(|balance| {
            acc += balance.balance;
            ProjectedMonth {
                balance,
                cumulative: acc,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub income: Decimal,
    pub card: Decimal,
    pub debit: Decimal,
    pub final_balance: Decimal,
}

pub fn totals(months: &[ProjectedMonth]) -> Totals {
    Totals {
        income: months.iter().map(|m| m.balance.income).sum(),
        card: months.iter().map(|m| m.balance.card).sum(),
        debit: months.iter().map(|m| m.balance.debit).sum(),
        final_balance: months.last().map(|m| m.cumulative).unwrap_or(Decimal::ZERO),
    }
}

pub fn months_with_data(data: &FinanceData) -> Vec<String> {
    let set: BTreeSet<&str> = data
        .incomes
        .iter()
        .map(|r| r.month.as_str())
        .chain(data.card_installments.iter().map(|c| c.month.as_str()))
        .chain(data.debit_expenses.iter().map(|d| d.month.as_str()))
        .collect();
    set.into_iter().map(str::to_string).collect()
}

/// The next `n` months from `current` plus every month with data at or after
/// `current`, sorted and de-duplicated.
pub fn projection_window(current: &str, n: usize, data: &FinanceData) -> Result<Vec<String>> {
    let mut set: BTreeSet<String> = next_months(current, n)?.into_iter().collect();
    set.extend(
        months_with_data(data)
            .into_iter()
            .filter(|m| m.as_str() >= current),
    );
    Ok(set.into_iter().collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillAnalysis {
    pub month: String,
    pub bill_total: Decimal,
    pub income: Decimal,
    /// Income left after debit expenses.
    pub available: Decimal,
    pub can_pay: bool,
    /// `available / bill_total` in percent; `None` without a bill or when
    /// the ratio does not fit a `Decimal`.
    pub coverage_pct: Option<Decimal>,
    /// Months of future surplus needed to cover the shortfall. `Some(0)` when
    /// the bill is covered, `None` when the window never covers it.
    pub months_to_payoff: Option<u32>,
}

pub fn bill_analysis(month: &str, data: &FinanceData, window: &[String]) -> BillAnalysis {
    let mb = monthly_balance(month, data, CardStatus::All);
    let available = mb.income - mb.debit;
    let can_pay = available >= mb.card;
    let coverage_pct = available
        .checked_div(mb.card)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .map(|p| p.round_dp(2));
    let months_to_payoff = if can_pay {
        Some(0)
    } else {
        let mut shortfall = mb.card - available;
        let mut needed = None;
        let later = window.iter().filter(|m| m.as_str() > month);
        for (i, m) in later.enumerate() {
            let surplus = monthly_balance(m, data, CardStatus::All).balance;
            if surplus > Decimal::ZERO {
                shortfall -= surplus;
            }
            if shortfall <= Decimal::ZERO {
                needed = Some(i as u32 + 1);
                break;
            }
        }
        needed
    };
    BillAnalysis {
        month: month.to_string(),
        bill_total: mb.card,
        income: mb.income,
        available,
        can_pay,
        coverage_pct,
        months_to_payoff,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstallmentStatus {
    pub month: String,
    pub paid: Decimal,
    pub open: Decimal,
}

pub fn installment_status(months: &[String], data: &FinanceData) -> Vec<InstallmentStatus> {
    months
        .iter()
        .map(|m| {
            let (paid, open) = data
                .card_installments
                .iter()
                .filter(|c| &c.month == m)
                .fold((Decimal::ZERO, Decimal::ZERO), |(p, o), c| {
                    if c.paid {
                        (p + c.installment_amount, o)
                    } else {
                        (p, o + c.installment_amount)
                    }
                });
            InstallmentStatus {
                month: m.clone(),
                paid,
                open,
            }
        })
        .filter(|s| !s.paid.is_zero() || !s.open.is_zero())
        .collect()
}
