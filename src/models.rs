// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub month: String, // YYYY-MM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One parcel of a credit-card purchase. All parcels of a purchase share the
/// id prefix `<purchase>-` and the same `start_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardInstallment {
    pub id: String,
    pub description: String,
    pub total_amount: Decimal,
    pub installments: u32,
    pub installment_number: u32,
    pub installment_amount: Decimal,
    pub start_date: NaiveDate,
    pub month: String, // YYYY-MM
    #[serde(default)]
    pub paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl CardInstallment {
    pub fn due_date(&self) -> NaiveDate {
        self.start_date
            .checked_add_months(Months::new(self.installment_number.saturating_sub(1)))
            .unwrap_or(self.start_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebitExpense {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub month: String, // YYYY-MM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinanceData {
    #[serde(default)]
    pub incomes: Vec<Income>,
    #[serde(default)]
    pub card_installments: Vec<CardInstallment>,
    #[serde(default)]
    pub debit_expenses: Vec<DebitExpense>,
}

impl FinanceData {
    pub fn is_empty(&self) -> bool {
        self.incomes.is_empty() && self.card_installments.is_empty() && self.debit_expenses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.incomes.len() + self.card_installments.len() + self.debit_expenses.len()
    }

    /// Keeps only records whose reference month is `from` or later.
    /// Returns how many records were dropped.
    pub fn retain_from(&mut self, from: &str) -> usize {
        let before = self.len();
        self.incomes.retain(|r| r.month.as_str() >= from);
        self.card_installments.retain(|r| r.month.as_str() >= from);
        self.debit_expenses.retain(|r| r.month.as_str() >= from);
        before - self.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBalance {
    pub month: String,
    pub income: Decimal,
    pub card: Decimal,
    pub debit: Decimal,
    pub balance: Decimal,
}

impl MonthlyBalance {
    pub fn zero(month: &str) -> Self {
        Self {
            month: month.to_string(),
            income: Decimal::ZERO,
            card: Decimal::ZERO,
            debit: Decimal::ZERO,
            balance: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: i64,
    pub exercise_name: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
    pub date: NaiveDate,
}
