// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local, Months, NaiveDate};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

const UA: &str = concat!("pocketlog/", env!("CARGO_PKG_VERSION"));

pub fn http_client(timeout_secs: u64) -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Validates a `YYYY-MM` key and returns it zero-padded.
pub fn parse_month(s: &str) -> Result<String> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(month_of(first))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Largest amount a single record may carry.
pub fn max_amount() -> Decimal {
    Decimal::from(1_000_000_000_000i64)
}

pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d <= Decimal::ZERO {
        bail!("Amount must be positive, got {}", d);
    }
    if d > max_amount() {
        bail!("Amount {} exceeds the limit of {}", d, max_amount());
    }
    Ok(d)
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, d.round_dp(2))
}

pub fn month_of(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

pub fn add_months(month: &str, n: u32) -> Result<String> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", month))?;
    let shifted = first
        .checked_add_months(Months::new(n))
        .with_context(|| format!("Month {} + {} is out of range", month, n))?;
    Ok(month_of(shifted))
}

/// `n` consecutive month keys starting at `from` (inclusive).
pub fn next_months(from: &str, n: usize) -> Result<Vec<String>> {
    (0..n).map(|i| add_months(from, i as u32)).collect()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn current_month() -> String {
    month_of(today())
}

/// Default entry date: the day before today.
pub fn yesterday() -> NaiveDate {
    today().pred_opt().unwrap_or_else(today)
}

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Millisecond timestamp used as a record identifier, strictly increasing
/// within the process.
pub fn new_id() -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    let prev = LAST_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
        .unwrap_or(now - 1);
    now.max(prev + 1)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Description search and amount bounds shared by the list commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub search: Option<String>,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl ListFilter {
    pub fn from_matches(m: &clap::ArgMatches) -> Result<Self> {
        let f = Self {
            search: m
                .get_one::<String>("search")
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
            min: m.get_one::<String>("min").map(|s| parse_decimal(s)).transpose()?,
            max: m.get_one::<String>("max").map(|s| parse_decimal(s)).transpose()?,
        };
        if let (Some(lo), Some(hi)) = (f.min, f.max) {
            if lo > hi {
                bail!("--min {} is greater than --max {}", lo, hi);
            }
        }
        Ok(f)
    }

    /// Case-insensitive substring match on the description, inclusive bounds
    /// on the amount.
    pub fn matches(&self, description: &str, amount: Decimal) -> bool {
        if let Some(q) = &self.search {
            if !description.to_lowercase().contains(q.as_str()) {
                return false;
            }
        }
        self.min.is_none_or(|lo| amount >= lo) && self.max.is_none_or(|hi| amount <= hi)
    }
}

/// Fetches an argument the CLI declares as required.
pub fn required<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a String> {
    m.get_one::<String>(name)
        .with_context(|| format!("Missing required argument --{}", name))
}
