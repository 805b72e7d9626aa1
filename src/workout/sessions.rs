// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::Workout;

pub fn new_entry(
    id: i64,
    exercise_name: &str,
    sets: u32,
    reps: u32,
    weight: f64,
    date: NaiveDate,
) -> Result<Workout> {
    let name = exercise_name.trim();
    if name.is_empty() {
        bail!("Exercise name must not be empty");
    }
    if sets == 0 || reps == 0 {
        bail!("Sets and reps must be at least 1");
    }
    if !weight.is_finite() || weight < 0.0 {
        bail!("Invalid weight {}", weight);
    }
    Ok(Workout {
        id,
        exercise_name: name.to_string(),
        sets,
        reps,
        weight,
        date,
    })
}

/// Inserts an entry keeping the log ordered most recent first.
pub fn insert(log: &mut Vec<Workout>, entry: Workout) {
    log.push(entry);
    log.sort_by(|a, b| b.date.cmp(&a.date));
}

/// One exercise on one day, possibly logged as several entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub exercise_name: String,
    pub date: NaiveDate,
    pub total_sets: u32,
    pub avg_reps: u32,
    pub max_weight: f64,
    pub entries: usize,
}

/// Groups the log by (exercise, date) in log order.
pub fn sessions(log: &[Workout]) -> Vec<Session> {
    let mut keys: Vec<(&str, NaiveDate)> = Vec::new();
    for w in log {
        let key = (w.exercise_name.as_str(), w.date);
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys.into_iter()
        .map(|(name, date)| {
            let group: Vec<&Workout> = log
                .iter()
                .filter(|w| w.exercise_name == name && w.date == date)
                .collect();
            let total_sets = group.iter().map(|w| w.sets).sum();
            let reps: u32 = group.iter().map(|w| w.reps).sum();
            let avg_reps = (reps as f64 / group.len() as f64).round() as u32;
            let max_weight = group.iter().map(|w| w.weight).fold(f64::MIN, f64::max);
            Session {
                exercise_name: name.to_string(),
                date,
                total_sets,
                avg_reps,
                max_weight,
                entries: group.len(),
            }
        })
        .collect()
}

pub fn exercise_names(log: &[Workout]) -> Vec<String> {
    let set: BTreeSet<&str> = log.iter().map(|w| w.exercise_name.as_str()).collect();
    set.into_iter().map(str::to_string).collect()
}

/// Removes every entry of the session. Returns how many were removed.
pub fn remove_session(log: &mut Vec<Workout>, exercise_name: &str, date: NaiveDate) -> usize {
    let before = log.len();
    log.retain(|w| !(w.exercise_name == exercise_name && w.date == date));
    before - log.len()
}

/// Entries for one exercise, oldest first.
pub fn history<'a>(log: &'a [Workout], exercise_name: &str) -> Vec<&'a Workout> {
    let mut out: Vec<&Workout> = log
        .iter()
        .filter(|w| w.exercise_name == exercise_name)
        .collect();
    out.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    out
}
