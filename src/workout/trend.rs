// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Weight trend per exercise.
//!
//! Each day contributes its heaviest entry; an ordinary least-squares line
//! is fitted over the 0-indexed session sequence and evaluated one step past
//! the last session. Advisory only: no outlier handling, no confidence bounds.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::Workout;
use crate::workout::sessions::history;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBest {
    pub date: NaiveDate,
    pub weight: f64,
    pub reps: u32,
}

/// Heaviest entry per date, oldest date first. Ties keep the earlier entry.
pub fn daily_best(log: &[Workout], exercise_name: &str) -> Vec<DailyBest> {
    let mut by_day: BTreeMap<NaiveDate, DailyBest> = BTreeMap::new();
    for w in history(log, exercise_name) {
        let replace = by_day.get(&w.date).is_none_or(|b| w.weight > b.weight);
        if replace {
            by_day.insert(
                w.date,
                DailyBest {
                    date: w.date,
                    weight: w.weight,
                    reps: w.reps,
                },
            );
        }
    }
    by_day.into_values().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// OLS fit of `ys[i]` over `i`. `None` with fewer than two points.
pub fn linear_fit(ys: &[f64]) -> Option<LinearFit> {
    let n = ys.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let x_mean = (0..n).map(|i| i as f64).sum::<f64>() / nf;
    let y_mean = ys.iter().sum::<f64>() / nf;
    let (mut num, mut den) = (0.0, 0.0);
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    let slope = if den != 0.0 { num / den } else { 0.0 };
    Some(LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub exercise_name: String,
    pub sessions: usize,
    pub current_weight: f64,
    pub projected_weight: f64,
    pub weight_change_pct: Option<f64>,
    pub suggested_reps: u32,
    pub projected_volume: f64,
    pub volume_change_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProjectionOutcome {
    InsufficientData { sessions: usize },
    Projected(Projection),
}

fn pct_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        None
    } else {
        Some((to - from) / from * 100.0)
    }
}

pub fn project(log: &[Workout], exercise_name: &str) -> ProjectionOutcome {
    let days = daily_best(log, exercise_name);
    let weights: Vec<f64> = days.iter().map(|d| d.weight).collect();
    let Some(fit) = linear_fit(&weights) else {
        return ProjectionOutcome::InsufficientData {
            sessions: days.len(),
        };
    };
    let entries = history(log, exercise_name);
    let Some(last_entry) = entries.last() else {
        return ProjectionOutcome::InsufficientData { sessions: 0 };
    };

    let n = weights.len();
    let projected_weight = fit.at(n as f64);
    let current_weight = weights[n - 1];
    let suggested_reps =
        (days.iter().map(|d| d.reps as f64).sum::<f64>() / n as f64).round() as u32;
    let last_volume = last_entry.sets as f64 * last_entry.reps as f64 * last_entry.weight;
    let projected_volume = last_entry.sets as f64 * suggested_reps as f64 * projected_weight;

    ProjectionOutcome::Projected(Projection {
        exercise_name: exercise_name.to_string(),
        sessions: n,
        current_weight,
        projected_weight,
        weight_change_pct: pct_change(current_weight, projected_weight),
        suggested_reps,
        projected_volume,
        volume_change_pct: pct_change(last_volume, projected_volume),
    })
}
