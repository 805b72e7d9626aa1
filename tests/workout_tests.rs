// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{date, leaf, local_ctx, workout};
use pocketlog::commands::workouts;
use pocketlog::workout::sessions::{exercise_names, history, insert, new_entry, sessions};
use pocketlog::workout::trend::{ProjectionOutcome, daily_best, linear_fit, project};

fn setup() -> Vec<pocketlog::models::Workout> {
    let mut log = Vec::new();
    for w in [
        workout(1, "Squat", "2025-11-01", 3, 5, 100.0),
        workout(2, "Squat", "2025-11-01", 2, 3, 110.0),
        workout(3, "Bench", "2025-11-02", 3, 8, 60.0),
        workout(4, "Squat", "2025-11-04", 3, 5, 105.0),
        workout(5, "Squat", "2025-11-07", 3, 6, 110.0),
    ] {
        insert(&mut log, w);
    }
    log
}

#[test]
fn log_stays_most_recent_first() {
    let log = setup();
    assert_eq!(log[0].date, date("2025-11-07"));
    assert_eq!(log.last().unwrap().date, date("2025-11-01"));
    assert_eq!(exercise_names(&log), ["Bench", "Squat"]);
}

#[test]
fn entries_on_the_same_day_form_one_session() {
    let log = setup();
    let s = sessions(&log);
    assert_eq!(s.len(), 4);
    let first_day = s
        .iter()
        .find(|x| x.exercise_name == "Squat" && x.date == date("2025-11-01"))
        .unwrap();
    assert_eq!(first_day.entries, 2);
    assert_eq!(first_day.total_sets, 5);
    assert_eq!(first_day.avg_reps, 4);
    assert_eq!(first_day.max_weight, 110.0);
}

#[test]
fn history_is_oldest_first() {
    let log = setup();
    let ids: Vec<i64> = history(&log, "Squat").iter().map(|w| w.id).collect();
    assert_eq!(ids, [1, 2, 4, 5]);
}

#[test]
fn daily_best_keeps_heaviest_entry() {
    let log = setup();
    let days = daily_best(&log, "Squat");
    assert_eq!(days.len(), 3);
    assert_eq!(days[0].weight, 110.0);
    assert_eq!(days[0].reps, 3);
    assert_eq!(days[2].date, date("2025-11-07"));
}

#[test]
fn linear_fit_matches_least_squares() {
    assert!(linear_fit(&[]).is_none());
    assert!(linear_fit(&[50.0]).is_none());
    let fit = linear_fit(&[100.0, 102.0, 104.0]).unwrap();
    assert!((fit.slope - 2.0).abs() < 1e-9);
    assert!((fit.intercept - 100.0).abs() < 1e-9);
    assert!((fit.at(3.0) - 106.0).abs() < 1e-9);

    let flat = linear_fit(&[80.0, 80.0]).unwrap();
    assert_eq!(flat.slope, 0.0);
}

#[test]
fn projection_needs_two_days() {
    let log = vec![
        workout(1, "Row", "2025-11-01", 3, 10, 40.0),
        workout(2, "Row", "2025-11-01", 3, 10, 45.0),
    ];
    assert_eq!(project(&log, "Row"), ProjectionOutcome::InsufficientData { sessions: 1 });
    assert_eq!(project(&log, "Deadlift"), ProjectionOutcome::InsufficientData { sessions: 0 });
}

#[test]
fn projection_extends_the_trend() {
    let log = vec![
        workout(1, "Press", "2025-11-01", 3, 8, 40.0),
        workout(2, "Press", "2025-11-03", 3, 8, 42.0),
        workout(3, "Press", "2025-11-05", 3, 8, 44.0),
    ];
    let ProjectionOutcome::Projected(p) = project(&log, "Press") else {
        panic!("expected a projection");
    };
    assert_eq!(p.sessions, 3);
    assert_eq!(p.current_weight, 44.0);
    assert!((p.projected_weight - 46.0).abs() < 1e-9);
    assert_eq!(p.suggested_reps, 8);
    assert!((p.projected_volume - 3.0 * 8.0 * 46.0).abs() < 1e-9);
    let pct = p.weight_change_pct.unwrap();
    assert!((pct - (2.0 / 44.0 * 100.0)).abs() < 1e-9);
}

#[test]
fn rejects_invalid_entries() {
    let d = date("2025-11-01");
    assert!(new_entry(1, "  ", 3, 5, 50.0, d).is_err());
    assert!(new_entry(1, "Squat", 0, 5, 50.0, d).is_err());
    assert!(new_entry(1, "Squat", 3, 0, 50.0, d).is_err());
    assert!(new_entry(1, "Squat", 3, 5, -1.0, d).is_err());
    assert!(new_entry(1, "Squat", 3, 5, f64::NAN, d).is_err());
    assert_eq!(new_entry(1, " Squat ", 3, 5, 0.0, d).unwrap().exercise_name, "Squat");
}

#[test]
fn cli_logs_and_projects() {
    let ctx = local_ctx();
    for (day, kg) in [("2025-11-01", "60"), ("2025-11-08", "62.5")] {
        let m = pocketlog::cli::build_cli().get_matches_from([
            "pocketlog", "workout", "add", "-e", "Bench", "--sets", "3", "--reps", "8", "--weight", kg,
            "--date", day,
        ]);
        let (_, area) = m.subcommand().unwrap();
        workouts::handle(&ctx, area).unwrap();
    }
    assert_eq!(ctx.storage.load_workouts().unwrap().len(), 2);

    let sub = leaf(&["workout", "project", "-e", "Bench"]);
    match workouts::projection(&ctx, &sub).unwrap() {
        ProjectionOutcome::Projected(p) => assert!((p.projected_weight - 65.0).abs() < 1e-9),
        other => panic!("unexpected {:?}", other),
    }
}
