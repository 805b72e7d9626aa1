// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::AppContext;
use crate::utils::{maybe_print_json, new_id, parse_date, pretty_table, required, today};
use crate::workout::sessions::{exercise_names, new_entry, sessions};
use crate::workout::trend::{ProjectionOutcome, daily_best, project};
use anyhow::{Result, bail};

pub fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ctx, sub)?,
        Some(("list", sub)) => list(ctx, sub)?,
        Some(("exercises", _)) => exercises(ctx)?,
        Some(("history", sub)) => history(ctx, sub)?,
        Some(("project", sub)) => {
            projection(ctx, sub)?;
        }
        Some(("rm", sub)) => rm(ctx, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => today(),
    };
    let entry = new_entry(
        new_id(),
        required(sub, "exercise")?,
        *sub.get_one::<u32>("sets").unwrap_or(&0),
        *sub.get_one::<u32>("reps").unwrap_or(&0),
        *sub.get_one::<f64>("weight").unwrap_or(&-1.0),
        date,
    )?;
    ctx.storage.add_workout(&entry)?;
    println!(
        "Logged {}: {}x{} @ {} kg on {}",
        entry.exercise_name, entry.sets, entry.reps, entry.weight, entry.date
    );
    Ok(())
}

fn list(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let log = ctx.storage.load_workouts()?;
    let data = sessions(&log);
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        if data.is_empty() {
            println!("No workouts logged yet.");
            return Ok(());
        }
        let rows = data
            .iter()
            .map(|s| {
                vec![
                    s.date.to_string(),
                    s.exercise_name.clone(),
                    s.total_sets.to_string(),
                    s.avg_reps.to_string(),
                    format!("{} kg", s.max_weight),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Exercise", "Sets", "Reps", "Max weight"], rows)
        );
    }
    Ok(())
}

fn exercises(ctx: &AppContext) -> Result<()> {
    let log = ctx.storage.load_workouts()?;
    for name in exercise_names(&log) {
        println!("{}", name);
    }
    Ok(())
}

fn history(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let name = required(sub, "exercise")?.trim();
    let log = ctx.storage.load_workouts()?;
    let days = daily_best(&log, name);
    if days.is_empty() {
        bail!("No entries for exercise '{}'", name);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &days)? {
        let rows = days
            .iter()
            .map(|d| vec![d.date.to_string(), format!("{} kg", d.weight), d.reps.to_string()])
            .collect();
        println!("{}", pretty_table(&["Date", "Weight", "Reps"], rows));
    }
    Ok(())
}

pub fn projection(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<ProjectionOutcome> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let name = required(sub, "exercise")?.trim();
    let log = ctx.storage.load_workouts()?;
    let outcome = project(&log, name);
    if maybe_print_json(json_flag, jsonl_flag, &outcome)? {
        return Ok(outcome);
    }
    match &outcome {
        ProjectionOutcome::InsufficientData { sessions } => {
            println!(
                "Insufficient data: {} has {} session(s); at least 2 are needed.",
                name, sessions
            );
        }
        ProjectionOutcome::Projected(p) => {
            let pct = |v: Option<f64>| match v {
                Some(x) => format!("{}{:.1}%", if x > 0.0 { "+" } else { "" }, x),
                None => "-".into(),
            };
            println!(
                "{}",
                pretty_table(
                    &["Exercise", "Current", "Projected", "Change", "Reps", "Volume", "Volume change"],
                    vec![vec![
                        p.exercise_name.clone(),
                        format!("{:.1} kg", p.current_weight),
                        format!("{:.1} kg", p.projected_weight),
                        pct(p.weight_change_pct),
                        p.suggested_reps.to_string(),
                        format!("{:.0} kg", p.projected_volume),
                        pct(p.volume_change_pct),
                    ]],
                )
            );
        }
    }
    Ok(outcome)
}

fn rm(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let name = required(sub, "exercise")?.trim();
    let date = parse_date(required(sub, "date")?)?;
    let log = ctx.storage.load_workouts()?;
    let removed = log
        .iter()
        .filter(|w| w.exercise_name == name && w.date == date)
        .count();
    if removed == 0 {
        bail!("No '{}' session on {}", name, date);
    }
    ctx.storage.remove_workout_session(name, date)?;
    println!("Removed {} entries of {} on {}", removed, name, date);
    Ok(())
}
