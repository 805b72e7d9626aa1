// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use pocketlog::commands::entries::Kind;
use pocketlog::{cli, commands, config, context::AppContext};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "pocketlog=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let cfg = config::load(matches.get_one::<String>("config").map(Path::new))?;
    let ctx = AppContext::init(cfg)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Local cache ready");
            println!("Remote store: {}", ctx.remote_status);
            println!("Currency: {}", ctx.config.currency);
            if let Some(m) = &ctx.config.retain_from {
                println!("Keeping records from {} on", m);
            }
        }
        Some(("income", sub)) => commands::entries::handle(&ctx, Kind::Income, sub)?,
        Some(("debit", sub)) => commands::entries::handle(&ctx, Kind::Debit, sub)?,
        Some(("card", sub)) => commands::card::handle(&ctx, sub)?,
        Some(("report", sub)) => commands::reports::handle(&ctx, sub)?,
        Some(("workout", sub)) => commands::workouts::handle(&ctx, sub)?,
        Some(("data", sub)) => commands::data::handle(&ctx, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&ctx)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
