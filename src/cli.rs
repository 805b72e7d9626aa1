// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn list_filters(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("search")
            .long("search")
            .short('s')
            .help("Case-insensitive text in the description"),
    )
    .arg(Arg::new("min").long("min").help("Smallest amount to show"))
    .arg(Arg::new("max").long("max").help("Largest amount to show"))
}

fn status_arg() -> Arg {
    Arg::new("status")
        .long("status")
        .value_parser(["all", "paid", "open"])
        .default_value("all")
        .help("Which card installments to count")
}

/// income and debit share the same shape: amount, date, reference month.
fn entry_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Record an entry")
                .arg(Arg::new("description").long("description").short('d').required(true))
                .arg(Arg::new("amount").long("amount").short('a').required(true))
                .arg(
                    Arg::new("date")
                        .long("date")
                        .help("YYYY-MM-DD (default: yesterday)"),
                )
                .arg(
                    Arg::new("month")
                        .long("month")
                        .help("Reference month YYYY-MM (default: current month)"),
                ),
        )
        .subcommand(json_flags(list_filters(
            Command::new("list")
                .about("List entries")
                .arg(Arg::new("month").long("month").help("Only this reference month")),
        )))
        .subcommand(
            Command::new("edit")
                .about("Change an entry")
                .arg(Arg::new("id").required(true))
                .arg(Arg::new("description").long("description").short('d'))
                .arg(Arg::new("amount").long("amount").short('a'))
                .arg(Arg::new("date").long("date"))
                .arg(Arg::new("month").long("month")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete an entry")
                .arg(Arg::new("id").required(true)),
        )
}

fn card_command() -> Command {
    Command::new("card")
        .about("Credit-card purchases split into monthly installments")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Record a purchase and generate its installments")
                .arg(Arg::new("description").long("description").short('d').required(true))
                .arg(Arg::new("total").long("total").short('t').required(true))
                .arg(
                    Arg::new("installments")
                        .long("installments")
                        .short('n')
                        .value_parser(value_parser!(u32))
                        .default_value("1"),
                )
                .arg(
                    Arg::new("start")
                        .long("start")
                        .help("Date of the first installment (default: yesterday)"),
                ),
        )
        .subcommand(json_flags(list_filters(
            Command::new("list")
                .about("List installments")
                .arg(Arg::new("month").long("month"))
                .arg(status_arg()),
        )))
        .subcommand(
            Command::new("pay")
                .about("Toggle the paid flag of one installment")
                .arg(Arg::new("id").required(true)),
        )
        .subcommand(
            Command::new("edit")
                .about("Change one installment")
                .arg(Arg::new("id").required(true))
                .arg(Arg::new("description").long("description").short('d'))
                .arg(Arg::new("total").long("total").short('t'))
                .arg(
                    Arg::new("installments")
                        .long("installments")
                        .short('n')
                        .value_parser(value_parser!(u32)),
                )
                .arg(Arg::new("start").long("start")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a purchase and all of its installments")
                .arg(Arg::new("id").required(true)),
        )
}

fn report_command() -> Command {
    Command::new("report")
        .about("Monthly balances, projections and card bill checks")
        .subcommand_required(true)
        .subcommand(json_flags(
            Command::new("month")
                .about("Balance for one month")
                .arg(Arg::new("month").long("month").help("YYYY-MM (default: current)"))
                .arg(status_arg()),
        ))
        .subcommand(json_flags(
            Command::new("projection")
                .about("Balances from the current month forward, with running total")
                .arg(
                    Arg::new("months")
                        .long("months")
                        .value_parser(value_parser!(usize))
                        .help("Months ahead (default from config)"),
                )
                .arg(Arg::new("from").long("from").help("First month (default: current)"))
                .arg(status_arg()),
        ))
        .subcommand(json_flags(
            Command::new("compare")
                .about("Side-by-side balances of chosen months")
                .arg(
                    Arg::new("month")
                        .long("month")
                        .action(ArgAction::Append)
                        .required(true),
                ),
        ))
        .subcommand(json_flags(
            Command::new("bill")
                .about("Can the card bill be paid from the month's income?")
                .arg(Arg::new("month").long("month").help("YYYY-MM (default: current)")),
        ))
        .subcommand(json_flags(
            Command::new("installments")
                .about("Paid and open installment totals per month")
                .arg(
                    Arg::new("months")
                        .long("months")
                        .value_parser(value_parser!(usize)),
                ),
        ))
}

fn workout_command() -> Command {
    Command::new("workout")
        .about("Workout log and weight projections")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Log an exercise")
                .arg(Arg::new("exercise").long("exercise").short('e').required(true))
                .arg(
                    Arg::new("sets")
                        .long("sets")
                        .value_parser(value_parser!(u32))
                        .required(true),
                )
                .arg(
                    Arg::new("reps")
                        .long("reps")
                        .value_parser(value_parser!(u32))
                        .required(true),
                )
                .arg(
                    Arg::new("weight")
                        .long("weight")
                        .value_parser(value_parser!(f64))
                        .required(true),
                )
                .arg(Arg::new("date").long("date").help("YYYY-MM-DD (default: today)")),
        )
        .subcommand(json_flags(Command::new("list").about("Sessions, most recent first")))
        .subcommand(Command::new("exercises").about("Known exercise names"))
        .subcommand(json_flags(
            Command::new("history")
                .about("Best weight per day for one exercise")
                .arg(Arg::new("exercise").long("exercise").short('e').required(true)),
        ))
        .subcommand(json_flags(
            Command::new("project")
                .about("Project the next session's weight")
                .arg(Arg::new("exercise").long("exercise").short('e').required(true)),
        ))
        .subcommand(
            Command::new("rm")
                .about("Delete every entry of one exercise on one day")
                .arg(Arg::new("exercise").long("exercise").short('e').required(true))
                .arg(Arg::new("date").long("date").required(true)),
        )
}

fn data_command() -> Command {
    Command::new("data")
        .about("Bulk export, import and cleanup of finance records")
        .subcommand_required(true)
        .subcommand(
            Command::new("export")
                .about("Export finance records")
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("json")
                        .help("csv | json"),
                )
                .arg(Arg::new("out").long("out").required(true)),
        )
        .subcommand(
            Command::new("import")
                .about("Merge a JSON export into the store (upsert by id)")
                .arg(Arg::new("path").long("path").required(true)),
        )
        .subcommand(
            Command::new("purge")
                .about("Delete every record with a reference month before --before")
                .arg(Arg::new("before").long("before").required(true)),
        )
        .subcommand(
            Command::new("clear")
                .about("Delete ALL finance records, locally and remotely")
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .action(ArgAction::SetTrue)
                        .help("Confirm"),
                ),
        )
}

pub fn build_cli() -> Command {
    Command::new("pocketlog")
        .version(clap::crate_version!())
        .about("Card installments, monthly projections and a workout log")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Settings file (default: platform config dir)"),
        )
        .subcommand(Command::new("init").about("Create the local cache and show settings"))
        .subcommand(entry_command("income", "Income records"))
        .subcommand(entry_command("debit", "Debit expenses"))
        .subcommand(card_command())
        .subcommand(report_command())
        .subcommand(workout_command())
        .subcommand(data_command())
        .subcommand(Command::new("doctor").about("Check settings, remote reachability and data"))
}
