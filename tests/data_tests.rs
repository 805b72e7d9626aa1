// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{area, card, d, debit, income, leaf, local_ctx, remote_ctx};
use pocketlog::commands::doctor::{self, schedule_issues};
use pocketlog::commands::entries::{self, Kind};
use pocketlog::commands::{card as card_cmd, data, reports};
use pocketlog::finance::installments::{Purchase, expand};
use pocketlog::models::FinanceData;
use pocketlog::remote::Table;

fn setup() -> pocketlog::context::AppContext {
    let ctx = local_ctx();
    ctx.storage.add_income(&income("i1", "2025-11", "3000")).unwrap();
    ctx.storage.add_income(&income("i2", "2025-12", "3200")).unwrap();
    ctx.storage.add_debit(&debit("d1", "2025-11", "250.50")).unwrap();
    ctx.storage.add_card_installment(&card("c1-1", "2025-11", "99.90", true)).unwrap();
    ctx
}

#[test]
fn entry_add_and_list_by_month() {
    let ctx = local_ctx();
    for (desc, amount, month) in [("Salary", "5000", "2025-11"), ("Bonus", "800", "2025-12")] {
        let m = area(&["income", "add", "-d", desc, "-a", amount, "--date", "2025-11-03", "--month", month]);
        entries::handle(&ctx, Kind::Income, &m).unwrap();
    }
    let rows = entries::query_rows(&ctx, Kind::Income, &leaf(&["income", "list", "--month", "2025-11"])).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].description, "Salary");
    assert_eq!(rows[0].amount, d("5000"));

    let all = entries::query_rows(&ctx, Kind::Income, &leaf(&["income", "list"])).unwrap();
    assert_eq!(all[0].month, "2025-12");
    assert!(entries::query_rows(&ctx, Kind::Debit, &leaf(&["debit", "list"])).unwrap().is_empty());
}

#[test]
fn entry_add_rejects_bad_amounts() {
    let ctx = local_ctx();
    let m = area(&["debit", "add", "-d", "Rent", "--amount=-10"]);
    assert!(entries::handle(&ctx, Kind::Debit, &m).is_err());
    let m = area(&["debit", "add", "-d", "Rent", "-a", "abc"]);
    assert!(entries::handle(&ctx, Kind::Debit, &m).is_err());
    assert!(ctx.storage.load_finance().unwrap().is_empty());
}

#[test]
fn entry_edit_and_remove() {
    let ctx = setup();
    let m = area(&["debit", "edit", "d1", "-a", "300", "--month", "2025-12"]);
    entries::handle(&ctx, Kind::Debit, &m).unwrap();
    let data = ctx.storage.load_finance().unwrap();
    assert_eq!(data.debit_expenses[0].amount, d("300"));
    assert_eq!(data.debit_expenses[0].month, "2025-12");

    assert!(entries::handle(&ctx, Kind::Debit, &area(&["debit", "edit", "d1"])).is_err());

    entries::handle(&ctx, Kind::Income, &area(&["income", "rm", "i2"])).unwrap();
    assert_eq!(ctx.storage.load_finance().unwrap().incomes.len(), 1);
}

#[test]
fn card_list_filters_by_status() {
    let ctx = setup();
    ctx.storage.add_card_installment(&card("c2-1", "2025-11", "10", false)).unwrap();
    let open = card_cmd::query_rows(&ctx, &leaf(&["card", "list", "--status", "open"])).unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, "c2-1");
    let nov = card_cmd::query_rows(&ctx, &leaf(&["card", "list", "--month", "2025-11"])).unwrap();
    assert_eq!(nov.len(), 2);
}

#[test]
fn export_json_then_import_merges_by_id() {
    let ctx = setup();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("finance.json");
    let out_s = out.to_str().unwrap();
    data::handle(&ctx, &area(&["data", "export", "--out", out_s])).unwrap();
    let exported: FinanceData =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(exported.len(), 4);

    let (other, remote) = remote_ctx();
    other.storage.add_income(&income("i1", "2025-11", "1")).unwrap();
    let merged = data::import(&other, &leaf(&["data", "import", "--path", out_s])).unwrap();
    assert_eq!(merged.len(), 4);
    let i1 = merged.incomes.iter().find(|r| r.id == "i1").unwrap();
    assert_eq!(i1.amount, d("3000"));
    assert_eq!(remote.state.borrow().rows(Table::Incomes).len(), 2);
}

#[test]
fn export_csv_has_one_row_per_record() {
    let ctx = setup();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("finance.csv");
    data::handle(
        &ctx,
        &area(&["data", "export", "--format", "csv", "--out", out.to_str().unwrap()]),
    )
    .unwrap();
    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "kind");
    let kinds: Vec<String> = rdr
        .records()
        .map(|r| r.unwrap()[0].to_string())
        .collect();
    assert_eq!(kinds, ["income", "income", "card", "debit"]);
}

#[test]
fn unknown_export_format_writes_nothing() {
    let ctx = setup();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("finance.xml");
    let m = area(&["data", "export", "--format", "xml", "--out", out.to_str().unwrap()]);
    assert!(data::handle(&ctx, &m).is_err());
    assert!(!out.exists());
}

#[test]
fn import_rejects_bad_months() {
    let ctx = local_ctx();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    let mut doc = FinanceData::default();
    doc.incomes.push(income("x", "2025-11", "10"));
    doc.incomes[0].month = "Nov 2025".into();
    std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();
    assert!(data::import(&ctx, &leaf(&["data", "import", "--path", path.to_str().unwrap()])).is_err());
    assert!(ctx.storage.load_finance().unwrap().is_empty());
}

#[test]
fn clear_requires_confirmation() {
    let ctx = setup();
    assert!(data::handle(&ctx, &area(&["data", "clear"])).is_err());
    assert_eq!(ctx.storage.load_finance().unwrap().len(), 4);
    data::handle(&ctx, &area(&["data", "clear", "--yes"])).unwrap();
    assert!(ctx.storage.load_finance().unwrap().is_empty());
}

#[test]
fn doctor_flags_broken_schedules() {
    let p = Purchase {
        description: "Sofa".into(),
        total_amount: d("100"),
        installments: 3,
        start_date: common::date("2025-11-10"),
    };
    let mut rows = expand(&p, "s", 24).unwrap();
    let clean = FinanceData {
        card_installments: rows.clone(),
        ..FinanceData::default()
    };
    let kinds: Vec<String> = schedule_issues(&clean).into_iter().map(|(k, _)| k).collect();
    assert_eq!(kinds, ["rounding_drift"]);

    rows.remove(1);
    rows[1].month = "2026-03".into();
    let broken = FinanceData {
        card_installments: rows,
        ..FinanceData::default()
    };
    let kinds: Vec<String> = schedule_issues(&broken).into_iter().map(|(k, _)| k).collect();
    assert_eq!(kinds, ["installment_gap", "month_mismatch"]);
}

#[test]
fn entry_rm_rejects_unknown_id() {
    let ctx = setup();
    assert!(entries::handle(&ctx, Kind::Income, &area(&["income", "rm", "does-not-exist"])).is_err());
    assert!(entries::handle(&ctx, Kind::Debit, &area(&["debit", "rm", "i1"])).is_err());
    assert_eq!(ctx.storage.load_finance().unwrap().len(), 4);

    entries::handle(&ctx, Kind::Debit, &area(&["debit", "rm", "d1"])).unwrap();
    assert!(ctx.storage.load_finance().unwrap().debit_expenses.is_empty());
}

#[test]
fn card_edit_changes_one_installment() {
    let ctx = local_ctx();
    let rows = card_cmd::add(
        &ctx,
        &leaf(&["card", "add", "-d", "Bike", "-t", "900", "-n", "3", "--start", "2025-11-20"]),
    )
    .unwrap();
    let target = rows[1].id.as_str();
    card_cmd::handle(&ctx, &area(&["card", "edit", target, "-t", "600"])).unwrap();

    let after = ctx.storage.load_finance().unwrap().card_installments;
    assert_eq!(after.len(), 3);
    for c in &after {
        if c.id == target {
            assert_eq!(c.installment_amount, d("200.00"));
            assert_eq!(c.total_amount, d("600"));
            assert_eq!(c.month, "2025-12");
        } else {
            assert_eq!(c.installment_amount, d("300.00"));
            assert_eq!(c.total_amount, d("900"));
        }
    }
    let months: Vec<&str> = after.iter().map(|c| c.month.as_str()).collect();
    assert_eq!(months, ["2025-11", "2025-12", "2026-01"]);

    assert!(card_cmd::handle(&ctx, &area(&["card", "edit", target])).is_err());
    assert!(card_cmd::handle(&ctx, &area(&["card", "edit", "missing-1", "-t", "10"])).is_err());
}

#[test]
fn list_filters_by_text_and_amount() {
    let ctx = local_ctx();
    let mut salary = income("i1", "2025-11", "5000");
    salary.description = "Monthly SALARY".into();
    let mut freelance = income("i2", "2025-11", "750");
    freelance.description = "Freelance logo".into();
    ctx.storage.add_income(&salary).unwrap();
    ctx.storage.add_income(&freelance).unwrap();
    ctx.storage.add_income(&income("i3", "2025-12", "120")).unwrap();

    let hits = entries::query_rows(&ctx, Kind::Income, &leaf(&["income", "list", "--search", "salary"])).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "i1");

    let mid = entries::query_rows(
        &ctx,
        Kind::Income,
        &leaf(&["income", "list", "--min", "120", "--max", "750"]),
    )
    .unwrap();
    let ids: Vec<&str> = mid.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["i3", "i2"]);

    assert!(
        entries::query_rows(&ctx, Kind::Income, &leaf(&["income", "list", "--min", "10", "--max", "5"]))
            .is_err()
    );

    ctx.storage.add_card_installment(&card("tv-1", "2025-11", "300", false)).unwrap();
    ctx.storage.add_card_installment(&card("gym-1", "2025-11", "90", false)).unwrap();
    let cards = card_cmd::query_rows(&ctx, &leaf(&["card", "list", "-s", "GYM", "--max", "100"])).unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].id, "gym-1");
}

#[test]
fn amounts_above_the_limit_are_rejected() {
    let ctx = local_ctx();
    let m = area(&["income", "add", "-d", "Lottery", "-a", "10000000000000000000000000000"]);
    assert!(entries::handle(&ctx, Kind::Income, &m).is_err());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.json");
    let doc = FinanceData {
        incomes: vec![income("x", "2025-11", "10000000000000000000000000000")],
        ..FinanceData::default()
    };
    std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();
    assert!(data::import(&ctx, &leaf(&["data", "import", "--path", path.to_str().unwrap()])).is_err());
    assert!(ctx.storage.load_finance().unwrap().is_empty());
}

#[test]
fn doctor_reports_unreachable_remote_and_cache_state() {
    let (ctx, remote) = remote_ctx();
    ctx.storage.add_card_installment(&card("c1-1", "2025-11", "50", false)).unwrap();
    remote.state.borrow_mut().fail_reads = Some(common::Failure::Connection);

    let found = doctor::issues(&ctx).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].0, "remote_unreachable");
    assert!(remote.state.borrow().calls.contains(&"ping".to_string()));

    let fresh = doctor::cache_freshness(&ctx).unwrap();
    assert_eq!(fresh[0].0, "finance-data");
    assert!(fresh[0].1.is_some());
    assert_eq!(fresh[1].0, "workouts");
    assert!(fresh[1].1.is_none());

    remote.state.borrow_mut().fail_reads = None;
    assert!(doctor::issues(&ctx).unwrap().is_empty());
    doctor::handle(&ctx).unwrap();
}

#[test]
fn projection_report_follows_cli_window() {
    let ctx = setup();
    let rows = reports::projection_rows(
        &ctx,
        &leaf(&["report", "projection", "--from", "2025-11", "--months", "3"]),
    )
    .unwrap();
    let months: Vec<&str> = rows.iter().map(|r| r.balance.month.as_str()).collect();
    assert_eq!(months, ["2025-11", "2025-12", "2026-01"]);
    assert_eq!(rows[0].balance.balance, d("2649.60"));
    assert_eq!(rows[2].cumulative, d("5849.60"));

    let open = reports::projection_rows(
        &ctx,
        &leaf(&["report", "projection", "--from", "2025-11", "--months", "1", "--status", "open"]),
    )
    .unwrap();
    assert_eq!(open[0].balance.card, d("0"));
    assert_eq!(open.len(), 2);

    let m = pocketlog::cli::build_cli().get_matches_from([
        "pocketlog", "report", "projection", "--from", "2025-11", "--json",
    ]);
    let (_, report_area) = m.subcommand().unwrap();
    reports::handle(&ctx, report_area).unwrap();
}

#[test]
fn bill_report_uses_configured_window() {
    let config = pocketlog::config::Config {
        projection_months: 2,
        ..pocketlog::config::Config::default()
    };
    let ctx = common::ctx_with(None, config);
    ctx.storage.add_income(&income("i1", "2025-11", "3000")).unwrap();
    ctx.storage.add_income(&income("i2", "2025-12", "3200")).unwrap();
    ctx.storage.add_debit(&debit("d1", "2025-11", "3050.50")).unwrap();
    ctx.storage.add_card_installment(&card("c1-1", "2025-11", "99.90", false)).unwrap();

    let (bill, window_len) = reports::bill_report(&ctx, &leaf(&["report", "bill", "--month", "2025-11"])).unwrap();
    assert_eq!(window_len, 2);
    assert!(!bill.can_pay);
    assert_eq!(bill.available, d("-50.50"));
    assert_eq!(bill.months_to_payoff, Some(1));

    assert!(reports::handle(&ctx, &area(&["report", "bill", "--month", "Nov"])).is_err());
}
