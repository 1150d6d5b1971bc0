//! End-to-end exercises of the fund lifecycle: creation, manual and random
//! draws, undo, reporting, and snapshot round-trips.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use potclub::{
    withdrawals_on, DrawOutcome, Fund, FundConfig, FundStatus, TableError, ValidationProblem,
};

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 5).expect("valid date")
}

fn at(date: &str) -> DateTime<Utc> {
    format!("{date}T09:00:00Z").parse().expect("timestamp")
}

fn ten_member_fund() -> Fund {
    Fund::create(
        FundConfig::new("Tet 2025", start_date())
            .with_total_members(10)
            .with_duration_months(5)
            .with_withdrawal_day(25),
    )
    .expect("create fund")
}

#[test]
fn a_fund_plays_out_to_exhaustion() {
    let mut rng = StdRng::seed_from_u64(2025);
    let mut fund = ten_member_fund();

    for month in 1..=5 {
        let outcome = fund.withdraw_all_random(&mut rng, at(&format!("2025-0{month}-25")));
        assert_eq!(
            outcome,
            DrawOutcome {
                succeeded: 2,
                skipped: 0,
                failed: 0,
            }
        );
    }

    assert_eq!(fund.total_withdrawn(), 10);
    assert_eq!(fund.total_remaining(), 0);
    assert!(fund.tables().iter().all(|t| t.is_exhausted()));

    // One more sweep finds nothing left to draw.
    let outcome = fund.withdraw_all_random(&mut rng, at("2025-06-25"));
    assert_eq!(
        outcome,
        DrawOutcome {
            succeeded: 0,
            skipped: 2,
            failed: 0,
        }
    );

    // Round numbers per table are exactly 1..=5, and pots grow as more
    // prior receivers pay the full base amount.
    for table in fund.tables() {
        let numbers: Vec<_> = table.rounds().iter().map(|r| r.round_number).collect();
        assert_eq!(numbers, [1, 2, 3, 4, 5]);
        let pots: Vec<_> = table.rounds().iter().map(|r| r.pot_amount).collect();
        assert_eq!(
            pots,
            [1_600_000, 1_700_000, 1_800_000, 1_900_000, 2_000_000]
        );
    }
}

#[test]
fn undo_walks_history_back_step_by_step() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut fund = ten_member_fund();
    let table_id = fund.tables()[0].id;

    let fresh = fund.table(table_id).expect("table").clone();
    let table = fund.table_mut(table_id).expect("table");
    table.withdraw_random(&mut rng, at("2025-01-25")).expect("first draw");
    let after_one = table.clone();
    table.withdraw_random(&mut rng, at("2025-02-25")).expect("second draw");

    table.undo_last().expect("undo second");
    assert_eq!(*table, after_one);
    table.undo_last().expect("undo first");
    assert_eq!(*table, fresh);
    assert_eq!(table.undo_last(), Err(TableError::EmptyLedger));
}

#[test]
fn manual_draws_follow_the_given_selections() {
    let mut fund = ten_member_fund();
    let mut selections = BTreeMap::new();
    for table in fund.tables() {
        selections.insert(table.id, table.roster().eligible_members()[0].id);
    }

    let outcome = fund.withdraw_all_manual(&selections, at("2025-01-25"));
    assert_eq!(
        outcome,
        DrawOutcome {
            succeeded: 2,
            skipped: 0,
            failed: 0,
        }
    );

    // Re-running the same selections fails both tables: the receivers have
    // already withdrawn, and nothing else changes.
    let before = fund.clone();
    let outcome = fund.withdraw_all_manual(&selections, at("2025-02-25"));
    assert_eq!(
        outcome,
        DrawOutcome {
            succeeded: 0,
            skipped: 0,
            failed: 2,
        }
    );
    assert_eq!(fund, before);
}

#[test]
fn reporting_pairs_rounds_with_current_members() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut fund = ten_member_fund();

    fund.withdraw_all_random(&mut rng, at("2025-01-25"));
    fund.withdraw_all_random(&mut rng, at("2025-02-25"));

    let january = withdrawals_on(&fund, NaiveDate::from_ymd_opt(2025, 1, 25).expect("date"));
    let february = withdrawals_on(&fund, NaiveDate::from_ymd_opt(2025, 2, 25).expect("date"));
    assert_eq!(january.len(), 2);
    assert_eq!(february.len(), 2);
    for notice in january.iter().chain(&february) {
        assert_eq!(notice.round.receiver_id, notice.member.id);
        assert!(notice.member.has_withdrawn);
    }

    let empty = withdrawals_on(&fund, NaiveDate::from_ymd_opt(2025, 3, 25).expect("date"));
    assert!(empty.is_empty());
}

#[test]
fn snapshots_round_trip_losslessly() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut fund = ten_member_fund();
    fund.withdraw_all_random(&mut rng, at("2025-01-25"));
    let table_id = fund.tables()[1].id;
    let member_id = fund.tables()[1].roster().eligible_members()[0].id;
    fund.table_mut(table_id)
        .expect("table")
        .update_member_profile(
            member_id,
            "Phạm Thảo",
            Some(potclub::PayoutAccount {
                account_number: "111222333".into(),
                bank_name: "Techcombank".into(),
            }),
        )
        .expect("update profile");
    fund.complete();

    let json = serde_json::to_string(&fund).expect("serialize fund");
    let restored: Fund = serde_json::from_str(&json).expect("deserialize fund");
    assert_eq!(restored, fund);
    assert_eq!(restored.status, FundStatus::Completed);

    // The restored value keeps operating: undo the january draw on table 1.
    let mut restored = restored;
    let first = restored.tables()[0].id;
    restored
        .table_mut(first)
        .expect("table")
        .undo_last()
        .expect("undo after restore");
    assert_eq!(restored.total_withdrawn(), 1);
}

#[test]
fn validation_failures_arrive_in_one_report() {
    let err = Fund::create(
        FundConfig::new("", start_date())
            .with_total_members(21)
            .with_duration_months(0),
    )
    .expect_err("validation");

    assert!(err.contains(&ValidationProblem::EmptyName));
    assert!(err.contains(&ValidationProblem::IndivisibleMembers {
        total: 21,
        tables: 2,
    }));
    assert!(err.contains(&ValidationProblem::ZeroDuration));
}
