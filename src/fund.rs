use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationProblem};
use crate::id::{FundId, MemberId, TableId};
use crate::member::Roster;
use crate::payout::Amount;
use crate::schedule::Schedule;
use crate::table::{Table, TableConfig};

pub const DEFAULT_BASE_CONTRIBUTION: Amount = 500_000;
pub const DEFAULT_FEE_PER_NON_RECEIVER: Amount = 100_000;
pub const DEFAULT_TOTAL_MEMBERS: u32 = 20;
pub const DEFAULT_TABLE_COUNT: u32 = 2;
pub const DEFAULT_DURATION_MONTHS: u32 = 1;
pub const DEFAULT_WITHDRAWAL_DAY: u8 = 1;

/// Everything needed to create a fund.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundConfig {
    pub name: String,
    pub base_contribution: Amount,
    pub fee_per_non_receiver: Amount,
    pub total_members: u32,
    pub table_count: u32,
    pub start_date: NaiveDate,
    pub duration_months: u32,
    pub withdrawal_day: u8,
}

impl FundConfig {
    pub fn new(name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            base_contribution: DEFAULT_BASE_CONTRIBUTION,
            fee_per_non_receiver: DEFAULT_FEE_PER_NON_RECEIVER,
            total_members: DEFAULT_TOTAL_MEMBERS,
            table_count: DEFAULT_TABLE_COUNT,
            start_date,
            duration_months: DEFAULT_DURATION_MONTHS,
            withdrawal_day: DEFAULT_WITHDRAWAL_DAY,
        }
    }

    pub fn with_base_contribution(mut self, amount: Amount) -> Self {
        self.base_contribution = amount;
        self
    }

    pub fn with_fee_per_non_receiver(mut self, amount: Amount) -> Self {
        self.fee_per_non_receiver = amount;
        self
    }

    pub fn with_total_members(mut self, total: u32) -> Self {
        self.total_members = total;
        self
    }

    pub fn with_table_count(mut self, count: u32) -> Self {
        self.table_count = count;
        self
    }

    pub fn with_duration_months(mut self, months: u32) -> Self {
        self.duration_months = months;
        self
    }

    pub fn with_withdrawal_day(mut self, day: u8) -> Self {
        self.withdrawal_day = day;
        self
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push(ValidationProblem::EmptyName);
        }
        if self.base_contribution == 0 {
            problems.push(ValidationProblem::NonPositiveContribution);
        } else if self.fee_per_non_receiver >= self.base_contribution {
            problems.push(ValidationProblem::FeeNotBelowContribution {
                fee: self.fee_per_non_receiver,
                base: self.base_contribution,
            });
        }
        if self.total_members == 0 {
            problems.push(ValidationProblem::NoMembers);
        }
        if self.table_count == 0 {
            problems.push(ValidationProblem::NoTables);
        } else if self.total_members > 0 && self.total_members % self.table_count != 0 {
            problems.push(ValidationProblem::IndivisibleMembers {
                total: self.total_members,
                tables: self.table_count,
            });
        }
        if self.duration_months == 0 {
            problems.push(ValidationProblem::ZeroDuration);
        }
        if !(1..=31).contains(&self.withdrawal_day) {
            problems.push(ValidationProblem::WithdrawalDayOutOfRange {
                day: self.withdrawal_day,
            });
        }
        let schedule = self.schedule();
        if schedule.end_date <= schedule.start_date {
            problems.push(ValidationProblem::EndNotAfterStart {
                start: schedule.start_date,
                end: schedule.end_date,
            });
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { problems })
        }
    }

    fn schedule(&self) -> Schedule {
        Schedule::from_duration(self.start_date, self.duration_months, self.withdrawal_day)
    }
}

/// Whether a fund is still being played or has been closed out by an
/// operator. A flag only; it takes no part in the ledger invariants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundStatus {
    Active,
    Completed,
}

/// Per-table outcome counts for a bulk draw across a fund.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawOutcome {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl fmt::Display for DrawOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "succeeded={}, skipped={}, failed={}",
            self.succeeded, self.skipped, self.failed
        )
    }
}

/// A fixed set of tables playing under one name and schedule. Tables are
/// independent ledgers: no member, round, or amount ever crosses between
/// them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fund {
    pub id: FundId,
    pub name: String,
    pub status: FundStatus,
    pub schedule: Schedule,
    tables: Vec<Table>,
}

impl Fund {
    /// Validated construction. Members are partitioned evenly and
    /// sequentially across the tables, once, at creation. Every violated
    /// constraint is reported together in a single [`ValidationError`].
    pub fn create(config: FundConfig) -> Result<Self, ValidationError> {
        config.validate()?;

        let members_per_table = config.total_members / config.table_count;
        let table_config = TableConfig {
            base_contribution: config.base_contribution,
            fee_per_non_receiver: config.fee_per_non_receiver,
        };
        let tables = (1..=config.table_count)
            .map(|n| {
                Table::new(
                    format!("Table {n}"),
                    table_config,
                    Roster::generate(members_per_table),
                )
            })
            .collect();

        let fund = Self {
            id: FundId::generate(),
            name: config.name.trim().to_string(),
            status: FundStatus::Active,
            schedule: config.schedule(),
            tables,
        };
        info!(
            "fund {} created: {} tables of {} members",
            fund.name, config.table_count, members_per_table
        );
        Ok(fund)
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, table_id: TableId) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == table_id)
    }

    pub fn table_mut(&mut self, table_id: TableId) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.id == table_id)
    }

    pub fn total_registered(&self) -> usize {
        self.tables.iter().map(|t| t.roster().len()).sum()
    }

    pub fn total_withdrawn(&self) -> usize {
        self.tables.iter().map(|t| t.roster().withdrawn_count()).sum()
    }

    pub fn total_remaining(&self) -> usize {
        self.total_registered() - self.total_withdrawn()
    }

    /// Draws one random receiver on every table that still has eligible
    /// members. Exhausted tables are skipped, a failing table never blocks
    /// the others, and each table's own atomicity applies independently.
    pub fn withdraw_all_random<R: Rng>(
        &mut self,
        rng: &mut R,
        at: DateTime<Utc>,
    ) -> DrawOutcome {
        let mut outcome = DrawOutcome::default();
        for table in &mut self.tables {
            if table.is_exhausted() {
                outcome.skipped += 1;
                continue;
            }
            match table.withdraw_random(rng, at) {
                Ok(_) => outcome.succeeded += 1,
                Err(err) => {
                    warn!("[{}] random draw failed: {err}", table.name);
                    outcome.failed += 1;
                }
            }
        }
        info!("fund {}: random draw finished, {outcome}", self.name);
        outcome
    }

    /// Draws an explicitly chosen receiver on each selected table. Tables
    /// with no selection are skipped; failures never abort the batch.
    pub fn withdraw_all_manual(
        &mut self,
        selections: &BTreeMap<TableId, MemberId>,
        at: DateTime<Utc>,
    ) -> DrawOutcome {
        let mut outcome = DrawOutcome::default();
        for table in &mut self.tables {
            let Some(&receiver) = selections.get(&table.id) else {
                outcome.skipped += 1;
                continue;
            };
            match table.withdraw(receiver, at) {
                Ok(_) => outcome.succeeded += 1,
                Err(err) => {
                    warn!("[{}] manual draw failed: {err}", table.name);
                    outcome.failed += 1;
                }
            }
        }
        info!("fund {}: manual draw finished, {outcome}", self.name);
        outcome
    }

    pub fn complete(&mut self) {
        self.status = FundStatus::Completed;
    }

    pub fn reactivate(&mut self) {
        self.status = FundStatus::Active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 5).expect("valid date")
    }

    fn drawn_at() -> DateTime<Utc> {
        "2025-01-25T10:00:00Z".parse().expect("timestamp")
    }

    fn small_fund() -> Fund {
        Fund::create(
            FundConfig::new("Tet 2025", start_date())
                .with_total_members(10)
                .with_duration_months(5),
        )
        .expect("create fund")
    }

    #[test]
    fn create_partitions_members_evenly() {
        let fund = small_fund();
        assert_eq!(fund.tables().len(), 2);
        assert!(fund.tables().iter().all(|t| t.roster().len() == 5));
        assert_eq!(fund.total_registered(), 10);
        assert_eq!(fund.total_withdrawn(), 0);
        assert_eq!(fund.total_remaining(), 10);
        assert_eq!(fund.status, FundStatus::Active);
        assert_eq!(fund.tables()[1].name, "Table 2");
    }

    #[test]
    fn create_rejects_indivisible_membership() {
        let err = Fund::create(FundConfig::new("Odd", start_date()).with_total_members(21))
            .expect_err("validation");
        assert!(err.contains(&ValidationProblem::IndivisibleMembers {
            total: 21,
            tables: 2,
        }));
    }

    #[test]
    fn create_reports_every_problem_at_once() {
        let config = FundConfig {
            name: "  ".into(),
            base_contribution: 0,
            fee_per_non_receiver: 0,
            total_members: 0,
            table_count: 0,
            start_date: start_date(),
            duration_months: 0,
            withdrawal_day: 45,
        };
        let err = Fund::create(config).expect_err("validation");
        assert!(err.contains(&ValidationProblem::EmptyName));
        assert!(err.contains(&ValidationProblem::NonPositiveContribution));
        assert!(err.contains(&ValidationProblem::NoMembers));
        assert!(err.contains(&ValidationProblem::NoTables));
        assert!(err.contains(&ValidationProblem::ZeroDuration));
        assert!(err.contains(&ValidationProblem::WithdrawalDayOutOfRange { day: 45 }));
    }

    #[test]
    fn create_rejects_fee_at_or_above_base() {
        let err = Fund::create(
            FundConfig::new("Steep", start_date())
                .with_base_contribution(100_000)
                .with_fee_per_non_receiver(100_000),
        )
        .expect_err("validation");
        assert!(err.contains(&ValidationProblem::FeeNotBelowContribution {
            fee: 100_000,
            base: 100_000,
        }));
    }

    #[test]
    fn end_date_lands_one_duration_past_start() {
        let fund = small_fund();
        assert_eq!(fund.schedule.start_date, start_date());
        assert_eq!(
            fund.schedule.end_date,
            NaiveDate::from_ymd_opt(2025, 6, 5).expect("valid date")
        );
    }

    #[test]
    fn withdraw_all_random_reports_per_table_outcomes() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut fund = Fund::create(
            FundConfig::new("Mixed", start_date())
                .with_total_members(6)
                .with_table_count(2),
        )
        .expect("create fund");

        // Exhaust the first table; leave the second with all 3 eligible.
        let first = fund.tables()[0].id;
        for _ in 0..3 {
            fund.table_mut(first)
                .expect("table")
                .withdraw_random(&mut rng, drawn_at())
                .expect("draw");
        }

        let outcome = fund.withdraw_all_random(&mut rng, drawn_at());
        assert_eq!(
            outcome,
            DrawOutcome {
                succeeded: 1,
                skipped: 1,
                failed: 0,
            }
        );
        assert_eq!(fund.total_withdrawn(), 4);
    }

    #[test]
    fn withdraw_all_manual_skips_unselected_tables() {
        let mut fund = small_fund();
        let second = fund.tables()[1].id;
        let receiver = fund.tables()[1].roster().eligible_members()[2].id;

        let mut selections = BTreeMap::new();
        selections.insert(second, receiver);

        let outcome = fund.withdraw_all_manual(&selections, drawn_at());
        assert_eq!(
            outcome,
            DrawOutcome {
                succeeded: 1,
                skipped: 1,
                failed: 0,
            }
        );
        assert_eq!(fund.tables()[0].rounds().len(), 0);
        assert_eq!(fund.tables()[1].rounds().len(), 1);
    }

    #[test]
    fn withdraw_all_manual_counts_bad_selections_as_failures() {
        let mut fund = small_fund();
        let first = fund.tables()[0].id;
        let second = fund.tables()[1].id;

        let mut selections = BTreeMap::new();
        selections.insert(first, MemberId::generate());
        selections.insert(second, fund.tables()[1].roster().eligible_members()[0].id);

        let outcome = fund.withdraw_all_manual(&selections, drawn_at());
        assert_eq!(
            outcome,
            DrawOutcome {
                succeeded: 1,
                skipped: 0,
                failed: 1,
            }
        );
    }

    #[test]
    fn status_toggles_without_touching_the_ledgers() {
        let mut fund = small_fund();
        let before_tables = fund.tables().to_vec();

        fund.complete();
        assert_eq!(fund.status, FundStatus::Completed);
        fund.reactivate();
        assert_eq!(fund.status, FundStatus::Active);
        assert_eq!(fund.tables(), before_tables.as_slice());
    }
}
