use chrono::NaiveDate;
use thiserror::Error;

use crate::id::MemberId;
use crate::payout::Amount;
use crate::round::RoundNumber;

/// Internal consistency failure. Signals a bug, never expected in correct
/// operation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("{withdrawn} members marked withdrawn exceeds the {payers} co-members of the table")]
    WithdrawnCountExceedsMembership { withdrawn: usize, payers: usize },
    #[error("fee {fee} is not smaller than the base contribution {base}")]
    FeeExceedsContribution { fee: Amount, base: Amount },
    #[error("round {round_number} names receiver {member_id} but the roster disagrees")]
    LedgerRosterMismatch {
        round_number: RoundNumber,
        member_id: MemberId,
    },
    #[error("round number {got} breaks the contiguous sequence, expected {expected}")]
    NonContiguousRound {
        expected: RoundNumber,
        got: RoundNumber,
    },
}

/// Errors raised by roster state transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("member {member_id} not found in roster")]
    NotFound { member_id: MemberId },
    #[error("member {member_id} has already withdrawn")]
    AlreadyWithdrawn { member_id: MemberId },
    #[error("member {member_id} is not currently withdrawn, nothing to revert")]
    NotEligibleToRevert { member_id: MemberId },
}

/// Errors raised by table withdraw/undo operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("receiver {member_id} is unknown or has already withdrawn")]
    InvalidReceiver { member_id: MemberId },
    #[error("no eligible members remain, every pot has been withdrawn")]
    TableExhausted,
    #[error("no rounds recorded, nothing to undo")]
    EmptyLedger,
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Single constraint violated during fund construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationProblem {
    #[error("fund name must not be empty")]
    EmptyName,
    #[error("base contribution must be positive")]
    NonPositiveContribution,
    #[error("fee {fee} must be smaller than the base contribution {base}")]
    FeeNotBelowContribution { fee: Amount, base: Amount },
    #[error("total member count must be positive")]
    NoMembers,
    #[error("table count must be positive")]
    NoTables,
    #[error("{total} members cannot be split evenly across {tables} tables")]
    IndivisibleMembers { total: u32, tables: u32 },
    #[error("duration must be at least one month")]
    ZeroDuration,
    #[error("monthly withdrawal day {day} is outside 1..=31")]
    WithdrawalDayOutOfRange { day: u8 },
    #[error("end date {end} is not after start date {start}")]
    EndNotAfterStart { start: NaiveDate, end: NaiveDate },
}

/// Construction-time error aggregating every violated constraint, so callers
/// see all problems at once rather than just the first.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid fund configuration: {}", describe(.problems))]
pub struct ValidationError {
    pub problems: Vec<ValidationProblem>,
}

impl ValidationError {
    pub fn contains(&self, problem: &ValidationProblem) -> bool {
        self.problems.contains(problem)
    }
}

fn describe(problems: &[ValidationProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
