//! Ledger engine for a rotating savings fund ("pot club"): a fixed group of
//! members contributes a base amount per round, and each round exactly one
//! member withdraws the pot, paying a fee to everyone still waiting.
//!
//! The crate exposes:
//! - [`Fund`]: validated construction, fund-wide queries, and bulk draws
//!   across its fixed set of tables.
//! - [`Table`]: the withdraw/undo state machine over one roster and its
//!   append-only round ledger.
//! - [`compute_payout`]: closed-form pot pricing from the current
//!   withdrawal-status snapshot.
//! - [`withdrawals_on`] / [`transfer_note`]: the read-side queries the
//!   export collaborator consumes.
//!
//! The engine performs no I/O and owns no clock or randomness: callers pass
//! event times in, and random draws take any [`rand::Rng`]. Every type in
//! the data model serializes losslessly with serde, so an external store can
//! wrap the pure state transitions with its own concurrency discipline.

pub mod error;
pub mod fund;
pub mod id;
pub mod member;
pub mod payout;
pub mod report;
pub mod round;
pub mod schedule;
pub mod table;

pub use error::{
    InvariantViolation, RosterError, TableError, ValidationError, ValidationProblem,
};
pub use fund::{DrawOutcome, Fund, FundConfig, FundStatus};
pub use id::{FundId, MemberId, TableId};
pub use member::{Member, PayoutAccount, Roster};
pub use payout::{compute_payout, Amount, PayoutBreakdown};
pub use report::{fold_accents, transfer_note, withdrawals_on, WithdrawalNotice};
pub use round::{Round, RoundLedger, RoundNumber};
pub use schedule::{advance_months, Schedule};
pub use table::{Table, TableConfig};
