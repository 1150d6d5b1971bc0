use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;
use crate::id::MemberId;
use crate::payout::{Amount, PayoutBreakdown};

pub type RoundNumber = u32;

/// Immutable record of one pot withdrawal. `receiver_name` is a point-in-time
/// snapshot so the history stays stable when a member's profile is edited
/// later.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub round_number: RoundNumber,
    pub receiver_id: MemberId,
    pub receiver_name: String,
    pub pot_amount: Amount,
    pub total_fee_collected: Amount,
    pub net_contribution_per_payer: Amount,
    pub drawn_at: DateTime<Utc>,
}

impl Round {
    pub fn breakdown(&self) -> PayoutBreakdown {
        PayoutBreakdown {
            pot_amount: self.pot_amount,
            total_fee_collected: self.total_fee_collected,
            net_contribution_per_payer: self.net_contribution_per_payer,
        }
    }
}

/// Append-only withdrawal history of one table. The ledger is a stack:
/// push = withdraw, pop = undo-last. Round numbers are always the contiguous
/// sequence `1..=len`, so the next number is derived rather than stored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundLedger {
    rounds: Vec<Round>,
}

impl RoundLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn last(&self) -> Option<&Round> {
        self.rounds.last()
    }

    pub fn next_round_number(&self) -> RoundNumber {
        self.rounds.len() as RoundNumber + 1
    }

    /// Appends a round, rejecting any break in the round-number sequence.
    pub fn append(&mut self, round: Round) -> Result<(), InvariantViolation> {
        let expected = self.next_round_number();
        if round.round_number != expected {
            return Err(InvariantViolation::NonContiguousRound {
                expected,
                got: round.round_number,
            });
        }
        self.rounds.push(round);
        Ok(())
    }

    /// Removes and returns the most recent round. The only permitted mutation
    /// of history; arbitrary deletion or reordering is never supported.
    pub fn pop_last(&mut self) -> Option<Round> {
        self.rounds.pop()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Round> {
        self.rounds.iter()
    }
}
