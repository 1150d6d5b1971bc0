use chrono::{DateTime, Utc};
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{InvariantViolation, RosterError, TableError};
use crate::id::{MemberId, TableId};
use crate::member::{PayoutAccount, Roster};
use crate::payout::{compute_payout, Amount};
use crate::round::{Round, RoundLedger, RoundNumber};

/// Per-table contribution schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// What every member puts into the pot per round, before any fee.
    pub base_contribution: Amount,
    /// What the receiver forgoes to each member still waiting for their turn.
    pub fee_per_non_receiver: Amount,
}

/// One independent sub-group of a fund: a fixed roster plus its withdrawal
/// ledger. The roster and the ledger are owned exclusively by the table and
/// only move together, so a failed withdraw or undo leaves both exactly as
/// they were.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub config: TableConfig,
    roster: Roster,
    ledger: RoundLedger,
}

impl Table {
    pub fn new(name: impl Into<String>, config: TableConfig, roster: Roster) -> Self {
        Self {
            id: TableId::generate(),
            name: name.into(),
            config,
            roster,
            ledger: RoundLedger::new(),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn rounds(&self) -> &[Round] {
        self.ledger.rounds()
    }

    pub fn next_round_number(&self) -> RoundNumber {
        self.ledger.next_round_number()
    }

    /// True once every member has withdrawn; the table's terminal state.
    pub fn is_exhausted(&self) -> bool {
        self.roster.eligible_members().is_empty()
    }

    /// Withdraws the pot for an explicitly chosen receiver.
    pub fn withdraw(
        &mut self,
        receiver: MemberId,
        at: DateTime<Utc>,
    ) -> Result<Round, TableError> {
        let member = match self.roster.get(receiver) {
            Some(member) if !member.has_withdrawn => member,
            _ => return Err(TableError::InvalidReceiver { member_id: receiver }),
        };
        let receiver_name = member.name.clone();

        // Price against the current snapshot, receiver still eligible.
        let breakdown = compute_payout(&self.config, &self.roster, receiver)?;

        let round = Round {
            round_number: self.ledger.next_round_number(),
            receiver_id: receiver,
            receiver_name,
            pot_amount: breakdown.pot_amount,
            total_fee_collected: breakdown.total_fee_collected,
            net_contribution_per_payer: breakdown.net_contribution_per_payer,
            drawn_at: at,
        };

        self.roster
            .mark_withdrawn(receiver)
            .map_err(|_| roster_disagreement(round.round_number, receiver))?;
        if let Err(violation) = self.ledger.append(round.clone()) {
            // Leave no disagreement between ledger and roster behind.
            self.roster
                .mark_eligible(receiver)
                .map_err(|_| roster_disagreement(round.round_number, receiver))?;
            return Err(violation.into());
        }

        info!(
            "[{}] round {} drawn by {}, pot {}",
            self.name, round.round_number, round.receiver_name, round.pot_amount
        );
        Ok(round)
    }

    /// Withdraws the pot for a uniformly chosen eligible member.
    pub fn withdraw_random<R: Rng>(
        &mut self,
        rng: &mut R,
        at: DateTime<Utc>,
    ) -> Result<Round, TableError> {
        let eligible = self.roster.eligible_members();
        if eligible.is_empty() {
            return Err(TableError::TableExhausted);
        }
        let receiver = eligible[rng.gen_range(0..eligible.len())].id;
        self.withdraw(receiver, at)
    }

    /// Undoes the most recent withdrawal and returns the removed round.
    /// Strictly last-in-first-out; nothing else in history can be touched.
    pub fn undo_last(&mut self) -> Result<Round, TableError> {
        let round = self.ledger.last().ok_or(TableError::EmptyLedger)?.clone();
        self.roster
            .mark_eligible(round.receiver_id)
            .map_err(|_| roster_disagreement(round.round_number, round.receiver_id))?;
        self.ledger.pop_last();

        info!(
            "[{}] round {} undone, {} is eligible again",
            self.name, round.round_number, round.receiver_name
        );
        Ok(round)
    }

    /// Edits a member's display and contact fields; past rounds keep their
    /// receiver-name snapshots.
    pub fn update_member_profile(
        &mut self,
        member_id: MemberId,
        name: impl Into<String>,
        payout_account: Option<PayoutAccount>,
    ) -> Result<(), RosterError> {
        self.roster.update_profile(member_id, name, payout_account)
    }
}

fn roster_disagreement(round_number: RoundNumber, member_id: MemberId) -> TableError {
    InvariantViolation::LedgerRosterMismatch {
        round_number,
        member_id,
    }
    .into()
}
