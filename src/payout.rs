//! Closed-form pot pricing.
//!
//! The calculator is stateless given the current withdrawal-status snapshot:
//! members who already withdrew contribute the full base amount, members
//! still waiting pay the base minus the fee the receiver owes them for
//! waiting. No round history needs replaying.

use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;
use crate::id::MemberId;
use crate::member::Roster;
use crate::table::TableConfig;

/// Whole units of the fund's currency.
pub type Amount = u64;

/// What one withdrawal pays out, and what everyone else still owes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutBreakdown {
    pub pot_amount: Amount,
    pub total_fee_collected: Amount,
    pub net_contribution_per_payer: Amount,
}

/// Prices the pot `receiver` would collect against the current roster state.
///
/// The receiver must still be eligible; callers validate that before asking
/// for a price. Fails rather than producing a silently-wrong number when the
/// roster state is inconsistent with the table's membership.
pub fn compute_payout(
    config: &TableConfig,
    roster: &Roster,
    receiver: MemberId,
) -> Result<PayoutBreakdown, InvariantViolation> {
    let base = config.base_contribution;
    let fee = config.fee_per_non_receiver;
    if fee >= base {
        return Err(InvariantViolation::FeeExceedsContribution { fee, base });
    }

    let already_withdrawn = roster
        .iter()
        .filter(|m| m.has_withdrawn && m.id != receiver)
        .count();
    let total_other_members = roster.len().saturating_sub(1);
    let remaining_payers = total_other_members
        .checked_sub(already_withdrawn)
        .ok_or(InvariantViolation::WithdrawnCountExceedsMembership {
            withdrawn: already_withdrawn,
            payers: total_other_members,
        })?;

    let net_contribution_per_payer = base - fee;
    Ok(PayoutBreakdown {
        pot_amount: already_withdrawn as Amount * base
            + remaining_payers as Amount * net_contribution_per_payer,
        total_fee_collected: remaining_payers as Amount * fee,
        net_contribution_per_payer,
    })
}
