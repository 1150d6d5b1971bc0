use serde::{Deserialize, Serialize};

use crate::error::RosterError;
use crate::id::MemberId;

/// Bank transfer details used when paying a member their pot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutAccount {
    pub account_number: String,
    pub bank_name: String,
}

/// One participant of a table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub has_withdrawn: bool,
    pub payout_account: Option<PayoutAccount>,
}

impl Member {
    /// Creates a member that has not yet withdrawn and has no payout details.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: MemberId::generate(),
            name: name.into(),
            has_withdrawn: false,
            payout_account: None,
        }
    }
}

/// Ordered member registry of one table. Membership is fixed at creation:
/// members are never added, removed, or moved between tables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    members: Vec<Member>,
}

impl Roster {
    pub fn new(members: Vec<Member>) -> Self {
        Self { members }
    }

    /// Builds a roster of `count` members with sequential placeholder names.
    pub fn generate(count: u32) -> Self {
        let members = (1..=count)
            .map(|n| Member::new(format!("Member {n}")))
            .collect();
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.members.iter()
    }

    pub fn get(&self, member_id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    /// Members who have not yet withdrawn, in roster order.
    pub fn eligible_members(&self) -> Vec<&Member> {
        self.members.iter().filter(|m| !m.has_withdrawn).collect()
    }

    pub fn withdrawn_count(&self) -> usize {
        self.members.iter().filter(|m| m.has_withdrawn).count()
    }

    /// Flips exactly one member to withdrawn. Double withdrawal is a
    /// programming error, not a no-op.
    pub fn mark_withdrawn(&mut self, member_id: MemberId) -> Result<(), RosterError> {
        let member = self.get_mut(member_id)?;
        if member.has_withdrawn {
            return Err(RosterError::AlreadyWithdrawn { member_id });
        }
        member.has_withdrawn = true;
        Ok(())
    }

    /// Reverses [`Roster::mark_withdrawn`]; used only by undo.
    pub fn mark_eligible(&mut self, member_id: MemberId) -> Result<(), RosterError> {
        let member = self.get_mut(member_id)?;
        if !member.has_withdrawn {
            return Err(RosterError::NotEligibleToRevert { member_id });
        }
        member.has_withdrawn = false;
        Ok(())
    }

    /// Replaces display and contact fields. Withdrawal state is untouched.
    pub fn update_profile(
        &mut self,
        member_id: MemberId,
        name: impl Into<String>,
        payout_account: Option<PayoutAccount>,
    ) -> Result<(), RosterError> {
        let member = self.get_mut(member_id)?;
        member.name = name.into();
        member.payout_account = payout_account;
        Ok(())
    }

    fn get_mut(&mut self, member_id: MemberId) -> Result<&mut Member, RosterError> {
        self.members
            .iter_mut()
            .find(|m| m.id == member_id)
            .ok_or(RosterError::NotFound { member_id })
    }
}
