//! Notices emitted by successful ledger mutations.
//!
//! The presentation layer drains these after each operation and shows
//! `message()` to the user.

use crate::{
    money,
    types::{MemberId, TierId},
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    MemberEnrolled {
        member_id: MemberId,
        name:      String,
        tier:      TierId,
        amount:    f64,
    },
    WeeklyInterestApplied {
        members_updated:   usize,
        interest_credited: f64,
    },
    MemberWithdrew {
        member_id: MemberId,
        name:      String,
        balance:   f64,
    },
    LedgerReset {
        members_removed: usize,
    },
}

impl LedgerEvent {
    pub fn message(&self) -> String {
        match self {
            LedgerEvent::MemberEnrolled { .. } => "Student registered successfully".into(),
            LedgerEvent::WeeklyInterestApplied { interest_credited, .. } => format!(
                "Weekly interest applied to all members ({} credited)",
                money::format(*interest_credited)
            ),
            LedgerEvent::MemberWithdrew { name, .. } => {
                format!("{name} has withdrawn and been removed")
            }
            LedgerEvent::LedgerReset { .. } => "All data reset".into(),
        }
    }
}
