use crate::types::{MemberId, TierId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Member '{member_id}' not found")]
    NotFound { member_id: MemberId },

    #[error("Tier {tier} not found")]
    TierNotFound { tier: TierId },

    #[error("Invalid tier {tier}: {reason}")]
    InvalidTier { tier: TierId, reason: String },

    #[error("No members to {operation}")]
    EmptyOperation { operation: Operation },

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Whole-ledger operations that need at least one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    WeeklyTick,
    Summary,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::WeeklyTick => f.write_str("apply progress to"),
            Operation::Summary => f.write_str("summarize"),
        }
    }
}

/// Rejected enrollment input. The display text is what the end user sees.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Please select a tier")]
    NoTierSelected,

    #[error("Tier {tier} does not exist")]
    UnknownTier { tier: TierId },

    #[error("Amount must match Tier {tier}: {}", money_text(.expected))]
    AmountMismatch {
        tier:     TierId,
        expected: f64,
        actual:   f64,
    },
}

fn money_text(amount: &f64) -> String {
    crate::money::format(*amount)
}

pub type LedgerResult<T> = Result<T, LedgerError>;
