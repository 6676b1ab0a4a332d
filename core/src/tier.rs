//! Tier catalog: fixed contribution levels and their weekly rates.
//!
//! Built once at startup from config and never mutated afterwards.

use crate::{
    config::TierConfig,
    error::{LedgerError, LedgerResult},
    money,
    types::TierId,
};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Tier {
    pub id:     TierId,
    /// Required contribution, in currency units.
    pub amount: f64,
    /// Weekly interest rate as a fraction, 0 < rate < 1.
    pub rate:   f64,
}

#[derive(Debug, Clone)]
pub struct TierCatalog {
    tiers: BTreeMap<TierId, Tier>,
}

impl TierCatalog {
    pub fn new(tiers: &[TierConfig]) -> LedgerResult<Self> {
        let mut map = BTreeMap::new();
        for t in tiers {
            if t.tier == 0 {
                return Err(invalid(t.tier, "identifier must be positive"));
            }
            if !(t.amount.is_finite() && t.amount > 0.0) {
                return Err(invalid(t.tier, "amount must be a positive number"));
            }
            if money::round(t.amount) != t.amount {
                return Err(invalid(t.tier, "amount must have at most 2 decimal places"));
            }
            if !(t.rate > 0.0 && t.rate < 1.0) {
                return Err(invalid(t.tier, "rate must lie strictly between 0 and 1"));
            }
            let tier = Tier { id: t.tier, amount: t.amount, rate: t.rate };
            if map.insert(t.tier, tier).is_some() {
                return Err(invalid(t.tier, "defined more than once"));
            }
        }
        Ok(Self { tiers: map })
    }

    pub fn tier_of(&self, id: TierId) -> LedgerResult<&Tier> {
        self.tiers.get(&id).ok_or(LedgerError::TierNotFound { tier: id })
    }

    /// All tiers in ascending identifier order.
    pub fn all(&self) -> impl Iterator<Item = &Tier> {
        self.tiers.values()
    }

    /// Lowest tier identifier; the default selection for a new enrollment form.
    pub fn first(&self) -> Option<&Tier> {
        self.tiers.values().next()
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

fn invalid(tier: TierId, reason: &str) -> LedgerError {
    LedgerError::InvalidTier { tier, reason: reason.to_string() }
}
