//! Membership lifecycle: Prospective → Active → Withdrawn.
//!
//! An `Enrollment` is the prospective state: form data that is not yet a
//! member. `enroll` turns it into an active `Member` in the ledger;
//! `withdraw` removes the member outright, no tombstone is kept.
//!
//! None of these operations prompt for confirmation. Callers must confirm
//! with the user before invoking `withdraw` or `reset_all`.

use crate::{
    clock::Clock,
    error::{LedgerResult, ValidationError},
    member::Member,
    money,
    store::{LedgerStore, Persistence},
    tier::{Tier, TierCatalog},
    types::TierId,
};
use chrono::SubsecRound;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub name:   String,
    pub tier:   Option<TierId>,
    pub amount: f64,
}

impl Enrollment {
    pub fn new(name: impl Into<String>, tier: Option<TierId>, amount: f64) -> Self {
        Self {
            name: name.into(),
            tier,
            amount,
        }
    }

    /// Check the form against the catalog. Constraints are checked in order:
    /// name, tier selection, tier existence, amount.
    pub fn validate<'c>(
        &self,
        catalog: &'c TierCatalog,
        tolerance: f64,
    ) -> Result<&'c Tier, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let tier_id = self.tier.ok_or(ValidationError::NoTierSelected)?;
        let tier = catalog
            .tier_of(tier_id)
            .map_err(|_| ValidationError::UnknownTier { tier: tier_id })?;
        if !money::within_tolerance(self.amount, tier.amount, tolerance) {
            return Err(ValidationError::AmountMismatch {
                tier: tier.id,
                expected: tier.amount,
                actual: self.amount,
            });
        }
        Ok(tier)
    }
}

pub fn enroll(
    store: &mut LedgerStore,
    catalog: &TierCatalog,
    tolerance: f64,
    clock: &dyn Clock,
    request: &Enrollment,
) -> LedgerResult<Member> {
    let tier = request.validate(catalog, tolerance)?;

    let member = Member {
        id: Uuid::new_v4().to_string(),
        name: request.name.trim().to_string(),
        tier: tier.id,
        balance: money::round(request.amount),
        rate: tier.rate,
        // Stored stamps carry milliseconds; truncate now so reloads compare equal.
        joined_at: clock.now().trunc_subsecs(3),
    };

    log::info!(
        "Enrolled {} ({}) at tier {} with {:.2} @ {}",
        member.name,
        member.id,
        member.tier,
        member.balance,
        member.rate
    );
    store.add(member.clone());
    Ok(member)
}

pub fn withdraw(store: &mut LedgerStore, member_id: &str) -> LedgerResult<Member> {
    let removed = store.remove_by_id(member_id)?;
    log::info!(
        "{} ({}) withdrew with balance {:.2}",
        removed.name,
        removed.id,
        removed.balance
    );
    Ok(removed)
}

/// Remove every member. Irreversible.
pub fn reset_all(store: &mut LedgerStore) -> Persistence {
    let removed = store.count();
    let persistence = store.clear();
    log::info!("Ledger reset; {removed} members removed");
    persistence
}

