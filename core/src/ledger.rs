//! The savings ledger: single owner of the store, tier catalog and clock.
//!
//! Presentation code holds one `SavingsLedger` for the life of the process
//! and routes every read and write through it.

use crate::{
    accrual::{self, AccrualSummary, MemberRow, Preview, TickReport},
    clock::{Clock, FixedClock, SystemClock},
    config::LedgerConfig,
    error::{LedgerError, LedgerResult},
    event::LedgerEvent,
    lifecycle::{self, Enrollment},
    member::Member,
    store::{DurableSlot, LedgerStore, Persistence, SqliteSlot},
    tier::{Tier, TierCatalog},
    types::TierId,
};
use chrono::{TimeZone, Utc};

pub struct SavingsLedger {
    config:  LedgerConfig,
    catalog: TierCatalog,
    store:   LedgerStore,
    clock:   Box<dyn Clock>,
    events:  Vec<LedgerEvent>,
}

impl SavingsLedger {
    /// Build the tier catalog from `config` and load the ledger from `slot`.
    pub fn open(config: LedgerConfig, slot: Box<dyn DurableSlot>) -> LedgerResult<Self> {
        let catalog = TierCatalog::new(&config.tiers)?;
        let store = LedgerStore::load(slot, config.storage_key.clone());
        log::info!(
            "Savings ledger opened: {} tiers, {} members",
            catalog.len(),
            store.count()
        );
        Ok(Self {
            config,
            catalog,
            store,
            clock: Box::new(SystemClock),
            events: Vec::new(),
        })
    }

    /// Open against a SQLite database at `path` (a file path or SQLite URI).
    pub fn open_sqlite(config: LedgerConfig, path: &str) -> LedgerResult<Self> {
        let slot = SqliteSlot::open(path)?;
        slot.migrate()?;
        Self::open(config, Box::new(slot))
    }

    /// Reference tiers, private in-memory database, clock fixed at
    /// 2026-01-05 09:00 UTC.
    pub fn build_test() -> LedgerResult<Self> {
        let slot = SqliteSlot::in_memory()?;
        slot.migrate()?;
        let epoch = Utc
            .with_ymd_and_hms(2026, 1, 5, 9, 0, 0)
            .single()
            .ok_or_else(|| LedgerError::Other(anyhow::anyhow!("invalid test epoch")))?;
        Ok(Self::open(LedgerConfig::default_test(), Box::new(slot))?
            .with_clock(Box::new(FixedClock(epoch))))
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // ── Reads ──────────────────────────────────────────────────

    pub fn tiers(&self) -> &TierCatalog {
        &self.catalog
    }

    pub fn tier_of(&self, id: TierId) -> LedgerResult<&Tier> {
        self.catalog.tier_of(id)
    }

    pub fn all(&self) -> &[Member] {
        self.store.all()
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.store.get(id)
    }

    pub fn count(&self) -> usize {
        self.store.count()
    }

    pub fn total_balance(&self) -> f64 {
        self.store.total_balance()
    }

    pub fn weekly_interest(&self, member: &Member) -> f64 {
        accrual::weekly_interest(member)
    }

    pub fn weekly_payout(&self, member: &Member) -> f64 {
        accrual::weekly_payout(member)
    }

    pub fn preview_interest_and_payout(&self, amount: f64, rate: f64) -> Preview {
        accrual::preview_interest_and_payout(amount, rate)
    }

    /// Preview at the selected tier's rate; no selection previews at rate 0.
    pub fn preview_for_tier(&self, tier: Option<TierId>, amount: f64) -> Preview {
        let rate = tier
            .and_then(|id| self.catalog.tier_of(id).ok())
            .map_or(0.0, |t| t.rate);
        accrual::preview_interest_and_payout(amount, rate)
    }

    pub fn rows(&self) -> Vec<MemberRow> {
        self.store.all().iter().map(accrual::member_row).collect()
    }

    pub fn summary(&self) -> LedgerResult<AccrualSummary> {
        accrual::summarize(&self.store)
    }

    pub fn last_persistence(&self) -> &Persistence {
        self.store.last_persistence()
    }

    /// Take every notice recorded since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Mutations ──────────────────────────────────────────────

    pub fn enroll(&mut self, name: &str, tier: Option<TierId>, amount: f64) -> LedgerResult<Member> {
        let request = Enrollment::new(name, tier, amount);
        let member = lifecycle::enroll(
            &mut self.store,
            &self.catalog,
            self.config.amount_tolerance,
            self.clock.as_ref(),
            &request,
        )?;
        self.events.push(LedgerEvent::MemberEnrolled {
            member_id: member.id.clone(),
            name: member.name.clone(),
            tier: member.tier,
            amount: member.balance,
        });
        Ok(member)
    }

    /// Remove a member. The caller must have confirmed with the user first.
    pub fn withdraw(&mut self, member_id: &str) -> LedgerResult<Member> {
        let removed = lifecycle::withdraw(&mut self.store, member_id)?;
        self.events.push(LedgerEvent::MemberWithdrew {
            member_id: removed.id.clone(),
            name: removed.name.clone(),
            balance: removed.balance,
        });
        Ok(removed)
    }

    pub fn apply_weekly_tick(&mut self) -> LedgerResult<TickReport> {
        let report = accrual::apply_weekly_tick(&mut self.store)?;
        self.events.push(LedgerEvent::WeeklyInterestApplied {
            members_updated: report.members_updated,
            interest_credited: report.interest_credited,
        });
        Ok(report)
    }

    /// Remove every member. The caller must have confirmed with the user first.
    pub fn reset_all(&mut self) -> Persistence {
        let members_removed = self.store.count();
        let persistence = lifecycle::reset_all(&mut self.store);
        self.events.push(LedgerEvent::LedgerReset { members_removed });
        persistence
    }
}
