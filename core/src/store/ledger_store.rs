use super::{DurableSlot, Persistence};
use crate::{
    error::{LedgerError, LedgerResult},
    member::{decode_snapshot, encode_snapshot, Member},
    money,
    types::SlotKey,
};

/// The single owner of the member list.
///
/// Members are kept in insertion order. Every mutator writes the full list
/// back to the durable slot before returning; a failed write is logged and
/// reported through `Persistence`, never propagated.
pub struct LedgerStore {
    members: Vec<Member>,
    slot: Box<dyn DurableSlot>,
    key: SlotKey,
    last_persistence: Persistence,
}

impl LedgerStore {
    /// Read the ledger from `slot`. An absent or unreadable snapshot yields
    /// an empty ledger.
    pub fn load(slot: Box<dyn DurableSlot>, key: impl Into<SlotKey>) -> Self {
        let key = key.into();
        let members = match read_snapshot(slot.as_ref(), &key) {
            Ok(members) => members,
            Err(e) => {
                log::warn!("Discarding ledger snapshot in slot '{key}': {e}");
                Vec::new()
            }
        };
        log::debug!("Loaded {} members from slot '{key}'", members.len());
        Self {
            members,
            slot,
            key,
            last_persistence: Persistence::Durable,
        }
    }

    // ── Reads ──────────────────────────────────────────────────

    pub fn all(&self) -> &[Member] {
        &self.members
    }

    pub fn get(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn total_balance(&self) -> f64 {
        money::round(self.members.iter().map(|m| m.balance).sum())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn last_persistence(&self) -> &Persistence {
        &self.last_persistence
    }

    // ── Mutations ──────────────────────────────────────────────

    pub fn add(&mut self, member: Member) -> Persistence {
        self.members.push(member);
        self.save()
    }

    pub fn remove_by_id(&mut self, id: &str) -> LedgerResult<Member> {
        let idx = self
            .members
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| LedgerError::NotFound { member_id: id.to_string() })?;
        let removed = self.members.remove(idx);
        self.save();
        Ok(removed)
    }

    pub fn clear(&mut self) -> Persistence {
        self.members.clear();
        self.save()
    }

    /// Replace every balance, positionally. Nothing changes unless there is
    /// exactly one balance per member.
    pub(crate) fn set_balances(&mut self, balances: &[f64]) -> LedgerResult<Persistence> {
        if balances.len() != self.members.len() {
            return Err(LedgerError::Other(anyhow::anyhow!(
                "balance update covers {} members, ledger holds {}",
                balances.len(),
                self.members.len()
            )));
        }
        for (member, balance) in self.members.iter_mut().zip(balances) {
            member.balance = money::round(*balance);
        }
        Ok(self.save())
    }

    // ── Persistence ────────────────────────────────────────────

    /// Write the full member list to the slot, absorbing any failure.
    pub fn save(&mut self) -> Persistence {
        self.last_persistence = match self.try_save() {
            Ok(()) => Persistence::Durable,
            Err(e) => {
                log::warn!(
                    "Ledger kept in memory only; write to slot '{}' failed: {e}",
                    self.key
                );
                Persistence::BestEffort { reason: e.to_string() }
            }
        };
        self.last_persistence.clone()
    }

    pub fn try_save(&self) -> LedgerResult<()> {
        let payload = encode_snapshot(&self.members)?;
        self.slot
            .write(&self.key, &payload)
            .map_err(|e| match e {
                LedgerError::Persistence(reason) => LedgerError::Persistence(reason),
                other => LedgerError::Persistence(other.to_string()),
            })
    }
}

fn read_snapshot(slot: &dyn DurableSlot, key: &str) -> LedgerResult<Vec<Member>> {
    match slot.read(key)? {
        None => Ok(Vec::new()),
        Some(payload) => decode_snapshot(&payload),
    }
}
