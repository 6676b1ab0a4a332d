//! Shared primitive types used across the ledger.

/// Stable, unique member identifier. Opaque to callers.
pub type MemberId = String;

/// Contribution tier identifier.
pub type TierId = u8;

/// Key of the durable slot holding the serialized ledger.
pub type SlotKey = String;
