//! Member records and their durable JSON representation.
//!
//! Stored layout, one object per member, in ledger order:
//!   { "id": "...", "name": "...", "tier": 1, "amount": 10000.0,
//!     "rate": 0.05, "joinedAt": "2026-10-19T08:24:00.123Z" }
//!
//! Numeric fields are parsed explicitly on the way back in. A record that
//! fails to parse rejects the whole snapshot.
//!
//! `joinedAt` is written with milliseconds. Stamps loaded with finer
//! precision are written back with that precision intact.

use crate::{
    error::{LedgerError, LedgerResult},
    types::{MemberId, TierId},
};
use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Member {
    pub id:   MemberId,
    pub name: String,
    pub tier: TierId,
    /// Current balance, always rounded to cents.
    #[serde(rename = "amount")]
    pub balance: f64,
    /// Weekly rate frozen from the tier at enrollment.
    pub rate: f64,
    #[serde(rename = "joinedAt", serialize_with = "serialize_timestamp")]
    pub joined_at: DateTime<Utc>,
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    let format = if ts.nanosecond() % 1_000_000 == 0 {
        SecondsFormat::Millis
    } else {
        SecondsFormat::AutoSi
    };
    s.serialize_str(&ts.to_rfc3339_opts(format, true))
}

/// A record as found in the slot, before its fields are trusted.
#[derive(Debug, Deserialize)]
struct StoredMember {
    id:   String,
    name: String,
    tier: Value,
    amount: Value,
    rate:   Value,
    #[serde(rename = "joinedAt")]
    joined_at: String,
}

impl TryFrom<StoredMember> for Member {
    type Error = String;

    fn try_from(r: StoredMember) -> Result<Self, Self::Error> {
        if r.id.trim().is_empty() {
            return Err("id: empty".into());
        }
        if r.name.trim().is_empty() {
            return Err("name: empty".into());
        }
        let tier = coerce_number("tier", &r.tier)?;
        if tier.fract() != 0.0 || !(1.0..=f64::from(TierId::MAX)).contains(&tier) {
            return Err(format!("tier: {tier} is not a valid tier identifier"));
        }
        let balance = coerce_number("amount", &r.amount)?;
        if balance < 0.0 {
            return Err(format!("amount: {balance} is negative"));
        }
        let rate = coerce_number("rate", &r.rate)?;
        if !(rate > 0.0 && rate < 1.0) {
            return Err(format!("rate: {rate} is outside (0, 1)"));
        }
        let joined_at = DateTime::parse_from_rfc3339(&r.joined_at)
            .map_err(|e| format!("joinedAt: {e}"))?
            .with_timezone(&Utc);

        Ok(Member {
            id: r.id,
            name: r.name,
            tier: tier as TierId,
            balance: crate::money::round(balance),
            rate,
            joined_at,
        })
    }
}

/// Accepts a JSON number or a numeric string; anything else, or a
/// non-finite result, is an error rather than a silent zero.
fn coerce_number(field: &str, value: &Value) -> Result<f64, String> {
    let n = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("{field}: {n} is not representable"))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("{field}: {s:?} is not a number"))?,
        other => return Err(format!("{field}: expected a number, got {other}")),
    };
    if !n.is_finite() {
        return Err(format!("{field}: {n} is not finite"));
    }
    Ok(n)
}

pub fn encode_snapshot(members: &[Member]) -> LedgerResult<String> {
    Ok(serde_json::to_string(members)?)
}

pub fn decode_snapshot(payload: &str) -> LedgerResult<Vec<Member>> {
    let records: Vec<StoredMember> = serde_json::from_str(payload)?;
    let mut seen = HashSet::with_capacity(records.len());
    let mut members = Vec::with_capacity(records.len());
    for (i, record) in records.into_iter().enumerate() {
        let member = Member::try_from(record)
            .map_err(|reason| LedgerError::MalformedSnapshot(format!("record {i}: {reason}")))?;
        if !seen.insert(member.id.clone()) {
            return Err(LedgerError::MalformedSnapshot(format!(
                "record {i}: duplicate id '{}'",
                member.id
            )));
        }
        members.push(member);
    }
    Ok(members)
}
