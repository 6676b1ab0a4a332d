//! Weekly interest accrual.
//!
//! Interest and payout are always computed through the same two helpers so
//! that an enrollment preview and the first real tick can never disagree.

use crate::{
    error::{LedgerError, LedgerResult, Operation},
    member::Member,
    money,
    store::{LedgerStore, Persistence},
    types::{MemberId, TierId},
};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Preview {
    pub interest: f64,
    pub payout:   f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TickReport {
    pub members_updated:   usize,
    pub interest_credited: f64,
    pub total_balance:     f64,
    pub persistence:       Persistence,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AccrualSummary {
    pub member_count:          usize,
    pub total_balance:         f64,
    pub total_weekly_interest: f64,
    pub total_weekly_payout:   f64,
}

/// One member as shown in a ledger table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MemberRow {
    pub id:              MemberId,
    pub name:            String,
    pub tier:            TierId,
    pub balance:         f64,
    pub weekly_interest: f64,
    pub weekly_payout:   f64,
    pub joined_on:       NaiveDate,
}

fn interest_on(balance: f64, rate: f64) -> f64 {
    money::round(balance * rate)
}

fn payout_on(balance: f64, interest: f64) -> f64 {
    money::round(balance + interest)
}

pub fn weekly_interest(member: &Member) -> f64 {
    interest_on(member.balance, member.rate)
}

pub fn weekly_payout(member: &Member) -> f64 {
    payout_on(member.balance, weekly_interest(member))
}

/// What a prospective member contributing `amount` at `rate` would accrue
/// in one week.
pub fn preview_interest_and_payout(amount: f64, rate: f64) -> Preview {
    let interest = interest_on(amount, rate);
    Preview {
        interest,
        payout: payout_on(amount, interest),
    }
}

pub fn member_row(member: &Member) -> MemberRow {
    MemberRow {
        id: member.id.clone(),
        name: member.name.clone(),
        tier: member.tier,
        balance: member.balance,
        weekly_interest: weekly_interest(member),
        weekly_payout: weekly_payout(member),
        joined_on: member.joined_at.date_naive(),
    }
}

/// Compound one week of interest into every balance.
///
/// Fails with `EmptyOperation` when the ledger has no members, leaving it
/// untouched. New balances are computed up front and applied in one step.
pub fn apply_weekly_tick(store: &mut LedgerStore) -> LedgerResult<TickReport> {
    if store.is_empty() {
        return Err(LedgerError::EmptyOperation { operation: Operation::WeeklyTick });
    }

    let payouts: Vec<f64> = store.all().iter().map(weekly_payout).collect();
    let interest_credited = money::round(store.all().iter().map(weekly_interest).sum());

    let persistence = store.set_balances(&payouts)?;
    let report = TickReport {
        members_updated: payouts.len(),
        interest_credited,
        total_balance: store.total_balance(),
        persistence,
    };

    log::debug!(
        "weekly tick: {} members, interest={:.2} total={:.2} durable={}",
        report.members_updated,
        report.interest_credited,
        report.total_balance,
        report.persistence.is_durable()
    );
    Ok(report)
}

/// Aggregate weekly figures across the ledger. Empty ledger is an
/// `EmptyOperation`.
pub fn summarize(store: &LedgerStore) -> LedgerResult<AccrualSummary> {
    if store.is_empty() {
        return Err(LedgerError::EmptyOperation { operation: Operation::Summary });
    }
    let members = store.all();
    Ok(AccrualSummary {
        member_count: members.len(),
        total_balance: store.total_balance(),
        total_weekly_interest: money::round(members.iter().map(weekly_interest).sum()),
        total_weekly_payout: money::round(members.iter().map(weekly_payout).sum()),
    })
}
