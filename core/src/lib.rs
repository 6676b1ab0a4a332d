//! Savings-group ledger core.
//!
//! Members join at a fixed contribution tier, accrue weekly interest at the
//! tier's rate (frozen at enrollment), and may withdraw. The ledger is held
//! in memory and written to a single durable slot after every mutation.

pub mod accrual;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod ledger;
pub mod lifecycle;
pub mod member;
pub mod money;
pub mod store;
pub mod tier;
pub mod types;
