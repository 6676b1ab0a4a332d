//! Full member journeys through the ledger.

use savings_core::{ledger::SavingsLedger, money};

#[test]
fn ada_joins_accrues_and_withdraws() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut ledger = SavingsLedger::build_test().unwrap();

    let ada = ledger.enroll("Ada", Some(1), 10_000.0).unwrap();
    assert_eq!(ada.balance, 10_000.0);
    assert_eq!(ada.rate, 0.05);

    ledger.apply_weekly_tick().unwrap();
    let ada = ledger.member(&ada.id).unwrap().clone();
    assert_eq!(ada.balance, 10_500.0);
    assert_eq!(ledger.weekly_interest(&ada), 525.0);
    assert_eq!(money::format(ada.balance), "₦10,500.00");

    ledger.withdraw(&ada.id).unwrap();
    assert_eq!(ledger.count(), 0);
}

#[test]
fn two_tiers_sum_to_exact_total() {
    let mut ledger = SavingsLedger::build_test().unwrap();
    let a = ledger.enroll("Ada", Some(1), 10_000.0).unwrap();
    let b = ledger.enroll("Bo", Some(3), 30_000.0).unwrap();

    assert_eq!(ledger.total_balance(), money::round(a.balance + b.balance));
    assert_eq!(ledger.total_balance(), 40_000.0);

    // Fractional balances after several weeks still sum to cents.
    for _ in 0..3 {
        ledger.apply_weekly_tick().unwrap();
    }
    let sum: f64 = ledger.all().iter().map(|m| m.balance).sum();
    assert_eq!(ledger.total_balance(), money::round(sum));
    assert_eq!(ledger.total_balance(), money::round(11_576.25 + 51_840.0));
}
