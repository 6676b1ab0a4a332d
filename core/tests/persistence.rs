//! Durable slot round-trips and best-effort persistence.
//!
//! Shared-cache in-memory URIs let a second connection see what the first
//! wrote, standing in for a process restart. Each test uses its own name.

use savings_core::{
    config::{LedgerConfig, TierConfig},
    error::{LedgerError, LedgerResult},
    ledger::SavingsLedger,
    store::{DurableSlot, LedgerStore, Persistence, SqliteSlot},
};

fn shared_slot(name: &str) -> SqliteSlot {
    let slot = SqliteSlot::open(&format!("file:{name}?mode=memory&cache=shared"))
        .expect("open shared slot");
    slot.migrate().expect("migration");
    slot
}

const KEY: &str = "savingsGroupStudentsV1";

struct FailingSlot;

impl DurableSlot for FailingSlot {
    fn read(&self, _key: &str) -> LedgerResult<Option<String>> {
        Ok(None)
    }

    fn write(&self, _key: &str, _payload: &str) -> LedgerResult<()> {
        Err(LedgerError::Persistence("quota exceeded".into()))
    }
}

#[test]
fn reload_yields_same_members_in_same_order() {
    let keeper = shared_slot("persist_roundtrip");
    let mut ledger =
        SavingsLedger::open(LedgerConfig::default_test(), Box::new(keeper.reopen().unwrap()))
            .unwrap();
    ledger.enroll("Ada", Some(1), 10_000.0).unwrap();
    ledger.enroll("Bo", Some(3), 30_000.0).unwrap();
    ledger.enroll("Cy", Some(2), 20_000.0).unwrap();
    ledger.apply_weekly_tick().unwrap();
    let saved = ledger.all().to_vec();
    drop(ledger);

    let reloaded =
        SavingsLedger::open(LedgerConfig::default_test(), Box::new(keeper.reopen().unwrap()))
            .unwrap();
    assert_eq!(reloaded.all(), saved.as_slice());
}

#[test]
fn load_then_save_rewrites_identical_payload() {
    let keeper = shared_slot("persist_resave");
    {
        let mut ledger =
            SavingsLedger::open(LedgerConfig::default_test(), Box::new(keeper.reopen().unwrap()))
                .unwrap();
        ledger.enroll("Ada", Some(1), 10_000.0).unwrap();
        ledger.enroll("Bo", Some(2), 20_000.0).unwrap();
        ledger.apply_weekly_tick().unwrap();
    }
    let before = keeper.read(KEY).unwrap().expect("slot written");

    let mut store = LedgerStore::load(Box::new(keeper.reopen().unwrap()), KEY);
    assert_eq!(store.save(), Persistence::Durable);

    let after = keeper.read(KEY).unwrap().expect("slot written");
    assert_eq!(before, after);
}

#[test]
fn every_mutation_reaches_the_slot() {
    let keeper = shared_slot("persist_every_mutation");
    let mut ledger =
        SavingsLedger::open(LedgerConfig::default_test(), Box::new(keeper.reopen().unwrap()))
            .unwrap();
    let stored_count = || {
        LedgerStore::load(Box::new(keeper.reopen().unwrap()), KEY).count()
    };
    let stored_total = || {
        LedgerStore::load(Box::new(keeper.reopen().unwrap()), KEY).total_balance()
    };

    let ada = ledger.enroll("Ada", Some(1), 10_000.0).unwrap();
    assert_eq!(stored_count(), 1, "after enroll");

    ledger.enroll("Bo", Some(2), 20_000.0).unwrap();
    ledger.apply_weekly_tick().unwrap();
    assert_eq!(stored_total(), 32_500.0, "after tick");

    ledger.withdraw(&ada.id).unwrap();
    assert_eq!(stored_count(), 1, "after withdraw");

    ledger.reset_all();
    assert_eq!(stored_count(), 0, "after reset");
    assert_eq!(keeper.slot_count().unwrap(), 1, "reset writes an empty list, not nothing");
}

#[test]
fn absent_slot_loads_empty() {
    let slot = SqliteSlot::in_memory().unwrap();
    slot.migrate().unwrap();
    let store = LedgerStore::load(Box::new(slot), KEY);
    assert_eq!(store.count(), 0);
}

#[test]
fn malformed_snapshot_loads_empty() {
    let keeper = shared_slot("persist_malformed");
    for payload in [
        "not json",
        "{}",
        r#"[{"id":"a","name":"Ada","tier":1,"amount":"NaN","rate":0.05,"joinedAt":"2026-01-05T09:00:00.000Z"}]"#,
        r#"[{"id":"a","name":"Ada","tier":1,"amount":100,"rate":0.05}]"#,
        r#"[{"id":"a","name":"  ","tier":1,"amount":100,"rate":0.05,"joinedAt":"2026-01-05T09:00:00.000Z"}]"#,
    ] {
        keeper.write(KEY, payload).unwrap();
        let ledger =
            SavingsLedger::open(LedgerConfig::default_test(), Box::new(keeper.reopen().unwrap()))
                .unwrap();
        assert_eq!(ledger.count(), 0, "payload {payload:?} should load as empty");
    }
}

#[test]
fn stored_numeric_strings_are_coerced() {
    let keeper = shared_slot("persist_coerce");
    keeper
        .write(
            KEY,
            r#"[{"id":"a","name":"Ada","tier":"1","amount":"10500.00","rate":"0.05","joinedAt":"2026-01-05T09:00:00.000Z"}]"#,
        )
        .unwrap();
    let ledger =
        SavingsLedger::open(LedgerConfig::default_test(), Box::new(keeper.reopen().unwrap()))
            .unwrap();
    let ada = &ledger.all()[0];
    assert_eq!(ada.balance, 10_500.0);
    assert_eq!(ada.rate, 0.05);
    assert_eq!(ledger.weekly_interest(ada), 525.0);
}

#[test]
fn rate_stays_frozen_when_catalog_changes() {
    let keeper = shared_slot("persist_frozen_rate");
    {
        let mut ledger =
            SavingsLedger::open(LedgerConfig::default_test(), Box::new(keeper.reopen().unwrap()))
                .unwrap();
        ledger.enroll("Ada", Some(1), 10_000.0).unwrap();
    }

    let mut changed = LedgerConfig::default_test();
    changed.tiers[0] = TierConfig { tier: 1, amount: 10_000.0, rate: 0.07 };
    let mut ledger =
        SavingsLedger::open(changed, Box::new(keeper.reopen().unwrap())).unwrap();

    assert_eq!(ledger.all()[0].rate, 0.05);
    ledger.apply_weekly_tick().unwrap();
    assert_eq!(ledger.all()[0].balance, 10_500.0);

    let newcomer = ledger.enroll("Bo", Some(1), 10_000.0).unwrap();
    assert_eq!(newcomer.rate, 0.07, "new enrollments see the new rate");
}

#[test]
fn write_failures_degrade_to_best_effort() {
    let mut ledger =
        SavingsLedger::open(LedgerConfig::default_test(), Box::new(FailingSlot)).unwrap();

    let ada = ledger.enroll("Ada", Some(1), 10_000.0).unwrap();
    assert!(!ledger.last_persistence().is_durable());
    assert_eq!(ledger.count(), 1, "in-memory ledger stays authoritative");

    let report = ledger.apply_weekly_tick().unwrap();
    assert!(
        matches!(&report.persistence, Persistence::BestEffort { reason } if reason.contains("quota")),
        "got {:?}",
        report.persistence
    );
    assert_eq!(ledger.member(&ada.id).unwrap().balance, 10_500.0);

    ledger.withdraw(&ada.id).unwrap();
    assert_eq!(ledger.count(), 0);
}

#[test]
fn ledgers_under_different_keys_do_not_collide() {
    let keeper = shared_slot("persist_keys");
    let mut store_a = LedgerStore::load(Box::new(keeper.reopen().unwrap()), "group-a");
    let store_b = LedgerStore::load(Box::new(keeper.reopen().unwrap()), "group-b");

    let ledger = {
        let mut l = SavingsLedger::build_test().unwrap();
        l.enroll("Ada", Some(1), 10_000.0).unwrap();
        l
    };
    store_a.add(ledger.all()[0].clone());

    assert_eq!(LedgerStore::load(Box::new(keeper.reopen().unwrap()), "group-a").count(), 1);
    assert_eq!(LedgerStore::load(Box::new(keeper.reopen().unwrap()), "group-b").count(), 0);
    assert_eq!(store_b.key(), "group-b");
}
