//! End-to-end scenarios for the vault.
//!
//! Each test drives a vault over an in-memory asset and a manual clock and
//! checks the documented behaviour of one operation or failure mode.

use std::sync::Arc;

use brook_core::asset::MemoryAsset;
use brook_core::clock::ManualClock;
use brook_core::constants::SCALE;
use brook_core::error::VaultError;
use brook_core::traits::AssetLedger;
use brook_core::types::{AssetId, VaultEvent};
use brook_tests::helpers::*;
use brook_vault::{Vault, VaultState};

// ---------------------------------------------------------------------------
// Deposit
// ---------------------------------------------------------------------------

#[test]
fn deposit_zero_rejected_in_any_state() {
    let h = Harness::new(SCALE / 1_000);
    let alice = acct("alice");
    assert_eq!(h.vault.deposit(&alice, 0), Err(VaultError::InvalidAmount));

    h.fund(&alice, 100);
    h.vault.deposit(&alice, 100).unwrap();
    h.advance(1_000);
    assert_eq!(h.vault.deposit(&alice, 0), Err(VaultError::InvalidAmount));

    h.vault.set_paused(&owner(), true).unwrap();
    assert_eq!(h.vault.deposit(&alice, 0), Err(VaultError::InvalidAmount));
}

#[test]
fn dust_rejected_at_double_rate() {
    // 1% per second for 100 seconds doubles the rate in one accrual.
    let h = Harness::new(SCALE / 100);
    h.advance(100);
    h.vault.accrue().unwrap();
    assert_eq!(h.vault.exchange_rate(), 2 * SCALE);

    let alice = acct("alice");
    h.fund(&alice, 1);
    assert_eq!(
        h.vault.deposit(&alice, 1),
        Err(VaultError::DustAmount { amount: 1 })
    );
    assert_eq!(h.asset.balance_of(&alice), 1);
    assert_eq!(h.vault.total_shares(), 0);
}

#[test]
fn proportional_shares_at_same_rate() {
    let h = Harness::new(SCALE / 10_000);
    h.advance(3_600);
    h.vault.accrue().unwrap();

    let (alice, bob) = (acct("alice"), acct("bob"));
    let x = 7 * SCALE;
    h.fund(&alice, x);
    h.fund(&bob, 2 * x);
    let a = h.vault.deposit(&alice, x).unwrap();
    let b = h.vault.deposit(&bob, 2 * x).unwrap();
    // Floor rounding can cost the larger deposit at most one share.
    assert!(b == 2 * a || b == 2 * a + 1, "a={a} b={b}");
    h.assert_invariants();
}

// ---------------------------------------------------------------------------
// Withdraw
// ---------------------------------------------------------------------------

#[test]
fn over_withdraw_rejected() {
    let h = Harness::new(0);
    let alice = acct("alice");
    h.fund(&alice, 10 * SCALE);
    assert_eq!(h.vault.deposit(&alice, 10 * SCALE).unwrap(), 10 * SCALE);
    assert_eq!(
        h.vault.withdraw(&alice, 20 * SCALE),
        Err(VaultError::InsufficientShares {
            have: 10 * SCALE,
            need: 20 * SCALE
        })
    );
    assert_eq!(h.vault.shares_of(&alice), 10 * SCALE);
}

#[test]
fn withdraw_zero_rejected() {
    let h = Harness::new(0);
    assert_eq!(
        h.vault.withdraw(&acct("alice"), 0),
        Err(VaultError::InvalidAmount)
    );
}

#[test]
fn round_trip_without_elapsed_time_never_gains() {
    let h = Harness::new(SCALE / 1_000);
    h.advance(777);
    h.vault.accrue().unwrap();
    let rate = h.vault.exchange_rate();

    let alice = acct("alice");
    let amount = 123_456_789_012_345u128;
    h.fund(&alice, amount);
    let shares = h.vault.deposit(&alice, amount).unwrap();
    let back = h.vault.withdraw(&alice, shares).unwrap();
    assert!(back <= amount);
    assert!(amount - back <= rate / SCALE + 1, "shortfall {}", amount - back);
}

#[test]
fn yield_accrues_to_holders() {
    let h = Harness::new(SCALE / 1_000_000);
    let alice = acct("alice");
    h.fund(&alice, 1_000 * SCALE);
    let shares = h.vault.deposit(&alice, 1_000 * SCALE).unwrap();

    h.advance(10_000);
    h.back_yield(100 * SCALE);
    let out = h.vault.withdraw_all(&alice).unwrap();
    // 1e-6 per second for 10,000 seconds is 1%.
    assert_eq!(out, 1_010 * SCALE);
    assert_eq!(h.vault.shares_of(&alice), 0);
    assert!(shares > 0);
}

#[test]
fn later_depositor_gets_fewer_shares() {
    let h = Harness::new(SCALE / 100_000);
    let (alice, bob) = (acct("alice"), acct("bob"));
    h.fund(&alice, SCALE);
    h.fund(&bob, SCALE);
    let early = h.vault.deposit(&alice, SCALE).unwrap();
    h.advance(1_000);
    let late = h.vault.deposit(&bob, SCALE).unwrap();
    assert!(late < early);
    h.assert_invariants();
}

// ---------------------------------------------------------------------------
// Accrual
// ---------------------------------------------------------------------------

#[test]
fn accrue_is_idempotent_without_elapsed_time() {
    let h = Harness::new(SCALE / 1_000);
    h.advance(10);
    let first = h.vault.accrue().unwrap();
    let ts = h.vault.last_accrual_timestamp();
    let second = h.vault.accrue().unwrap();
    assert_eq!(first, second);
    assert_eq!(h.vault.last_accrual_timestamp(), ts);
}

#[test]
fn zero_growth_accrual_still_advances_timestamp() {
    // Once the rate is at or above 1.0 any non-zero coefficient grows it, so
    // a zero coefficient is the only way to get a zero delta.
    let h = Harness::new(0);
    let t = h.advance(1);
    assert_eq!(h.vault.accrue().unwrap(), SCALE);
    assert_eq!(h.vault.last_accrual_timestamp(), t);
}

// ---------------------------------------------------------------------------
// Guard
// ---------------------------------------------------------------------------

#[test]
fn pause_gate_blocks_users_not_admin_or_accrual() {
    let h = Harness::new(SCALE / 1_000);
    let alice = acct("alice");
    h.fund(&alice, 100);
    h.vault.deposit(&alice, 50).unwrap();

    h.vault.set_paused(&owner(), true).unwrap();
    assert_eq!(h.vault.deposit(&alice, 50), Err(VaultError::Paused));
    assert_eq!(h.vault.withdraw(&alice, 10), Err(VaultError::Paused));
    assert_eq!(h.vault.withdraw_all(&alice), Err(VaultError::Paused));
    // Holders without shares also see the pause first.
    assert_eq!(h.vault.withdraw_all(&acct("bob")), Err(VaultError::Paused));

    h.advance(5);
    assert!(h.vault.accrue().unwrap() > SCALE);
    assert!(h.vault.set_rate_per_second(&owner(), 0).is_ok());
    assert!(h.vault.set_paused(&owner(), false).is_ok());
    assert!(h.vault.withdraw_all(&alice).is_ok());
}

#[test]
fn non_owner_admin_calls_unauthorized() {
    let h = Harness::new(0);
    let mallory = acct("mallory");
    let foreign = brook_core::asset::MemoryAsset::new("FOREIGN");
    assert_eq!(
        h.vault.set_rate_per_second(&mallory, SCALE),
        Err(VaultError::Unauthorized)
    );
    assert_eq!(h.vault.set_paused(&mallory, true), Err(VaultError::Unauthorized));
    assert_eq!(
        h.vault.rescue_asset(&mallory, &foreign, &mallory, 0),
        Err(VaultError::Unauthorized)
    );
    assert_eq!(h.vault.rate_per_second(), 0);
    assert!(!h.vault.is_paused());
}

#[test]
fn rescue_cannot_touch_principal() {
    let h = Harness::new(0);
    let alice = acct("alice");
    h.fund(&alice, 1_000);
    h.vault.deposit(&alice, 1_000).unwrap();
    let managed: &dyn AssetLedger = &*h.asset;
    assert_eq!(
        h.vault.rescue_asset(&owner(), managed, &owner(), 1_000),
        Err(VaultError::ReservedAsset)
    );
    assert_eq!(h.vault.total_assets(), 1_000);
}

// ---------------------------------------------------------------------------
// Solvency
// ---------------------------------------------------------------------------

#[test]
fn unbacked_accrual_diverges_from_total_assets() {
    let h = Harness::new(SCALE / 100);
    let (alice, bob) = (acct("alice"), acct("bob"));
    h.fund(&alice, 100);
    h.fund(&bob, 100);
    h.vault.deposit(&alice, 100).unwrap();
    h.vault.deposit(&bob, 100).unwrap();

    h.advance(100);
    h.vault.accrue().unwrap();
    let owed = h.vault.assets_of(&alice).unwrap() + h.vault.assets_of(&bob).unwrap();
    assert_eq!(owed, 400);
    assert_eq!(h.vault.total_assets(), 200);

    // First withdrawer is paid in full; the last cannot redeem at the quoted rate.
    assert_eq!(h.vault.withdraw_all(&alice).unwrap(), 200);
    assert_eq!(h.vault.withdraw_all(&bob), Err(VaultError::TransferFailed));
    assert_eq!(h.vault.shares_of(&bob), 100);
    h.assert_invariants();
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

#[test]
fn audit_log_records_successes_only() {
    let h = Harness::new(SCALE / 1_000);
    let alice = acct("alice");
    h.fund(&alice, 1_000);

    h.vault.deposit(&alice, 1_000).unwrap();
    let _ = h.vault.deposit(&alice, 0);
    let _ = h.vault.withdraw(&alice, 5_000);
    let _ = h.vault.set_paused(&acct("mallory"), true);

    let log = h.vault.audit_log();
    assert_eq!(log.len(), 1);
    assert_eq!(
        log[0].event,
        VaultEvent::Deposited {
            holder: alice.clone(),
            assets: 1_000,
            shares: 1_000,
        }
    );
    assert_eq!(log[0].timestamp, START);

    h.advance(10);
    h.vault.withdraw(&alice, 500).unwrap();
    let tail = h.vault.audit_since(1);
    assert!(matches!(tail[0].event, VaultEvent::Accrued { .. }));
    assert!(matches!(tail[1].event, VaultEvent::Withdrawn { shares: 500, .. }));

    let json = serde_json::to_string(&tail).unwrap();
    assert!(json.contains("\"kind\":\"withdrawn\""), "{json}");
}

// ---------------------------------------------------------------------------
// Compounding
// ---------------------------------------------------------------------------

#[test]
fn daily_accrual_compounds_above_simple_interest() {
    let rps = brook_accrual::rate_per_second_from_apr_bps(500);

    let daily = Harness::new(rps);
    for _ in 0..365 {
        daily.advance(86_400);
        daily.vault.accrue().unwrap();
    }

    let yearly = Harness::new(rps);
    yearly.advance(365 * 86_400);
    yearly.vault.accrue().unwrap();

    // e^0.05 ~ 1.05127 versus a single linear step just under 1.05.
    let d = daily.vault.exchange_rate();
    let y = yearly.vault.exchange_rate();
    assert!(d > 10_512 * SCALE / 10_000 && d < 10_513 * SCALE / 10_000, "daily {d}");
    assert!(y > 10_499 * SCALE / 10_000 && y < 105 * SCALE / 100, "yearly {y}");
}

// ---------------------------------------------------------------------------
// Arithmetic limits
// ---------------------------------------------------------------------------

#[test]
fn deposit_past_share_capacity_overflows_without_side_effects() {
    let asset = Arc::new(MemoryAsset::new(ASSET));
    let clock = Arc::new(ManualClock::new(START));
    let mut state = VaultState::new(AssetId::from(ASSET), vault_account(), owner(), 0, START);
    state.ledger.mint(&acct("whale"), u128::MAX - 10).unwrap();
    let vault = Vault::from_state(state, asset.clone(), clock).unwrap();

    let alice = acct("alice");
    assert!(asset.mint(&alice, 100));
    asset.approve(&alice, &vault_account(), u128::MAX);

    let before = vault.state();
    assert_eq!(vault.deposit(&alice, 100), Err(VaultError::Overflow));
    assert_eq!(vault.state(), before);
    assert!(vault.audit_log().is_empty());
    assert_eq!(asset.balance_of(&alice), 100);

    // A deposit that still fits goes through.
    assert_eq!(vault.deposit(&alice, 10).unwrap(), 10);
    assert_eq!(vault.total_shares(), u128::MAX);
}

#[test]
fn accrual_overflow_leaves_rate_untouched() {
    let h = Harness::new(u128::MAX / 2);
    let alice = acct("alice");
    h.fund(&alice, SCALE);
    h.advance(3);

    let before = h.vault.state();
    assert_eq!(h.vault.accrue(), Err(VaultError::Overflow));
    assert_eq!(h.vault.projected_exchange_rate(), Err(VaultError::Overflow));
    // Deposits accrue first, so they fail the same way.
    assert_eq!(h.vault.deposit(&alice, SCALE), Err(VaultError::Overflow));

    assert_eq!(h.vault.state(), before);
    assert_eq!(h.vault.exchange_rate(), SCALE);
    assert_eq!(h.vault.last_accrual_timestamp(), START);
    assert!(h.vault.audit_log().is_empty());
    assert_eq!(h.asset.balance_of(&alice), SCALE);
}
