//! Accrual engine implementing the [`RateAccrual`] trait.

use brook_core::error::VaultError;
use brook_core::fixed::mul3_scale_floor;
use brook_core::traits::RateAccrual;
use brook_core::types::{Accrual, RateState};
use tracing::{debug, warn};

/// The production accrual rule: linear growth over the elapsed interval,
/// applied to the current (already grown) rate.
#[derive(Debug, Clone, Default)]
pub struct AccrualEngine;

impl AccrualEngine {
    /// Create a new AccrualEngine.
    pub fn new() -> Self {
        Self
    }
}

/// Growth for one accrual: `floor(exchange_rate * rate_per_second * elapsed / SCALE)`.
///
/// Fails with [`VaultError::Overflow`] if either intermediate product exceeds `u128`.
pub fn accrual_delta(
    exchange_rate: u128,
    rate_per_second: u128,
    elapsed: u64,
) -> Result<u128, VaultError> {
    if rate_per_second == 0 || elapsed == 0 {
        return Ok(0);
    }
    mul3_scale_floor(exchange_rate, rate_per_second, elapsed as u128)
}

impl RateAccrual for AccrualEngine {
    fn accrue(&self, state: &RateState, now: u64) -> Result<Accrual, VaultError> {
        if now < state.last_accrual {
            warn!(
                now,
                last_accrual = state.last_accrual,
                "clock moved backwards; skipping accrual"
            );
            return Ok(Accrual::unchanged(*state));
        }

        let elapsed = now - state.last_accrual;
        if elapsed == 0 {
            return Ok(Accrual::unchanged(*state));
        }

        let delta = accrual_delta(state.exchange_rate, state.rate_per_second, elapsed)?;
        let exchange_rate = state
            .exchange_rate
            .checked_add(delta)
            .ok_or(VaultError::Overflow)?;

        // The timestamp advances even when the delta floors to zero, so the
        // skipped interval is never replayed later.
        debug!(elapsed, delta, exchange_rate, "accrued exchange rate");
        Ok(Accrual {
            state: RateState {
                exchange_rate,
                last_accrual: now,
                ..*state
            },
            delta,
            elapsed,
        })
    }
}
