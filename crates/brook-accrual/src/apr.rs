//! Conversions between an annual percentage rate in basis points and the
//! per-second growth coefficient used by the accrual engine.
//!
//! The conversion is linear (`apr / SECONDS_PER_YEAR`) and floors, so the
//! effective yield of a configured APR is never above what was asked for.

use brook_core::constants::{BPS_PRECISION, SCALE, SECONDS_PER_YEAR};
use brook_core::error::VaultError;
use brook_core::fixed::mul_div_floor;

/// `floor(apr_bps * SCALE / BPS_PRECISION / SECONDS_PER_YEAR)`.
///
/// Infallible: `u32::MAX * SCALE` is far below `u128::MAX`.
pub fn rate_per_second_from_apr_bps(apr_bps: u32) -> u128 {
    apr_bps as u128 * SCALE / (BPS_PRECISION * SECONDS_PER_YEAR as u128)
}

/// Annualised rate in basis points implied by `rate_per_second` (floored).
pub fn apr_bps_from_rate_per_second(rate_per_second: u128) -> Result<u128, VaultError> {
    let per_year = rate_per_second
        .checked_mul(SECONDS_PER_YEAR as u128)
        .ok_or(VaultError::Overflow)?;
    mul_div_floor(per_year, BPS_PRECISION, SCALE)
}
