//! Fixed-point helpers over `u128` with [`SCALE`] as the implicit denominator.
//!
//! Every helper rounds toward zero (floor for unsigned values), so a
//! conversion never rounds in the caller's favour. Products are widened to
//! 256 bits before dividing; a result that does not fit back into `u128`
//! yields [`VaultError::Overflow`] instead of wrapping.

use primitive_types::U256;

use crate::constants::SCALE;
use crate::error::VaultError;

fn narrow(value: U256) -> Result<u128, VaultError> {
    if value > U256::from(u128::MAX) {
        return Err(VaultError::Overflow);
    }
    Ok(value.as_u128())
}

/// `floor(a * b / denominator)`.
pub fn mul_div_floor(a: u128, b: u128, denominator: u128) -> Result<u128, VaultError> {
    if denominator == 0 {
        return Err(VaultError::DivisionByZero);
    }
    // Two u128 factors always fit in 256 bits.
    let product = U256::from(a) * U256::from(b);
    narrow(product / U256::from(denominator))
}

/// `floor(a * b / SCALE)`: multiply two fixed-point values, or scale an
/// integer amount by a fixed-point factor.
pub fn mul_scale_floor(a: u128, b: u128) -> Result<u128, VaultError> {
    mul_div_floor(a, b, SCALE)
}

/// `floor(a * SCALE / b)`: divide an amount by a fixed-point factor.
pub fn div_scale_floor(a: u128, b: u128) -> Result<u128, VaultError> {
    mul_div_floor(a, SCALE, b)
}

/// `floor(a * b * c / SCALE)`.
///
/// Used for the accrual delta `rate * rate_per_second * elapsed / SCALE`.
/// The three-term product is checked in 256 bits.
pub fn mul3_scale_floor(a: u128, b: u128, c: u128) -> Result<u128, VaultError> {
    let product = (U256::from(a) * U256::from(b))
        .checked_mul(U256::from(c))
        .ok_or(VaultError::Overflow)?;
    narrow(product / U256::from(SCALE))
}
