//! # brook-accrual — Time-indexed exchange-rate accrual.
//!
//! All calculations use integer arithmetic only.
//!
//! - **Linear-per-call growth**: each accrual adds
//!   `rate * rate_per_second * elapsed / SCALE` to the exchange rate, floored.
//!   Frequent calls approximate continuous compounding; one call over a long
//!   gap applies simple interest for the whole gap.
//! - **Lazy**: nothing ticks in the background. The vault accrues as the first
//!   step of every state-mutating operation.
//! - **APR helpers**: convert between annual basis points and the per-second
//!   coefficient.

pub mod apr;
pub mod engine;

pub use apr::{apr_bps_from_rate_per_second, rate_per_second_from_apr_bps};
pub use engine::{AccrualEngine, accrual_delta};
