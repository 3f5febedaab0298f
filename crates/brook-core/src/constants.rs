//! Protocol constants. Rates and exchange rates are fixed-point with [`SCALE`]
//! as the denominator.

/// Fixed-point precision: `1.0 == SCALE`.
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Exchange rate of a freshly deployed vault (one asset unit per share unit).
pub const INITIAL_EXCHANGE_RATE: u128 = SCALE;

/// Basis-point denominator (100% = 10,000 bps).
pub const BPS_PRECISION: u128 = 10_000;

/// Seconds in a 365-day year, used to convert annual rates to per-second rates.
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// Environment variable prefix recognised by the configuration loader.
pub const ENV_PREFIX: &str = "BROOK";
