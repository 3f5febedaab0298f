//! # brook-vault — Share ledger, safety guard and vault composition.
//!
//! Composes the Brook subsystems into a single owned aggregate:
//! - [`vault::Vault`] — deposit/withdraw, admin operations and read-only views
//! - [`ledger::ShareLedger`] — per-holder shares and asset/share conversion
//! - [`guard`] — owner and pause gate, reentrancy lock
//! - [`audit::AuditLog`] — append-only record of successful operations
//! - [`state::VaultState`] — persisted state record and its binary codec
//! - [`config::VaultConfig`] — deployment configuration
//! - [`telemetry`] — tracing subscriber setup

pub mod audit;
pub mod config;
pub mod guard;
pub mod ledger;
pub mod state;
pub mod telemetry;
pub mod vault;

pub use audit::{AuditLog, AuditRecord};
pub use config::{ConfigError, VaultConfig};
pub use state::VaultState;
pub use telemetry::init_logging;
pub use vault::Vault;
