//! Adversarial and property-based test suite for Brook.
//!
//! This crate contains integration tests that drive the vault across crate
//! boundaries and check the accounting invariants under randomized inputs.

pub mod helpers;
