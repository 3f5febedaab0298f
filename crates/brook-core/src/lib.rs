//! # brook-core
//! Foundation types, fixed-point arithmetic and collaborator traits for the
//! Brook vault.

pub mod asset;
pub mod clock;
pub mod constants;
pub mod error;
pub mod fixed;
pub mod traits;
pub mod types;
