//! # Bulwark Common
//!
//! Shared types, errors, and defaults used across Bulwark components.
//!
//! ## Modules
//! - `types` - Core data structures (AccountRecord, LoginStatus, AttackReport, etc.)
//! - `error` - Common error types
//! - `constants` - Default policy values and seed data

pub mod constants;
pub mod error;
pub mod types;

pub use error::BulwarkError;
pub use types::*;
