//! Foundation types for the carpool credit system.
//!
//! Every other carpool crate depends on `carpool-types` for the identifiers
//! that key wallets, weekly counters, and ride records.
//!
//! # Key Types
//!
//! - [`UserId`] — Opaque user identifier supplied by the identity provider
//! - [`RideId`] — Opaque ride identifier supplied by the ride source

pub mod error;
pub mod ids;

pub use error::TypeError;
pub use ids::{RideId, UserId};
