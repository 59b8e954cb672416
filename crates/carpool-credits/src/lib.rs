//! Credit ledger for carpool rides.
//!
//! Riders pay for a completed ride in credits proportional to its distance;
//! the driver earns the same amount, clamped by a weekly earning cap. This
//! crate provides:
//! - [`CreditConfig`] with environment and TOML loading
//! - `CreditReader` / `CreditWriter` trait boundaries
//! - [`InMemoryCreditLedger`], an explicit ledger object owning all balances
//! - Transaction and settlement records with a stable JSON shape
//!
//! # Quick Start
//!
//! ```rust
//! use carpool_credits::{CreditConfig, CreditReader, CreditWriter, InMemoryCreditLedger, RideCompletion};
//!
//! let ledger = InMemoryCreditLedger::new(CreditConfig::default());
//! let ride = RideCompletion::new("ride-1", Some(3.0), "driver-1")
//!     .with_riders(["rider-a", "rider-b"]);
//! let settlement = ledger.process_ride_completion(&ride).unwrap();
//! assert_eq!(settlement.amount, 12);
//! assert_eq!(ledger.wallet_balance(&"rider-a".into()).unwrap(), -12);
//! assert_eq!(ledger.wallet_balance(&"driver-1".into()).unwrap(), 12);
//! ```

pub mod config;
pub mod error;
pub mod memory;
pub mod records;
pub mod traits;

pub use config::{
    CreditConfig, DEFAULT_RATE_PER_MILE, DEFAULT_WEEKLY_EARN_CAP, MAX_RIDE_CREDITS,
};
pub use error::{CreditError, Result};
pub use memory::InMemoryCreditLedger;
pub use records::{CreditTransaction, Credits, RideCompletion, RideSettlement, TransactionKind};
pub use traits::{CreditReader, CreditWriter};
