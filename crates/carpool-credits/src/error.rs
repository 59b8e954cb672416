//! Error types for credit ledger operations.

use carpool_types::UserId;
use thiserror::Error;

use crate::records::Credits;

/// Errors that can occur during ledger operations.
///
/// With the default configuration a completion is only rejected when a balance
/// would leave the `Credits` range, which takes billions of maximum-price rides.
#[derive(Debug, Error)]
pub enum CreditError {
    /// A rider's balance would drop below the configured overdraft floor.
    #[error(
        "insufficient credits for {user}: balance {balance}, charge {amount}, floor {floor}"
    )]
    InsufficientCredits {
        user: UserId,
        balance: Credits,
        amount: Credits,
        floor: Credits,
    },

    /// Applying the completion would move a balance outside the `Credits` range.
    #[error("balance of {user} would overflow")]
    BalanceOverflow { user: UserId },

    /// The ledger lock was poisoned by a panicking writer.
    #[error("ledger lock poisoned: {0}")]
    LockPoisoned(String),

    /// Configuration could not be parsed or failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error while reading a configuration file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for ledger operations.
pub type Result<T> = std::result::Result<T, CreditError>;
