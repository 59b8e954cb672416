//! Error types for ride and message store operations.

use carpool_types::{RideId, UserId};
use thiserror::Error;

/// Errors that can occur during ride and message store operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RideError {
    /// A required argument was missing or blank.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No ride exists with this id.
    #[error("ride not found: {0}")]
    NotFound(RideId),

    /// A ride with this id already exists.
    #[error("ride already exists: {0}")]
    AlreadyExists(RideId),

    /// Every seat on the ride is taken.
    #[error("no seats available on ride {0}")]
    NoSeatsAvailable(RideId),

    /// The user is already a rider on this ride.
    #[error("{user} already joined ride {ride}")]
    AlreadyJoined { ride: RideId, user: UserId },

    /// The store lock was poisoned.
    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Convenience type alias for ride and message store operations.
pub type Result<T> = std::result::Result<T, RideError>;
