//! Ride source for the carpool credit system.
//!
//! Rides are owned by an external store; this crate defines the minimal
//! contract the rest of the system relies on and an in-memory store seeded
//! with the fixed fallback dataset used when no backend is configured.
//!
//! - [`Ride`], [`NewRide`], [`RideQuery`] — records and listing filters
//! - [`RideStore`] — list/create/join boundary
//! - [`InMemoryRideStore`] — fallback implementation
//! - [`MessageStore`] / [`InMemoryMessageStore`] — per-ride chat rooms

pub mod error;
pub mod memory;
pub mod messages;
pub mod ride;
pub mod traits;

pub use error::{Result, RideError};
pub use memory::{fallback_rides, InMemoryRideStore};
pub use messages::{
    fallback_messages, list_messages_or_fallback, InMemoryMessageStore, Message, StoreHealth,
    DEFAULT_MESSAGE_LIMIT,
};
pub use ride::{
    time_window_match, JoinReceipt, JoinStatus, NewRide, Ride, RideQuery,
    DEFAULT_MATCH_WINDOW_MINUTES,
};
pub use traits::{MessageStore, RideStore};
