//! The [`RideStore`] and [`MessageStore`] traits defining the ride source
//! interface.

use carpool_types::{RideId, UserId};

use crate::error::Result;
use crate::messages::{Message, StoreHealth};
use crate::ride::{JoinReceipt, NewRide, Ride, RideQuery};

/// Storage backend for ride records.
///
/// Implementations must be thread-safe. A remote backend that becomes
/// unavailable is expected to degrade to its fallback dataset rather than
/// surface an error from `list_rides`.
pub trait RideStore: Send + Sync {
    /// Rides matching every filter in `query`, earliest start first.
    fn list_rides(&self, query: &RideQuery) -> Result<Vec<Ride>>;

    /// Read a single ride. Returns `Ok(None)` if it does not exist.
    fn get_ride(&self, ride_id: &RideId) -> Result<Option<Ride>>;

    /// Store a new ride, assigning an id and creation time where missing.
    fn create_ride(&self, ride: NewRide) -> Result<Ride>;

    /// Add `user_id` as a rider, taking one seat.
    fn join_ride(&self, ride_id: &RideId, user_id: &UserId) -> Result<JoinReceipt>;
}

/// Storage backend for ride chat messages.
pub trait MessageStore: Send + Sync {
    /// Up to `limit` messages in `room_id`, oldest first. An unknown room is
    /// empty, not an error.
    fn list_messages(&self, room_id: &str, limit: usize) -> Result<Vec<Message>>;

    /// Append a message stamped with the current time.
    fn send_message(&self, room_id: &str, sender: &str, body: &str) -> Result<Message>;

    /// Check that the backend is reachable. Never fails; problems are
    /// reported in the returned health.
    fn ping(&self) -> StoreHealth;
}
