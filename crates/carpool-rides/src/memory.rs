//! In-memory ride store.
//!
//! [`InMemoryRideStore`] keeps rides in a `HashMap` behind a `RwLock`. When
//! built with [`InMemoryRideStore::with_fallback`] it serves the fixed demo
//! dataset that stands in for an unreachable backend.

use std::collections::HashMap;
use std::sync::RwLock;

use carpool_types::{RideId, UserId};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, RideError};
use crate::ride::{JoinReceipt, JoinStatus, NewRide, Ride, RideQuery};
use crate::traits::RideStore;

/// The fallback dataset, with start times relative to `now`.
pub fn fallback_rides(now: DateTime<Utc>) -> Vec<Ride> {
    vec![
        Ride {
            ride_id: "ride-1".into(),
            driver_id: "driver-1".into(),
            driver_name: "SAUMIT G.".into(),
            origin: "Rappahannock Deck".into(),
            origin_zone: "North".into(),
            campus_zone: "Main Quad".into(),
            start_time: now + Duration::minutes(30),
            time_window_minutes: 20,
            seats_total: 3,
            seats_available: 2,
            recurrence: vec!["M".into(), "W".into(), "F".into()],
            rider_ids: Vec::new(),
            distance_miles: None,
            created_at: None,
        },
        Ride {
            ride_id: "ride-2".into(),
            driver_id: "driver-2".into(),
            driver_name: "ALEX R.".into(),
            origin: "Fairfax Circle".into(),
            origin_zone: "East".into(),
            campus_zone: "Johnson Center".into(),
            start_time: now + Duration::minutes(60),
            time_window_minutes: 30,
            seats_total: 2,
            seats_available: 1,
            recurrence: vec!["Tu".into(), "Th".into()],
            rider_ids: vec!["student-demo".into()],
            distance_miles: None,
            created_at: None,
        },
    ]
}

/// An in-memory implementation of [`RideStore`].
#[derive(Debug, Default)]
pub struct InMemoryRideStore {
    rides: RwLock<HashMap<RideId, Ride>>,
}

impl InMemoryRideStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given rides.
    pub fn with_rides(rides: impl IntoIterator<Item = Ride>) -> Self {
        let rides = rides
            .into_iter()
            .map(|ride| (ride.ride_id.clone(), ride))
            .collect();
        Self {
            rides: RwLock::new(rides),
        }
    }

    /// Create a store seeded with [`fallback_rides`] anchored at the current time.
    pub fn with_fallback() -> Self {
        Self::with_rides(fallback_rides(Utc::now()))
    }
}

impl RideStore for InMemoryRideStore {
    fn list_rides(&self, query: &RideQuery) -> Result<Vec<Ride>> {
        let rides = self.rides.read().map_err(|e| {
            RideError::LockPoisoned(e.to_string())
        })?;
        let mut result: Vec<Ride> = rides
            .values()
            .filter(|ride| query.matches(ride))
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.ride_id.cmp(&b.ride_id))
        });
        Ok(result)
    }

    fn get_ride(&self, ride_id: &RideId) -> Result<Option<Ride>> {
        let rides = self.rides.read().map_err(|e| {
            RideError::LockPoisoned(e.to_string())
        })?;
        Ok(rides.get(ride_id).cloned())
    }

    fn create_ride(&self, new_ride: NewRide) -> Result<Ride> {
        if new_ride.driver_id.as_str().trim().is_empty() {
            return Err(RideError::InvalidArgument("driverId required".into()));
        }
        let seats_available = new_ride.seats_available.unwrap_or(new_ride.seats_total);
        if seats_available > new_ride.seats_total {
            return Err(RideError::InvalidArgument(format!(
                "seatsAvailable ({seats_available}) exceeds seatsTotal ({})",
                new_ride.seats_total
            )));
        }

        let ride_id = new_ride
            .ride_id
            .unwrap_or_else(|| RideId::new(format!("ride-{}", Uuid::now_v7())));

        let mut rides = self.rides.write().map_err(|e| {
            RideError::LockPoisoned(e.to_string())
        })?;
        if rides.contains_key(&ride_id) {
            return Err(RideError::AlreadyExists(ride_id));
        }

        let ride = Ride {
            ride_id: ride_id.clone(),
            driver_id: new_ride.driver_id,
            driver_name: new_ride.driver_name,
            origin: new_ride.origin,
            origin_zone: new_ride.origin_zone,
            campus_zone: new_ride.campus_zone,
            start_time: new_ride.start_time,
            time_window_minutes: new_ride.time_window_minutes,
            seats_total: new_ride.seats_total,
            seats_available,
            recurrence: new_ride.recurrence,
            rider_ids: new_ride.rider_ids,
            distance_miles: new_ride.distance_miles,
            created_at: Some(Utc::now()),
        };
        rides.insert(ride_id, ride.clone());
        debug!(ride = %ride.ride_id, driver = %ride.driver_id, "ride created");
        Ok(ride)
    }

    fn join_ride(&self, ride_id: &RideId, user_id: &UserId) -> Result<JoinReceipt> {
        if ride_id.as_str().trim().is_empty() || user_id.as_str().trim().is_empty() {
            return Err(RideError::InvalidArgument(
                "rideId and userId required".into(),
            ));
        }

        let mut rides = self.rides.write().map_err(|e| {
            RideError::LockPoisoned(e.to_string())
        })?;
        let ride = rides
            .get_mut(ride_id)
            .ok_or_else(|| RideError::NotFound(ride_id.clone()))?;

        if ride.has_rider(user_id) {
            return Err(RideError::AlreadyJoined {
                ride: ride_id.clone(),
                user: user_id.clone(),
            });
        }
        if ride.is_full() {
            return Err(RideError::NoSeatsAvailable(ride_id.clone()));
        }

        ride.rider_ids.push(user_id.clone());
        ride.seats_available -= 1;
        debug!(
            ride = %ride_id,
            user = %user_id,
            seats_available = ride.seats_available,
            "rider joined"
        );

        Ok(JoinReceipt {
            ride_id: ride_id.clone(),
            user_id: user_id.clone(),
            status: JoinStatus::Joined,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn new_ride(id: Option<&str>) -> NewRide {
        NewRide {
            ride_id: id.map(RideId::from),
            driver_id: "driver-9".into(),
            driver_name: "JO K.".into(),
            origin: "West Lot".into(),
            origin_zone: "West".into(),
            campus_zone: "Main Quad".into(),
            start_time: Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap(),
            time_window_minutes: 15,
            seats_total: 1,
            seats_available: None,
            recurrence: Vec::new(),
            rider_ids: Vec::new(),
            distance_miles: Some(3.0),
        }
    }

    #[test]
    fn fallback_store_lists_both_rides_in_start_order() {
        let store = InMemoryRideStore::with_fallback();
        let rides = store.list_rides(&RideQuery::default()).unwrap();
        let ids: Vec<&str> = rides.iter().map(|r| r.ride_id.as_str()).collect();
        assert_eq!(ids, vec!["ride-1", "ride-2"]);
    }

    #[test]
    fn fallback_store_filters_by_zone() {
        let store = InMemoryRideStore::with_fallback();
        let rides = store
            .list_rides(&RideQuery::default().campus_zone("Johnson Center"))
            .unwrap();
        assert_eq!(rides.len(), 1);
        assert_eq!(rides[0].driver_id, UserId::from("driver-2"));
        assert!(rides[0].has_rider(&"student-demo".into()));
    }

    #[test]
    fn fallback_store_filters_by_time() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 7, 0, 0).unwrap();
        let store = InMemoryRideStore::with_rides(fallback_rides(now));
        // ride-1 is 30 min out, ride-2 60 min out.
        let rides = store
            .list_rides(&RideQuery::default().around(now, Some(40)))
            .unwrap();
        assert_eq!(rides.len(), 1);
        assert_eq!(rides[0].ride_id, RideId::from("ride-1"));
    }

    #[test]
    fn create_assigns_id_and_defaults() {
        let store = InMemoryRideStore::new();
        let ride = store.create_ride(new_ride(None)).unwrap();
        assert!(ride.ride_id.as_str().starts_with("ride-"));
        assert_eq!(ride.seats_available, 1);
        assert!(ride.created_at.is_some());
        assert_eq!(store.get_ride(&ride.ride_id).unwrap(), Some(ride));
    }

    #[test]
    fn create_rejects_duplicate_id() {
        let store = InMemoryRideStore::new();
        store.create_ride(new_ride(Some("ride-x"))).unwrap();
        let err = store.create_ride(new_ride(Some("ride-x"))).unwrap_err();
        assert_eq!(err, RideError::AlreadyExists("ride-x".into()));
    }

    #[test]
    fn create_rejects_overbooked_seats() {
        let store = InMemoryRideStore::new();
        let mut input = new_ride(None);
        input.seats_available = Some(2);
        assert!(matches!(
            store.create_ride(input),
            Err(RideError::InvalidArgument(_))
        ));
    }

    #[test]
    fn join_requires_both_ids() {
        let store = InMemoryRideStore::with_fallback();
        let err = store
            .join_ride(&RideId::new(""), &"u1".into())
            .unwrap_err();
        assert_eq!(
            err,
            RideError::InvalidArgument("rideId and userId required".into())
        );
        assert!(store.join_ride(&"ride-1".into(), &UserId::new(" ")).is_err());
    }

    #[test]
    fn join_takes_a_seat() {
        let store = InMemoryRideStore::with_fallback();
        let receipt = store.join_ride(&"ride-1".into(), &"u1".into()).unwrap();
        assert_eq!(receipt.status, JoinStatus::Joined);

        let ride = store.get_ride(&"ride-1".into()).unwrap().unwrap();
        assert_eq!(ride.seats_available, 1);
        assert_eq!(ride.rider_ids, vec![UserId::from("u1")]);
    }

    #[test]
    fn join_rejects_repeat_and_full_rides() {
        let store = InMemoryRideStore::with_fallback();
        let err = store
            .join_ride(&"ride-2".into(), &"student-demo".into())
            .unwrap_err();
        assert!(matches!(err, RideError::AlreadyJoined { .. }));

        store.join_ride(&"ride-2".into(), &"u1".into()).unwrap();
        let err = store.join_ride(&"ride-2".into(), &"u2".into()).unwrap_err();
        assert_eq!(err, RideError::NoSeatsAvailable("ride-2".into()));
    }

    #[test]
    fn join_unknown_ride() {
        let store = InMemoryRideStore::new();
        let err = store.join_ride(&"nope".into(), &"u1".into()).unwrap_err();
        assert_eq!(err, RideError::NotFound("nope".into()));
    }

    #[test]
    fn joined_ride_settles_on_the_ledger() {
        use carpool_credits::{CreditReader, CreditWriter, InMemoryCreditLedger};

        let store = InMemoryRideStore::with_fallback();
        store.join_ride(&"ride-1".into(), &"u1".into()).unwrap();
        store.join_ride(&"ride-1".into(), &"u2".into()).unwrap();
        let ride = store.get_ride(&"ride-1".into()).unwrap().unwrap();

        let ledger = InMemoryCreditLedger::default();
        let settlement = ledger
            .process_ride_completion(&ride.completion(Some(3.0)))
            .unwrap();
        assert_eq!(settlement.amount, 12);
        assert_eq!(ledger.wallet_balance(&"driver-1".into()).unwrap(), 12);
        assert_eq!(ledger.wallet_balance(&"u2".into()).unwrap(), -12);
    }
}
