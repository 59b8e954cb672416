use carpool_credits::RideCompletion;
use carpool_types::{RideId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Match window applied to `target_time` when the query does not set one.
pub const DEFAULT_MATCH_WINDOW_MINUTES: u32 = 45;

// ---------------------------------------------------------------------------
// Ride
// ---------------------------------------------------------------------------

/// An offered ride as held by the ride store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub ride_id: RideId,
    pub driver_id: UserId,
    pub driver_name: String,
    pub origin: String,
    pub origin_zone: String,
    pub campus_zone: String,
    pub start_time: DateTime<Utc>,
    /// How flexible the driver is around `start_time`.
    pub time_window_minutes: u32,
    pub seats_total: u32,
    pub seats_available: u32,
    /// Weekday codes the ride repeats on, e.g. `["M", "W", "F"]`.
    #[serde(default)]
    pub recurrence: Vec<String>,
    #[serde(default)]
    pub rider_ids: Vec<UserId>,
    /// Trip length once known. Supplied by the caller, never computed here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Ride {
    pub fn has_rider(&self, user: &UserId) -> bool {
        self.rider_ids.contains(user)
    }

    pub fn is_full(&self) -> bool {
        self.seats_available == 0
    }

    /// Build the ledger input for this ride once it is over.
    ///
    /// `distance_miles` overrides the distance stored on the ride.
    pub fn completion(&self, distance_miles: Option<f64>) -> RideCompletion {
        RideCompletion {
            ride_id: self.ride_id.clone(),
            distance_miles: distance_miles.or(self.distance_miles),
            rider_ids: self.rider_ids.clone(),
            driver_id: self.driver_id.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// NewRide
// ---------------------------------------------------------------------------

/// Input for [`crate::RideStore::create_ride`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRide {
    /// Generated as `ride-<uuid>` when absent.
    #[serde(default)]
    pub ride_id: Option<RideId>,
    pub driver_id: UserId,
    pub driver_name: String,
    pub origin: String,
    pub origin_zone: String,
    pub campus_zone: String,
    pub start_time: DateTime<Utc>,
    pub time_window_minutes: u32,
    pub seats_total: u32,
    /// Defaults to `seats_total`.
    #[serde(default)]
    pub seats_available: Option<u32>,
    #[serde(default)]
    pub recurrence: Vec<String>,
    #[serde(default)]
    pub rider_ids: Vec<UserId>,
    #[serde(default)]
    pub distance_miles: Option<f64>,
}

// ---------------------------------------------------------------------------
// RideQuery
// ---------------------------------------------------------------------------

/// Filters for [`crate::RideStore::list_rides`]. Unset filters match everything.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideQuery {
    pub campus_zone: Option<String>,
    pub origin_zone: Option<String>,
    pub target_time: Option<DateTime<Utc>>,
    /// Tolerance around `target_time`; [`DEFAULT_MATCH_WINDOW_MINUTES`] when unset.
    pub window_minutes: Option<u32>,
}

impl RideQuery {
    pub fn campus_zone(mut self, zone: impl Into<String>) -> Self {
        self.campus_zone = Some(zone.into());
        self
    }

    pub fn origin_zone(mut self, zone: impl Into<String>) -> Self {
        self.origin_zone = Some(zone.into());
        self
    }

    pub fn around(mut self, target: DateTime<Utc>, window_minutes: Option<u32>) -> Self {
        self.target_time = Some(target);
        self.window_minutes = window_minutes;
        self
    }

    /// Returns `true` if `ride` satisfies every set filter.
    pub fn matches(&self, ride: &Ride) -> bool {
        if let Some(ref zone) = self.campus_zone {
            if &ride.campus_zone != zone {
                return false;
            }
        }
        if let Some(ref zone) = self.origin_zone {
            if &ride.origin_zone != zone {
                return false;
            }
        }
        if let Some(target) = self.target_time {
            let window = self.window_minutes.unwrap_or(DEFAULT_MATCH_WINDOW_MINUTES);
            if !time_window_match(ride.start_time, target, window) {
                return false;
            }
        }
        true
    }
}

/// Whether `start` lies within `window_minutes` of `target`, in either direction.
pub fn time_window_match(start: DateTime<Utc>, target: DateTime<Utc>, window_minutes: u32) -> bool {
    let diff_ms = (start - target).num_milliseconds().unsigned_abs();
    diff_ms <= u64::from(window_minutes) * 60_000
}

// ---------------------------------------------------------------------------
// JoinReceipt
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinStatus {
    Joined,
}

/// Confirmation returned by a successful join.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinReceipt {
    pub ride_id: RideId,
    pub user_id: UserId,
    pub status: JoinStatus,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn sample_ride() -> Ride {
        Ride {
            ride_id: "ride-1".into(),
            driver_id: "driver-1".into(),
            driver_name: "SAM P.".into(),
            origin: "Rappahannock Deck".into(),
            origin_zone: "North".into(),
            campus_zone: "Main Quad".into(),
            start_time: Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap(),
            time_window_minutes: 20,
            seats_total: 3,
            seats_available: 2,
            recurrence: vec!["M".into()],
            rider_ids: vec!["rider-a".into()],
            distance_miles: Some(4.0),
            created_at: None,
        }
    }

    #[test]
    fn window_is_symmetric_and_inclusive() {
        let target = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
        assert!(time_window_match(target + Duration::minutes(45), target, 45));
        assert!(time_window_match(target - Duration::minutes(45), target, 45));
        assert!(!time_window_match(target + Duration::minutes(46), target, 45));
        assert!(time_window_match(target, target, 0));
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(RideQuery::default().matches(&sample_ride()));
    }

    #[test]
    fn zone_filters() {
        let ride = sample_ride();
        assert!(RideQuery::default().campus_zone("Main Quad").matches(&ride));
        assert!(!RideQuery::default().campus_zone("Johnson Center").matches(&ride));
        assert!(RideQuery::default().origin_zone("North").matches(&ride));
        assert!(!RideQuery::default()
            .campus_zone("Main Quad")
            .origin_zone("East")
            .matches(&ride));
    }

    #[test]
    fn time_filter_uses_default_window() {
        let ride = sample_ride();
        let near = ride.start_time + Duration::minutes(40);
        let far = ride.start_time + Duration::minutes(50);
        assert!(RideQuery::default().around(near, None).matches(&ride));
        assert!(!RideQuery::default().around(far, None).matches(&ride));
        assert!(RideQuery::default().around(far, Some(60)).matches(&ride));
    }

    #[test]
    fn completion_carries_participants() {
        let ride = sample_ride();
        let completion = ride.completion(None);
        assert_eq!(completion.ride_id, ride.ride_id);
        assert_eq!(completion.driver_id, ride.driver_id);
        assert_eq!(completion.rider_ids, ride.rider_ids);
        assert_eq!(completion.distance_miles, Some(4.0));
        assert_eq!(ride.completion(Some(2.5)).distance_miles, Some(2.5));
    }

    #[test]
    fn ride_json_shape() {
        let json = serde_json::to_value(sample_ride()).unwrap();
        assert_eq!(json["rideId"], "ride-1");
        assert_eq!(json["seatsAvailable"], 2);
        assert_eq!(json["riderIds"][0], "rider-a");
        assert!(json.get("createdAt").is_none());
    }

    #[test]
    fn join_status_serializes_lowercase() {
        let receipt = JoinReceipt {
            ride_id: "ride-1".into(),
            user_id: "u".into(),
            status: JoinStatus::Joined,
        };
        let json = serde_json::to_value(receipt).unwrap();
        assert_eq!(json["status"], "joined");
    }
}
