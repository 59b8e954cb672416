//! Ride chat messages.
//!
//! Messages are grouped by room and listed oldest first. Like rides, the
//! in-memory store can be seeded with a fixed demo conversation that stands
//! in for an unreachable backend.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, RideError};
use crate::traits::MessageStore;

/// Messages returned per listing when the caller has no preference.
pub const DEFAULT_MESSAGE_LIMIT: usize = 50;

/// One chat message in a ride room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// `{room_id}-{created_at}` for messages sent through a store.
    pub id: String,
    pub room_id: String,
    pub sender: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a backend reachability check.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreHealth {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StoreHealth {
    pub fn healthy() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// The demo conversation, timestamped `now`.
pub fn fallback_messages(now: DateTime<Utc>) -> Vec<Message> {
    vec![Message {
        id: "demo-1".into(),
        room_id: "demo-room".into(),
        sender: "driver".into(),
        body: "Yo! I'm parked near the Rappahannock deck entrance.".into(),
        created_at: now,
    }]
}

/// List `room_id` from `store`, serving [`fallback_messages`] if the store
/// fails. Listing never surfaces an error to the caller.
pub fn list_messages_or_fallback(
    store: &dyn MessageStore,
    room_id: &str,
    limit: usize,
) -> Vec<Message> {
    match store.list_messages(room_id, limit) {
        Ok(messages) => messages,
        Err(e) => {
            warn!(room = room_id, error = %e, "message listing failed; serving fallback");
            fallback_messages(Utc::now())
        }
    }
}

/// An in-memory implementation of [`MessageStore`].
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    rooms: RwLock<HashMap<String, Vec<Message>>>,
}

impl InMemoryMessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given messages.
    pub fn with_messages(messages: impl IntoIterator<Item = Message>) -> Self {
        let mut rooms: HashMap<String, Vec<Message>> = HashMap::new();
        for message in messages {
            rooms.entry(message.room_id.clone()).or_default().push(message);
        }
        for room in rooms.values_mut() {
            room.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        }
        Self {
            rooms: RwLock::new(rooms),
        }
    }

    /// Create a store seeded with [`fallback_messages`].
    pub fn with_fallback() -> Self {
        Self::with_messages(fallback_messages(Utc::now()))
    }
}

impl MessageStore for InMemoryMessageStore {
    fn list_messages(&self, room_id: &str, limit: usize) -> Result<Vec<Message>> {
        let rooms = self.rooms.read().map_err(|e| {
            RideError::LockPoisoned(e.to_string())
        })?;
        Ok(rooms
            .get(room_id)
            .map(|room| room.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    fn send_message(&self, room_id: &str, sender: &str, body: &str) -> Result<Message> {
        if room_id.trim().is_empty() {
            return Err(RideError::InvalidArgument("roomId required".into()));
        }

        let created_at = Utc::now();
        let message = Message {
            id: format!(
                "{room_id}-{}",
                created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
            room_id: room_id.to_string(),
            sender: sender.to_string(),
            body: body.to_string(),
            created_at,
        };

        let mut rooms = self.rooms.write().map_err(|e| {
            RideError::LockPoisoned(e.to_string())
        })?;
        rooms
            .entry(room_id.to_string())
            .or_default()
            .push(message.clone());
        debug!(room = room_id, sender, "message sent");
        Ok(message)
    }

    fn ping(&self) -> StoreHealth {
        match self.rooms.read() {
            Ok(_) => StoreHealth::healthy(),
            Err(e) => StoreHealth::failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    struct UnreachableStore;

    impl MessageStore for UnreachableStore {
        fn list_messages(&self, _room_id: &str, _limit: usize) -> Result<Vec<Message>> {
            Err(RideError::LockPoisoned("backend unreachable".into()))
        }

        fn send_message(&self, _room_id: &str, _sender: &str, _body: &str) -> Result<Message> {
            Err(RideError::LockPoisoned("backend unreachable".into()))
        }

        fn ping(&self) -> StoreHealth {
            StoreHealth::failed("backend unreachable")
        }
    }

    fn message(id: &str, room: &str, at: DateTime<Utc>) -> Message {
        Message {
            id: id.into(),
            room_id: room.into(),
            sender: "u1".into(),
            body: format!("body of {id}"),
            created_at: at,
        }
    }

    #[test]
    fn fallback_store_serves_demo_room() {
        let store = InMemoryMessageStore::with_fallback();
        let messages = store.list_messages("demo-room", DEFAULT_MESSAGE_LIMIT).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, "demo-1");
        assert_eq!(messages[0].sender, "driver");
        assert!(store.list_messages("other-room", 10).unwrap().is_empty());
    }

    #[test]
    fn listing_is_oldest_first_and_limited() {
        let t0 = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
        let store = InMemoryMessageStore::with_messages([
            message("c", "room", t0 + Duration::minutes(2)),
            message("a", "room", t0),
            message("b", "room", t0 + Duration::minutes(1)),
            message("x", "elsewhere", t0),
        ]);

        let ids: Vec<String> = store
            .list_messages("room", 2)
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(store.list_messages("room", DEFAULT_MESSAGE_LIMIT).unwrap().len(), 3);
    }

    #[test]
    fn send_appends_to_room() {
        let store = InMemoryMessageStore::new();
        let sent = store.send_message("ride-1", "me", "on my way").unwrap();
        assert!(sent.id.starts_with("ride-1-"));
        assert!(sent.id.ends_with('Z'));
        assert_eq!(sent.room_id, "ride-1");

        let listed = store.list_messages("ride-1", DEFAULT_MESSAGE_LIMIT).unwrap();
        assert_eq!(listed, vec![sent]);
    }

    #[test]
    fn send_requires_room() {
        let store = InMemoryMessageStore::new();
        let err = store.send_message("  ", "me", "hello").unwrap_err();
        assert_eq!(err, RideError::InvalidArgument("roomId required".into()));
    }

    #[test]
    fn failed_listing_serves_fallback() {
        let messages = list_messages_or_fallback(&UnreachableStore, "ride-1", 10);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].room_id, "demo-room");

        let store = InMemoryMessageStore::new();
        store.send_message("ride-1", "me", "hi").unwrap();
        let messages = list_messages_or_fallback(&store, "ride-1", 10);
        assert_eq!(messages[0].body, "hi");
    }

    #[test]
    fn ping_reports_health() {
        assert_eq!(InMemoryMessageStore::new().ping(), StoreHealth::healthy());

        let health = UnreachableStore.ping();
        assert!(!health.ok);
        assert_eq!(health.error.as_deref(), Some("backend unreachable"));
        assert_eq!(
            serde_json::to_value(StoreHealth::healthy()).unwrap(),
            serde_json::json!({ "ok": true })
        );
    }

    #[test]
    fn message_serializes_camel_case() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
        let json = serde_json::to_value(message("m1", "room", at)).unwrap();
        assert_eq!(json["roomId"], "room");
        assert_eq!(json["createdAt"], "2026-10-19T08:00:00Z");
    }
}
