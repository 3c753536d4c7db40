use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A scheduled gathering organised by a super user.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    #[cfg_attr(feature = "serde", serde(rename = "event_id"))]
    pub id: Uuid,
    pub name: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub location: Option<String>,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub organizer_id: Uuid,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attendees: Vec<Uuid>,
}

/// Create input for an event; identity and timestamps are assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct EventDraft {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: Option<String>,
    pub capacity: i32,
    pub organizer_id: Uuid,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attendees: Vec<Uuid>,
}

impl EventDraft {
    pub fn into_event(self, id: Uuid, now: DateTime<Utc>) -> Event {
        Event {
            id,
            name: self.name,
            description: self.description,
            date: crate::truncate_to_micros(self.date),
            location: self.location,
            capacity: self.capacity,
            created_at: now,
            updated_at: now,
            organizer_id: self.organizer_id,
            attendees: self.attendees,
        }
    }
}
