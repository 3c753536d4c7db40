use async_trait::async_trait;
use chrono::Utc;
use eventify_model::{
    Event, EventDraft, EventSortField, PageRequest, SearchQuery, SortField,
    truncate_to_micros,
};
use serde::{Deserialize, Serialize};
use surrealdb::{Connection, Surreal};
use tracing::info;
use uuid::Uuid;

use super::{from_micros, parse_uuid, storage_error, to_micros};
use crate::database::ports::events::EventRepository;
use crate::error::{CoreError, Result};
use crate::superusers::validation::{validate_event, validate_event_update};

const SELECT_EVENT: &str = "SELECT meta::id(id) AS record_id, * FROM";

/// Description and location may be absent, hence the `?? ''` fallbacks.
const EVENT_MATCH: &str = "string::contains(string::lowercase(name), $needle) \
     OR string::contains(string::lowercase(description ?? ''), $needle) \
     OR string::contains(string::lowercase(location ?? ''), $needle)";

#[derive(Serialize)]
struct EventContent {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    date: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    capacity: i32,
    organizer_id: String,
    attendees: Vec<String>,
    created_at: i64,
    updated_at: i64,
}

impl EventContent {
    fn from_event(event: &Event) -> Self {
        Self {
            name: event.name.clone(),
            description: event.description.clone(),
            date: to_micros(event.date),
            location: event.location.clone(),
            capacity: event.capacity,
            organizer_id: event.organizer_id.to_string(),
            attendees: event.attendees.iter().map(Uuid::to_string).collect(),
            created_at: to_micros(event.created_at),
            updated_at: to_micros(event.updated_at),
        }
    }
}

#[derive(Deserialize)]
struct EventRowWithId {
    record_id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    date: i64,
    #[serde(default)]
    location: Option<String>,
    capacity: i32,
    organizer_id: String,
    #[serde(default)]
    attendees: Vec<String>,
    created_at: i64,
    updated_at: i64,
}

impl EventRowWithId {
    fn try_into_event(self) -> Result<Event> {
        Ok(Event {
            id: parse_uuid(&self.record_id)?,
            name: self.name,
            description: self.description,
            date: from_micros(self.date)?,
            location: self.location,
            capacity: self.capacity,
            created_at: from_micros(self.created_at)?,
            updated_at: from_micros(self.updated_at)?,
            organizer_id: parse_uuid(&self.organizer_id)?,
            attendees: self
                .attendees
                .iter()
                .map(|raw| parse_uuid(raw))
                .collect::<Result<_>>()?,
        })
    }
}

#[derive(Deserialize)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the `EventRepository` port.
#[derive(Clone)]
pub struct SurrealEventRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> std::fmt::Debug for SurrealEventRepository<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealEventRepository").finish_non_exhaustive()
    }
}

impl<C: Connection> SurrealEventRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn fetch_page(
        &self,
        filter: Option<String>,
        page: &PageRequest<EventSortField>,
        action: &str,
    ) -> Result<Vec<Event>> {
        let where_clause = if filter.is_some() {
            format!(" WHERE {EVENT_MATCH}")
        } else {
            String::new()
        };
        let sql = format!(
            "{SELECT_EVENT} event{where_clause} ORDER BY {} ASC, record_id ASC \
             LIMIT $limit START $start",
            page.sort_by.column()
        );

        let mut query = self
            .db
            .query(sql)
            .bind(("limit", i64::from(page.limit)))
            .bind(("start", i64::try_from(page.offset()).unwrap_or(i64::MAX)));
        if let Some(needle) = filter {
            query = query.bind(("needle", needle));
        }

        let mut response = query.await.map_err(|e| storage_error(action, e))?;
        let rows: Vec<EventRowWithId> =
            response.take(0).map_err(|e| storage_error(action, e))?;
        rows.into_iter().map(EventRowWithId::try_into_event).collect()
    }
}

#[async_trait]
impl<C: Connection> EventRepository for SurrealEventRepository<C> {
    async fn create_event(&self, draft: EventDraft) -> Result<Event> {
        validate_event(&draft)?;
        let event = draft.into_event(Uuid::new_v4(), truncate_to_micros(Utc::now()));

        self.db
            .query("CREATE type::thing('event', $id) CONTENT $content RETURN NONE")
            .bind(("id", event.id.to_string()))
            .bind(("content", EventContent::from_event(&event)))
            .await
            .and_then(|response| response.check())
            .map_err(|e| storage_error("create event", e))?;

        info!("Created event: {} ({})", event.name, event.id);
        Ok(event)
    }

    async fn get_event_by_id(&self, id: Uuid) -> Result<Event> {
        let sql = format!("{SELECT_EVENT} type::thing('event', $id)");
        let mut response = self
            .db
            .query(sql)
            .bind(("id", id.to_string()))
            .await
            .map_err(|e| storage_error("get event by id", e))?;

        let rows: Vec<EventRowWithId> = response
            .take(0)
            .map_err(|e| storage_error("get event by id", e))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| CoreError::event_not_found(id))?
            .try_into_event()
    }

    async fn update_event(&self, event: &Event) -> Result<Event> {
        validate_event_update(event)?;
        let mut response = self
            .db
            .query(
                "UPDATE event SET name = $name, description = $description, \
                 date = $date, location = $location, capacity = $capacity, \
                 organizer_id = $organizer_id, attendees = $attendees, \
                 updated_at = $updated_at \
                 WHERE id = type::thing('event', $id) RETURN NONE; \
                 SELECT meta::id(id) AS record_id, * FROM type::thing('event', $id);",
            )
            .bind(("id", event.id.to_string()))
            .bind(("name", event.name.clone()))
            .bind(("description", event.description.clone()))
            .bind(("date", to_micros(truncate_to_micros(event.date))))
            .bind(("location", event.location.clone()))
            .bind(("capacity", event.capacity))
            .bind(("organizer_id", event.organizer_id.to_string()))
            .bind((
                "attendees",
                event.attendees.iter().map(Uuid::to_string).collect::<Vec<_>>(),
            ))
            .bind(("updated_at", to_micros(truncate_to_micros(Utc::now()))))
            .await
            .and_then(|response| response.check())
            .map_err(|e| storage_error("update event", e))?;

        let rows: Vec<EventRowWithId> = response
            .take(1)
            .map_err(|e| storage_error("update event", e))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| CoreError::event_not_found(event.id))?
            .try_into_event()
    }

    async fn delete_event(&self, id: Uuid) -> Result<()> {
        let mut response = self
            .db
            .query(
                "SELECT VALUE meta::id(id) FROM type::thing('event', $id); \
                 DELETE type::thing('event', $id);",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(|e| storage_error("delete event", e))?;

        let existing: Vec<String> = response
            .take(0)
            .map_err(|e| storage_error("delete event", e))?;
        if existing.is_empty() {
            return Err(CoreError::event_not_found(id));
        }
        response
            .check()
            .map_err(|e| storage_error("delete event", e))?;
        Ok(())
    }

    async fn search_events(
        &self,
        query: &SearchQuery<EventSortField>,
    ) -> Result<Vec<Event>> {
        self.fetch_page(Some(query.needle()), &query.paging, "search events")
            .await
    }

    async fn list_events(&self, page: &PageRequest<EventSortField>) -> Result<Vec<Event>> {
        self.fetch_page(None, page, "list events").await
    }

    async fn count_events(&self, query: &str) -> Result<u64> {
        let sql = format!("SELECT count() AS total FROM event WHERE {EVENT_MATCH} GROUP ALL");
        let mut response = self
            .db
            .query(sql)
            .bind(("needle", query.trim().to_lowercase()))
            .await
            .map_err(|e| storage_error("count events", e))?;

        let rows: Vec<CountRow> = response
            .take(0)
            .map_err(|e| storage_error("count events", e))?;
        Ok(rows.first().map(|row| row.total).unwrap_or(0))
    }
}
