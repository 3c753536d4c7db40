use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eventify_model::{
    Event, EventDraft, EventSortField, PageRequest, SearchQuery, SortField,
    truncate_to_micros,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use super::storage_error;
use crate::database::infrastructure::like_pattern;
use crate::database::ports::events::EventRepository;
use crate::error::{CoreError, Result};
use crate::superusers::validation::{validate_event, validate_event_update};

const EVENT_COLUMNS: &str =
    "id, name, description, date, location, capacity, organizer_id, attendees, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PostgresEventRepository {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    date: DateTime<Utc>,
    location: Option<String>,
    capacity: i32,
    organizer_id: Uuid,
    attendees: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            name: row.name,
            description: row.description,
            date: row.date,
            location: row.location,
            capacity: row.capacity,
            created_at: row.created_at,
            updated_at: row.updated_at,
            organizer_id: row.organizer_id,
            attendees: row.attendees,
        }
    }
}

impl PostgresEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// `(name ILIKE p OR description ILIKE p OR location ILIKE p)`
fn push_match(builder: &mut QueryBuilder<'_, Postgres>, needle: &str) {
    let pattern = like_pattern(needle);
    builder.push("(name ILIKE ");
    builder.push_bind(pattern.clone());
    builder.push(" OR description ILIKE ");
    builder.push_bind(pattern.clone());
    builder.push(" OR location ILIKE ");
    builder.push_bind(pattern);
    builder.push(")");
}

fn push_page(builder: &mut QueryBuilder<'_, Postgres>, page: &PageRequest<EventSortField>) {
    builder.push(" ORDER BY ").push(page.sort_by.column());
    if page.sort_by.is_text() {
        builder.push(r#" COLLATE "C""#);
    }
    builder.push(", id LIMIT ");
    builder.push_bind(i64::from(page.limit));
    builder.push(" OFFSET ");
    builder.push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    async fn create_event(&self, draft: EventDraft) -> Result<Event> {
        validate_event(&draft)?;
        let event = draft.into_event(Uuid::new_v4(), truncate_to_micros(Utc::now()));

        let sql = format!(
            r#"
            INSERT INTO events (
                id, name, description, date, location, capacity,
                organizer_id, attendees, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {EVENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(event.id)
            .bind(&event.name)
            .bind(&event.description)
            .bind(event.date)
            .bind(&event.location)
            .bind(event.capacity)
            .bind(event.organizer_id)
            .bind(&event.attendees)
            .bind(event.created_at)
            .bind(event.updated_at)
            .fetch_one(self.pool())
            .await
            .map_err(|e| storage_error("create event", e))?;

        info!("Created event: {} ({})", row.name, row.id);
        Ok(row.into())
    }

    async fn get_event_by_id(&self, id: Uuid) -> Result<Event> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| storage_error("get event by id", e))?
            .map(Event::from)
            .ok_or_else(|| CoreError::event_not_found(id))
    }

    async fn update_event(&self, event: &Event) -> Result<Event> {
        validate_event_update(event)?;
        let sql = format!(
            r#"
            UPDATE events
            SET name = $2, description = $3, date = $4, location = $5,
                capacity = $6, organizer_id = $7, attendees = $8, updated_at = $9
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, EventRow>(&sql)
            .bind(event.id)
            .bind(&event.name)
            .bind(&event.description)
            .bind(truncate_to_micros(event.date))
            .bind(&event.location)
            .bind(event.capacity)
            .bind(event.organizer_id)
            .bind(&event.attendees)
            .bind(truncate_to_micros(Utc::now()))
            .fetch_optional(self.pool())
            .await
            .map_err(|e| storage_error("update event", e))?
            .map(Event::from)
            .ok_or_else(|| CoreError::event_not_found(event.id))
    }

    async fn delete_event(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| storage_error("delete event", e))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::event_not_found(id));
        }
        Ok(())
    }

    async fn search_events(
        &self,
        query: &SearchQuery<EventSortField>,
    ) -> Result<Vec<Event>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT ");
        builder.push(EVENT_COLUMNS).push(" FROM events WHERE ");
        push_match(&mut builder, &query.needle());
        push_page(&mut builder, &query.paging);

        let rows = builder
            .build_query_as::<EventRow>()
            .fetch_all(self.pool())
            .await
            .map_err(|e| storage_error("search events", e))?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn list_events(&self, page: &PageRequest<EventSortField>) -> Result<Vec<Event>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT ");
        builder.push(EVENT_COLUMNS).push(" FROM events");
        push_page(&mut builder, page);

        let rows = builder
            .build_query_as::<EventRow>()
            .fetch_all(self.pool())
            .await
            .map_err(|e| storage_error("list events", e))?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn count_events(&self, query: &str) -> Result<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM events WHERE ");
        push_match(&mut builder, &query.trim().to_lowercase());

        let count: i64 = builder
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(|e| storage_error("count events", e))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
