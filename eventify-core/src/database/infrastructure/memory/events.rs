use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use eventify_model::{
    Event, EventDraft, EventSortField, PageRequest, SearchQuery, truncate_to_micros,
};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::database::infrastructure::{compare_events, event_matches};
use crate::database::ports::events::EventRepository;
use crate::error::{CoreError, Result};
use crate::superusers::validation::{validate_event, validate_event_update};

#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    records: RwLock<HashMap<Uuid, Event>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page_of<'a>(
    mut events: Vec<&'a Event>,
    page: &PageRequest<EventSortField>,
) -> Vec<Event> {
    events.sort_by(|a, b| compare_events(a, b, page.sort_by));
    events
        .into_iter()
        .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
        .take(page.limit as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn create_event(&self, draft: EventDraft) -> Result<Event> {
        validate_event(&draft)?;
        let event = draft.into_event(Uuid::new_v4(), truncate_to_micros(Utc::now()));
        self.records.write().await.insert(event.id, event.clone());
        info!("Created event: {} ({})", event.name, event.id);
        Ok(event)
    }

    async fn get_event_by_id(&self, id: Uuid) -> Result<Event> {
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::event_not_found(id))
    }

    async fn update_event(&self, event: &Event) -> Result<Event> {
        validate_event_update(event)?;
        let mut records = self.records.write().await;
        let existing = records
            .get(&event.id)
            .ok_or_else(|| CoreError::event_not_found(event.id))?;

        let mut stored = event.clone();
        stored.created_at = existing.created_at;
        stored.date = truncate_to_micros(stored.date);
        stored.updated_at = truncate_to_micros(Utc::now());
        records.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn delete_event(&self, id: Uuid) -> Result<()> {
        self.records
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CoreError::event_not_found(id))
    }

    async fn search_events(
        &self,
        query: &SearchQuery<EventSortField>,
    ) -> Result<Vec<Event>> {
        let needle = query.needle();
        let records = self.records.read().await;
        let matches = records
            .values()
            .filter(|event| event_matches(event, &needle))
            .collect();
        Ok(page_of(matches, &query.paging))
    }

    async fn list_events(&self, page: &PageRequest<EventSortField>) -> Result<Vec<Event>> {
        let records = self.records.read().await;
        Ok(page_of(records.values().collect(), page))
    }

    async fn count_events(&self, query: &str) -> Result<u64> {
        let needle = query.trim().to_lowercase();
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|event| event_matches(event, &needle))
            .count() as u64)
    }
}
