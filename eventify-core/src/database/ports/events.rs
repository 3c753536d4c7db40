use async_trait::async_trait;
use eventify_model::{Event, EventDraft, EventSortField, PageRequest, SearchQuery};
use uuid::Uuid;

use crate::error::Result;

/// Persistence contract for events. Same error semantics as
/// [`SuperUserRepository`](super::superusers::SuperUserRepository).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create_event(&self, draft: EventDraft) -> Result<Event>;
    async fn get_event_by_id(&self, id: Uuid) -> Result<Event>;
    async fn update_event(&self, event: &Event) -> Result<Event>;
    async fn delete_event(&self, id: Uuid) -> Result<()>;

    /// Case-insensitive substring match on name, description and location.
    async fn search_events(
        &self,
        query: &SearchQuery<EventSortField>,
    ) -> Result<Vec<Event>>;

    async fn list_events(&self, page: &PageRequest<EventSortField>) -> Result<Vec<Event>>;

    /// Number of events matching `query`; an empty query counts everything.
    async fn count_events(&self, query: &str) -> Result<u64>;
}
