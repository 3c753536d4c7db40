//! Core data model definitions shared across Eventify crates.
#![allow(missing_docs)]

pub mod error;
pub mod event;
pub mod query;
pub mod superuser;

pub use error::ModelError;
pub use event::{Event, EventDraft};
pub use query::{
    DEFAULT_LIMIT, DEFAULT_PAGE, EventSortField, MAX_LIMIT, PageRequest,
    SearchQuery, SortField, SuperUserSortField,
};
pub use superuser::{
    DEFAULT_ROLE, NewSuperUser, SuperUser, SuperUserDetails, SuperUserDraft,
    SuperUserField,
};

/// Truncate a timestamp to microsecond precision.
///
/// Every backend stores timestamps with microsecond resolution, so values are
/// normalised before they are persisted or compared.
pub fn truncate_to_micros(
    ts: chrono::DateTime<chrono::Utc>,
) -> chrono::DateTime<chrono::Utc> {
    use chrono::SubsecRound;
    ts.trunc_subsecs(6)
}
