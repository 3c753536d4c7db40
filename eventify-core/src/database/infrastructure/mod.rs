pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "surreal")]
pub mod surreal;

use std::cmp::Ordering;

use eventify_model::{Event, EventSortField, SuperUser, SuperUserSortField};

/// Case-insensitive literal substring test. `needle` must already be lowercased.
pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(needle)
}

pub(crate) fn superuser_matches(user: &SuperUser, needle: &str) -> bool {
    contains_ci(&user.full_name, needle)
        || contains_ci(&user.email, needle)
        || contains_ci(&user.username, needle)
}

pub(crate) fn event_matches(event: &Event, needle: &str) -> bool {
    contains_ci(&event.name, needle)
        || event
            .description
            .as_deref()
            .is_some_and(|d| contains_ci(d, needle))
        || event
            .location
            .as_deref()
            .is_some_and(|l| contains_ci(l, needle))
}

/// Ascending by the sort column, ties broken by id. Text compares bytewise.
pub(crate) fn compare_superusers(
    a: &SuperUser,
    b: &SuperUser,
    sort_by: SuperUserSortField,
) -> Ordering {
    let primary = match sort_by {
        SuperUserSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SuperUserSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SuperUserSortField::FullName => a.full_name.cmp(&b.full_name),
        SuperUserSortField::Email => a.email.cmp(&b.email),
        SuperUserSortField::Username => a.username.cmp(&b.username),
        SuperUserSortField::Role => a.role.cmp(&b.role),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

pub(crate) fn compare_events(a: &Event, b: &Event, sort_by: EventSortField) -> Ordering {
    let primary = match sort_by {
        EventSortField::Date => a.date.cmp(&b.date),
        EventSortField::Name => a.name.cmp(&b.name),
        EventSortField::Capacity => a.capacity.cmp(&b.capacity),
        EventSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        EventSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

/// Escape `%`, `_` and `\` so user text is matched literally by `LIKE`.
#[cfg(feature = "postgres")]
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_needle_matches_everything() {
        assert!(contains_ci("anything", ""));
    }

    #[test]
    fn match_ignores_case() {
        assert!(contains_ci("Alice A", "alice"));
        assert!(!contains_ci("Bob", "alice"));
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
        assert_eq!(like_pattern(""), "%%");
    }
}
