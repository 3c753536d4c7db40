use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Closed set of columns a listing may be ordered by.
///
/// Backends only ever see the static column name, never caller text.
pub trait SortField:
    Copy + Default + Eq + fmt::Debug + FromStr<Err = ModelError> + Send + Sync
{
    fn column(&self) -> &'static str;

    /// Whether the column holds text (ordered bytewise in every backend).
    fn is_text(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SuperUserSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    FullName,
    Email,
    Username,
    Role,
}

impl SortField for SuperUserSortField {
    fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::FullName => "full_name",
            Self::Email => "email",
            Self::Username => "username",
            Self::Role => "role",
        }
    }

    fn is_text(&self) -> bool {
        !matches!(self, Self::CreatedAt | Self::UpdatedAt)
    }
}

impl FromStr for SuperUserSortField {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            "full_name" => Ok(Self::FullName),
            "email" => Ok(Self::Email),
            "username" => Ok(Self::Username),
            "role" => Ok(Self::Role),
            other => Err(ModelError::UnknownSortField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EventSortField {
    #[default]
    Date,
    Name,
    Capacity,
    CreatedAt,
    UpdatedAt,
}

impl SortField for EventSortField {
    fn column(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Name => "name",
            Self::Capacity => "capacity",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }

    fn is_text(&self) -> bool {
        matches!(self, Self::Name)
    }
}

impl FromStr for EventSortField {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "date" => Ok(Self::Date),
            "name" => Ok(Self::Name),
            "capacity" => Ok(Self::Capacity),
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            other => Err(ModelError::UnknownSortField(other.to_string())),
        }
    }
}

/// One page of an ordered listing. `page` is one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<S> {
    pub page: u32,
    pub limit: u32,
    pub sort_by: S,
}

impl<S: SortField> Default for PageRequest<S> {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort_by: S::default(),
        }
    }
}

impl<S> PageRequest<S> {
    pub fn new(page: u32, limit: u32, sort_by: S) -> Self {
        Self {
            page,
            limit,
            sort_by,
        }
    }

    /// Number of records skipped before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Free-text search plus paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery<S = SuperUserSortField> {
    pub query: String,
    pub paging: PageRequest<S>,
}

impl<S: SortField> SearchQuery<S> {
    pub fn new(query: impl Into<String>, page: u32, limit: u32, sort_by: S) -> Self {
        Self {
            query: query.into(),
            paging: PageRequest::new(page, limit, sort_by),
        }
    }

    /// Lowercased search text used for case-insensitive substring matching.
    pub fn needle(&self) -> String {
        self.query.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_based() {
        let page = PageRequest::new(3, 10, SuperUserSortField::CreatedAt);
        assert_eq!(page.offset(), 20);
        let first = PageRequest::new(1, 25, EventSortField::Date);
        assert_eq!(first.offset(), 0);
    }

    #[test]
    fn rejects_columns_outside_the_allow_list() {
        assert!("full_name".parse::<SuperUserSortField>().is_ok());
        assert_eq!(
            "id; DROP TABLE superusers".parse::<SuperUserSortField>(),
            Err(ModelError::UnknownSortField(
                "id; DROP TABLE superusers".to_string()
            ))
        );
        assert!("password".parse::<EventSortField>().is_err());
    }

    #[test]
    fn needle_is_lowercased_and_trimmed() {
        let query = SearchQuery::new("  ALIce ", 1, 10, SuperUserSortField::default());
        assert_eq!(query.needle(), "alice");
    }
}
