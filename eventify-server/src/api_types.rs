//! Wire types of the HTTP API.

use chrono::{DateTime, Utc};
use eventify_model::{
    DEFAULT_LIMIT, DEFAULT_PAGE, SearchQuery, SuperUser, SuperUserSortField,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::infra::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// Success without a payload.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            data: None,
            error: None,
            message: Some(message.into()),
        }
    }
}

/// Public view of a super user. Credentials never leave the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperUserResponse {
    pub id: Uuid,
    pub role: String,
    pub email: String,
    pub full_name: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_2fa_enabled: bool,
    pub has_reset_token: bool,
    pub permission_groups: Vec<String>,
}

impl From<SuperUser> for SuperUserResponse {
    fn from(user: SuperUser) -> Self {
        Self {
            id: user.id,
            role: user.role,
            email: user.email,
            full_name: user.full_name,
            username: user.username,
            created_at: user.created_at,
            updated_at: user.updated_at,
            is_2fa_enabled: user.is_2fa_enabled,
            has_reset_token: user.reset_token.is_some(),
            permission_groups: user.permission_groups,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Enable2faRequest {
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleResponse {
    pub id: Uuid,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePermissionsRequest {
    pub permission_groups: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetTokenResponse {
    pub reset_token: String,
}

/// `GET /superusers/search` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(alias = "sortBy")]
    pub sort_by: Option<String>,
}

impl SearchParams {
    pub fn into_query(self) -> Result<SearchQuery, AppError> {
        let sort_by = match self.sort_by.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw.parse::<SuperUserSortField>()?,
            _ => SuperUserSortField::default(),
        };

        Ok(SearchQuery::new(
            self.q,
            self.page.unwrap_or(DEFAULT_PAGE),
            self.limit.unwrap_or(DEFAULT_LIMIT),
            sort_by,
        ))
    }
}
