use async_trait::async_trait;
use eventify_model::{SearchQuery, SuperUser, SuperUserDraft, SuperUserField};
use uuid::Uuid;

use crate::error::Result;

/// Persistence contract for super users. Every backend must behave
/// identically: missing records are `NotFound`, duplicate email/username and
/// backend faults are `Storage`.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SuperUserRepository: Send + Sync {
    /// Persist a new record. Identity and timestamps are assigned here.
    async fn create(&self, draft: SuperUserDraft) -> Result<SuperUser>;

    async fn find_by_id(&self, id: Uuid) -> Result<SuperUser>;
    async fn find_by_email(&self, email: &str) -> Result<SuperUser>;
    async fn find_by_username(&self, username: &str) -> Result<SuperUser>;
    async fn find_by_reset_token(&self, token: &str) -> Result<SuperUser>;

    /// Every record ordered by creation time, then id.
    async fn find_all(&self) -> Result<Vec<SuperUser>>;

    async fn delete_by_id(&self, id: Uuid) -> Result<()>;

    /// Replace every mutable field of an existing record. `id` and
    /// `created_at` are never changed; `updated_at` is stamped.
    async fn update(&self, user: &SuperUser) -> Result<SuperUser>;

    /// Change exactly one field and stamp `updated_at`.
    async fn update_field(&self, id: Uuid, field: SuperUserField) -> Result<()>;

    /// Case-insensitive substring match on full name, email and username.
    async fn search_superusers(&self, query: &SearchQuery) -> Result<Vec<SuperUser>>;

    async fn get_role_by_id(&self, id: Uuid) -> Result<String>;

    async fn find_all_2fa_enabled(&self) -> Result<Vec<SuperUser>>;

    async fn update_reset_token(&self, id: Uuid, token: Option<String>) -> Result<()> {
        self.update_field(id, SuperUserField::ResetToken(token)).await
    }

    async fn update_superuser_role(&self, id: Uuid, role: String) -> Result<()> {
        self.update_field(id, SuperUserField::Role(role)).await
    }
}
