use std::fmt;
use std::sync::Arc;

use eventify_model::{
    DEFAULT_ROLE, NewSuperUser, SearchQuery, SuperUser, SuperUserDetails,
    SuperUserDraft, SuperUserField,
};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::validation::{
    ValidationError, validate_2fa_secret, validate_details, validate_field,
    validate_new_superuser, validate_paging, validate_permission_update,
    validate_role,
};
use crate::auth::{AuthCrypto, AuthCryptoError};
use crate::database::ports::superusers::SuperUserRepository;
use crate::error::{CoreError, ErrorKind};

#[derive(Debug, Error)]
pub enum SuperUserServiceError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("{operation}: {source}")]
    Repository {
        operation: &'static str,
        #[source]
        source: CoreError,
    },

    #[error("credential processing failed: {0}")]
    Crypto(#[from] AuthCryptoError),

    #[error("background task failed: {0}")]
    Task(String),
}

impl SuperUserServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SuperUserServiceError::Validation(_) => ErrorKind::Validation,
            SuperUserServiceError::Repository { source, .. } => source.kind(),
            SuperUserServiceError::Crypto(_) | SuperUserServiceError::Task(_) => {
                ErrorKind::Internal
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

pub type ServiceResult<T> = std::result::Result<T, SuperUserServiceError>;

fn repository(
    operation: &'static str,
) -> impl FnOnce(CoreError) -> SuperUserServiceError {
    move |source| SuperUserServiceError::Repository { operation, source }
}

/// Validation, hashing and token generation on top of a
/// [`SuperUserRepository`]. Holds no state beyond its two handles, so it is
/// cheap to share behind an `Arc`.
pub struct SuperUserService {
    repository: Arc<dyn SuperUserRepository>,
    crypto: Arc<AuthCrypto>,
}

impl fmt::Debug for SuperUserService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuperUserService")
            .field("repository_refs", &Arc::strong_count(&self.repository))
            .field("crypto_refs", &Arc::strong_count(&self.crypto))
            .finish()
    }
}

/// Trim text payloads the same way `create_superuser` does.
fn normalize_field(field: SuperUserField) -> SuperUserField {
    match field {
        SuperUserField::Role(role) => SuperUserField::Role(role.trim().to_string()),
        SuperUserField::Email(email) => SuperUserField::Email(email.trim().to_string()),
        SuperUserField::FullName(name) => SuperUserField::FullName(name.trim().to_string()),
        other => other,
    }
}

fn normalize_details(details: SuperUserDetails) -> SuperUserDetails {
    let trim = |value: Option<String>| value.map(|v| v.trim().to_string());
    SuperUserDetails {
        full_name: trim(details.full_name),
        email: trim(details.email),
        role: trim(details.role),
        ..details
    }
}

impl SuperUserService {
    pub fn new(
        repository: Arc<dyn SuperUserRepository>,
        crypto: Arc<AuthCrypto>,
    ) -> Self {
        Self { repository, crypto }
    }

    /// Validate, hash the password off the async workers, and persist.
    pub async fn create_superuser(&self, input: NewSuperUser) -> ServiceResult<SuperUser> {
        validate_new_superuser(&input)?;

        let NewSuperUser {
            full_name,
            email,
            username,
            password,
            role,
            permission_groups,
        } = input;

        let hashed_password = self.hash_password(password).await?;
        let role = role
            .map(|role| role.trim().to_string())
            .filter(|role| !role.is_empty())
            .unwrap_or_else(|| DEFAULT_ROLE.to_string());

        let draft = SuperUserDraft {
            role,
            email: email.trim().to_string(),
            full_name: full_name.trim().to_string(),
            username,
            hashed_password,
            permission_groups,
        };

        let user = self
            .repository
            .create(draft)
            .await
            .map_err(repository("failed to create superuser"))?;

        info!(
            target: "superuser.admin",
            superuser_id = %user.id,
            username = %user.username,
            action = "create",
            "Super user created"
        );
        Ok(user)
    }

    pub async fn get_superuser_by_id(&self, id: Uuid) -> ServiceResult<SuperUser> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(repository("failed to get superuser by id"))
    }

    pub async fn get_superuser_by_email(&self, email: &str) -> ServiceResult<SuperUser> {
        self.repository
            .find_by_email(email)
            .await
            .map_err(repository("failed to get superuser by email"))
    }

    pub async fn get_superuser_by_username(
        &self,
        username: &str,
    ) -> ServiceResult<SuperUser> {
        self.repository
            .find_by_username(username)
            .await
            .map_err(repository("failed to get superuser by username"))
    }

    pub async fn get_superuser_by_reset_token(
        &self,
        token: &str,
    ) -> ServiceResult<SuperUser> {
        self.repository
            .find_by_reset_token(token)
            .await
            .map_err(repository("failed to get superuser by reset token"))
    }

    pub async fn get_all_superusers(&self) -> ServiceResult<Vec<SuperUser>> {
        let users = self
            .repository
            .find_all()
            .await
            .map_err(repository("failed to list superusers"))?;
        debug!("Loaded {} superusers", users.len());
        Ok(users)
    }

    pub async fn get_all_2fa_enabled_superusers(&self) -> ServiceResult<Vec<SuperUser>> {
        self.repository
            .find_all_2fa_enabled()
            .await
            .map_err(repository("failed to list 2FA-enabled superusers"))
    }

    pub async fn get_role_by_superuser_id(&self, id: Uuid) -> ServiceResult<String> {
        self.repository
            .get_role_by_id(id)
            .await
            .map_err(repository("failed to get superuser role"))
    }

    pub async fn enable_2fa(&self, id: Uuid, secret: &str) -> ServiceResult<SuperUser> {
        validate_2fa_secret(secret)?;

        let mut user = self
            .repository
            .find_by_id(id)
            .await
            .map_err(repository("failed to load superuser for 2FA"))?;
        user.two_factor_secret = Some(secret.to_string());
        user.is_2fa_enabled = true;

        let user = self
            .repository
            .update(&user)
            .await
            .map_err(repository("failed to enable 2FA"))?;

        info!(target: "superuser.admin", superuser_id = %id, action = "enable_2fa", "2FA enabled");
        Ok(user)
    }

    pub async fn disable_2fa(&self, id: Uuid) -> ServiceResult<SuperUser> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await
            .map_err(repository("failed to load superuser for 2FA"))?;
        user.two_factor_secret = None;
        user.is_2fa_enabled = false;

        let user = self
            .repository
            .update(&user)
            .await
            .map_err(repository("failed to disable 2FA"))?;

        info!(target: "superuser.admin", superuser_id = %id, action = "disable_2fa", "2FA disabled");
        Ok(user)
    }

    pub async fn update_superuser_role(&self, id: Uuid, role: &str) -> ServiceResult<()> {
        validate_role(role)?;

        self.repository
            .update_superuser_role(id, role.trim().to_string())
            .await
            .map_err(repository("failed to update superuser role"))?;

        info!(target: "superuser.admin", superuser_id = %id, role = %role.trim(), action = "update_role", "Role updated");
        Ok(())
    }

    pub async fn update_superuser_permissions(
        &self,
        id: Uuid,
        permission_groups: Vec<String>,
    ) -> ServiceResult<()> {
        validate_permission_update(&permission_groups)?;

        let count = permission_groups.len();
        self.repository
            .update_field(id, SuperUserField::PermissionGroups(permission_groups))
            .await
            .map_err(repository("failed to update superuser permissions"))?;

        info!(
            target: "superuser.admin",
            superuser_id = %id,
            groups = count,
            action = "update_permissions",
            "Permission groups updated"
        );
        Ok(())
    }

    pub async fn update_superuser_field(
        &self,
        id: Uuid,
        field: SuperUserField,
    ) -> ServiceResult<()> {
        validate_field(&field)?;

        let field = normalize_field(field);
        let column = field.column();
        self.repository
            .update_field(id, field)
            .await
            .map_err(repository("failed to update superuser field"))?;

        info!(target: "superuser.admin", superuser_id = %id, field = column, action = "update_field", "Field updated");
        Ok(())
    }

    /// Apply the provided fields to the stored record and write it back.
    pub async fn update_superuser_details(
        &self,
        id: Uuid,
        details: SuperUserDetails,
    ) -> ServiceResult<SuperUser> {
        validate_details(&details)?;

        let mut user = self
            .repository
            .find_by_id(id)
            .await
            .map_err(repository("failed to load superuser for update"))?;
        user.apply_details(normalize_details(details));

        let user = self
            .repository
            .update(&user)
            .await
            .map_err(repository("failed to update superuser details"))?;

        info!(target: "superuser.admin", superuser_id = %id, action = "update_details", "Details updated");
        Ok(user)
    }

    /// Mint a fresh reset token, store it, and hand it back to the caller.
    pub async fn generate_and_set_reset_token(&self, id: Uuid) -> ServiceResult<String> {
        let token = self.crypto.generate_reset_token()?;

        self.repository
            .update_reset_token(id, Some(token.clone()))
            .await
            .map_err(repository("failed to store reset token"))?;

        info!(target: "superuser.admin", superuser_id = %id, action = "generate_reset_token", "Reset token issued");
        Ok(token)
    }

    pub async fn clear_reset_token(&self, id: Uuid) -> ServiceResult<()> {
        self.repository
            .update_reset_token(id, None)
            .await
            .map_err(repository("failed to clear reset token"))?;

        info!(target: "superuser.admin", superuser_id = %id, action = "clear_reset_token", "Reset token cleared");
        Ok(())
    }

    pub async fn delete_superuser_by_id(&self, id: Uuid) -> ServiceResult<()> {
        self.repository
            .delete_by_id(id)
            .await
            .map_err(repository("failed to delete superuser"))?;

        info!(target: "superuser.admin", superuser_id = %id, action = "delete", "Super user deleted");
        Ok(())
    }

    pub async fn search_superusers(&self, query: &SearchQuery) -> ServiceResult<Vec<SuperUser>> {
        validate_paging(&query.paging)?;

        let users = self
            .repository
            .search_superusers(query)
            .await
            .map_err(repository("failed to search superusers"))?;

        debug!(
            query = %query.query,
            page = query.paging.page,
            results = users.len(),
            "Super user search"
        );
        Ok(users)
    }

    /// Check a plaintext password against the stored hash.
    pub async fn verify_password(
        &self,
        user: &SuperUser,
        password: &str,
    ) -> ServiceResult<bool> {
        let crypto = Arc::clone(&self.crypto);
        let password = password.to_string();
        let hash = user.hashed_password.clone();

        let verified = tokio::task::spawn_blocking(move || {
            crypto.verify_password(&password, &hash)
        })
        .await
        .map_err(|e| SuperUserServiceError::Task(e.to_string()))??;

        if !verified {
            warn!(target: "superuser.auth", superuser_id = %user.id, "Password verification failed");
        }
        Ok(verified)
    }

    async fn hash_password(&self, password: String) -> ServiceResult<String> {
        let crypto = Arc::clone(&self.crypto);
        let hash = tokio::task::spawn_blocking(move || crypto.hash_password(&password))
            .await
            .map_err(|e| SuperUserServiceError::Task(e.to_string()))??;
        Ok(hash)
    }
}
