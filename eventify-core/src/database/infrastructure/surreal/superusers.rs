use async_trait::async_trait;
use chrono::Utc;
use eventify_model::{
    SearchQuery, SortField, SuperUser, SuperUserDraft, SuperUserField,
    truncate_to_micros,
};
use serde::{Deserialize, Serialize};
use surrealdb::{Connection, Surreal};
use tracing::{debug, info};
use uuid::Uuid;

use super::{from_micros, parse_uuid, storage_error, to_micros};
use crate::database::ports::superusers::SuperUserRepository;
use crate::error::{CoreError, Result};

const SELECT_SUPERUSER: &str = "SELECT meta::id(id) AS record_id, * FROM";

/// Document body as written to the `superuser` table.
#[derive(Serialize, Deserialize)]
struct SuperUserContent {
    role: String,
    email: String,
    full_name: String,
    username: String,
    hashed_password: String,
    created_at: i64,
    updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reset_token: Option<String>,
    is_2fa_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    two_factor_secret: Option<String>,
    #[serde(default)]
    permission_groups: Vec<String>,
}

impl SuperUserContent {
    fn from_superuser(user: &SuperUser) -> Self {
        Self {
            role: user.role.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            username: user.username.clone(),
            hashed_password: user.hashed_password.clone(),
            created_at: to_micros(user.created_at),
            updated_at: to_micros(user.updated_at),
            reset_token: user.reset_token.clone(),
            is_2fa_enabled: user.is_2fa_enabled,
            two_factor_secret: user.two_factor_secret.clone(),
            permission_groups: user.permission_groups.clone(),
        }
    }

    fn into_superuser(self, id: Uuid) -> Result<SuperUser> {
        Ok(SuperUser {
            id,
            role: self.role,
            email: self.email,
            full_name: self.full_name,
            username: self.username,
            hashed_password: self.hashed_password,
            created_at: from_micros(self.created_at)?,
            updated_at: from_micros(self.updated_at)?,
            reset_token: self.reset_token,
            is_2fa_enabled: self.is_2fa_enabled,
            two_factor_secret: self.two_factor_secret,
            permission_groups: self.permission_groups,
        })
    }
}

/// Read-side row that carries the record key via `meta::id(id)`.
#[derive(Deserialize)]
struct SuperUserRowWithId {
    record_id: String,
    role: String,
    email: String,
    full_name: String,
    username: String,
    hashed_password: String,
    created_at: i64,
    updated_at: i64,
    #[serde(default)]
    reset_token: Option<String>,
    is_2fa_enabled: bool,
    #[serde(default)]
    two_factor_secret: Option<String>,
    #[serde(default)]
    permission_groups: Vec<String>,
}

impl SuperUserRowWithId {
    fn try_into_superuser(self) -> Result<SuperUser> {
        let id = parse_uuid(&self.record_id)?;
        SuperUserContent {
            role: self.role,
            email: self.email,
            full_name: self.full_name,
            username: self.username,
            hashed_password: self.hashed_password,
            created_at: self.created_at,
            updated_at: self.updated_at,
            reset_token: self.reset_token,
            is_2fa_enabled: self.is_2fa_enabled,
            two_factor_secret: self.two_factor_secret,
            permission_groups: self.permission_groups,
        }
        .into_superuser(id)
    }
}

#[derive(Deserialize)]
struct RoleRow {
    role: String,
}

/// SurrealDB implementation of the `SuperUserRepository` port.
#[derive(Clone)]
pub struct SurrealSuperUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> std::fmt::Debug for SurrealSuperUserRepository<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealSuperUserRepository").finish_non_exhaustive()
    }
}

impl<C: Connection> SurrealSuperUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn fetch_one_where(
        &self,
        column: &'static str,
        value: &str,
        action: &str,
    ) -> Result<Option<SuperUser>> {
        let sql = format!("{SELECT_SUPERUSER} superuser WHERE {column} = $value LIMIT 1");
        let mut response = self
            .db
            .query(sql)
            .bind(("value", value.to_owned()))
            .await
            .map_err(|e| storage_error(action, e))?;

        let rows: Vec<SuperUserRowWithId> =
            response.take(0).map_err(|e| storage_error(action, e))?;
        rows.into_iter()
            .next()
            .map(SuperUserRowWithId::try_into_superuser)
            .transpose()
    }

    async fn fetch_many(&self, sql: String, action: &str) -> Result<Vec<SuperUser>> {
        let mut response = self
            .db
            .query(sql)
            .await
            .map_err(|e| storage_error(action, e))?;
        let rows: Vec<SuperUserRowWithId> =
            response.take(0).map_err(|e| storage_error(action, e))?;
        rows.into_iter()
            .map(SuperUserRowWithId::try_into_superuser)
            .collect()
    }
}

#[async_trait]
impl<C: Connection> SuperUserRepository for SurrealSuperUserRepository<C> {
    async fn create(&self, draft: SuperUserDraft) -> Result<SuperUser> {
        let user = draft.into_superuser(Uuid::new_v4(), truncate_to_micros(Utc::now()));
        let content = SuperUserContent::from_superuser(&user);

        self.db
            .query("CREATE type::thing('superuser', $id) CONTENT $content RETURN NONE")
            .bind(("id", user.id.to_string()))
            .bind(("content", content))
            .await
            .and_then(|response| response.check())
            .map_err(|e| storage_error("create superuser", e))?;

        info!("Created superuser: {} ({})", user.username, user.id);
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<SuperUser> {
        let sql = format!("{SELECT_SUPERUSER} type::thing('superuser', $id)");
        let mut response = self
            .db
            .query(sql)
            .bind(("id", id.to_string()))
            .await
            .map_err(|e| storage_error("get superuser by id", e))?;

        let rows: Vec<SuperUserRowWithId> = response
            .take(0)
            .map_err(|e| storage_error("get superuser by id", e))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| CoreError::superuser_not_found(id))?
            .try_into_superuser()
    }

    async fn find_by_email(&self, email: &str) -> Result<SuperUser> {
        self.fetch_one_where("email", email, "get superuser by email")
            .await?
            .ok_or_else(|| CoreError::superuser_not_found(format!("with email {email}")))
    }

    async fn find_by_username(&self, username: &str) -> Result<SuperUser> {
        self.fetch_one_where("username", username, "get superuser by username")
            .await?
            .ok_or_else(|| {
                CoreError::superuser_not_found(format!("with username {username}"))
            })
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<SuperUser> {
        self.fetch_one_where("reset_token", token, "get superuser by reset token")
            .await?
            .ok_or_else(|| CoreError::superuser_not_found("with the given reset token"))
    }

    async fn find_all(&self) -> Result<Vec<SuperUser>> {
        let sql = format!("{SELECT_SUPERUSER} superuser ORDER BY created_at ASC, record_id ASC");
        let users = self.fetch_many(sql, "get all superusers").await?;
        debug!("Retrieved {} superusers", users.len());
        Ok(users)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<()> {
        let mut response = self
            .db
            .query("DELETE superuser WHERE id = type::thing('superuser', $id) RETURN BEFORE")
            .bind(("id", id.to_string()))
            .await
            .map_err(|e| storage_error("delete superuser", e))?;

        let removed: Vec<SuperUserContent> = response
            .take(0)
            .map_err(|e| storage_error("delete superuser", e))?;
        if removed.is_empty() {
            return Err(CoreError::superuser_not_found(id));
        }

        info!("Deleted superuser: {}", id);
        Ok(())
    }

    async fn update(&self, user: &SuperUser) -> Result<SuperUser> {
        let mut response = self
            .db
            .query(
                "UPDATE superuser SET \
                 role = $role, email = $email, full_name = $full_name, \
                 username = $username, hashed_password = $hashed_password, \
                 reset_token = $reset_token, is_2fa_enabled = $is_2fa_enabled, \
                 two_factor_secret = $two_factor_secret, \
                 permission_groups = $permission_groups, updated_at = $updated_at \
                 WHERE id = type::thing('superuser', $id) RETURN AFTER",
            )
            .bind(("id", user.id.to_string()))
            .bind(("role", user.role.clone()))
            .bind(("email", user.email.clone()))
            .bind(("full_name", user.full_name.clone()))
            .bind(("username", user.username.clone()))
            .bind(("hashed_password", user.hashed_password.clone()))
            .bind(("reset_token", user.reset_token.clone()))
            .bind(("is_2fa_enabled", user.is_2fa_enabled))
            .bind(("two_factor_secret", user.two_factor_secret.clone()))
            .bind(("permission_groups", user.permission_groups.clone()))
            .bind(("updated_at", to_micros(truncate_to_micros(Utc::now()))))
            .await
            .map_err(|e| storage_error("update superuser", e))?;

        let rows: Vec<SuperUserContent> = response
            .take(0)
            .map_err(|e| storage_error("update superuser", e))?;
        let stored = rows
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::superuser_not_found(user.id))?
            .into_superuser(user.id)?;

        debug!(superuser_id = %stored.id, "Updated superuser");
        Ok(stored)
    }

    async fn update_field(&self, id: Uuid, field: SuperUserField) -> Result<()> {
        let column = field.column();
        let sql = format!(
            "UPDATE superuser SET {column} = $value, updated_at = $updated_at \
             WHERE id = type::thing('superuser', $id) RETURN AFTER"
        );
        let query = self
            .db
            .query(sql)
            .bind(("id", id.to_string()))
            .bind(("updated_at", to_micros(truncate_to_micros(Utc::now()))));
        let query = match field {
            SuperUserField::Role(value)
            | SuperUserField::Email(value)
            | SuperUserField::FullName(value)
            | SuperUserField::Username(value) => query.bind(("value", value)),
            SuperUserField::ResetToken(token) => query.bind(("value", token)),
            SuperUserField::PermissionGroups(groups) => query.bind(("value", groups)),
        };

        let mut response = query
            .await
            .map_err(|e| storage_error("update superuser field", e))?;
        let rows: Vec<SuperUserContent> = response
            .take(0)
            .map_err(|e| storage_error("update superuser field", e))?;
        if rows.is_empty() {
            return Err(CoreError::superuser_not_found(id));
        }

        debug!(superuser_id = %id, field = column, "Updated superuser field");
        Ok(())
    }

    async fn search_superusers(&self, query: &SearchQuery) -> Result<Vec<SuperUser>> {
        let paging = &query.paging;
        let sql = format!(
            "{SELECT_SUPERUSER} superuser WHERE \
             string::contains(string::lowercase(full_name), $needle) \
             OR string::contains(string::lowercase(email), $needle) \
             OR string::contains(string::lowercase(username), $needle) \
             ORDER BY {} ASC, record_id ASC LIMIT $limit START $start",
            paging.sort_by.column()
        );

        let mut response = self
            .db
            .query(sql)
            .bind(("needle", query.needle()))
            .bind(("limit", i64::from(paging.limit)))
            .bind(("start", i64::try_from(paging.offset()).unwrap_or(i64::MAX)))
            .await
            .map_err(|e| storage_error("search superusers", e))?;

        let rows: Vec<SuperUserRowWithId> = response
            .take(0)
            .map_err(|e| storage_error("search superusers", e))?;
        rows.into_iter()
            .map(SuperUserRowWithId::try_into_superuser)
            .collect()
    }

    async fn get_role_by_id(&self, id: Uuid) -> Result<String> {
        let mut response = self
            .db
            .query("SELECT role FROM type::thing('superuser', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(|e| storage_error("get superuser role", e))?;

        let rows: Vec<RoleRow> = response
            .take(0)
            .map_err(|e| storage_error("get superuser role", e))?;
        rows.into_iter()
            .next()
            .map(|row| row.role)
            .ok_or_else(|| CoreError::superuser_not_found(id))
    }

    async fn find_all_2fa_enabled(&self) -> Result<Vec<SuperUser>> {
        let sql = format!(
            "{SELECT_SUPERUSER} superuser WHERE is_2fa_enabled = true \
             ORDER BY created_at ASC, record_id ASC"
        );
        self.fetch_many(sql, "list 2FA-enabled superusers").await
    }
}
