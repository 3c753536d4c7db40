use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eventify_model::{
    SearchQuery, SortField, SuperUser, SuperUserDraft, SuperUserField,
    truncate_to_micros,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};
use uuid::Uuid;

use super::storage_error;
use crate::database::infrastructure::like_pattern;
use crate::database::ports::superusers::SuperUserRepository;
use crate::error::{CoreError, Result};

const SUPERUSER_COLUMNS: &str = "id, role, email, full_name, username, hashed_password, \
     created_at, updated_at, reset_token, is_2fa_enabled, two_factor_secret, permission_groups";

/// PostgreSQL-backed implementation of the `SuperUserRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresSuperUserRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct SuperUserRow {
    id: Uuid,
    role: String,
    email: String,
    full_name: String,
    username: String,
    hashed_password: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    reset_token: Option<String>,
    is_2fa_enabled: bool,
    two_factor_secret: Option<String>,
    permission_groups: Vec<String>,
}

impl From<SuperUserRow> for SuperUser {
    fn from(row: SuperUserRow) -> Self {
        SuperUser {
            id: row.id,
            role: row.role,
            email: row.email,
            full_name: row.full_name,
            username: row.username,
            hashed_password: row.hashed_password,
            created_at: row.created_at,
            updated_at: row.updated_at,
            reset_token: row.reset_token,
            is_2fa_enabled: row.is_2fa_enabled,
            two_factor_secret: row.two_factor_secret,
            permission_groups: row.permission_groups,
        }
    }
}

impl PostgresSuperUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_one_where(
        &self,
        column: &'static str,
        value: &str,
        action: &str,
    ) -> Result<Option<SuperUser>> {
        let sql = format!("SELECT {SUPERUSER_COLUMNS} FROM superusers WHERE {column} = $1");
        let row = sqlx::query_as::<_, SuperUserRow>(&sql)
            .bind(value)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| storage_error(action, e))?;
        Ok(row.map(SuperUser::from))
    }
}

#[async_trait]
impl SuperUserRepository for PostgresSuperUserRepository {
    async fn create(&self, draft: SuperUserDraft) -> Result<SuperUser> {
        let user = draft.into_superuser(Uuid::new_v4(), truncate_to_micros(Utc::now()));

        let sql = format!(
            r#"
            INSERT INTO superusers (
                id, role, email, full_name, username, hashed_password,
                created_at, updated_at, reset_token, is_2fa_enabled,
                two_factor_secret, permission_groups
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {SUPERUSER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, SuperUserRow>(&sql)
            .bind(user.id)
            .bind(&user.role)
            .bind(&user.email)
            .bind(&user.full_name)
            .bind(&user.username)
            .bind(&user.hashed_password)
            .bind(user.created_at)
            .bind(user.updated_at)
            .bind(&user.reset_token)
            .bind(user.is_2fa_enabled)
            .bind(&user.two_factor_secret)
            .bind(&user.permission_groups)
            .fetch_one(self.pool())
            .await
            .map_err(|e| storage_error("create superuser", e))?;

        info!("Created superuser: {} ({})", row.username, row.id);
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<SuperUser> {
        let sql = format!("SELECT {SUPERUSER_COLUMNS} FROM superusers WHERE id = $1");
        let row = sqlx::query_as::<_, SuperUserRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| storage_error("get superuser by id", e))?;

        row.map(SuperUser::from)
            .ok_or_else(|| CoreError::superuser_not_found(id))
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
        let sql = format!("SELECT {SUPERUSER_COLUMNS} FROM superusers ORDER BY created_at, id");
        let rows = sqlx::query_as::<_, SuperUserRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(|e| storage_error("get all superusers", e))?;

        debug!("Retrieved {} superusers", rows.len());
        Ok(rows.into_iter().map(SuperUser::from).collect())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM superusers WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| storage_error("delete superuser", e))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::superuser_not_found(id));
        }

        info!("Deleted superuser: {}", id);
        Ok(())
    }

    async fn update(&self, user: &SuperUser) -> Result<SuperUser> {
        let sql = format!(
            r#"
            UPDATE superusers
            SET role = $2, email = $3, full_name = $4, username = $5,
                hashed_password = $6, reset_token = $7, is_2fa_enabled = $8,
                two_factor_secret = $9, permission_groups = $10, updated_at = $11
            WHERE id = $1
            RETURNING {SUPERUSER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, SuperUserRow>(&sql)
            .bind(user.id)
            .bind(&user.role)
            .bind(&user.email)
            .bind(&user.full_name)
            .bind(&user.username)
            .bind(&user.hashed_password)
            .bind(&user.reset_token)
            .bind(user.is_2fa_enabled)
            .bind(&user.two_factor_secret)
            .bind(&user.permission_groups)
            .bind(truncate_to_micros(Utc::now()))
            .fetch_optional(self.pool())
            .await
            .map_err(|e| storage_error("update superuser", e))?;

        let row = row.ok_or_else(|| CoreError::superuser_not_found(user.id))?;
        debug!(superuser_id = %row.id, "Updated superuser");
        Ok(row.into())
    }

    async fn update_field(&self, id: Uuid, field: SuperUserField) -> Result<()> {
        let column = field.column();
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE superusers SET ");
        builder.push(column).push(" = ");
        match field {
            SuperUserField::Role(value)
            | SuperUserField::Email(value)
            | SuperUserField::FullName(value)
            | SuperUserField::Username(value) => {
                builder.push_bind(value);
            }
            SuperUserField::ResetToken(token) => {
                builder.push_bind(token);
            }
            SuperUserField::PermissionGroups(groups) => {
                builder.push_bind(groups);
            }
        }
        builder
            .push(", updated_at = ")
            .push_bind(truncate_to_micros(Utc::now()))
            .push(" WHERE id = ")
            .push_bind(id);

        let result = builder
            .build()
            .execute(self.pool())
            .await
            .map_err(|e| storage_error("update superuser field", e))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::superuser_not_found(id));
        }

        debug!(superuser_id = %id, field = column, "Updated superuser field");
        Ok(())
    }

    async fn search_superusers(&self, query: &SearchQuery) -> Result<Vec<SuperUser>> {
        let pattern = like_pattern(&query.needle());
        let paging = &query.paging;

        let mut builder = QueryBuilder::<Postgres>::new("SELECT ");
        builder.push(SUPERUSER_COLUMNS).push(" FROM superusers WHERE (full_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR email ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR username ILIKE ");
        builder.push_bind(pattern);
        builder.push(") ORDER BY ").push(paging.sort_by.column());
        if paging.sort_by.is_text() {
            builder.push(r#" COLLATE "C""#);
        }
        builder.push(", id LIMIT ");
        builder.push_bind(i64::from(paging.limit));
        builder.push(" OFFSET ");
        builder.push_bind(i64::try_from(paging.offset()).unwrap_or(i64::MAX));

        let rows = builder
            .build_query_as::<SuperUserRow>()
            .fetch_all(self.pool())
            .await
            .map_err(|e| storage_error("search superusers", e))?;

        Ok(rows.into_iter().map(SuperUser::from).collect())
    }

    async fn get_role_by_id(&self, id: Uuid) -> Result<String> {
        sqlx::query_scalar::<_, String>("SELECT role FROM superusers WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| storage_error("get superuser role", e))?
            .ok_or_else(|| CoreError::superuser_not_found(id))
    }

    async fn find_all_2fa_enabled(&self) -> Result<Vec<SuperUser>> {
        let sql = format!(
            "SELECT {SUPERUSER_COLUMNS} FROM superusers WHERE is_2fa_enabled ORDER BY created_at, id"
        );
        let rows = sqlx::query_as::<_, SuperUserRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(|e| storage_error("list 2FA-enabled superusers", e))?;

        Ok(rows.into_iter().map(SuperUser::from).collect())
    }
}
