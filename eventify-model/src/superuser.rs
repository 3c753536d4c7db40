use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Role assigned when a create request does not name one.
pub const DEFAULT_ROLE: &str = "guest";

/// An administrative account as persisted by every backend.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SuperUser {
    pub id: Uuid,
    pub role: String,
    pub email: String,
    pub full_name: String,
    pub username: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing, default))]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub reset_token: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_2fa_enabled: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing, default))]
    pub two_factor_secret: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub permission_groups: Vec<String>,
}

impl fmt::Debug for SuperUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuperUser")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("username", &self.username)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("has_reset_token", &self.reset_token.is_some())
            .field("is_2fa_enabled", &self.is_2fa_enabled)
            .field("permission_groups", &self.permission_groups)
            .finish_non_exhaustive()
    }
}

impl SuperUser {
    /// Apply a single-field update in place. Does not touch `updated_at`.
    pub fn apply_field(&mut self, field: SuperUserField) {
        match field {
            SuperUserField::Role(role) => self.role = role,
            SuperUserField::Email(email) => self.email = email,
            SuperUserField::FullName(name) => self.full_name = name,
            SuperUserField::Username(username) => self.username = username,
            SuperUserField::ResetToken(token) => self.reset_token = token,
            SuperUserField::PermissionGroups(groups) => {
                self.permission_groups = groups
            }
        }
    }

    /// Apply a partial details edit in place.
    pub fn apply_details(&mut self, details: SuperUserDetails) {
        let SuperUserDetails {
            full_name,
            email,
            username,
            role,
            permission_groups,
        } = details;

        if let Some(full_name) = full_name {
            self.full_name = full_name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(username) = username {
            self.username = username;
        }
        if let Some(role) = role {
            self.role = role;
        }
        if let Some(groups) = permission_groups {
            self.permission_groups = groups;
        }
    }
}

/// Service-level create request carrying the plaintext password.
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct NewSuperUser {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub role: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub permission_groups: Vec<String>,
}

impl fmt::Debug for NewSuperUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewSuperUser")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("permission_groups", &self.permission_groups)
            .finish()
    }
}

/// Repository-level create input. The password is already hashed.
#[derive(Clone, PartialEq, Eq)]
pub struct SuperUserDraft {
    pub role: String,
    pub email: String,
    pub full_name: String,
    pub username: String,
    pub hashed_password: String,
    pub permission_groups: Vec<String>,
}

impl fmt::Debug for SuperUserDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuperUserDraft")
            .field("role", &self.role)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("username", &self.username)
            .field("permission_groups", &self.permission_groups)
            .finish_non_exhaustive()
    }
}

impl SuperUserDraft {
    /// Materialise the draft into a record with the given identity and time.
    pub fn into_superuser(self, id: Uuid, now: DateTime<Utc>) -> SuperUser {
        SuperUser {
            id,
            role: self.role,
            email: self.email,
            full_name: self.full_name,
            username: self.username,
            hashed_password: self.hashed_password,
            created_at: now,
            updated_at: now,
            reset_token: None,
            is_2fa_enabled: false,
            two_factor_secret: None,
            permission_groups: self.permission_groups,
        }
    }
}

/// Partial edit of the descriptive fields of a super user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct SuperUserDetails {
    #[cfg_attr(feature = "serde", serde(default))]
    pub full_name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub email: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub username: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub role: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub permission_groups: Option<Vec<String>>,
}

impl SuperUserDetails {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.email.is_none()
            && self.username.is_none()
            && self.role.is_none()
            && self.permission_groups.is_none()
    }
}

/// A single typed field update.
///
/// Only the fields listed here can be changed through a field update; the
/// password hash, 2FA state and identity fields go through dedicated
/// operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "field", content = "value", rename_all = "snake_case")
)]
pub enum SuperUserField {
    Role(String),
    Email(String),
    FullName(String),
    Username(String),
    ResetToken(Option<String>),
    PermissionGroups(Vec<String>),
}

impl SuperUserField {
    /// Storage column / document key for this field.
    pub fn column(&self) -> &'static str {
        match self {
            SuperUserField::Role(_) => "role",
            SuperUserField::Email(_) => "email",
            SuperUserField::FullName(_) => "full_name",
            SuperUserField::Username(_) => "username",
            SuperUserField::ResetToken(_) => "reset_token",
            SuperUserField::PermissionGroups(_) => "permission_groups",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SuperUser {
        let now = Utc::now();
        SuperUserDraft {
            role: "guest".into(),
            email: "a@x.com".into(),
            full_name: "Alice A".into(),
            username: "alice1".into(),
            hashed_password: "$argon2id$stub".into(),
            permission_groups: vec![],
        }
        .into_superuser(Uuid::new_v4(), now)
    }

    #[test]
    fn draft_starts_without_2fa_or_token() {
        let user = sample();
        assert!(!user.is_2fa_enabled);
        assert!(user.two_factor_secret.is_none());
        assert!(user.reset_token.is_none());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn apply_details_only_touches_provided_fields() {
        let mut user = sample();
        user.apply_details(SuperUserDetails {
            full_name: Some("Alice B".into()),
            ..Default::default()
        });
        assert_eq!(user.full_name, "Alice B");
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.username, "alice1");
    }

    #[test]
    fn debug_output_hides_credentials() {
        let mut user = sample();
        user.two_factor_secret = Some("JBSWY3DPEHPK3PXP".into());
        let rendered = format!("{user:?}");
        assert!(!rendered.contains("argon2id"));
        assert!(!rendered.contains("JBSWY3DPEHPK3PXP"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn field_update_uses_tagged_representation() {
        let raw = r#"{"field":"permission_groups","value":["ops","billing"]}"#;
        let parsed: SuperUserField = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed,
            SuperUserField::PermissionGroups(vec!["ops".into(), "billing".into()])
        );
        assert_eq!(parsed.column(), "permission_groups");
    }
}
