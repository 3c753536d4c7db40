//! Field constraints shared by the service layer and repository inputs.

use eventify_model::{
    Event, EventDraft, MAX_LIMIT, NewSuperUser, PageRequest, SuperUserDetails,
    SuperUserField,
};
use thiserror::Error;

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 32;
pub const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

type Check = Result<(), ValidationError>;

pub fn validate_email(email: &str) -> Check {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::new("email", "is required"));
    }
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(())
        }
        _ => Err(ValidationError::new("email", "must look like name@domain")),
    }
}

pub fn validate_username(username: &str) -> Check {
    if username.trim().is_empty() {
        return Err(ValidationError::new("username", "is required"));
    }
    let len = username.chars().count();
    if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        return Err(ValidationError::new(
            "username",
            format!("must be between {NAME_MIN_LEN} and {NAME_MAX_LEN} characters"),
        ));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::new(
            "username",
            "may only contain letters and digits",
        ));
    }
    Ok(())
}

pub fn validate_full_name(full_name: &str) -> Check {
    let len = full_name.trim().chars().count();
    if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        return Err(ValidationError::new(
            "full_name",
            format!("must be between {NAME_MIN_LEN} and {NAME_MAX_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Check {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ValidationError::new(
            "password",
            format!("must be at least {PASSWORD_MIN_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_role(role: &str) -> Check {
    if role.trim().is_empty() {
        return Err(ValidationError::new("role", "must not be empty"));
    }
    Ok(())
}

/// Entries must be non-empty; the list itself may be empty on create.
pub fn validate_permission_entries(groups: &[String]) -> Check {
    if groups.iter().any(|group| group.trim().is_empty()) {
        return Err(ValidationError::new(
            "permission_groups",
            "entries must not be empty",
        ));
    }
    Ok(())
}

/// An explicit permissions update must name at least one group.
pub fn validate_permission_update(groups: &[String]) -> Check {
    if groups.is_empty() {
        return Err(ValidationError::new(
            "permission_groups",
            "must contain at least one group",
        ));
    }
    validate_permission_entries(groups)
}

pub fn validate_2fa_secret(secret: &str) -> Check {
    if secret.trim().is_empty() {
        return Err(ValidationError::new("two_factor_secret", "must not be empty"));
    }
    Ok(())
}

pub fn validate_paging<S>(paging: &PageRequest<S>) -> Check {
    if paging.page == 0 {
        return Err(ValidationError::new("page", "must be at least 1"));
    }
    if paging.limit == 0 || paging.limit > MAX_LIMIT {
        return Err(ValidationError::new(
            "limit",
            format!("must be between 1 and {MAX_LIMIT}"),
        ));
    }
    Ok(())
}

pub fn validate_new_superuser(input: &NewSuperUser) -> Check {
    // Presence of the two alternate keys is reported before anything else.
    if input.email.trim().is_empty() {
        return Err(ValidationError::new("email", "is required"));
    }
    if input.username.trim().is_empty() {
        return Err(ValidationError::new("username", "is required"));
    }
    validate_email(&input.email)?;
    validate_username(&input.username)?;
    validate_full_name(&input.full_name)?;
    validate_password(&input.password)?;
    if let Some(role) = &input.role {
        // Blank roles fall back to the default instead of failing.
        if !role.trim().is_empty() {
            validate_role(role)?;
        }
    }
    validate_permission_entries(&input.permission_groups)
}

pub fn validate_details(details: &SuperUserDetails) -> Check {
    if details.is_empty() {
        return Err(ValidationError::new("details", "no fields to update"));
    }
    if let Some(email) = &details.email {
        validate_email(email)?;
    }
    if let Some(username) = &details.username {
        validate_username(username)?;
    }
    if let Some(full_name) = &details.full_name {
        validate_full_name(full_name)?;
    }
    if let Some(role) = &details.role {
        validate_role(role)?;
    }
    if let Some(groups) = &details.permission_groups {
        validate_permission_update(groups)?;
    }
    Ok(())
}

pub fn validate_field(field: &SuperUserField) -> Check {
    match field {
        SuperUserField::Role(role) => validate_role(role),
        SuperUserField::Email(email) => validate_email(email),
        SuperUserField::FullName(name) => validate_full_name(name),
        SuperUserField::Username(username) => validate_username(username),
        SuperUserField::ResetToken(Some(_)) => Err(ValidationError::new(
            "reset_token",
            "can only be cleared here; generate a new one instead",
        )),
        SuperUserField::ResetToken(None) => Ok(()),
        SuperUserField::PermissionGroups(groups) => validate_permission_update(groups),
    }
}

fn validate_event_fields(name: &str, capacity: i32) -> Check {
    if name.trim().is_empty() {
        return Err(ValidationError::new("name", "is required"));
    }
    if capacity < 1 {
        return Err(ValidationError::new("capacity", "must be at least 1"));
    }
    Ok(())
}

/// Checked by every event backend before anything is written.
pub fn validate_event(draft: &EventDraft) -> Check {
    validate_event_fields(&draft.name, draft.capacity)
}

pub fn validate_event_update(event: &Event) -> Check {
    validate_event_fields(&event.name, event.capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventify_model::SuperUserSortField;

    fn new_user() -> NewSuperUser {
        NewSuperUser {
            full_name: "Alice A".into(),
            email: "a@x.com".into(),
            username: "alice1".into(),
            password: "longpassword".into(),
            role: None,
            permission_groups: vec![],
        }
    }

    #[test]
    fn accepts_minimal_valid_user() {
        assert!(validate_new_superuser(&new_user()).is_ok());
    }

    #[test]
    fn missing_email_or_username_is_reported_first() {
        let mut input = new_user();
        input.email.clear();
        input.password = "short".into();
        assert_eq!(validate_new_superuser(&input).unwrap_err().field, "email");

        let mut input = new_user();
        input.username = "   ".into();
        assert_eq!(validate_new_superuser(&input).unwrap_err().field, "username");
    }

    #[test]
    fn username_must_be_alphanumeric_and_bounded() {
        assert!(validate_username("al").is_err());
        assert!(validate_username("alice_1").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username(&"a".repeat(32)).is_ok());
    }

    #[test]
    fn full_name_length_bounds() {
        assert!(validate_full_name("Al").is_err());
        assert!(validate_full_name("Ali").is_ok());
        assert!(validate_full_name(&"x".repeat(33)).is_err());
    }

    #[test]
    fn password_needs_eight_characters() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("ax.com").is_err());
        assert!(validate_email("@x.com").is_err());
        assert!(validate_email("a@b@c").is_err());
    }

    #[test]
    fn permission_updates_need_non_empty_entries() {
        assert!(validate_permission_update(&[]).is_err());
        assert!(validate_permission_update(&["ops".into(), "".into()]).is_err());
        assert!(validate_permission_update(&["ops".into()]).is_ok());
        assert!(validate_permission_entries(&[]).is_ok());
    }

    #[test]
    fn blank_2fa_secret_is_rejected() {
        assert!(validate_2fa_secret("").is_err());
        assert!(validate_2fa_secret("  ").is_err());
        assert!(validate_2fa_secret("secret1").is_ok());
    }

    #[test]
    fn paging_bounds() {
        let sort = SuperUserSortField::CreatedAt;
        assert!(validate_paging(&PageRequest::new(0, 10, sort)).is_err());
        assert!(validate_paging(&PageRequest::new(1, 0, sort)).is_err());
        assert!(validate_paging(&PageRequest::new(1, MAX_LIMIT + 1, sort)).is_err());
        assert!(validate_paging(&PageRequest::new(3, MAX_LIMIT, sort)).is_ok());
    }

    #[test]
    fn field_updates_reuse_create_rules() {
        assert!(validate_field(&SuperUserField::Username("bad name".into())).is_err());
        assert!(validate_field(&SuperUserField::Role("".into())).is_err());
        assert!(validate_field(&SuperUserField::ResetToken(None)).is_ok());
        assert!(validate_field(&SuperUserField::ResetToken(Some("mine".into()))).is_err());
        assert!(validate_field(&SuperUserField::PermissionGroups(vec![])).is_err());
    }
}
