use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use eventify_model::{
    SearchQuery, SuperUser, SuperUserDraft, SuperUserField, truncate_to_micros,
};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::infrastructure::{compare_superusers, superuser_matches};
use crate::database::ports::superusers::SuperUserRepository;
use crate::error::{CoreError, Result};

#[derive(Debug, Default)]
pub struct InMemorySuperUserRepository {
    records: RwLock<HashMap<Uuid, SuperUser>>,
}

impl InMemorySuperUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Mirror the unique email/username constraints of the persistent backends.
fn ensure_unique(
    records: &HashMap<Uuid, SuperUser>,
    id: Uuid,
    email: &str,
    username: &str,
) -> Result<()> {
    for other in records.values().filter(|other| other.id != id) {
        if other.email == email {
            return Err(CoreError::Storage(format!(
                "duplicate key: email '{email}' already exists"
            )));
        }
        if other.username == username {
            return Err(CoreError::Storage(format!(
                "duplicate key: username '{username}' already exists"
            )));
        }
    }
    Ok(())
}

fn find_one<F>(records: &HashMap<Uuid, SuperUser>, predicate: F) -> Option<SuperUser>
where
    F: Fn(&SuperUser) -> bool,
{
    records.values().find(|user| predicate(user)).cloned()
}

#[async_trait]
impl SuperUserRepository for InMemorySuperUserRepository {
    async fn create(&self, draft: SuperUserDraft) -> Result<SuperUser> {
        let mut records = self.records.write().await;
        let id = Uuid::new_v4();
        ensure_unique(&records, id, &draft.email, &draft.username)?;

        let user = draft.into_superuser(id, truncate_to_micros(Utc::now()));
        records.insert(id, user.clone());

        info!("Created superuser: {} ({})", user.username, user.id);
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<SuperUser> {
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::superuser_not_found(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<SuperUser> {
        let records = self.records.read().await;
        find_one(&records, |user| user.email == email)
            .ok_or_else(|| CoreError::superuser_not_found(format!("with email {email}")))
    }

    async fn find_by_username(&self, username: &str) -> Result<SuperUser> {
        let records = self.records.read().await;
        find_one(&records, |user| user.username == username).ok_or_else(|| {
            CoreError::superuser_not_found(format!("with username {username}"))
        })
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<SuperUser> {
        let records = self.records.read().await;
        find_one(&records, |user| user.reset_token.as_deref() == Some(token))
            .ok_or_else(|| CoreError::superuser_not_found("with the given reset token"))
    }

    async fn find_all(&self) -> Result<Vec<SuperUser>> {
        let records = self.records.read().await;
        let mut users: Vec<SuperUser> = records.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        debug!("Retrieved {} superusers", users.len());
        Ok(users)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<()> {
        let removed = self.records.write().await.remove(&id);
        match removed {
            Some(user) => {
                info!("Deleted superuser: {} ({})", user.username, id);
                Ok(())
            }
            None => Err(CoreError::superuser_not_found(id)),
        }
    }

    async fn update(&self, user: &SuperUser) -> Result<SuperUser> {
        let mut records = self.records.write().await;
        let created_at = records
            .get(&user.id)
            .map(|existing| existing.created_at)
            .ok_or_else(|| CoreError::superuser_not_found(user.id))?;
        ensure_unique(&records, user.id, &user.email, &user.username)?;

        let mut stored = user.clone();
        stored.created_at = created_at;
        stored.updated_at = truncate_to_micros(Utc::now());
        records.insert(stored.id, stored.clone());

        debug!(superuser_id = %stored.id, "Updated superuser");
        Ok(stored)
    }

    async fn update_field(&self, id: Uuid, field: SuperUserField) -> Result<()> {
        let mut records = self.records.write().await;
        let mut candidate = records
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::superuser_not_found(id))?;

        let column = field.column();
        candidate.apply_field(field);
        ensure_unique(&records, id, &candidate.email, &candidate.username)?;
        candidate.updated_at = truncate_to_micros(Utc::now());
        records.insert(id, candidate);

        debug!(superuser_id = %id, field = column, "Updated superuser field");
        Ok(())
    }

    async fn search_superusers(&self, query: &SearchQuery) -> Result<Vec<SuperUser>> {
        let needle = query.needle();
        let paging = &query.paging;
        let records = self.records.read().await;

        let mut matches: Vec<&SuperUser> = records
            .values()
            .filter(|user| superuser_matches(user, &needle))
            .collect();
        matches.sort_by(|a, b| compare_superusers(a, b, paging.sort_by));

        Ok(matches
            .into_iter()
            .skip(usize::try_from(paging.offset()).unwrap_or(usize::MAX))
            .take(paging.limit as usize)
            .cloned()
            .collect())
    }

    async fn get_role_by_id(&self, id: Uuid) -> Result<String> {
        self.records
            .read()
            .await
            .get(&id)
            .map(|user| user.role.clone())
            .ok_or_else(|| CoreError::superuser_not_found(id))
    }

    async fn find_all_2fa_enabled(&self) -> Result<Vec<SuperUser>> {
        let records = self.records.read().await;
        let mut users: Vec<SuperUser> = records
            .values()
            .filter(|user| user.is_2fa_enabled)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(username: &str, email: &str) -> SuperUserDraft {
        SuperUserDraft {
            role: "guest".into(),
            email: email.into(),
            full_name: format!("{username} full"),
            username: username.into(),
            hashed_password: "$argon2id$stub".into(),
            permission_groups: vec![],
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_email_on_create() {
        let repo = InMemorySuperUserRepository::new();
        repo.create(draft("alice1", "a@x.com")).await.unwrap();
        let err = repo.create(draft("alice2", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));
    }

    #[tokio::test]
    async fn field_update_cannot_steal_another_username() {
        let repo = InMemorySuperUserRepository::new();
        repo.create(draft("alice1", "a@x.com")).await.unwrap();
        let bob = repo.create(draft("bob1", "b@x.com")).await.unwrap();

        let err = repo
            .update_field(bob.id, SuperUserField::Username("alice1".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));
        assert_eq!(repo.find_by_id(bob.id).await.unwrap().username, "bob1");
    }

    #[tokio::test]
    async fn update_keeps_created_at() {
        let repo = InMemorySuperUserRepository::new();
        let user = repo.create(draft("alice1", "a@x.com")).await.unwrap();
        let mut changed = user.clone();
        changed.created_at = Utc::now() + chrono::Duration::days(1);
        changed.role = "admin".into();

        let stored = repo.update(&changed).await.unwrap();
        assert_eq!(stored.created_at, user.created_at);
        assert_eq!(stored.role, "admin");
        assert!(stored.updated_at >= user.updated_at);
    }

    #[tokio::test]
    async fn concurrent_creates_are_all_visible() {
        let repo = std::sync::Arc::new(InMemorySuperUserRepository::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create(draft(&format!("user{i}"), &format!("u{i}@x.com")))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(repo.find_all().await.unwrap().len(), 32);
    }
}
