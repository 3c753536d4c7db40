//! Backend-agnostic conformance checks. Every backend test binary runs the
//! same functions against a freshly created, empty store.
#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result, ensure};
use chrono::{Duration, Utc};
use eventify_core::model::{
    EventDraft, EventSortField, NewSuperUser, PageRequest, SearchQuery,
    SuperUserDraft, SuperUserField, SuperUserSortField,
};
use eventify_core::{AuthCrypto, DatabaseContext, ErrorKind, SuperUserService};
use uuid::Uuid;

pub fn draft(n: usize) -> SuperUserDraft {
    SuperUserDraft {
        role: "guest".into(),
        email: format!("user{n:02}@example.com"),
        full_name: format!("User Number {n:02}"),
        username: format!("user{n:02}"),
        hashed_password: "$argon2id$v=19$placeholder".into(),
        permission_groups: vec!["group1".into()],
    }
}

pub fn service(ctx: &DatabaseContext) -> Result<SuperUserService> {
    let crypto = AuthCrypto::insecure_fast("conformance-pepper")?;
    Ok(SuperUserService::new(ctx.superusers(), Arc::new(crypto)))
}

pub async fn create_and_find(ctx: &DatabaseContext) -> Result<()> {
    let repo = ctx.superusers();
    let created = repo.create(draft(1)).await?;

    ensure!(!created.id.is_nil(), "id must be assigned");
    ensure!(created.created_at == created.updated_at);
    ensure!(!created.is_2fa_enabled && created.reset_token.is_none());

    let by_id = repo.find_by_id(created.id).await?;
    ensure!(by_id == created, "round-trip through storage changed the record");
    ensure!(repo.find_by_username("user01").await?.id == created.id);
    ensure!(repo.get_role_by_id(created.id).await? == "guest");
    ensure!(repo.find_all().await?.len() == 1);
    Ok(())
}

/// Create without a role, look the user up by email.
pub async fn email_lookup_scenario(ctx: &DatabaseContext) -> Result<()> {
    let service = service(ctx)?;
    let created = service
        .create_superuser(NewSuperUser {
            full_name: "Alice A".into(),
            email: "a@x.com".into(),
            username: "alice1".into(),
            password: "longpassword".into(),
            role: None,
            permission_groups: vec![],
        })
        .await?;

    let found = service.get_superuser_by_email("a@x.com").await?;
    ensure!(found.id == created.id);
    ensure!(found.role == "guest");
    ensure!(service.verify_password(&found, "longpassword").await?);

    let missing = service
        .get_superuser_by_email("nobody@x.com")
        .await
        .expect_err("unknown email must fail");
    ensure!(missing.kind() == ErrorKind::NotFound);
    Ok(())
}

pub async fn delete_then_not_found(ctx: &DatabaseContext) -> Result<()> {
    let repo = ctx.superusers();
    let created = repo.create(draft(2)).await?;

    repo.delete_by_id(created.id).await?;
    let err = repo.find_by_id(created.id).await.expect_err("record is gone");
    ensure!(err.is_not_found());

    let err = repo
        .delete_by_id(created.id)
        .await
        .expect_err("second delete must fail");
    ensure!(err.is_not_found(), "expected NotFound, got {err}");
    Ok(())
}

pub async fn duplicate_keys_are_rejected(ctx: &DatabaseContext) -> Result<()> {
    let repo = ctx.superusers();
    repo.create(draft(3)).await?;

    let same_email = SuperUserDraft {
        username: "someoneelse".into(),
        ..draft(3)
    };
    let err = repo.create(same_email).await.expect_err("email is unique");
    ensure!(err.kind() == ErrorKind::Storage, "got {err}");

    let same_username = SuperUserDraft {
        email: "other@example.com".into(),
        ..draft(3)
    };
    let err = repo.create(same_username).await.expect_err("username is unique");
    ensure!(err.kind() == ErrorKind::Storage, "got {err}");

    ensure!(repo.find_all().await?.len() == 1);
    Ok(())
}

pub async fn missing_records_are_not_found(ctx: &DatabaseContext) -> Result<()> {
    let repo = ctx.superusers();
    let ghost = draft(4).into_superuser(Uuid::new_v4(), Utc::now());

    ensure!(repo.update(&ghost).await.expect_err("absent").is_not_found());
    ensure!(
        repo.update_field(ghost.id, SuperUserField::Role("admin".into()))
            .await
            .expect_err("absent")
            .is_not_found()
    );
    ensure!(repo.get_role_by_id(ghost.id).await.expect_err("absent").is_not_found());
    ensure!(
        repo.find_by_reset_token("no-such-token")
            .await
            .expect_err("absent")
            .is_not_found()
    );
    Ok(())
}

pub async fn two_factor_toggle(ctx: &DatabaseContext) -> Result<()> {
    let service = service(ctx)?;
    let repo = ctx.superusers();
    let first = repo.create(draft(5)).await?;
    let second = repo.create(draft(6)).await?;

    let enabled = service.enable_2fa(first.id, "JBSWY3DPEHPK3PXP").await?;
    ensure!(enabled.is_2fa_enabled);
    ensure!(enabled.created_at == first.created_at, "created_at must not move");
    ensure!(enabled.updated_at >= first.updated_at);

    let listed = service.get_all_2fa_enabled_superusers().await?;
    ensure!(listed.len() == 1 && listed[0].id == first.id);
    ensure!(listed[0].two_factor_secret.as_deref() == Some("JBSWY3DPEHPK3PXP"));

    service.disable_2fa(first.id).await?;
    let reloaded = repo.find_by_id(first.id).await?;
    ensure!(!reloaded.is_2fa_enabled && reloaded.two_factor_secret.is_none());
    ensure!(service.get_all_2fa_enabled_superusers().await?.is_empty());
    ensure!(!repo.find_by_id(second.id).await?.is_2fa_enabled);
    Ok(())
}

pub async fn search_is_case_insensitive_substring(ctx: &DatabaseContext) -> Result<()> {
    let repo = ctx.superusers();
    repo.create(SuperUserDraft {
        full_name: "Alice Anders".into(),
        email: "alice@x.com".into(),
        username: "alice".into(),
        ..draft(7)
    })
    .await?;
    repo.create(SuperUserDraft {
        full_name: "Bob Brown".into(),
        email: "bob@y.org".into(),
        username: "bobby".into(),
        ..draft(8)
    })
    .await?;

    let query = |text: &str| SearchQuery::new(text, 1, 10, SuperUserSortField::Username);

    let hits = repo.search_superusers(&query("ALI")).await?;
    ensure!(hits.len() == 1 && hits[0].username == "alice");

    let hits = repo.search_superusers(&query("Y.OR")).await?;
    ensure!(hits.len() == 1 && hits[0].username == "bobby");

    let hits = repo.search_superusers(&query("O")).await?;
    ensure!(
        hits.iter().map(|u| u.username.as_str()).collect::<Vec<_>>() == ["alice", "bobby"],
        "both records contain an o, sorted by username"
    );

    ensure!(repo.search_superusers(&query("zzz")).await?.is_empty());
    ensure!(
        repo.search_superusers(&query("%")).await?.is_empty(),
        "search text is matched literally"
    );
    Ok(())
}

pub async fn pagination_splits_pages(ctx: &DatabaseContext) -> Result<()> {
    let repo = ctx.superusers();
    for n in (0..25).rev() {
        repo.create(draft(n)).await?;
    }

    let page = |page| SearchQuery::new("EXAMPLE.COM", page, 10, SuperUserSortField::Username);

    let first = repo.search_superusers(&page(1)).await?;
    let second = repo.search_superusers(&page(2)).await?;
    let third = repo.search_superusers(&page(3)).await?;
    let fourth = repo.search_superusers(&page(4)).await?;

    ensure!(first.len() == 10 && second.len() == 10 && third.len() == 5);
    ensure!(fourth.is_empty());
    ensure!(first[0].username == "user00");
    ensure!(second[0].username == "user10");
    ensure!(third[4].username == "user24");

    let by_created = repo
        .search_superusers(&SearchQuery::new("user", 1, 3, SuperUserSortField::CreatedAt))
        .await?;
    ensure!(by_created.len() == 3);
    ensure!(
        by_created.windows(2).all(|w| (w[0].created_at, w[0].id) <= (w[1].created_at, w[1].id)),
        "ties on created_at fall back to id"
    );
    Ok(())
}

pub async fn field_updates(ctx: &DatabaseContext) -> Result<()> {
    let repo = ctx.superusers();
    let created = repo.create(draft(9)).await?;

    repo.update_field(created.id, SuperUserField::FullName("Renamed User".into()))
        .await?;
    repo.update_field(
        created.id,
        SuperUserField::PermissionGroups(vec!["ops".into(), "billing".into()]),
    )
    .await?;
    repo.update_superuser_role(created.id, "admin".into()).await?;

    let reloaded = repo.find_by_id(created.id).await?;
    ensure!(reloaded.full_name == "Renamed User");
    ensure!(reloaded.permission_groups == ["ops", "billing"]);
    ensure!(reloaded.role == "admin");
    ensure!(reloaded.email == created.email, "other fields untouched");
    ensure!(reloaded.created_at == created.created_at);
    ensure!(reloaded.updated_at >= created.updated_at);
    Ok(())
}

pub async fn reset_token_lifecycle(ctx: &DatabaseContext) -> Result<()> {
    let service = service(ctx)?;
    let created = ctx.superusers().create(draft(10)).await?;

    let token = service.generate_and_set_reset_token(created.id).await?;
    ensure!(token.len() == 43);
    let found = service
        .get_superuser_by_reset_token(&token)
        .await
        .context("token lookup")?;
    ensure!(found.id == created.id);

    let replacement = service.generate_and_set_reset_token(created.id).await?;
    ensure!(replacement != token);
    ensure!(service.get_superuser_by_reset_token(&token).await.is_err());

    service.clear_reset_token(created.id).await?;
    ensure!(service.get_superuser_by_id(created.id).await?.reset_token.is_none());
    ensure!(
        service
            .get_superuser_by_reset_token(&replacement)
            .await
            .expect_err("cleared")
            .is_not_found()
    );
    Ok(())
}

pub async fn details_update_keeps_identity(ctx: &DatabaseContext) -> Result<()> {
    let service = service(ctx)?;
    let created = ctx.superusers().create(draft(11)).await?;

    let updated = service
        .update_superuser_details(
            created.id,
            eventify_core::model::SuperUserDetails {
                email: Some("moved@example.com".into()),
                ..Default::default()
            },
        )
        .await?;

    ensure!(updated.id == created.id);
    ensure!(updated.email == "moved@example.com");
    ensure!(updated.username == created.username);
    ensure!(updated.hashed_password == created.hashed_password);
    ensure!(service.get_superuser_by_email("moved@example.com").await?.id == created.id);
    Ok(())
}

fn event(name: &str, location: Option<&str>, days: i64, organizer: Uuid) -> EventDraft {
    EventDraft {
        name: name.into(),
        description: Some(format!("{name} for the whole team")),
        date: Utc::now() + Duration::days(days),
        location: location.map(str::to_string),
        capacity: 50,
        organizer_id: organizer,
        attendees: vec![],
    }
}

pub async fn events_lifecycle(ctx: &DatabaseContext) -> Result<()> {
    let repo = ctx.events();
    let organizer = Uuid::new_v4();

    let launch = repo
        .create_event(event("Launch Party", Some("Main Hall"), 30, organizer))
        .await?;
    repo.create_event(event("Quarterly Review", None, 10, organizer))
        .await?;
    repo.create_event(event("Offsite", Some("Lake House"), 60, organizer))
        .await?;

    ensure!(repo.get_event_by_id(launch.id).await? == launch);
    ensure!(repo.count_events("").await? == 3);
    ensure!(repo.count_events("HALL").await? == 1);
    ensure!(repo.count_events("house").await? == 1);

    let listed = repo
        .list_events(&PageRequest::new(1, 10, EventSortField::Date))
        .await?;
    let names: Vec<_> = listed.iter().map(|e| e.name.as_str()).collect();
    ensure!(names == ["Quarterly Review", "Launch Party", "Offsite"], "got {names:?}");

    let hits = repo
        .search_events(&SearchQuery::new("team", 1, 2, EventSortField::Name))
        .await?;
    let names: Vec<_> = hits.iter().map(|e| e.name.as_str()).collect();
    ensure!(names == ["Launch Party", "Offsite"], "got {names:?}");

    let mut changed = launch.clone();
    changed.capacity = 120;
    changed.attendees = vec![organizer];
    let updated = repo.update_event(&changed).await?;
    ensure!(updated.capacity == 120 && updated.attendees == [organizer]);
    ensure!(updated.created_at == launch.created_at);

    repo.delete_event(launch.id).await?;
    ensure!(repo.get_event_by_id(launch.id).await.expect_err("gone").is_not_found());
    ensure!(repo.delete_event(launch.id).await.expect_err("gone").is_not_found());
    ensure!(repo.update_event(&changed).await.expect_err("gone").is_not_found());
    ensure!(repo.count_events("").await? == 2);
    Ok(())
}

pub async fn events_reject_invalid_capacity(ctx: &DatabaseContext) -> Result<()> {
    let repo = ctx.events();
    let organizer = Uuid::new_v4();

    let empty = EventDraft {
        capacity: 0,
        ..event("Empty Room", None, 1, organizer)
    };
    let err = repo.create_event(empty).await.expect_err("capacity 0");
    ensure!(err.kind() == ErrorKind::Validation, "got {err}");

    let nameless = event("   ", None, 1, organizer);
    let err = repo.create_event(nameless).await.expect_err("blank name");
    ensure!(err.kind() == ErrorKind::Validation, "got {err}");
    ensure!(repo.count_events("").await? == 0);

    let stored = repo
        .create_event(event("Board Meeting", None, 2, organizer))
        .await?;
    let mut shrunk = stored.clone();
    shrunk.capacity = -5;
    let err = repo.update_event(&shrunk).await.expect_err("negative capacity");
    ensure!(err.kind() == ErrorKind::Validation, "got {err}");
    ensure!(repo.get_event_by_id(stored.id).await?.capacity == 50);
    Ok(())
}
