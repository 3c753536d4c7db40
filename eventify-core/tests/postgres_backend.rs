//! Requires a reachable PostgreSQL via `DATABASE_URL`; each test gets a fresh
//! database with the bundled migrations applied.
#![cfg(feature = "pg-tests")]

mod support;

use anyhow::Result;
use eventify_core::DatabaseContext;
use sqlx::PgPool;

#[sqlx::test(migrator = "eventify_core::MIGRATOR")]
async fn create_and_find(pool: PgPool) -> Result<()> {
    support::create_and_find(&DatabaseContext::from_pg_pool(pool)).await
}

#[sqlx::test(migrator = "eventify_core::MIGRATOR")]
async fn email_lookup_scenario(pool: PgPool) -> Result<()> {
    support::email_lookup_scenario(&DatabaseContext::from_pg_pool(pool)).await
}

#[sqlx::test(migrator = "eventify_core::MIGRATOR")]
async fn delete_then_not_found(pool: PgPool) -> Result<()> {
    support::delete_then_not_found(&DatabaseContext::from_pg_pool(pool)).await
}

#[sqlx::test(migrator = "eventify_core::MIGRATOR")]
async fn duplicate_keys_are_rejected(pool: PgPool) -> Result<()> {
    support::duplicate_keys_are_rejected(&DatabaseContext::from_pg_pool(pool)).await
}

#[sqlx::test(migrator = "eventify_core::MIGRATOR")]
async fn missing_records_are_not_found(pool: PgPool) -> Result<()> {
    support::missing_records_are_not_found(&DatabaseContext::from_pg_pool(pool)).await
}

#[sqlx::test(migrator = "eventify_core::MIGRATOR")]
async fn two_factor_toggle(pool: PgPool) -> Result<()> {
    support::two_factor_toggle(&DatabaseContext::from_pg_pool(pool)).await
}

#[sqlx::test(migrator = "eventify_core::MIGRATOR")]
async fn search_is_case_insensitive_substring(pool: PgPool) -> Result<()> {
    support::search_is_case_insensitive_substring(&DatabaseContext::from_pg_pool(pool)).await
}

#[sqlx::test(migrator = "eventify_core::MIGRATOR")]
async fn pagination_splits_pages(pool: PgPool) -> Result<()> {
    support::pagination_splits_pages(&DatabaseContext::from_pg_pool(pool)).await
}

#[sqlx::test(migrator = "eventify_core::MIGRATOR")]
async fn field_updates(pool: PgPool) -> Result<()> {
    support::field_updates(&DatabaseContext::from_pg_pool(pool)).await
}

#[sqlx::test(migrator = "eventify_core::MIGRATOR")]
async fn reset_token_lifecycle(pool: PgPool) -> Result<()> {
    support::reset_token_lifecycle(&DatabaseContext::from_pg_pool(pool)).await
}

#[sqlx::test(migrator = "eventify_core::MIGRATOR")]
async fn details_update_keeps_identity(pool: PgPool) -> Result<()> {
    support::details_update_keeps_identity(&DatabaseContext::from_pg_pool(pool)).await
}

#[sqlx::test(migrator = "eventify_core::MIGRATOR")]
async fn events_lifecycle(pool: PgPool) -> Result<()> {
    support::events_lifecycle(&DatabaseContext::from_pg_pool(pool)).await
}

#[sqlx::test(migrator = "eventify_core::MIGRATOR")]
async fn events_reject_invalid_capacity(pool: PgPool) -> Result<()> {
    support::events_reject_invalid_capacity(&DatabaseContext::from_pg_pool(pool)).await
}

#[sqlx::test(migrator = "eventify_core::MIGRATOR")]
async fn unique_violation_names_the_constraint(pool: PgPool) -> Result<()> {
    let ctx = DatabaseContext::from_pg_pool(pool);
    ctx.superusers().create(support::draft(1)).await?;
    let same_email = eventify_core::model::SuperUserDraft {
        username: "another".into(),
        ..support::draft(1)
    };
    let err = ctx
        .superusers()
        .create(same_email)
        .await
        .expect_err("duplicate");
    anyhow::ensure!(err.to_string().contains("superusers_email_key"), "got {err}");
    Ok(())
}
