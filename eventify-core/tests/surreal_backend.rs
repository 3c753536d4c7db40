#![cfg(feature = "surreal")]

mod support;

use anyhow::Result;
use eventify_core::DatabaseContext;
use eventify_core::database::infrastructure::surreal::{self, SurrealSettings};

/// Every call opens its own embedded in-memory datastore.
async fn context() -> Result<DatabaseContext> {
    let db = surreal::connect(&SurrealSettings::default()).await?;
    Ok(DatabaseContext::from_surreal(db))
}

#[tokio::test]
async fn create_and_find() -> Result<()> {
    support::create_and_find(&context().await?).await
}

#[tokio::test]
async fn email_lookup_scenario() -> Result<()> {
    support::email_lookup_scenario(&context().await?).await
}

#[tokio::test]
async fn delete_then_not_found() -> Result<()> {
    support::delete_then_not_found(&context().await?).await
}

#[tokio::test]
async fn duplicate_keys_are_rejected() -> Result<()> {
    support::duplicate_keys_are_rejected(&context().await?).await
}

#[tokio::test]
async fn missing_records_are_not_found() -> Result<()> {
    support::missing_records_are_not_found(&context().await?).await
}

#[tokio::test]
async fn two_factor_toggle() -> Result<()> {
    support::two_factor_toggle(&context().await?).await
}

#[tokio::test]
async fn search_is_case_insensitive_substring() -> Result<()> {
    support::search_is_case_insensitive_substring(&context().await?).await
}

#[tokio::test]
async fn pagination_splits_pages() -> Result<()> {
    support::pagination_splits_pages(&context().await?).await
}

#[tokio::test]
async fn field_updates() -> Result<()> {
    support::field_updates(&context().await?).await
}

#[tokio::test]
async fn reset_token_lifecycle() -> Result<()> {
    support::reset_token_lifecycle(&context().await?).await
}

#[tokio::test]
async fn details_update_keeps_identity() -> Result<()> {
    support::details_update_keeps_identity(&context().await?).await
}

#[tokio::test]
async fn events_lifecycle() -> Result<()> {
    support::events_lifecycle(&context().await?).await
}

#[tokio::test]
async fn events_reject_invalid_capacity() -> Result<()> {
    support::events_reject_invalid_capacity(&context().await?).await
}

#[tokio::test]
async fn schema_initialization_is_idempotent() -> Result<()> {
    let db = surreal::connect(&SurrealSettings::default()).await?;
    surreal::initialize_schema(&db).await?;
    surreal::initialize_schema(&db).await?;
    Ok(())
}
