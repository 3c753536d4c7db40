use std::sync::Arc;

use anyhow::Result;
use axum_test::TestServer;
use eventify_core::{AuthCrypto, DatabaseContext};
use eventify_server::{AppState, create_app, infra::config::Config};
use serde_json::{Value, json};

/// A server over a fresh in-memory backend with cheap hashing parameters.
pub fn build_test_server() -> Result<(TestServer, AppState)> {
    let crypto = Arc::new(AuthCrypto::insecure_fast("test-pepper")?);
    let state = AppState::new(
        Arc::new(Config::default()),
        DatabaseContext::in_memory(),
        crypto,
    );
    let server = TestServer::new(create_app(state.clone()))?;
    Ok((server, state))
}

pub fn superuser_body(n: usize) -> Value {
    json!({
        "full_name": format!("Member Number {n:02}"),
        "email": format!("member{n:02}@example.com"),
        "username": format!("member{n:02}"),
        "password": "correct-horse",
        "permission_groups": ["group1"],
    })
}

/// Create a super user through the API and return its id.
pub async fn create_superuser(server: &TestServer, n: usize) -> String {
    let response = server
        .post("/api/v1/superusers")
        .json(&superuser_body(n))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body: Value = response.json();
    body["data"]["id"]
        .as_str()
        .expect("created superuser has an id")
        .to_string()
}
