//! Super user endpoints. Thin wrappers over [`SuperUserService`]; all rules
//! live in the service.
//!
//! [`SuperUserService`]: eventify_core::SuperUserService

use axum::{Json, extract::State, http::StatusCode};
use eventify_model::{NewSuperUser, SuperUserDetails, SuperUserField};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::api_types::{
    ApiResponse, Enable2faRequest, ResetTokenResponse, RoleResponse,
    SearchParams, SuperUserResponse, UpdatePermissionsRequest,
    UpdateRoleRequest,
};
use crate::infra::app_state::AppState;
use crate::infra::errors::{AppError, AppResult};
use crate::infra::extract::{ApiJson, ApiPath, ApiQuery};

type SuperUserList = Json<ApiResponse<Vec<SuperUserResponse>>>;

fn list(users: Vec<eventify_model::SuperUser>) -> SuperUserList {
    Json(ApiResponse::success(
        users.into_iter().map(SuperUserResponse::from).collect(),
    ))
}

pub async fn create_superuser(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewSuperUser>,
) -> AppResult<(StatusCode, Json<ApiResponse<SuperUserResponse>>)> {
    let created = state.superusers().create_superuser(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(SuperUserResponse::from(created))
                .with_message("SuperUser created successfully"),
        ),
    ))
}

pub async fn list_superusers(State(state): State<AppState>) -> AppResult<SuperUserList> {
    let users = state.superusers().get_all_superusers().await?;
    Ok(list(users))
}

pub async fn search_superusers(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> AppResult<SuperUserList> {
    let query = params.into_query()?;
    let users = state.superusers().search_superusers(&query).await?;
    Ok(list(users))
}

pub async fn list_2fa_enabled(State(state): State<AppState>) -> AppResult<SuperUserList> {
    let users = state.superusers().get_all_2fa_enabled_superusers().await?;
    Ok(list(users))
}

pub async fn get_superuser(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<SuperUserResponse>>> {
    let user = state.superusers().get_superuser_by_id(id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

pub async fn get_superuser_by_email(
    State(state): State<AppState>,
    ApiPath(email): ApiPath<String>,
) -> AppResult<Json<ApiResponse<SuperUserResponse>>> {
    let user = state.superusers().get_superuser_by_email(&email).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

pub async fn get_superuser_by_username(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
) -> AppResult<Json<ApiResponse<SuperUserResponse>>> {
    let user = state.superusers().get_superuser_by_username(&username).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

pub async fn get_superuser_by_reset_token(
    State(state): State<AppState>,
    ApiPath(token): ApiPath<String>,
) -> AppResult<Json<ApiResponse<SuperUserResponse>>> {
    let user = state.superusers().get_superuser_by_reset_token(&token).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

pub async fn update_superuser_details(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(details): ApiJson<SuperUserDetails>,
) -> AppResult<Json<ApiResponse<SuperUserResponse>>> {
    let user = state.superusers().update_superuser_details(id, details).await?;
    Ok(Json(
        ApiResponse::success(SuperUserResponse::from(user)).with_message("SuperUser updated"),
    ))
}

pub async fn delete_superuser(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.superusers().delete_superuser_by_id(id).await?;
    info!(target: "superuser.http", superuser_id = %id, "delete request served");
    Ok(Json(ApiResponse::ok("SuperUser deleted")))
}

pub async fn get_role(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<RoleResponse>>> {
    let role = state.superusers().get_role_by_superuser_id(id).await?;
    Ok(Json(ApiResponse::success(RoleResponse { id, role })))
}

pub async fn update_role(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateRoleRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .superusers()
        .update_superuser_role(id, &request.role)
        .await?;
    Ok(Json(ApiResponse::ok("Role updated")))
}

pub async fn update_permissions(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdatePermissionsRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .superusers()
        .update_superuser_permissions(id, request.permission_groups)
        .await?;
    Ok(Json(ApiResponse::ok("Permissions updated")))
}

/// The body is the bare JSON value for `field`, e.g. `"admin"` for `role`.
pub async fn update_field(
    State(state): State<AppState>,
    ApiPath((id, field)): ApiPath<(Uuid, String)>,
    ApiJson(value): ApiJson<serde_json::Value>,
) -> AppResult<Json<ApiResponse<()>>> {
    let update: SuperUserField =
        serde_json::from_value(json!({ "field": field, "value": value })).map_err(|e| {
            AppError::bad_request(format!("Invalid update for field '{field}': {e}"))
        })?;

    state.superusers().update_superuser_field(id, update).await?;
    Ok(Json(ApiResponse::ok("Field updated")))
}

pub async fn enable_2fa(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<Enable2faRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.superusers().enable_2fa(id, &request.secret).await?;
    Ok(Json(ApiResponse::ok("2FA enabled")))
}

pub async fn disable_2fa(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.superusers().disable_2fa(id).await?;
    Ok(Json(ApiResponse::ok("2FA disabled")))
}

pub async fn generate_reset_token(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<ResetTokenResponse>>> {
    let reset_token = state.superusers().generate_and_set_reset_token(id).await?;
    Ok(Json(
        ApiResponse::success(ResetTokenResponse { reset_token })
            .with_message("Reset token generated"),
    ))
}

pub async fn clear_reset_token(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.superusers().clear_reset_token(id).await?;
    Ok(Json(ApiResponse::ok("Reset token cleared")))
}
