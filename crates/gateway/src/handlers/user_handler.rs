//! User handlers.
//!
//! Every user leaving these handlers is sanitized first.

use std::collections::BTreeMap;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use common::AppResult;
use domain::User;

use crate::extractors::ValidatedJson;
use crate::middleware::ClientIp;
use crate::state::AppState;

/// User creation request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    /// Display name
    #[serde(default)]
    #[validate(length(min = 1, message = "Display name cannot be empty"))]
    #[schema(example = "Ann")]
    pub display_name: String,
    /// Email address
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ann@example.org")]
    pub email: String,
    /// Password (minimum 8 characters)
    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "secret123", min_length = 8)]
    pub password: String,
}

/// User update request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    /// New display name
    #[serde(default)]
    #[validate(length(min = 1, message = "Display name cannot be empty"))]
    #[schema(example = "Ann Smith")]
    pub display_name: String,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(search_users).post(create_user))
        .route(
            "/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

/// List all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users keyed by id", body = BTreeMap<String, User>)
    )
)]
pub async fn search_users(State(state): State<AppState>) -> AppResult<Json<BTreeMap<String, User>>> {
    let users = state
        .users
        .search_users()
        .await?
        .into_iter()
        .map(|(id, user)| (id, user.sanitized()))
        .collect();
    Ok(Json(users))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Malformed body"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(client_ip): Extension<ClientIp>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let candidate = User::new(payload.display_name, payload.email, payload.password);
    let user = state.users.create(candidate).await?;

    tracing::debug!(user_id = user.id, client_ip = %client_ip.0, "user registered");
    Ok((StatusCode::CREATED, Json(user.sanitized())))
}

/// Get user by id
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<User>> {
    let user = state.users.get(&id).await?;
    Ok(Json(user.sanitized()))
}

/// Change a user's display name
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User id")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Malformed body"),
        (status = 404, description = "User not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<User>> {
    let user = state.users.update(&id, payload.display_name).await?;
    Ok(Json(user.sanitized()))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.users.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
