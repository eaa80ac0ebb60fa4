//! Users API
//!
//! REST endpoints for the principal registry. Every route is bearer
//! authenticated; mutating routes additionally go through the scope-gated
//! service with the resolved caller bound per request.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::error::RegistryError;
use crate::middleware::Authenticated;
use crate::user::entity::{Scope, User, UserCreation, UserId, UserUpdate};
use crate::user::service::UserService;

/// Create user request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Display name, unique across principals
    pub name: String,

    /// Requested privilege scope
    pub scope: Scope,
}

/// Update user request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    /// New display name
    pub name: String,

    /// Scope to assign
    pub scope: Scope,
}

/// User response DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub scope: Scope,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            scope: user.scope,
        }
    }
}

/// Users service state
#[derive(Clone)]
pub struct UsersState {
    pub user_service: Arc<UserService>,
}

/// Get the authenticated caller's own record
#[utoipa::path(
    get,
    path = "/me",
    tag = "users",
    operation_id = "getApiUsersMe",
    responses(
        (status = 200, description = "The caller", body = UserResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(auth: Authenticated) -> Json<UserResponse> {
    Json(auth.0.into())
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "users",
    operation_id = "getApiUsersById",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<UsersState>,
    _auth: Authenticated,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>, RegistryError> {
    let user = state
        .user_service
        .get_user(id)
        .await?
        .ok_or_else(|| RegistryError::not_found(id))?;
    Ok(Json(user.into()))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = "users",
    operation_id = "postApiUsers",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 403, description = "Caller scope does not dominate requested scope"),
        (status = 409, description = "Name already taken")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<UsersState>,
    auth: Authenticated,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), RegistryError> {
    let created = state
        .user_service
        .on_behalf_of(auth.0)
        .create_user(UserCreation::new(req.name, req.scope))
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Update an existing user
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "users",
    operation_id = "putApiUsersById",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 403, description = "Caller scope does not dominate"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path(id): Path<UserId>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, RegistryError> {
    let updated = state
        .user_service
        .on_behalf_of(auth.0)
        .update_user(id, UserUpdate::new(req.name, req.scope))
        .await?;
    Ok(Json(updated.into()))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "users",
    operation_id = "deleteApiUsersById",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = UserResponse),
        (status = 403, description = "Caller scope does not dominate target scope"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>, RegistryError> {
    let removed = state
        .user_service
        .on_behalf_of(auth.0)
        .delete_user(id)
        .await?;
    Ok(Json(removed.into()))
}

pub fn users_router(state: UsersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_user))
        .routes(routes!(get_me))
        .routes(routes!(get_user, update_user, delete_user))
        .with_state(state)
}
