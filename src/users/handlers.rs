use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{principal::CurrentUser, services::authorize},
    error::ApiError,
    extract::{JsonBody, PathParam},
    state::AppState,
    users::{
        dto::{PublicUser, RegisterRequest, UpdateUserRequest},
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/me", get(get_me))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let user = services::register(state.users.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip_all, fields(user_id = principal.id()))]
pub async fn get_me(CurrentUser(principal): CurrentUser) -> Json<PublicUser> {
    Json(principal.0.into())
}

// The guard runs before the lookup so other users' ids are all 403, existing or not.
#[instrument(skip(state, principal), fields(user_id = principal.id()))]
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    PathParam(id): PathParam<i64>,
) -> Result<Json<PublicUser>, ApiError> {
    authorize(&principal, id).into_result()?;
    let user = state.users.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, principal, payload), fields(user_id = principal.id()))]
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    PathParam(id): PathParam<i64>,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    authorize(&principal, id).into_result()?;
    let user = services::update(state.users.as_ref(), id, payload).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, principal), fields(user_id = principal.id()))]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    PathParam(id): PathParam<i64>,
) -> Result<StatusCode, ApiError> {
    authorize(&principal, id).into_result()?;
    services::delete(state.users.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
