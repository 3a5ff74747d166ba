use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, TokenForm, TokenResponse},
        services,
    },
    error::ApiError,
    extract::{FormBody, JsonBody},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/token", post(token))
        .route("/auth/login", post(login))
}

/// OAuth2 password grant, as expected by Swagger-style "Authorize" buttons.
#[instrument(skip(state, form), fields(email = %form.username))]
pub async fn token(
    State(state): State<AppState>,
    FormBody(form): FormBody<TokenForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let res = services::login(state.users.as_ref(), &state.keys, &form.username, &form.password)
        .await?;
    Ok(Json(res))
}

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let res = services::login(
        state.users.as_ref(),
        &state.keys,
        &payload.email,
        &payload.password,
    )
    .await?;
    Ok(Json(res))
}
