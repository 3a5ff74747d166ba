use crate::state::AppState;
use axum::Router;

pub mod claims;
pub mod dto;
pub mod guard;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod principal;
pub mod services;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
