use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::password::hash_password_blocking,
    error::ApiError,
    users::{
        dto::{RegisterRequest, UpdateUserRequest},
        repo::UserStore,
        repo_types::{NewUser, User, UserChanges},
    },
};

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_email(email: &str) -> Result<(), ApiError> {
    if !is_valid_email(email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    Ok(())
}

fn check_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(ApiError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub async fn register(store: &dyn UserStore, req: RegisterRequest) -> Result<User, ApiError> {
    let email = req.email.trim().to_owned();
    check_email(&email)?;
    check_password(&req.password)?;

    if store.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::EmailTaken);
    }

    let password_hash = hash_password_blocking(req.password).await?;
    // A concurrent registration can still win the race; the store reports it as AlreadyExists.
    let user = store
        .create(NewUser {
            email,
            password_hash,
        })
        .await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(user)
}

pub async fn update(
    store: &dyn UserStore,
    id: i64,
    req: UpdateUserRequest,
) -> Result<User, ApiError> {
    let mut changes = UserChanges {
        is_active: req.is_active,
        ..Default::default()
    };

    if let Some(email) = req.email {
        let email = email.trim().to_owned();
        check_email(&email)?;
        changes.email = Some(email);
    }
    if let Some(password) = req.password {
        check_password(&password)?;
        changes.password_hash = Some(hash_password_blocking(password).await?);
    }

    if changes.is_empty() {
        return store.find_by_id(id).await?.ok_or(ApiError::NotFound);
    }

    let user = store.update(id, changes).await?;
    info!(user_id = user.id, "user updated");
    Ok(user)
}

pub async fn delete(store: &dyn UserStore, id: i64) -> Result<(), ApiError> {
    store.delete(id).await?;
    info!(user_id = id, "user deleted");
    Ok(())
}
