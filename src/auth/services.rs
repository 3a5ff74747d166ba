use tracing::{info, warn};

pub use crate::auth::guard::authorize;
use crate::{
    auth::{
        dto::TokenResponse,
        jwt::JwtKeys,
        password::verify_password_blocking,
        principal::{self, Principal, Unauthorized},
    },
    error::ApiError,
    users::repo::UserStore,
};

/// Checks credentials and issues a bearer token.
///
/// Unknown email and wrong password both end in
/// [`ApiError::InvalidCredentials`] after exactly one Argon2 verification.
pub async fn login(
    store: &dyn UserStore,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> Result<TokenResponse, ApiError> {
    let email = email.trim();
    let user = store.find_by_email(email).await?;

    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let ok = verify_password_blocking(password.to_owned(), stored_hash).await;

    let user = match user {
        Some(user) if ok => user,
        _ => {
            warn!(email = %email, "login rejected");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let access_token = keys.issue_for(&user.email)?;
    info!(user_id = user.id, "user logged in");
    Ok(TokenResponse {
        access_token,
        token_type: "bearer".into(),
        user_id: user.id,
    })
}

pub async fn authenticate(
    store: &dyn UserStore,
    keys: &JwtKeys,
    token: &str,
) -> Result<Principal, Unauthorized> {
    principal::resolve(keys, store, token).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{guard::Decision, password::hash_password},
        config::JwtConfig,
        users::{memory::MemoryUserStore, repo_types::NewUser},
    };

    fn keys() -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: "service-secret".into(),
            algorithm: jsonwebtoken::Algorithm::HS256,
            ttl_minutes: 30,
        })
    }

    async fn seeded() -> (MemoryUserStore, i64) {
        let store = MemoryUserStore::new();
        let user = store
            .create(NewUser {
                email: "a@x.com".into(),
                password_hash: hash_password("longenough1").unwrap(),
            })
            .await
            .unwrap();
        (store, user.id)
    }

    #[tokio::test]
    async fn login_then_authenticate_then_authorize() {
        let (store, id) = seeded().await;
        let keys = keys();

        let res = login(&store, &keys, "a@x.com", "longenough1").await.expect("login");
        assert_eq!(res.token_type, "bearer");
        assert_eq!(res.user_id, id);

        let principal = authenticate(&store, &keys, &res.access_token)
            .await
            .expect("authenticate");
        assert_eq!(principal.id(), id);
        assert_eq!(authorize(&principal, id), Decision::Allowed);
        assert_eq!(authorize(&principal, id + 1), Decision::Forbidden);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let (store, _) = seeded().await;
        let keys = keys();

        let wrong = login(&store, &keys, "a@x.com", "wrong-password").await.unwrap_err();
        let unknown = login(&store, &keys, "nobody@x.com", "longenough1").await.unwrap_err();
        assert!(matches!(wrong, ApiError::InvalidCredentials));
        assert!(matches!(unknown, ApiError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn corrupt_stored_hash_denies_login() {
        let store = MemoryUserStore::new();
        store
            .create(NewUser {
                email: "a@x.com".into(),
                password_hash: "corrupt".into(),
            })
            .await
            .unwrap();
        let err = login(&store, &keys(), "a@x.com", "longenough1").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));
    }
}
