use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::{error, warn};

lazy_static! {
    // Verified against when the email is unknown so both login failures cost one Argon2 run.
    static ref DUMMY_HASH: Option<String> = hash_password("usergate-timing-equalizer").ok();
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Returns `false` for a wrong password and for a hash that does not parse.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Forces the dummy hash to be built. Call once at startup, off the async runtime.
pub fn warm_up() {
    lazy_static::initialize(&DUMMY_HASH);
}

/// Burns one verification against a throwaway hash. Always `false`.
pub fn verify_against_dummy(plain: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(plain, hash);
    }
    false
}

pub async fn hash_password_blocking(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain)).await?
}

pub async fn verify_password_blocking(plain: String, hash: Option<String>) -> bool {
    let outcome = tokio::task::spawn_blocking(move || match hash {
        Some(hash) => verify_password(&plain, &hash),
        None => verify_against_dummy(&plain),
    })
    .await;
    match outcome {
        Ok(ok) => ok,
        Err(e) => {
            error!(error = %e, "password verification task failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_password("longenough1").unwrap();
        let b = hash_password("longenough1").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("longenough1", &a));
        assert!(verify_password("longenough1", &b));
    }

    #[test]
    fn hash_is_argon2_phc_string() {
        let hash = hash_password("longenough1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("longenough1"));
    }

    #[test]
    fn malformed_hash_fails_closed() {
        assert!(!verify_password("anything", "not-a-valid-hash"));
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "$argon2id$v=19$m=19456,t=2,p=1$broken"));
    }

    #[test]
    fn warm_up_builds_a_usable_dummy_hash() {
        warm_up();
        let hash = DUMMY_HASH.as_deref().expect("dummy hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("usergate-timing-equalizer", hash));
    }

    #[test]
    fn dummy_verification_never_succeeds() {
        assert!(!verify_against_dummy("usergate-timing-equalizer"));
    }

    #[tokio::test]
    async fn blocking_helpers_agree_with_sync_versions() {
        let hash = hash_password_blocking("longenough1".into()).await.unwrap();
        assert!(verify_password_blocking("longenough1".into(), Some(hash.clone())).await);
        assert!(!verify_password_blocking("nope".into(), Some(hash)).await);
        assert!(!verify_password_blocking("longenough1".into(), None).await);
    }
}
