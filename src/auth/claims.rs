use serde::{Deserialize, Serialize};

/// JWT payload used for authentication.
///
/// `sub` and `exp` are mandatory; presence is enforced by the validator in
/// [`JwtKeys::decode_at`](super::jwt::JwtKeys::decode_at), so `sub` defaults
/// here only to let that check report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: String, // user email
    #[serde(default)]
    pub iat: u64,    // issued at (unix timestamp)
    pub exp: u64,    // expires at (unix timestamp)
}
