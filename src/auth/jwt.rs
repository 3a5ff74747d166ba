use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;

use crate::{auth::claims::Claims, config::JwtConfig};

/// Why a token was refused. Only ever logged; callers collapse it to `Unauthorized`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenRejected {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token has no subject")]
    MissingSubject,
}

/// Signing and verification keys derived once from [`JwtConfig`].
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    ttl_secs: i64,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            ttl_secs: cfg.ttl_minutes.saturating_mul(60),
        }
    }

    /// Claims for `subject` valid from now until now + configured lifetime.
    pub fn claims_for(&self, subject: &str) -> anyhow::Result<Claims> {
        anyhow::ensure!(self.ttl_secs > 0, "token lifetime must be positive");
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let exp = now
            .checked_add(self.ttl_secs)
            .ok_or_else(|| anyhow::anyhow!("token lifetime overflows the clock"))?;
        Ok(Claims {
            sub: subject.to_owned(),
            iat: u64::try_from(now)?,
            exp: u64::try_from(exp)?,
        })
    }

    pub fn issue(&self, claims: &Claims) -> anyhow::Result<String> {
        let token = encode(&Header::new(self.algorithm), claims, &self.encoding)?;
        debug!(sub = %claims.sub, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    pub fn issue_for(&self, subject: &str) -> anyhow::Result<String> {
        self.issue(&self.claims_for(subject)?)
    }

    pub fn decode(&self, token: &str) -> Result<Claims, TokenRejected> {
        self.decode_at(token, OffsetDateTime::now_utc().unix_timestamp() as u64)
    }

    /// Verifies `token` as of the unix time `now`. Expiry is exclusive:
    /// a token with `exp == now` is already dead.
    pub fn decode_at(&self, token: &str, now: u64) -> Result<Claims, TokenRejected> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below against `now`, with no leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            let rejected = match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenRejected::InvalidSignature
                }
                ErrorKind::MissingRequiredClaim(claim) if claim == "sub" => {
                    TokenRejected::MissingSubject
                }
                _ => TokenRejected::Malformed,
            };
            debug!(error = %e, reason = %rejected, "jwt rejected");
            rejected
        })?;

        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            return Err(TokenRejected::MissingSubject);
        }
        if now >= claims.exp {
            debug!(sub = %claims.sub, exp = claims.exp, now, "jwt expired");
            return Err(TokenRejected::Expired);
        }
        Ok(claims)
    }
}
