use thiserror::Error;

use crate::auth::principal::Principal;

/// Outcome of an ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("not authorized")]
pub struct Forbidden;

impl Decision {
    pub fn into_result(self) -> Result<(), Forbidden> {
        match self {
            Decision::Allowed => Ok(()),
            Decision::Forbidden => Err(Forbidden),
        }
    }
}

/// A user may act only on their own record.
pub fn authorize(principal: &Principal, target_user_id: i64) -> Decision {
    if principal.id() == target_user_id {
        Decision::Allowed
    } else {
        Decision::Forbidden
    }
}
