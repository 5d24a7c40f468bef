use ph_core::{marker, ID};
use serde::{Deserialize, Serialize};

/// Payload of the bearer token this service accepts. Issuance is an
/// external collaborator's job; this crate only ever decodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated user's id.
    sub: uuid::Uuid,
    /// Unix timestamp the token expires at.
    exp: u64,
}

impl Claims {
    pub fn new(user: ID<marker::User>, expires_at_unix: u64) -> Self {
        Self {
            sub: user.inner(),
            exp: expires_at_unix,
        }
    }
    pub fn user(&self) -> ID<marker::User> {
        ID::from(self.sub)
    }
    pub fn expires_at_unix(&self) -> u64 {
        self.exp
    }
}
