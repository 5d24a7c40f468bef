//! Bearer-token identity resolution for the edge layer.
//!
//! Token issuance, registration, and session revocation belong to an
//! external identity service; this crate only verifies a token handed to
//! it and recovers the user id it names.

mod claims;
mod crypto;
#[cfg(feature = "server")]
mod middleware;

pub use claims::Claims;
pub use crypto::Crypto;
#[cfg(feature = "server")]
pub use middleware::{Auth, MaybeAuth};
