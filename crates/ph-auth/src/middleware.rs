use std::future::Future;
use std::pin::Pin;

use actix_web::dev::Payload;
use actix_web::web;
use actix_web::{FromRequest, HttpRequest};
use ph_core::{marker, ID};

use crate::claims::Claims;
use crate::crypto::Crypto;

/// Extractor for authenticated requests and channel connects.
pub struct Auth(pub Claims);

impl Auth {
    pub fn claims(&self) -> &Claims {
        &self.0
    }
    pub fn user(&self) -> ID<marker::User> {
        self.0.user()
    }
}

impl FromRequest for Auth {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let crypto = req.app_data::<web::Data<Crypto>>().cloned();
        let bearer = bearer_token(req);
        Box::pin(async move {
            let token = bearer
                .ok_or_else(|| actix_web::error::ErrorUnauthorized("missing bearer token"))?;
            let crypto = crypto
                .ok_or_else(|| actix_web::error::ErrorInternalServerError("auth not configured"))?;
            let claims = crypto
                .decode(&token)
                .map_err(|_| actix_web::error::ErrorUnauthorized("invalid token"))?;
            Ok(Auth(claims))
        })
    }
}

/// Optional authentication: a missing or invalid token yields `None`
/// rather than rejecting the request, for spectator-allowed channels.
pub struct MaybeAuth(pub Option<Claims>);

impl MaybeAuth {
    pub fn user(&self) -> Option<ID<marker::User>> {
        self.0.as_ref().map(Claims::user)
    }
}

impl FromRequest for MaybeAuth {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let inner = Auth::from_request(req, payload);
        Box::pin(async move {
            match inner.await {
                Ok(Auth(claims)) => Ok(MaybeAuth(Some(claims))),
                Err(_) => Ok(MaybeAuth(None)),
            }
        })
    }
}

/// Reads the bearer token from either the `Authorization` header or a
/// `token` query parameter, the latter for websocket channel connects
/// that can't set custom headers.
fn bearer_token(req: &HttpRequest) -> Option<String> {
    if let Some(header) = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(token) = header.strip_prefix("Bearer ") {
            return Some(token.to_owned());
        }
    }
    web::Query::<std::collections::HashMap<String, String>>::from_query(req.query_string())
        .ok()
        .and_then(|q| q.get("token").cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::Claims;

    #[test]
    fn decode_rejects_tampered_secret() {
        let minted = Crypto::new(b"right-secret");
        let reader = Crypto::new(b"wrong-secret");
        let claims = Claims::new(ID::default(), 9_999_999_999);
        let token = minted.encode(&claims).unwrap();
        assert!(reader.decode(&token).is_err());
    }
}
