use actix_web::{HttpResponse, ResponseError};
use ph_core::Error as CoreError;

/// Wraps [`ph_core::Error`] so the edge layer can map engine/session
/// failures to the right HTTP status without the core crates depending on
/// `actix-web`.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(CoreError::illegal(err.to_string()))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let body = serde_json::json!({ "error": self.0.to_string() });
        match &self.0 {
            CoreError::NotFound(_) => HttpResponse::NotFound().json(body),
            CoreError::Forbidden(_) => HttpResponse::Forbidden().json(body),
            CoreError::Conflict(_) => HttpResponse::Conflict().json(body),
            CoreError::InvalidArgument(_) => HttpResponse::BadRequest().json(body),
            CoreError::IllegalState(_) => HttpResponse::UnprocessableEntity().json(body),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
