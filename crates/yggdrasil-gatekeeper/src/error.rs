//! Unified error type for the gatekeeper, and its HTTP rendering.

use std::time::Duration;

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, ResponseError};
use yggdrasil_progression::ProgressionError;
use yggdrasil_realm::{RealmError, StatusResponse};
use yggdrasil_session::SessionError;

use crate::pages::SEALED_PAGE;

/// Top-level error that wraps every layer's error.
///
/// Implements [`ResponseError`], so handlers return
/// `Result<HttpResponse, GatekeeperError>` and use `?` freely. The body
/// never carries internal details: 5xx errors are logged and answered with
/// a generic message.
#[derive(Debug, thiserror::Error)]
pub enum GatekeeperError {
    #[error(transparent)]
    Realm(#[from] RealmError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Progression(#[from] ProgressionError),

    /// No live session on a route that needs one.
    #[error("authentication required")]
    Unauthenticated,

    #[error("{0}")]
    BadRequest(String),

    /// The realm is locked, unknown, or the caller is anonymous.
    #[error("realm sealed")]
    RealmSealed,

    #[error("rate limit exceeded, retry after {}s", .retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    /// `POST /internal/flags` was called but no service token is configured.
    #[error("flag issuing is not configured")]
    FlagIssueDisabled,

    #[error("invalid gatekeeper configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GatekeeperError {
    /// What the browser is told.
    fn public_message(&self) -> String {
        match self {
            Self::Session(SessionError::AuthFailed) => "Invalid username or password".into(),
            Self::Session(
                e @ (SessionError::InvalidUsername
                | SessionError::WeakPassword { .. }
                | SessionError::UsernameTaken(_)),
            ) => e.to_string(),
            Self::Progression(e) => match e {
                ProgressionError::MalformedFlag => "Invalid flag format".into(),
                ProgressionError::UnknownRealm(_) => "Unknown realm".into(),
                ProgressionError::WrongFlag(_) => "Incorrect flag".into(),
                ProgressionError::OutOfOrder { .. } => {
                    "Realm locked. Complete the current realm first.".into()
                }
                ProgressionError::Storage(_) => "Internal server error".into(),
            },
            Self::Realm(RealmError::UnknownRealm(_)) => "Unknown realm".into(),
            Self::Unauthenticated => "Authentication required".into(),
            Self::BadRequest(message) => message.clone(),
            Self::RealmSealed => "The way is sealed".into(),
            Self::RateLimited { .. } => "Too many requests. Please try again later.".into(),
            Self::FlagIssueDisabled => "Flag issuing is not available".into(),
            _ => "Internal server error".into(),
        }
    }
}

impl ResponseError for GatekeeperError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Session(SessionError::AuthFailed) | Self::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            Self::Session(
                SessionError::InvalidUsername
                | SessionError::WeakPassword { .. }
                | SessionError::UsernameTaken(_),
            ) => StatusCode::BAD_REQUEST,
            Self::Progression(
                ProgressionError::MalformedFlag
                | ProgressionError::UnknownRealm(_)
                | ProgressionError::WrongFlag(_),
            ) => StatusCode::BAD_REQUEST,
            Self::Progression(ProgressionError::OutOfOrder { .. }) => StatusCode::FORBIDDEN,
            Self::Realm(RealmError::UnknownRealm(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::RealmSealed => StatusCode::FORBIDDEN,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::FlagIssueDisabled => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        match self {
            Self::RealmSealed => HttpResponse::build(status)
                .content_type("text/html; charset=utf-8")
                .body(SEALED_PAGE),
            Self::RateLimited { retry_after } => {
                let secs = retry_after.as_secs();
                HttpResponse::build(status)
                    .insert_header((header::RETRY_AFTER, secs.to_string()))
                    .json(serde_json::json!({
                        "status": "error",
                        "message": self.public_message(),
                        "retryAfter": secs,
                    }))
            }
            _ => HttpResponse::build(status).json(StatusResponse::error(self.public_message())),
        }
    }
}
