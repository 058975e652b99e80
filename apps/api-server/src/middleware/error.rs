//! Error handling - RFC 7807 responses with localized detail.

use std::fmt;
use std::time::Duration;

use actix_web::http::header;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use quill_core::DomainError;
use quill_core::ports::{AuthError, StorageError};
use quill_shared::{ErrorResponse, Locale, MessageKey};

/// Application-level error: a message key, its HTTP status and the locale
/// the detail is rendered in.
#[derive(Debug)]
pub struct AppError {
    key: MessageKey,
    status: StatusCode,
    locale: Locale,
    retry_after: Option<Duration>,
    /// Logged, never sent to the client.
    internal: Option<String>,
}

impl AppError {
    pub fn new(key: MessageKey, status: StatusCode) -> Self {
        Self {
            key,
            status,
            locale: Locale::default(),
            retry_after: None,
            internal: None,
        }
    }

    pub fn not_found() -> Self {
        Self::new(MessageKey::NotFound, StatusCode::NOT_FOUND)
    }

    pub fn session_required() -> Self {
        Self::new(MessageKey::SessionRequired, StatusCode::UNAUTHORIZED)
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::new(MessageKey::Validation, StatusCode::UNPROCESSABLE_ENTITY).with_internal(reason)
    }

    pub fn localized(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    fn with_internal(mut self, detail: impl Into<String>) -> Self {
        self.internal = Some(detail.into());
        self
    }

    fn rate_limited(retry_after: Duration) -> Self {
        let mut err = Self::new(MessageKey::RateLimited, StatusCode::TOO_MANY_REQUESTS);
        err.retry_after = Some(retry_after);
        err
    }

    pub fn key(&self) -> MessageKey {
        self.key
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.internal {
            Some(detail) => write!(f, "{}: {}", self.key.code(), detail),
            None => f.write_str(self.key.code()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        if self.status.is_server_error() {
            tracing::error!(code = self.key.code(), error = ?self.internal, "Request failed");
        }

        let title = self.status.canonical_reason().unwrap_or("Error");
        let body = ErrorResponse::new(self.status.as_u16(), title, self.key.code())
            .with_detail(self.key.text(self.locale));

        let mut response = HttpResponse::build(self.status);
        response.insert_header((header::CONTENT_LANGUAGE, self.locale.tag()));
        if let Some(retry_after) = self.retry_after {
            response.insert_header((header::RETRY_AFTER, retry_after.as_secs().max(1).to_string()));
        }
        response.json(body)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(reason) => AppError::validation(reason),
            DomainError::SlugConflict(slug) => {
                AppError::new(MessageKey::SlugConflict, StatusCode::CONFLICT).with_internal(slug)
            }
            DomainError::PermissionDenied => {
                AppError::new(MessageKey::PermissionDenied, StatusCode::FORBIDDEN)
            }
            DomainError::NotFound => AppError::not_found(),
            DomainError::RateLimited { retry_after } => AppError::rate_limited(retry_after),
            DomainError::Backend(msg) => {
                AppError::new(MessageKey::Backend, StatusCode::INTERNAL_SERVER_ERROR)
                    .with_internal(msg)
            }
            DomainError::Transport(msg) => {
                AppError::new(MessageKey::Transport, StatusCode::BAD_GATEWAY).with_internal(msg)
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let unprocessable = StatusCode::UNPROCESSABLE_ENTITY;
        match err {
            AuthError::MissingCredentials => AppError::new(MessageKey::MissingCredentials, unprocessable),
            AuthError::InvalidEmail => AppError::new(MessageKey::InvalidEmail, unprocessable),
            AuthError::WeakPassword(_) => AppError::new(MessageKey::WeakPassword, unprocessable),
            AuthError::InvalidCredentials => {
                AppError::new(MessageKey::InvalidCredentials, StatusCode::UNAUTHORIZED)
            }
            AuthError::AlreadyRegistered => {
                AppError::new(MessageKey::AlreadyRegistered, StatusCode::CONFLICT)
            }
            AuthError::NotAdministrator => {
                AppError::new(MessageKey::NotAdministrator, StatusCode::FORBIDDEN)
            }
            AuthError::RateLimited { retry_after } => AppError::rate_limited(retry_after),
            AuthError::SessionExpired => {
                AppError::new(MessageKey::SessionExpired, StatusCode::UNAUTHORIZED)
            }
            AuthError::InvalidToken(msg) => AppError::session_required().with_internal(msg),
            AuthError::MissingAuth => AppError::session_required(),
            AuthError::HashingError(msg) | AuthError::Backend(msg) => {
                AppError::new(MessageKey::Backend, StatusCode::INTERNAL_SERVER_ERROR)
                    .with_internal(msg)
            }
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidPath(_) | StorageError::NotFound(_) => AppError::not_found(),
            StorageError::InvalidSignature => {
                AppError::new(MessageKey::PermissionDenied, StatusCode::FORBIDDEN)
            }
            StorageError::Io(msg) => {
                AppError::new(MessageKey::Backend, StatusCode::INTERNAL_SERVER_ERROR)
                    .with_internal(msg)
            }
        }
    }
}

/// Convert a service error into a localized [`AppError`].
pub trait Localize<T> {
    fn localized(self, locale: Locale) -> Result<T, AppError>;
}

impl<T, E> Localize<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn localized(self, locale: Locale) -> Result<T, AppError> {
        self.map_err(|e| {
            let err: AppError = e.into();
            err.localized(locale)
        })
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
