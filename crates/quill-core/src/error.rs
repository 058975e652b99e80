//! Domain-level error types.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Domain errors - the categories every post operation reports.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A required field is missing or malformed. Raised before any store call.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Slug \"{0}\" is already in use")]
    SlugConflict(String),

    /// Ownership mismatch or a policy rejection from the store.
    #[error("Permission denied")]
    PermissionDenied,

    #[error("Post not found")]
    NotFound,

    #[error("Rate limited, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Machine-readable codes reported by the table store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// `23505`
    UniqueViolation,
    /// `42P01`
    UndefinedTable,
    /// `42501`
    InsufficientPrivilege,
    /// `PGRST116` - a single-row fetch matched nothing.
    NoRows,
    Other(String),
}

impl StoreErrorCode {
    pub fn from_code(code: &str) -> Self {
        match code {
            "23505" => Self::UniqueViolation,
            "42P01" => Self::UndefinedTable,
            "42501" => Self::InsufficientPrivilege,
            "PGRST116" => Self::NoRows,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::UniqueViolation => "23505",
            Self::UndefinedTable => "42P01",
            Self::InsufficientPrivilege => "42501",
            Self::NoRows => "PGRST116",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store answered with a structured error.
    #[error("Store rejected request ({code}): {message}")]
    Rejected {
        code: StoreErrorCode,
        message: String,
    },

    /// The store could not be reached.
    #[error("Store unreachable: {0}")]
    Transport(String),
}

impl StoreError {
    pub fn rejected(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<&StoreErrorCode> {
        match self {
            Self::Rejected { code, .. } => Some(code),
            Self::Transport(_) => None,
        }
    }
}
