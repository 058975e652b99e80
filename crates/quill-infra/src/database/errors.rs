use sea_orm::{DbErr, SqlErr};

use quill_core::{StoreError, StoreErrorCode};

/// Translate a SeaORM error into the store error codes the services
/// understand. Postgres SQLSTATEs are matched in the driver message.
pub(crate) fn store_error(err: DbErr) -> StoreError {
    if let Some(SqlErr::UniqueConstraintViolation(msg)) = err.sql_err() {
        return StoreError::rejected(StoreErrorCode::UniqueViolation, msg);
    }

    match err {
        DbErr::Conn(e) => StoreError::Transport(e.to_string()),
        DbErr::ConnectionAcquire(e) => StoreError::Transport(e.to_string()),
        DbErr::RecordNotFound(msg) => StoreError::rejected(StoreErrorCode::NoRows, msg),
        other => {
            let message = other.to_string();
            let code = classify(&message);
            StoreError::rejected(code, message)
        }
    }
}

fn classify(message: &str) -> StoreErrorCode {
    let lower = message.to_lowercase();
    if lower.contains("23505") || lower.contains("duplicate key") {
        StoreErrorCode::UniqueViolation
    } else if lower.contains("42501") || lower.contains("permission denied") {
        StoreErrorCode::InsufficientPrivilege
    } else if lower.contains("42p01") || (lower.contains("relation") && lower.contains("does not exist")) {
        StoreErrorCode::UndefinedTable
    } else {
        StoreErrorCode::Other("unknown".to_string())
    }
}
