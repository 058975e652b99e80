//! # Quill Shared
//!
//! Wire types shared by the server and its clients: request/response DTOs,
//! RFC 7807 problem documents and the localized message catalogue.

pub mod dto;
pub mod i18n;
pub mod response;

pub use i18n::{Locale, MessageKey};
pub use response::{ApiResponse, ErrorResponse};
