//! User-facing message catalogue in English and Traditional Chinese.

use serde::{Deserialize, Serialize};

/// Supported display languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    En,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Locale {
    /// Pick a locale from an `Accept-Language` header value. The first
    /// supported tag wins; quality values are not weighed.
    pub fn from_accept_language(header: &str) -> Self {
        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .map(|tag| tag.trim().to_ascii_lowercase())
            .find_map(|tag| match tag.as_str() {
                "zh" | "zh-tw" | "zh-hant" | "zh-hant-tw" | "zh-hk" => Some(Locale::ZhTw),
                t if t == "en" || t.starts_with("en-") => Some(Locale::En),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn tag(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::ZhTw => "zh-TW",
        }
    }
}

/// Keys of every user-visible message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKey {
    Validation,
    SlugConflict,
    PermissionDenied,
    NotFound,
    RateLimited,
    Backend,
    Transport,
    MissingCredentials,
    InvalidEmail,
    WeakPassword,
    InvalidCredentials,
    AlreadyRegistered,
    NotAdministrator,
    SessionRequired,
    SessionExpired,
    Unauthorized,
    PostSaved,
    PostDeleted,
    Registered,
}

impl MessageKey {
    /// Stable machine-readable code, also used as the `code` of problem documents.
    pub fn code(self) -> &'static str {
        match self {
            MessageKey::Validation => "validation",
            MessageKey::SlugConflict => "slug_conflict",
            MessageKey::PermissionDenied => "permission_denied",
            MessageKey::NotFound => "not_found",
            MessageKey::RateLimited => "rate_limited",
            MessageKey::Backend => "backend",
            MessageKey::Transport => "transport",
            MessageKey::MissingCredentials => "missing_credentials",
            MessageKey::InvalidEmail => "invalid_email",
            MessageKey::WeakPassword => "weak_password",
            MessageKey::InvalidCredentials => "invalid_credentials",
            MessageKey::AlreadyRegistered => "already_registered",
            MessageKey::NotAdministrator => "not_administrator",
            MessageKey::SessionRequired => "session_required",
            MessageKey::SessionExpired => "session_expired",
            MessageKey::Unauthorized => "unauthorized",
            MessageKey::PostSaved => "post_saved",
            MessageKey::PostDeleted => "post_deleted",
            MessageKey::Registered => "registered",
        }
    }

    /// Inverse of [`code`](Self::code), for keys carried in query strings.
    pub fn from_code(code: &str) -> Option<Self> {
        ALL.iter().copied().find(|k| k.code() == code)
    }

    pub fn text(self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => english(self),
            Locale::ZhTw => traditional_chinese(self),
        }
    }
}

const ALL: [MessageKey; 19] = [
    MessageKey::Validation,
    MessageKey::SlugConflict,
    MessageKey::PermissionDenied,
    MessageKey::NotFound,
    MessageKey::RateLimited,
    MessageKey::Backend,
    MessageKey::Transport,
    MessageKey::MissingCredentials,
    MessageKey::InvalidEmail,
    MessageKey::WeakPassword,
    MessageKey::InvalidCredentials,
    MessageKey::AlreadyRegistered,
    MessageKey::NotAdministrator,
    MessageKey::SessionRequired,
    MessageKey::SessionExpired,
    MessageKey::Unauthorized,
    MessageKey::PostSaved,
    MessageKey::PostDeleted,
    MessageKey::Registered,
];

fn english(key: MessageKey) -> &'static str {
    match key {
        MessageKey::Validation => "Please fill in all required fields",
        MessageKey::SlugConflict => "This slug is already in use, please choose another one",
        MessageKey::PermissionDenied => "You do not have permission to do this",
        MessageKey::NotFound => "The requested post was not found",
        MessageKey::RateLimited => "Too many attempts, please try again later",
        MessageKey::Backend => "Something went wrong, please try again later",
        MessageKey::Transport => "The service is unreachable, please try again later",
        MessageKey::MissingCredentials => "Please enter your email and password",
        MessageKey::InvalidEmail => "Please enter a valid email address",
        MessageKey::WeakPassword => "Password must be at least 6 characters",
        MessageKey::InvalidCredentials => "Incorrect email or password",
        MessageKey::AlreadyRegistered => "This email is already registered",
        MessageKey::NotAdministrator => "Only the administrator can sign in here",
        MessageKey::SessionRequired => "Please sign in to continue",
        MessageKey::SessionExpired => "Your session has expired, please sign in again",
        MessageKey::Unauthorized => "⚠️ You are not allowed to access the admin area",
        MessageKey::PostSaved => "Post saved",
        MessageKey::PostDeleted => "Post deleted",
        MessageKey::Registered => "Registration successful, please sign in",
    }
}

fn traditional_chinese(key: MessageKey) -> &'static str {
    match key {
        MessageKey::Validation => "請填寫所有必填欄位",
        MessageKey::SlugConflict => "Slug 已存在，請嘗試其他網址名稱",
        MessageKey::PermissionDenied => "權限不足",
        MessageKey::NotFound => "找不到文章",
        MessageKey::RateLimited => "登入嘗試次數過多，請稍後再試",
        MessageKey::Backend => "發生錯誤，請稍後再試",
        MessageKey::Transport => "無法連線到服務，請稍後再試",
        MessageKey::MissingCredentials => "請輸入電子郵件和密碼",
        MessageKey::InvalidEmail => "請輸入有效的電子郵件地址",
        MessageKey::WeakPassword => "密碼至少需要 6 個字元",
        MessageKey::InvalidCredentials => "電子郵件或密碼錯誤",
        MessageKey::AlreadyRegistered => "此電子郵件已被註冊",
        MessageKey::NotAdministrator => "只有管理員可以登入",
        MessageKey::SessionRequired => "請先登入",
        MessageKey::SessionExpired => "登入已過期，請重新登入",
        MessageKey::Unauthorized => "⚠️ 你無權訪問管理後台",
        MessageKey::PostSaved => "文章已儲存",
        MessageKey::PostDeleted => "文章已刪除",
        MessageKey::Registered => "註冊成功，請登入",
    }
}
