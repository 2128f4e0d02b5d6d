#![forbid(unsafe_code)]

use ql_storage::StoreError;
use serde_json::{Value, json};

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Validation(String),
    WipLimitExceeded { current: i64, limit: i64 },
    Storage(String),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Validation(_) => "validation_error",
            Self::WipLimitExceeded { .. } => "wip_limit_exceeded",
            Self::Storage(_) => "storage_error",
        }
    }

    /// The cross-cutting failure shape: a typed error body a transport can
    /// serialize as-is.
    pub fn to_body(&self) -> Value {
        match self {
            Self::NotFound => json!({ "error": self.kind() }),
            Self::Validation(message) => json!({ "error": self.kind(), "message": message }),
            Self::WipLimitExceeded { current, limit } => json!({
                "error": self.kind(),
                "current": current,
                "limit": limit,
            }),
            Self::Storage(message) => json!({ "error": self.kind(), "message": message }),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Validation(message) => write!(f, "validation error: {message}"),
            Self::WipLimitExceeded { current, limit } => {
                write!(f, "wip limit exceeded (current={current}, limit={limit})")
            }
            Self::Storage(message) => write!(f, "storage error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::UnknownId => Self::NotFound,
            StoreError::InvalidInput(message) => Self::Validation(message.to_string()),
            StoreError::WipLimitExceeded { current, limit } => {
                Self::WipLimitExceeded { current, limit }
            }
            StoreError::Io(err) => Self::Storage(err.to_string()),
            StoreError::Sql(err) => Self::Storage(err.to_string()),
        }
    }
}
