use std::io;

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("Not Found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("password hash error: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// 是否属于内部错误（存储、IO 等），这类错误不应把细节暴露给用户
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Error::Corrupt(_)
                | Error::Config(_)
                | Error::PasswordHash(_)
                | Error::Sqlx(_)
                | Error::Io(_)
                | Error::Token(_)
        )
    }
}

impl From<sqlx::Error> for Error {
    /// 唯一约束冲突转换为 [`Error::Conflict`]，其余保持为数据库错误
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Conflict("Username already exists".to_string())
            }
            _ => Error::Sqlx(e),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::InvalidCredentials | Error::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Error::Sqlx(e) => {
                tracing::error!(%e, "sqlx error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Error::Io(e) => {
                tracing::error!(%e, "file io error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            e => {
                tracing::error!(%e, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if self.is_internal() {
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_errors_hide_details() {
        let resp = Error::Corrupt("news row 42".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = Error::NotFound.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = Error::validation("All fields are required").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_is_internal() {
        assert!(Error::Io(io::Error::other("disk")).is_internal());
        assert!(!Error::InvalidCredentials.is_internal());
        assert!(!Error::Conflict("dup".into()).is_internal());
    }
}
