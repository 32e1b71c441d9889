use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 统一错误类型
#[derive(Debug, Error)]
pub enum LedgerError {
    /// 缺少必填字段或字段非法
    #[error("validation failed: {0}")]
    Validation(String),

    /// 用户名或密码错误 (不区分两种情况)
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("not found: {0}")]
    NotFound(String),

    /// 唯一约束冲突 (汇总表的重复写入不走这里)
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 非 sqlx 存储后端的失败
    #[error("storage error: {0}")]
    Storage(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// 请求处理超过 `server.request_timeout_secs`
    #[error("request timed out")]
    Timeout,
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Database(_) | Self::Storage(_) | Self::Hashing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::InvalidCredentials => "invalid_credentials",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Timeout => "timeout",
            Self::Database(_) | Self::Storage(_) => "storage_error",
            Self::Hashing(_) => "server_error",
        }
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            // 内部细节只进日志
            tracing::error!("Request failed: {:?}", self);
            "Server error".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(json!({
                "error": self.code(),
                "message": message,
            })),
        )
            .into_response()
    }
}

/// Postgres 唯一约束冲突 (SQLSTATE 23505)
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}
