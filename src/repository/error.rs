// ==========================================
// 清洁业务数据导入 - 数据接口错误类型
// ==========================================
// 职责: 所有后端操作（REST / SQLite）的统一错误
// 约定: 错误只负责分类与携带上下文，日志由调用方输出
// 工具: thiserror 派生宏
// ==========================================

use serde::Serialize;
use thiserror::Error;

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorKind {
    /// 网络 / 连接 / 锁等传输层失败
    Transport,
    /// 后端拒绝（约束违反、列不存在等）
    Rejected,
    /// 目标表不存在
    TableAbsent,
    /// 记录序列化失败
    Encode,
    /// 响应解析失败
    Decode,
}

/// 数据接口错误
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind:?}{}: {detail}", .status.map(|s| format!(" [{}]", s)).unwrap_or_default())]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: Option<u16>,
    pub detail: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, status: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            detail: detail.into(),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, None, detail)
    }

    pub fn rejected(status: u16, detail: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Rejected, Some(status), detail)
    }

    pub fn table_absent(table: &str) -> Self {
        Self::new(ApiErrorKind::TableAbsent, Some(404), format!("表 {} 不存在", table))
    }

    pub fn encode(detail: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Encode, None, detail)
    }

    pub fn decode(detail: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, None, detail)
    }

    pub fn is_table_absent(&self) -> bool {
        self.kind == ApiErrorKind::TableAbsent
    }
}

// HTTP 客户端错误一律视为传输失败
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::new(
            ApiErrorKind::Transport,
            err.status().map(|s| s.as_u16()),
            err.to_string(),
        )
    }
}

// SQLite 错误按 PostgREST 语义归类
impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, msg) => {
                let detail = msg.clone().unwrap_or_else(|| err.to_string());
                if code.code == rusqlite::ErrorCode::ConstraintViolation {
                    ApiError::rejected(409, detail)
                } else if detail.contains("no such table") {
                    ApiError::new(ApiErrorKind::TableAbsent, Some(404), detail)
                } else if detail.contains("no such column") || detail.contains("has no column") {
                    ApiError::rejected(400, detail)
                } else {
                    ApiError::transport(detail)
                }
            }
            rusqlite::Error::ToSqlConversionFailure(_) => ApiError::encode(err.to_string()),
            rusqlite::Error::FromSqlConversionFailure(..) | rusqlite::Error::InvalidColumnType(..) => {
                ApiError::decode(err.to_string())
            }
            _ => ApiError::transport(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
