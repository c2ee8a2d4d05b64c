// ==========================================
// 清洁业务数据导入 - 数据接口层
// ==========================================
// 红线: 接口层不含业务逻辑
// ==========================================
// 职责: 屏蔽目标后端（PostgREST / SQLite）差异，提供批量写入与清理
// 约束: SQLite 查询全部参数化，标识符经白名单校验
// ==========================================

pub mod batch_loader;
pub mod data_api;
pub mod error;
pub mod rest_api;
pub mod sqlite_api;

// 重导出核心类型
pub use batch_loader::{BatchLoader, InsertOutcome, PurgeScope, DEFAULT_BATCH_SIZE};
pub use data_api::{DataApi, Filter, Page, Row};
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use rest_api::RestDataApi;
pub use sqlite_api::SqliteDataApi;
