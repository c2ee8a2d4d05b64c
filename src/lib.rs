// ==========================================
// 清洁业务数据导入 - 核心库
// ==========================================
// 技术栈: Rust + calamine + reqwest(PostgREST) / SQLite
// 系统定位: 一次性（可重复执行）的 Excel → 多租户数据库 对账与装载工具
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 目标实体与运行报告
pub mod domain;

// 导入层 - 工作簿读取、规范化、转换
pub mod importer;

// 数据仓储层 - DataApi（REST / SQLite）与批量装载
pub mod repository;

// 引擎层 - 清理、预载、装载编排、序列对齐
pub mod engine;

// 配置层 - 环境变量
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/目标库结构）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{ConfigError, ImportConfig, TargetSpec};
pub use domain::{EntityKind, ImportReport, Table, WarningKind};
pub use engine::{ImportPipeline, PipelineError, PipelineOptions, PurgePlan};
pub use importer::{open_workbook, IdentityMap, LoadContext, WorkbookSource};
pub use repository::{ApiError, BatchLoader, DataApi, RestDataApi, SqliteDataApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "清洁业务数据导入";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
