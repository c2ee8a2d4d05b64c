// ==========================================
// 清洁业务数据导入 - 配置层
// ==========================================
// 职责: 运行配置（环境变量 + 可选 .env）与写入目标选择
// ==========================================

pub mod import_config;

// 重导出
pub use import_config::{
    config_keys, ConfigError, ImportConfig, TargetSpec, DEFAULT_BATCH_SIZE, DEFAULT_EXCEL_PATH,
    DEFAULT_TENANT_ID,
};
