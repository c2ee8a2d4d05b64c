// ==========================================
// 清洁业务数据导入 - 运行配置
// ==========================================
// 职责: 从环境变量（可选 .env）读取运行配置并校验
// 红线: 配置错误必须在任何网络 / 工作簿 I/O 之前报告，
//       且指明需要设置哪个变量
// ==========================================

use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// 配置键
pub mod config_keys {
    pub const SUPABASE_URL: &str = "SUPABASE_URL";
    pub const SERVICE_ROLE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
    pub const TENANT_ID: &str = "TENANT_ID";
    pub const EXCEL_PATH: &str = "EXCEL_PATH";
    pub const BATCH_SIZE: &str = "IMPORT_BATCH_SIZE";
}

pub const DEFAULT_TENANT_ID: &str = "a0000000-0000-0000-0000-000000000001";
pub const DEFAULT_EXCEL_PATH: &str =
    "./spreadsheets/Anderson_Cleaning_Database_UPDATED_Feb2026.xlsx";
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("缺少环境变量 {key}，请执行: export {key}={hint}")]
    MissingVar { key: &'static str, hint: &'static str },

    #[error("环境变量 {key} 的值无效 ({value}): {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("数据源不存在: {0}（请通过 EXCEL_PATH 或命令行参数指定）")]
    SourceNotFound(PathBuf),
}

/// 写入目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// PostgREST
    Rest { url: String, service_key: String },
    /// 本地 SQLite 文件
    Sqlite(PathBuf),
    /// 内存 SQLite 演练（无网络）
    DryRun,
}

// ==========================================
// ImportConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub supabase_url: Option<String>,
    pub service_key: Option<String>,
    pub tenant_id: Uuid,
    pub excel_path: PathBuf,
    pub batch_size: usize,
}

impl ImportConfig {
    /// 从进程环境读取
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取（空字符串视为未设置）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let tenant_raw = get(config_keys::TENANT_ID).unwrap_or_else(|| DEFAULT_TENANT_ID.to_string());
        let tenant_id = Uuid::parse_str(&tenant_raw).map_err(|e| ConfigError::InvalidValue {
            key: config_keys::TENANT_ID,
            value: tenant_raw.clone(),
            reason: e.to_string(),
        })?;

        let batch_size = match get(config_keys::BATCH_SIZE) {
            None => DEFAULT_BATCH_SIZE,
            Some(raw) => parse_batch_size(&raw)?,
        };

        Ok(Self {
            supabase_url: get(config_keys::SUPABASE_URL),
            service_key: get(config_keys::SERVICE_ROLE_KEY),
            tenant_id,
            excel_path: get(config_keys::EXCEL_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXCEL_PATH)),
            batch_size,
        })
    }

    /// 命令行覆写批大小
    pub fn with_batch_size(mut self, batch_size: Option<usize>) -> Result<Self, ConfigError> {
        if let Some(n) = batch_size {
            if n == 0 {
                return Err(ConfigError::InvalidValue {
                    key: config_keys::BATCH_SIZE,
                    value: n.to_string(),
                    reason: "必须为正整数".to_string(),
                });
            }
            self.batch_size = n;
        }
        Ok(self)
    }

    /// 命令行覆写数据源
    pub fn with_source(mut self, source: Option<PathBuf>) -> Self {
        if let Some(path) = source {
            self.excel_path = path;
        }
        self
    }

    /// 数据源必须存在（文件或 CSV 目录）
    pub fn validate_source(&self) -> Result<&Path, ConfigError> {
        if self.excel_path.exists() {
            Ok(&self.excel_path)
        } else {
            Err(ConfigError::SourceNotFound(self.excel_path.clone()))
        }
    }

    /// 确定写入目标；REST 目标要求两个凭据变量
    pub fn target(&self, sqlite: Option<&Path>, dry_run: bool) -> Result<TargetSpec, ConfigError> {
        if dry_run {
            return Ok(TargetSpec::DryRun);
        }
        if let Some(path) = sqlite {
            return Ok(TargetSpec::Sqlite(path.to_path_buf()));
        }

        let url = self.supabase_url.clone().ok_or(ConfigError::MissingVar {
            key: config_keys::SUPABASE_URL,
            hint: "https://<project>.supabase.co",
        })?;
        let service_key = self.service_key.clone().ok_or(ConfigError::MissingVar {
            key: config_keys::SERVICE_ROLE_KEY,
            hint: "<service-role-key>",
        })?;
        Ok(TargetSpec::Rest { url, service_key })
    }
}

fn parse_batch_size(raw: &str) -> Result<usize, ConfigError> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        Ok(_) => Err(ConfigError::InvalidValue {
            key: config_keys::BATCH_SIZE,
            value: raw.to_string(),
            reason: "必须为正整数".to_string(),
        }),
        Err(e) => Err(ConfigError::InvalidValue {
            key: config_keys::BATCH_SIZE,
            value: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}
