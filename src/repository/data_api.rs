// ==========================================
// 清洁业务数据导入 - 数据接口 Trait
// ==========================================
// 职责: 表级 SELECT / INSERT / PATCH / DELETE 的统一接口
// 红线: 接口不含业务规则，只做数据读写；不记录日志
// 实现者: RestDataApi（PostgREST）, SqliteDataApi（本地 / 演练）
// ==========================================

use crate::repository::error::ApiResult;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// 一行 JSON 数据（列名 → 值）
pub type Row = Map<String, Value>;

/// 行过滤条件（多个条件为 AND）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// col = value
    Eq(String, String),
    /// col IS NOT NULL
    NotNull(String),
}

impl Filter {
    pub fn eq(column: &str, value: impl ToString) -> Self {
        Filter::Eq(column.to_string(), value.to_string())
    }

    pub fn not_null(column: &str) -> Self {
        Filter::NotNull(column.to_string())
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(c, _) | Filter::NotNull(c) => c,
        }
    }

    /// PostgREST 查询参数形式: (列, 操作符.值)
    pub fn to_query_pair(&self) -> (String, String) {
        match self {
            Filter::Eq(c, v) => (c.clone(), format!("eq.{}", v)),
            Filter::NotNull(c) => (c.clone(), "not.is.null".to_string()),
        }
    }
}

/// 分页
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

// ==========================================
// DataApi Trait
// ==========================================
#[async_trait]
pub trait DataApi: Send + Sync {
    /// 目标描述（用于日志）
    fn describe(&self) -> String;

    /// 查询指定列
    async fn select(
        &self,
        table: &str,
        columns: &[&str],
        filters: &[Filter],
        page: Page,
    ) -> ApiResult<Vec<Row>>;

    /// 插入一批记录（全部成功或全部失败）
    async fn insert(&self, table: &str, rows: &[Value]) -> ApiResult<()>;

    /// 部分更新匹配的行
    async fn patch(&self, table: &str, filters: &[Filter], fields: &Row) -> ApiResult<()>;

    /// 删除匹配的行
    async fn delete(&self, table: &str, filters: &[Filter]) -> ApiResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query_pairs() {
        assert_eq!(
            Filter::eq("tenant_id", "t-1").to_query_pair(),
            ("tenant_id".to_string(), "eq.t-1".to_string())
        );
        assert_eq!(
            Filter::not_null("id").to_query_pair(),
            ("id".to_string(), "not.is.null".to_string())
        );
    }
}
