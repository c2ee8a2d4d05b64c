// ==========================================
// 清洁业务数据导入 - SQLite 数据接口实现
// ==========================================
// 职责: 本地目标 / 演练目标（--sqlite / --dry-run）与集成测试后端
// 约定: 外键约束开启；每次 insert 一个事务（整批成功或整批回滚）；
//       唯一键冲突按 ignore-duplicates 语义忽略，其余约束违反报错
// ==========================================

use crate::db::{apply_target_schema, open_sqlite_connection};
use crate::repository::data_api::{DataApi, Filter, Page, Row};
use crate::repository::error::{ApiError, ApiResult};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("静态正则"));

// ==========================================
// SqliteDataApi
// ==========================================
pub struct SqliteDataApi {
    conn: Arc<Mutex<Connection>>,
    label: String,
}

impl SqliteDataApi {
    /// 打开（或创建）数据库文件并确保目标表结构存在
    pub fn open(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        apply_target_schema(&conn)?;
        Ok(Self::from_connection(conn, format!("sqlite:{}", db_path)))
    }

    /// 内存数据库（演练 / 测试）
    pub fn in_memory() -> ApiResult<Self> {
        let conn = open_sqlite_connection(":memory:")?;
        apply_target_schema(&conn)?;
        Ok(Self::from_connection(conn, "sqlite::memory:".to_string()))
    }

    /// 使用已配置的连接（表结构由调用方负责）
    pub fn from_connection(conn: Connection, label: String) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            label,
        }
    }

    fn lock(&self) -> ApiResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ApiError::transport(format!("数据库锁获取失败: {}", e)))
    }
}

/// 校验并引用标识符
fn ident(name: &str) -> ApiResult<String> {
    if IDENTIFIER.is_match(name) {
        Ok(format!("\"{}\"", name))
    } else {
        Err(ApiError::rejected(400, format!("非法标识符: {}", name)))
    }
}

/// WHERE 子句 + 参数（参数序号从 `first_param` 开始）
fn where_clause(filters: &[Filter], first_param: usize) -> ApiResult<(String, Vec<SqlValue>)> {
    if filters.is_empty() {
        return Ok((String::new(), Vec::new()));
    }
    let mut parts = Vec::with_capacity(filters.len());
    let mut params = Vec::new();
    for filter in filters {
        let col = ident(filter.column())?;
        match filter {
            Filter::Eq(_, v) => {
                parts.push(format!("{} = ?{}", col, first_param + params.len()));
                params.push(SqlValue::Text(v.clone()));
            }
            Filter::NotNull(_) => parts.push(format!("{} IS NOT NULL", col)),
        }
    }
    Ok((format!(" WHERE {}", parts.join(" AND ")), params))
}

/// JSON → SQLite 值（对象 / 数组以 JSON 文本存储）
fn to_sql_value(v: &Value) -> SqlValue {
    match v {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => SqlValue::Integer(i),
            (None, Some(f)) => SqlValue::Real(f),
            _ => SqlValue::Text(n.to_string()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(v.to_string()),
    }
}

fn to_json_value(v: ValueRef<'_>) -> Value {
    match v {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::json!(f),
        ValueRef::Text(t) | ValueRef::Blob(t) => {
            Value::String(String::from_utf8_lossy(t).into_owned())
        }
    }
}

#[async_trait]
impl DataApi for SqliteDataApi {
    fn describe(&self) -> String {
        self.label.clone()
    }

    async fn select(
        &self,
        table: &str,
        columns: &[&str],
        filters: &[Filter],
        page: Page,
    ) -> ApiResult<Vec<Row>> {
        let cols = columns
            .iter()
            .map(|c| ident(c))
            .collect::<ApiResult<Vec<_>>>()?;
        let (where_sql, mut params) = where_clause(filters, 1)?;
        let limit_idx = params.len() + 1;
        let sql = format!(
            "SELECT {} FROM {}{} LIMIT ?{} OFFSET ?{}",
            cols.join(", "),
            ident(table)?,
            where_sql,
            limit_idx,
            limit_idx + 1
        );
        params.push(SqlValue::Integer(page.limit as i64));
        params.push(SqlValue::Integer(page.offset as i64));

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let rows = stmt.query_map(params_from_iter(params.iter()), |r| {
            let mut row = Row::new();
            for (idx, name) in names.iter().enumerate() {
                row.insert(name.clone(), to_json_value(r.get_ref(idx)?));
            }
            Ok(row)
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    async fn insert(&self, table: &str, rows: &[Value]) -> ApiResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let table_sql = ident(table)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for row in rows {
            let obj = row
                .as_object()
                .ok_or_else(|| ApiError::encode("记录必须为 JSON 对象"))?;
            let cols = obj
                .keys()
                .map(|k| ident(k))
                .collect::<ApiResult<Vec<_>>>()?;
            let placeholders: Vec<String> = (1..=cols.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT DO NOTHING",
                table_sql,
                cols.join(", "),
                placeholders.join(", ")
            );
            let params: Vec<SqlValue> = obj.values().map(to_sql_value).collect();
            tx.prepare_cached(&sql)?
                .execute(params_from_iter(params.iter()))?;
        }
        // 未提交的事务在 drop 时回滚
        tx.commit()?;
        Ok(())
    }

    async fn patch(&self, table: &str, filters: &[Filter], fields: &Row) -> ApiResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut sets = Vec::with_capacity(fields.len());
        let mut params = Vec::with_capacity(fields.len());
        for (col, value) in fields {
            sets.push(format!("{} = ?{}", ident(col)?, params.len() + 1));
            params.push(to_sql_value(value));
        }
        let (where_sql, filter_params) = where_clause(filters, params.len() + 1)?;
        params.extend(filter_params);

        let sql = format!("UPDATE {} SET {}{}", ident(table)?, sets.join(", "), where_sql);
        let conn = self.lock()?;
        conn.execute(&sql, params_from_iter(params.iter()))?;
        Ok(())
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> ApiResult<()> {
        let (where_sql, params) = where_clause(filters, 1)?;
        let sql = format!("DELETE FROM {}{}", ident(table)?, where_sql);
        let conn = self.lock()?;
        conn.execute(&sql, params_from_iter(params.iter()))?;
        Ok(())
    }
}
