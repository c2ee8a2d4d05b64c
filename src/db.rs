// ==========================================
// 清洁业务数据导入 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键始终开启）
// - 统一 busy_timeout
// - 提供目标库表结构（本地目标 / 演练目标 / 测试共用）
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 目标库表结构（与 REST 目标的表 / 列名一致）
pub const TARGET_SCHEMA: &str = include_str!("../migrations/target_schema.sql");

/// 配置 SQLite 连接的统一 PRAGMA
///
/// foreign_keys 与 busy_timeout 都需要每个连接单独设置。
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
pub fn apply_target_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(TARGET_SCHEMA)
}

/// 读取当前库中已存在的表名
pub fn list_tables(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let names = stmt.query_map([], |row| row.get::<_, String>(0))?;
    names.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Table;

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = open_sqlite_connection(":memory:").unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_schema_covers_load_order_and_is_idempotent() {
        let conn = open_sqlite_connection(":memory:").unwrap();
        apply_target_schema(&conn).unwrap();
        apply_target_schema(&conn).unwrap();

        let tables = list_tables(&conn).unwrap();
        for table in Table::LOAD_ORDER {
            assert!(tables.iter().any(|t| t == table.as_str()), "缺少表 {}", table);
        }
        assert!(tables.iter().any(|t| t == "system_sequences"));
    }
}
