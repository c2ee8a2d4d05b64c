// ==========================================
// 清洁业务数据导入 - 身份映射预载
// ==========================================
// 职责: 子集重载时，从目标库读取未重载表的 代码 → id，
//       使被重载表的外键仍能解析
// 约定: 分页 SELECT（每页 1000 行），按租户过滤；员工同时登记 -A/-B 别名
// ==========================================

use crate::domain::types::{EntityKind, Table};
use crate::importer::context::LoadContext;
use crate::importer::supply_matcher::SupplyEntry;
use crate::importer::transformers::variant_aliases;
use crate::repository::data_api::{DataApi, Filter, Page, Row};
use crate::repository::error::ApiResult;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const SEED_PAGE_SIZE: usize = 1000;

/// 分页读取全部匹配行
pub async fn select_all(
    api: &dyn DataApi,
    table: &str,
    columns: &[&str],
    filters: &[Filter],
) -> ApiResult<Vec<Row>> {
    let mut rows = Vec::new();
    let mut offset = 0;
    loop {
        let page = api
            .select(
                table,
                columns,
                filters,
                Page {
                    limit: SEED_PAGE_SIZE,
                    offset,
                },
            )
            .await?;
        let fetched = page.len();
        rows.extend(page);
        debug!(table, offset, fetched, "分页读取");
        if fetched < SEED_PAGE_SIZE {
            break;
        }
        offset += SEED_PAGE_SIZE;
    }
    Ok(rows)
}

fn text_field(row: &Row, column: &str) -> Option<String> {
    match row.get(column) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn id_field(row: &Row) -> Option<Uuid> {
    text_field(row, "id").and_then(|s| Uuid::parse_str(&s).ok())
}

/// 预载一张表的身份；返回登记的代码数
pub async fn seed_table(api: &dyn DataApi, table: Table, ctx: &mut LoadContext) -> ApiResult<usize> {
    let Some((kind, code_column)) = table.identity() else {
        return Ok(0);
    };

    let mut columns = vec!["id", code_column];
    if kind == EntityKind::Supply {
        columns.extend(["name", "category", "sds_url"]);
    }
    let filters = [Filter::eq("tenant_id", ctx.tenant_id)];
    let rows = select_all(api, table.as_str(), &columns, &filters).await?;

    let mut seeded = 0;
    for row in &rows {
        let (Some(id), Some(code)) = (id_field(row), text_field(row, code_column)) else {
            warn!(table = %table, "预载行缺少 id 或代码，已忽略");
            continue;
        };
        ctx.identities.register(kind, &code, id);
        // 其他工作表仍可能以 -A/-B 原始代码引用员工
        if kind == EntityKind::Staff {
            for alias in variant_aliases(&code) {
                ctx.identities.register_alias(kind, &alias, id);
            }
        }
        if kind == EntityKind::Supply {
            ctx.supplies.insert(SupplyEntry {
                id,
                name: text_field(row, "name").unwrap_or_else(|| code.clone()),
                category: text_field(row, "category"),
                sds_url: text_field(row, "sds_url"),
                code,
            });
        }
        seeded += 1;
    }
    Ok(seeded)
}

/// 预载全部未选中且产生身份的表（按装载顺序）
pub async fn seed_unselected(
    api: &dyn DataApi,
    selected: &[Table],
    ctx: &mut LoadContext,
) -> ApiResult<usize> {
    let mut total = 0;
    for table in Table::LOAD_ORDER {
        if selected.contains(&table) || table.identity().is_none() {
            continue;
        }
        let n = seed_table(api, table, ctx).await?;
        info!(table = %table, seeded = n, "身份映射预载完成");
        total += n;
    }
    Ok(total)
}
