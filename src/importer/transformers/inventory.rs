// ==========================================
// 盘点转换: Inventory Count / Inventory Count Detail
// ==========================================
// 两张表均按位置读取（见 legacy_columns）；表头漂移时整表跳过
// 明细的耗材通过名称匹配解析，前缀命中记为低置信度
// ==========================================

use super::first_per_code;
use crate::domain::inventory::{InventoryCount, InventoryCountDetail};
use crate::domain::report::{FuzzyMatch, WarningKind};
use crate::domain::types::{EntityKind, Table};
use crate::importer::context::LoadContext;
use crate::importer::field_normalizer::{normalize_date, normalize_number, normalize_text};
use crate::importer::legacy_columns::{LegacyLayout, INVENTORY_COUNT, INVENTORY_COUNT_DETAIL};
use crate::importer::sheet::SheetRow;
use crate::importer::supply_matcher::MatchConfidence;
use tracing::{debug, warn};
use uuid::Uuid;

const COMPLETED: &str = "COMPLETED";

/// 表头校验；漂移时记录 SchemaDrift 并返回 false
fn layout_matches(layout: &LegacyLayout, table: Table, rows: &[SheetRow], ctx: &mut LoadContext) -> bool {
    let Some(first) = rows.first() else {
        return true;
    };
    match layout.check_headers(first.headers()) {
        Ok(()) => true,
        Err(drift) => {
            warn!(sheet = layout.sheet, drift = %drift, "表头已变化，停止按位置读取");
            ctx.warn(
                table,
                1,
                None,
                WarningKind::SchemaDrift,
                format!("工作表 {} 表头漂移: {}，整表跳过", layout.sheet, drift),
            );
            false
        }
    }
}

pub fn transform_inventory_counts(rows: &[SheetRow], ctx: &mut LoadContext) -> Vec<InventoryCount> {
    let table = Table::InventoryCounts;
    let layout = &INVENTORY_COUNT;
    if !layout_matches(layout, table, rows, ctx) {
        return Vec::new();
    }

    let rows = first_per_code(rows, table, ctx, |row| normalize_text(layout.get(row, "count_code")));
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let (Some(code), Some(site_code)) = (
            normalize_text(layout.get(row, "count_code")),
            normalize_text(layout.get(row, "site_code")),
        ) else {
            ctx.missing_identifier(table, row.row_number, "count_code/site_code");
            continue;
        };

        let Some(site_id) = ctx.resolve_required(table, row.row_number, EntityKind::Site, &site_code)
        else {
            continue;
        };

        let id = Uuid::new_v4();
        ctx.identities.register(EntityKind::InventoryCount, &code, id);

        out.push(InventoryCount {
            id,
            tenant_id: ctx.tenant_id,
            count_code: code,
            site_id,
            count_date: normalize_date(layout.get(row, "count_date")).unwrap_or(ctx.today),
            status: COMPLETED.to_string(),
            notes: normalize_text(layout.get(row, "notes")),
        });
    }

    out
}

/// 盘点明细: 父盘点必需；耗材描述须能匹配到目录
pub fn transform_inventory_count_details(
    rows: &[SheetRow],
    ctx: &mut LoadContext,
) -> Vec<InventoryCountDetail> {
    let table = Table::InventoryCountDetails;
    let layout = &INVENTORY_COUNT_DETAIL;
    if !layout_matches(layout, table, rows, ctx) {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let (Some(count_code), Some(description)) = (
            normalize_text(layout.get(row, "count_code")),
            normalize_text(layout.get(row, "supply_description")),
        ) else {
            ctx.missing_identifier(table, row.row_number, "count_code/supply_description");
            continue;
        };

        let Some(count_id) =
            ctx.resolve_required(table, row.row_number, EntityKind::InventoryCount, &count_code)
        else {
            continue;
        };

        let matched = ctx.supplies.match_description(&description).map(|m| {
            (
                m.entry.id,
                m.entry.code.clone(),
                m.entry.name.clone(),
                m.source_name,
                m.confidence,
            )
        });
        let Some((supply_id, supply_code, matched_name, source_name, confidence)) = matched else {
            ctx.warn(
                table,
                row.row_number,
                Some(&description),
                WarningKind::UnresolvedReference,
                format!("耗材描述 '{}' 无法匹配目录，行已跳过", description),
            );
            continue;
        };

        if confidence == MatchConfidence::Prefix {
            ctx.warn(
                table,
                row.row_number,
                Some(&supply_code),
                WarningKind::LowConfidenceMatch,
                format!("'{}' 按前缀匹配到 '{}'", source_name, matched_name),
            );
            ctx.fuzzy_matches.push(FuzzyMatch {
                row_number: row.row_number,
                source_name,
                matched_name,
                supply_code,
            });
        }

        out.push(InventoryCountDetail {
            id: Uuid::new_v4(),
            tenant_id: ctx.tenant_id,
            count_id,
            supply_id,
            actual_qty: normalize_number(layout.get(row, "actual_qty"), Some(0.0)).unwrap_or(0.0),
            notes: None,
        });
    }

    debug!(
        kept = out.len(),
        fuzzy = ctx.fuzzy_matches.len(),
        "盘点明细转换完成"
    );
    out
}
