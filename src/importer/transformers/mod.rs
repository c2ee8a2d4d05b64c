// ==========================================
// 清洁业务数据导入 - 实体转换器
// ==========================================
// 职责: 每张目标表一个转换函数: 标准化行 + 身份映射 → 类型化记录
// 约定: 必需代码缺失或无法解析时丢弃该行并告警；
//       产生身份的表在返回前完成登记
// ==========================================

pub mod assets;
pub mod customer;
pub mod inventory;
pub mod jobs;
pub mod reference;
pub mod staff;

pub use assets::{
    transform_equipment, transform_equipment_assignments, transform_site_supplies,
    transform_supply_catalog,
};
pub use customer::{transform_clients, transform_sites, transform_subcontractors};
pub use inventory::{transform_inventory_count_details, transform_inventory_counts};
pub use jobs::{transform_job_tasks, transform_site_jobs};
pub use reference::{
    transform_lookups, transform_service_tasks, transform_services, transform_staff_positions,
    transform_tasks,
};
pub use staff::{
    resolve_supervisor_patches, strip_variant_suffix, transform_staff, variant_aliases,
    StaffTransform,
};

use crate::domain::customer::Address;
use crate::domain::report::WarningKind;
use crate::domain::types::Table;
use crate::importer::context::LoadContext;
use crate::importer::deduplicator::keep_first;
use crate::importer::field_normalizer::normalize_text;
use crate::importer::sheet::SheetRow;

/// 按表头取标准化文本
pub(crate) fn text(row: &SheetRow, header: &str) -> Option<String> {
    normalize_text(row.get(header))
}

/// 按业务代码保留首行（与目标库唯一键 + 忽略重复的行为一致）
///
/// 缺少代码的行原样保留，由调用方报告缺失字段
pub(crate) fn first_per_code<'a, F>(
    rows: &'a [SheetRow],
    table: Table,
    ctx: &mut LoadContext,
    code_of: F,
) -> Vec<&'a SheetRow>
where
    F: Fn(&SheetRow) -> Option<String>,
{
    let keyed: Vec<(Option<String>, &SheetRow)> =
        rows.iter().map(|row| (code_of(row), row)).collect();
    let outcome = keep_first(keyed, |(code, row)| match code {
        Some(code) => (Some(code.clone()), 0),
        None => (None, row.row_number),
    });

    let collisions: Vec<(String, usize)> = outcome
        .collisions
        .into_iter()
        .filter_map(|((code, _), absorbed)| code.map(|c| (c, absorbed)))
        .collect();
    for (code, absorbed) in &collisions {
        let row_number = outcome
            .kept
            .iter()
            .find(|(kept, _)| kept.as_deref() == Some(code.as_str()))
            .map(|(_, row)| row.row_number)
            .unwrap_or(0);
        ctx.warn(
            table,
            row_number,
            Some(code.as_str()),
            WarningKind::DuplicateCode,
            format!("重复代码 {}（{} 行），保留首行", code, absorbed),
        );
    }
    ctx.record_dedup(table, collisions);

    outcome.kept.into_iter().map(|(_, row)| row).collect()
}

/// 地址列名
pub(crate) struct AddressColumns {
    pub street: &'static str,
    pub suite: Option<&'static str>,
    pub city: &'static str,
    pub state: &'static str,
    pub zip: &'static str,
}

/// 街道存在时构建地址
pub(crate) fn address(row: &SheetRow, cols: &AddressColumns) -> Option<Address> {
    let street = text(row, cols.street)?;
    Some(Address {
        street: Some(street),
        suite: cols.suite.and_then(|h| text(row, h)),
        city: text(row, cols.city),
        state: text(row, cols.state),
        zip: text(row, cols.zip),
    })
}

pub(crate) const STREET_ADDRESS: AddressColumns = AddressColumns {
    street: "Street Address",
    suite: Some("Suite/Unit"),
    city: "City",
    state: "State",
    zip: "ZIP Code",
};
