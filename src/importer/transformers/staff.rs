// ==========================================
// 员工转换: Staff（变体去重 + 上级关系延迟补丁）
// ==========================================
// 源表同一员工可能有 -A（基础资料）/-B（完整资料）两行:
// 按基础代码合并，B > A > 无后缀，所有原始代码作为别名指向保留行
// ==========================================

use super::{address, text, STREET_ADDRESS};
use crate::domain::report::{DeferredPatch, PatchValue, WarningKind};
use crate::domain::staff::{Staff, SupervisorLink};
use crate::domain::types::{EntityKind, Table, VariantRank};
use crate::importer::context::LoadContext;
use crate::importer::deduplicator::keep_highest_priority;
use crate::importer::field_normalizer::{
    normalize_date, normalize_enum_label, normalize_number, normalize_role_label,
};
use crate::importer::label_maps::{DEFAULT_STATUS, STAFF_STATUS};
use crate::importer::sheet::SheetRow;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::{info, trace};
use uuid::Uuid;

static VARIANT_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"-[AB]$").expect("静态正则"));

/// STF-1001-A → STF-1001
pub fn strip_variant_suffix(code: &str) -> &str {
    match VARIANT_SUFFIX.find(code) {
        Some(m) => &code[..m.start()],
        None => code,
    }
}

/// 基础代码对应的 -A/-B 原始代码
pub fn variant_aliases(base_code: &str) -> [String; 2] {
    [format!("{}-A", base_code), format!("{}-B", base_code)]
}

/// 员工转换结果
#[derive(Debug, Default)]
pub struct StaffTransform {
    pub records: Vec<Staff>,
    pub supervisor_links: Vec<SupervisorLink>,
}

struct Candidate<'a> {
    row: &'a SheetRow,
    raw_code: String,
    base_code: String,
}

pub fn transform_staff(rows: &[SheetRow], ctx: &mut LoadContext) -> StaffTransform {
    let table = Table::Staff;
    let mut candidates = Vec::with_capacity(rows.len());
    let mut raw_codes: HashMap<String, Vec<String>> = HashMap::new();

    for row in rows {
        let Some(raw_code) = text(row, "Staff Code") else {
            ctx.missing_identifier(table, row.row_number, "Staff Code");
            continue;
        };

        // 表头回显行
        if text(row, "First Name").is_some_and(|f| f.eq_ignore_ascii_case("first name")) {
            ctx.warn(
                table,
                row.row_number,
                Some(&raw_code),
                WarningKind::JunkRow,
                "表头回显行，已跳过",
            );
            continue;
        }

        let base_code = strip_variant_suffix(&raw_code).to_string();
        raw_codes
            .entry(base_code.clone())
            .or_default()
            .push(raw_code.clone());
        candidates.push(Candidate {
            row,
            raw_code,
            base_code,
        });
    }

    let outcome = keep_highest_priority(
        candidates,
        |c| c.base_code.clone(),
        |c| VariantRank::of(&c.raw_code),
    );
    ctx.record_dedup(table, outcome.collisions.iter().cloned());

    let mut result = StaffTransform::default();
    for Candidate {
        row,
        raw_code,
        base_code,
    } in outcome.kept
    {
        let id = Uuid::new_v4();
        ctx.identities.register(EntityKind::Staff, &base_code, id);
        for alias in raw_codes.get(&base_code).into_iter().flatten() {
            ctx.identities.register_alias(EntityKind::Staff, alias, id);
        }

        if let Some(supervisor) = text(row, "Supervisor Code") {
            result.supervisor_links.push(SupervisorLink {
                row_number: row.row_number,
                staff_code: base_code.clone(),
                supervisor_code: strip_variant_suffix(&supervisor).to_string(),
            });
        }

        let first_name = text(row, "First Name");
        let last_name = text(row, "Last Name");
        let full_name = format!(
            "{} {}",
            first_name.as_deref().unwrap_or(""),
            last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string();
        let full_name = if full_name.is_empty() {
            base_code.clone()
        } else {
            full_name
        };
        let mobile = text(row, "Mobile Phone");

        trace!(raw = %raw_code, base = %base_code, "员工变体保留");
        result.records.push(Staff {
            id,
            tenant_id: ctx.tenant_id,
            staff_code: base_code,
            full_name,
            first_name,
            last_name,
            preferred_name: text(row, "Preferred Name"),
            role: normalize_role_label(text(row, "Staff Role").as_deref()),
            staff_status: normalize_enum_label(
                text(row, "Staff Status").as_deref(),
                STAFF_STATUS,
                DEFAULT_STATUS,
            ),
            staff_type: text(row, "Staff Type"),
            employment_type: text(row, "Employment Type"),
            hire_date: normalize_date(row.get("Hire Date")),
            termination_date: normalize_date(row.get("Termination Date")),
            email: text(row, "Email"),
            phone: mobile.clone(),
            mobile_phone: mobile,
            pay_rate: normalize_number(row.get("Pay Rate"), None),
            schedule_type: text(row, "Schedule Type"),
            address: address(row, &STREET_ADDRESS),
            emergency_contact_name: text(row, "Emergency Contact Name"),
            emergency_contact_phone: text(row, "Emergency Contact Phone"),
            emergency_contact_relationship: text(row, "Emergency Contact Relationship"),
            certifications: text(row, "Certifications"),
            performance_rating: normalize_number(row.get("Performance Rating"), None),
            background_check_date: normalize_date(row.get("Background Check Date")),
            photo_url: text(row, "Photo URL"),
            notes: text(row, "Notes"),
        });
    }

    info!(
        kept = result.records.len(),
        supervisor_links = result.supervisor_links.len(),
        "员工转换完成"
    );
    result
}

/// 上级关系 → 延迟补丁（员工表写入后调用，两侧均为基础代码）
pub fn resolve_supervisor_patches(
    links: &[SupervisorLink],
    ctx: &mut LoadContext,
) -> Vec<DeferredPatch> {
    let table = Table::Staff;
    let mut patches = Vec::with_capacity(links.len());

    for link in links {
        let Some(record_id) = ctx.identities.resolve(EntityKind::Staff, &link.staff_code) else {
            continue;
        };
        let Some(supervisor_id) = ctx.resolve_optional(
            table,
            link.row_number,
            EntityKind::Staff,
            Some(&link.supervisor_code),
        ) else {
            continue;
        };

        patches.push(DeferredPatch {
            table,
            record_id,
            field: "supervisor_id".to_string(),
            value: PatchValue::Id(supervisor_id),
            code: link.staff_code.clone(),
        });
    }

    patches
}
