// ==========================================
// 物资转换: Supply / Equipment / Equipment Assignment / Supply Assignment
// ==========================================
// 耗材工作表表头带有 emoji 前缀，按原样匹配
// ==========================================

use super::{first_per_code, text};
use crate::domain::inventory::{Equipment, EquipmentAssignment, SiteSupply, SupplyCatalogItem};
use crate::domain::types::{EntityKind, Table};
use crate::importer::context::LoadContext;
use crate::importer::deduplicator::keep_first;
use crate::importer::field_normalizer::{
    normalize_boolean, normalize_date, normalize_integer, normalize_number, upper_slug,
};
use crate::importer::label_maps::DEFAULT_STATUS;
use crate::importer::sheet::SheetRow;
use crate::importer::supply_matcher::SupplyEntry;
use uuid::Uuid;

pub const SUPPLY_CODE: &str = "\u{1f3f7}\u{fe0f} Supply_Code";
pub const SUPPLY_NAME_EN: &str = "\u{1f1fa}\u{1f1f8} Supply_Name_EN";
const SUPPLY_DESCRIPTION: &str = "\u{1f4dd} Description_EN";
const SUPPLY_CATEGORY: &str = "\u{1f4c1} Supply_Category";
const SUPPLY_STATUS: &str = "\u{1f504} Supply_Status";
const MIN_STOCK_LEVEL: &str = "\u{26a0}\u{fe0f} Min_Stock_Level";
const SUPPLY_IMAGE_URL: &str = "\u{1f5bc}\u{fe0f} Supply_Image_URL";

const ASSIGNMENT_SITE_CODE: &str = "\u{1f3e2} Site_Code";
const ASSIGNMENT_SUPPLY_NAME: &str = "\u{1f4e6} Supply_Name";

/// 耗材目录: 登记身份并建立名称索引（供盘点明细与站点耗材使用）
pub fn transform_supply_catalog(rows: &[SheetRow], ctx: &mut LoadContext) -> Vec<SupplyCatalogItem> {
    let table = Table::SupplyCatalog;
    let rows = first_per_code(rows, table, ctx, |row| text(row, SUPPLY_CODE));
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let (Some(code), Some(name)) = (text(row, SUPPLY_CODE), text(row, SUPPLY_NAME_EN)) else {
            ctx.missing_identifier(table, row.row_number, "Supply_Code/Supply_Name_EN");
            continue;
        };

        let id = Uuid::new_v4();
        ctx.identities.register(EntityKind::Supply, &code, id);

        let item = SupplyCatalogItem {
            id,
            tenant_id: ctx.tenant_id,
            code,
            name,
            description: text(row, SUPPLY_DESCRIPTION),
            category: text(row, SUPPLY_CATEGORY),
            supply_status: text(row, SUPPLY_STATUS).unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            unit: text(row, "Unit_Of_Measure").unwrap_or_else(|| "EA".to_string()),
            pack_size: text(row, "Pack_Size"),
            min_stock_level: normalize_integer(row.get(MIN_STOCK_LEVEL), None),
            brand: text(row, "Brand"),
            manufacturer: text(row, "Manufacturer"),
            model_number: text(row, "Model_Number"),
            markup_percentage: normalize_number(row.get("Markup_Percentage"), None),
            billing_rate: normalize_number(row.get("Billing_Rate"), None),
            preferred_vendor: text(row, "Preferred_Vendor"),
            vendor_sku: text(row, "Vendor_Item_Sku"),
            eco_rating: text(row, "Eco_Rating"),
            ppe_required: normalize_boolean(row.get("PPE"), false),
            sds_url: text(row, "SDS_Link"),
            image_url: text(row, SUPPLY_IMAGE_URL),
            notes: text(row, "Notes"),
        };

        ctx.supplies.insert(SupplyEntry {
            id,
            code: item.code.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            sds_url: item.sds_url.clone(),
        });
        out.push(item);
    }

    out
}

pub fn transform_equipment(rows: &[SheetRow], ctx: &mut LoadContext) -> Vec<Equipment> {
    let table = Table::Equipment;
    let rows = first_per_code(rows, table, ctx, |row| text(row, "Equipment Code"));
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(code) = text(row, "Equipment Code") else {
            ctx.missing_identifier(table, row.row_number, "Equipment Code");
            continue;
        };
        let name = text(row, "Equipment Name").unwrap_or_else(|| code.clone());

        let id = Uuid::new_v4();
        ctx.identities.register(EntityKind::Equipment, &code, id);

        out.push(Equipment {
            id,
            tenant_id: ctx.tenant_id,
            equipment_code: code,
            name,
            equipment_type: text(row, "Equipment Type"),
            equipment_category: text(row, "Equipment Category"),
            manufacturer: text(row, "Manufacturer"),
            brand: text(row, "Brand"),
            model_number: text(row, "Model Number"),
            condition: upper_slug(text(row, "Condition").as_deref().unwrap_or("GOOD")),
            serial_number: text(row, "Serial Number"),
            purchase_date: normalize_date(row.get("Purchase Date")),
            purchase_price: normalize_number(row.get("Purchase Price"), None),
            maintenance_specs: text(row, "Maintenance Specs"),
            maintenance_schedule: text(row, "Maintenance Schedule"),
            last_maintenance_date: normalize_date(row.get("Last Maintenance Date")),
            next_maintenance_date: normalize_date(row.get("Next Maintenance Date")),
            photo_url: text(row, "Equipment Photo URL"),
            notes: text(row, "Notes"),
        });
    }

    out
}

/// 设备分配: 设备必需；员工/站点可选；分配日期缺省为运行当日
pub fn transform_equipment_assignments(
    rows: &[SheetRow],
    ctx: &mut LoadContext,
) -> Vec<EquipmentAssignment> {
    let table = Table::EquipmentAssignments;
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(equipment_code) = text(row, "Equipment Code") else {
            ctx.missing_identifier(table, row.row_number, "Equipment Code");
            continue;
        };
        let Some(equipment_id) =
            ctx.resolve_required(table, row.row_number, EntityKind::Equipment, &equipment_code)
        else {
            continue;
        };

        let staff_id = ctx.resolve_optional(
            table,
            row.row_number,
            EntityKind::Staff,
            text(row, "Assigned Employee Code").as_deref(),
        );
        let site_id = ctx.resolve_optional(
            table,
            row.row_number,
            EntityKind::Site,
            text(row, "Assigned Site Code").as_deref(),
        );

        out.push(EquipmentAssignment {
            id: Uuid::new_v4(),
            tenant_id: ctx.tenant_id,
            equipment_id,
            staff_id,
            site_id,
            assigned_date: normalize_date(row.get("Assignment Date")).unwrap_or(ctx.today),
            returned_date: normalize_date(row.get("Return Date")),
            notes: text(row, "Notes"),
            equipment_code,
        });
    }

    out
}

/// 站点耗材: 站点与耗材均为必需引用；(site_id, supply_id) 保留首行；
/// 类别与 SDS 链接取自耗材目录
pub fn transform_site_supplies(rows: &[SheetRow], ctx: &mut LoadContext) -> Vec<SiteSupply> {
    let table = Table::SiteSupplies;
    let mut candidates = Vec::with_capacity(rows.len());

    for row in rows {
        let (Some(site_code), Some(supply_code)) =
            (text(row, ASSIGNMENT_SITE_CODE), text(row, SUPPLY_CODE))
        else {
            ctx.missing_identifier(table, row.row_number, "Site_Code/Supply_Code");
            continue;
        };

        let Some(site_id) = ctx.resolve_required(table, row.row_number, EntityKind::Site, &site_code)
        else {
            continue;
        };
        let Some(supply_id) =
            ctx.resolve_required(table, row.row_number, EntityKind::Supply, &supply_code)
        else {
            continue;
        };

        let catalog = ctx.supplies.by_code(&supply_code);
        let category = catalog.and_then(|c| c.category.clone());
        let sds_url = catalog.and_then(|c| c.sds_url.clone());
        let name = text(row, ASSIGNMENT_SUPPLY_NAME)
            .or_else(|| catalog.map(|c| c.name.clone()))
            .unwrap_or_else(|| supply_code.clone());

        candidates.push((
            supply_id,
            SiteSupply {
                id: Uuid::new_v4(),
                tenant_id: ctx.tenant_id,
                site_id,
                name,
                category,
                sds_url,
                notes: text(row, "Notes"),
                supply_code,
            },
        ));
    }

    let outcome = keep_first(candidates, |(supply_id, ss)| (ss.site_id, *supply_id));
    let labels: Vec<(String, usize)> = outcome
        .collisions
        .iter()
        .map(|((site_id, supply_id), n)| (format!("{}/{}", site_id, supply_id), *n))
        .collect();
    ctx.record_dedup(table, labels);

    outcome.kept.into_iter().map(|(_, ss)| ss).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::sheet::CellValue;
    use chrono::NaiveDate;

    fn ctx() -> LoadContext {
        LoadContext::new(Uuid::new_v4(), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap())
    }

    fn row(n: usize, pairs: &[(&str, &str)]) -> SheetRow {
        let pairs: Vec<(&str, CellValue)> =
            pairs.iter().map(|(h, v)| (*h, CellValue::from(*v))).collect();
        SheetRow::from_pairs(n, &pairs)
    }

    #[test]
    fn test_supply_catalog_defaults_and_index() {
        let mut ctx = ctx();
        let rows = vec![row(2, &[
            (SUPPLY_CODE, "SUP-001"),
            (SUPPLY_NAME_EN, "Glass Cleaner"),
            (SUPPLY_CATEGORY, "CHEMICAL"),
            ("SDS_Link", "https://sds.example/glass"),
        ])];
        let items = transform_supply_catalog(&rows, &mut ctx);

        assert_eq!(items[0].unit, "EA");
        assert_eq!(items[0].supply_status, "ACTIVE");
        assert!(!items[0].ppe_required);
        assert_eq!(ctx.supplies.len(), 1);
        assert_eq!(
            ctx.identities.resolve(EntityKind::Supply, "SUP-001"),
            Some(items[0].id)
        );
    }

    #[test]
    fn test_equipment_condition_slug_and_name_fallback() {
        let mut ctx = ctx();
        let rows = vec![
            row(2, &[("Equipment Code", "EQP-001"), ("Condition", "Needs Repair")]),
            row(3, &[("Equipment Code", "EQP-002"), ("Equipment Name", "Buffer")]),
        ];
        let items = transform_equipment(&rows, &mut ctx);
        assert_eq!(items[0].name, "EQP-001");
        assert_eq!(items[0].condition, "NEEDS_REPAIR");
        assert_eq!(items[1].condition, "GOOD");
    }

    #[test]
    fn test_equipment_assignment_defaults_to_today() {
        let mut ctx = ctx();
        ctx.identities.register(EntityKind::Equipment, "EQP-001", Uuid::new_v4());
        let rows = vec![
            row(2, &[("Equipment Code", "EQP-001")]),
            row(3, &[("Equipment Code", "EQP-404")]),
        ];
        let out = transform_equipment_assignments(&rows, &mut ctx);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].assigned_date, ctx.today);
        assert_eq!(out[0].staff_id, None);
    }

    #[test]
    fn test_site_supplies_enriched_and_deduplicated() {
        let mut ctx = ctx();
        let site = Uuid::new_v4();
        ctx.identities.register(EntityKind::Site, "SIT-001", site);
        transform_supply_catalog(
            &[row(2, &[
                (SUPPLY_CODE, "SUP-001"),
                (SUPPLY_NAME_EN, "Glass Cleaner"),
                (SUPPLY_CATEGORY, "CHEMICAL"),
                ("SDS_Link", "https://sds.example/glass"),
            ])],
            &mut ctx,
        );

        let rows = vec![
            row(2, &[(ASSIGNMENT_SITE_CODE, "SIT-001"), (SUPPLY_CODE, "SUP-001")]),
            row(3, &[(ASSIGNMENT_SITE_CODE, "SIT-001"), (SUPPLY_CODE, "SUP-001"), (ASSIGNMENT_SUPPLY_NAME, "Other")]),
            row(4, &[(ASSIGNMENT_SITE_CODE, "SIT-001"), (SUPPLY_CODE, "SUP-404")]),
        ];
        let out = transform_site_supplies(&rows, &mut ctx);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].site_id, site);
        assert_eq!(out[0].name, "Glass Cleaner");
        assert_eq!(out[0].category.as_deref(), Some("CHEMICAL"));
        assert_eq!(out[0].sds_url.as_deref(), Some("https://sds.example/glass"));
        assert_eq!(ctx.dedup.len(), 1);
        assert!(ctx.warnings.iter().any(|w| w.code.as_deref() == Some("SUP-404")));
    }
}
