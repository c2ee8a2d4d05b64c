// ==========================================
// 清洁业务数据导入 - 物资与设备实体
// ==========================================
// 职责: 耗材目录、设备、设备分配、站点耗材、盘点及明细
// 对齐: 目标库 supply_catalog / equipment / equipment_assignments /
//       site_supplies / inventory_counts / inventory_count_details
// ==========================================

use crate::domain::record::entity_record;
use crate::domain::types::Table;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// SupplyCatalogItem - 耗材目录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyCatalogItem {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub supply_status: String, // 默认 ACTIVE
    pub unit: String,          // 默认 EA
    pub pack_size: Option<String>,
    pub min_stock_level: Option<i64>,
    pub brand: Option<String>,
    pub manufacturer: Option<String>,
    pub model_number: Option<String>,
    pub markup_percentage: Option<f64>,
    pub billing_rate: Option<f64>,
    pub preferred_vendor: Option<String>,
    pub vendor_sku: Option<String>,
    pub eco_rating: Option<String>,
    pub ppe_required: bool,
    pub sds_url: Option<String>,
    pub image_url: Option<String>,
    pub notes: Option<String>,
}

entity_record!(SupplyCatalogItem, Table::SupplyCatalog, code);

// ==========================================
// Equipment - 设备
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub equipment_code: String,
    pub name: String, // 缺失时回退为设备代码
    pub equipment_type: Option<String>,
    pub equipment_category: Option<String>,
    pub manufacturer: Option<String>,
    pub brand: Option<String>,
    pub model_number: Option<String>,
    pub condition: String, // 大写 slug，默认 GOOD
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<f64>,
    pub maintenance_specs: Option<String>,
    pub maintenance_schedule: Option<String>,
    pub last_maintenance_date: Option<NaiveDate>,
    pub next_maintenance_date: Option<NaiveDate>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
}

entity_record!(Equipment, Table::Equipment, equipment_code);

// ==========================================
// EquipmentAssignment - 设备分配
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentAssignment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub equipment_id: Uuid,
    pub staff_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub assigned_date: NaiveDate, // 缺失时为运行当日
    pub returned_date: Option<NaiveDate>,
    pub notes: Option<String>,

    #[serde(skip)]
    pub equipment_code: String,
}

entity_record!(EquipmentAssignment, Table::EquipmentAssignments, equipment_code);

// ==========================================
// SiteSupply - 站点耗材
// ==========================================
// 去重键: (site_id, supply_id)，保留首行；类别与 SDS 链接取自目录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSupply {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub site_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub sds_url: Option<String>,
    pub notes: Option<String>,

    #[serde(skip)]
    pub supply_code: String,
}

entity_record!(SiteSupply, Table::SiteSupplies, supply_code);

// ==========================================
// InventoryCount - 盘点单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryCount {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub count_code: String,
    pub site_id: Uuid,
    pub count_date: NaiveDate, // 缺失时为运行当日
    pub status: String,        // 固定 COMPLETED
    pub notes: Option<String>,
}

entity_record!(InventoryCount, Table::InventoryCounts, count_code);

// ==========================================
// InventoryCountDetail - 盘点明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryCountDetail {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub count_id: Uuid,
    pub supply_id: Uuid,
    pub actual_qty: f64, // 默认 0
    pub notes: Option<String>,
}

entity_record!(InventoryCountDetail, Table::InventoryCountDetails);
