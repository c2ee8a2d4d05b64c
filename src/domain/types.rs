// ==========================================
// 清洁业务数据导入 - 领域类型定义
// ==========================================
// 职责: 目标表、实体类型、员工角色等枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与后端一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 目标表 (Target Table)
// ==========================================
// 装载器写入的全部表，顺序即装载顺序（父表在前）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Lookups,
    StaffPositions,
    Services,
    Tasks,
    ServiceTasks,
    Clients,
    Staff,
    Sites,
    Subcontractors,
    SiteJobs,
    JobTasks,
    SupplyCatalog,
    Equipment,
    EquipmentAssignments,
    SiteSupplies,
    InventoryCounts,
    InventoryCountDetails,
}

impl Table {
    /// 装载顺序（依赖图的拓扑序）
    pub const LOAD_ORDER: [Table; 17] = [
        Table::Lookups,
        Table::StaffPositions,
        Table::Services,
        Table::Tasks,
        Table::ServiceTasks,
        Table::Clients,
        Table::Staff,
        Table::Sites,
        Table::Subcontractors,
        Table::SiteJobs,
        Table::JobTasks,
        Table::SupplyCatalog,
        Table::Equipment,
        Table::EquipmentAssignments,
        Table::SiteSupplies,
        Table::InventoryCounts,
        Table::InventoryCountDetails,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Lookups => "lookups",
            Table::StaffPositions => "staff_positions",
            Table::Services => "services",
            Table::Tasks => "tasks",
            Table::ServiceTasks => "service_tasks",
            Table::Clients => "clients",
            Table::Staff => "staff",
            Table::Sites => "sites",
            Table::Subcontractors => "subcontractors",
            Table::SiteJobs => "site_jobs",
            Table::JobTasks => "job_tasks",
            Table::SupplyCatalog => "supply_catalog",
            Table::Equipment => "equipment",
            Table::EquipmentAssignments => "equipment_assignments",
            Table::SiteSupplies => "site_supplies",
            Table::InventoryCounts => "inventory_counts",
            Table::InventoryCountDetails => "inventory_count_details",
        }
    }

    /// 源工作簿中对应的工作表名
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Table::Lookups => "Lookups",
            Table::StaffPositions => "Staff Position",
            Table::Services => "Service",
            Table::Tasks => "Task",
            Table::ServiceTasks => "Service Task",
            Table::Clients => "Client",
            Table::Staff => "Staff",
            Table::Sites => "Site",
            Table::Subcontractors => "Subcontractor",
            Table::SiteJobs => "Site Job",
            Table::JobTasks => "Job Task",
            Table::SupplyCatalog => "Supply",
            Table::Equipment => "Equipment",
            Table::EquipmentAssignments => "Equipment Assignment",
            Table::SiteSupplies => "Supply Assignment",
            Table::InventoryCounts => "Inventory Count",
            Table::InventoryCountDetails => "Inventory Count Detail",
        }
    }

    /// 该表的行是否登记到身份映射（以及业务代码列名）
    pub fn identity(&self) -> Option<(EntityKind, &'static str)> {
        match self {
            Table::StaffPositions => Some((EntityKind::StaffPosition, "position_code")),
            Table::Services => Some((EntityKind::Service, "service_code")),
            Table::Tasks => Some((EntityKind::Task, "task_code")),
            Table::Clients => Some((EntityKind::Client, "client_code")),
            Table::Staff => Some((EntityKind::Staff, "staff_code")),
            Table::Sites => Some((EntityKind::Site, "site_code")),
            Table::Subcontractors => Some((EntityKind::Subcontractor, "subcontractor_code")),
            Table::SiteJobs => Some((EntityKind::SiteJob, "job_code")),
            Table::SupplyCatalog => Some((EntityKind::Supply, "code")),
            Table::Equipment => Some((EntityKind::Equipment, "equipment_code")),
            Table::InventoryCounts => Some((EntityKind::InventoryCount, "count_code")),
            _ => None,
        }
    }

    /// 全局表（无租户隔离）
    pub fn is_global(&self) -> bool {
        matches!(self, Table::Lookups)
    }

    pub fn parse(raw: &str) -> Option<Table> {
        let raw = raw.trim();
        Table::LOAD_ORDER
            .iter()
            .copied()
            .find(|t| t.as_str() == raw)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 实体类型 (Entity Kind)
// ==========================================
// 身份映射的一级键：业务代码只在同一实体类型内唯一
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    StaffPosition,
    Service,
    Task,
    Client,
    Staff,
    Site,
    Subcontractor,
    SiteJob,
    Supply,
    Equipment,
    InventoryCount,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::StaffPosition => "staff_position",
            EntityKind::Service => "service",
            EntityKind::Task => "task",
            EntityKind::Client => "client",
            EntityKind::Staff => "staff",
            EntityKind::Site => "site",
            EntityKind::Subcontractor => "subcontractor",
            EntityKind::SiteJob => "site_job",
            EntityKind::Supply => "supply",
            EntityKind::Equipment => "equipment",
            EntityKind::InventoryCount => "inventory_count",
        };
        write!(f, "{}", label)
    }
}

// ==========================================
// 员工角色 (Staff Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    OwnerAdmin,
    Manager,
    Supervisor,
    Cleaner,
    Inspector,
    Sales,
}

impl Default for StaffRole {
    fn default() -> Self {
        StaffRole::Cleaner
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaffRole::OwnerAdmin => write!(f, "OWNER_ADMIN"),
            StaffRole::Manager => write!(f, "MANAGER"),
            StaffRole::Supervisor => write!(f, "SUPERVISOR"),
            StaffRole::Cleaner => write!(f, "CLEANER"),
            StaffRole::Inspector => write!(f, "INSPECTOR"),
            StaffRole::Sales => write!(f, "SALES"),
        }
    }
}

// ==========================================
// 员工代码变体 (Variant Rank)
// ==========================================
// 同一员工在源表中可能出现两行: -A(基础) / -B(完整)
// 排序即优先级: B > A > 无后缀
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VariantRank {
    Unsuffixed,
    VariantA,
    VariantB,
}

impl VariantRank {
    pub fn of(raw_code: &str) -> Self {
        if raw_code.ends_with("-B") {
            VariantRank::VariantB
        } else if raw_code.ends_with("-A") {
            VariantRank::VariantA
        } else {
            VariantRank::Unsuffixed
        }
    }
}
