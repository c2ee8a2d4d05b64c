// ==========================================
// 清洁业务数据导入 - 领域模型层
// ==========================================
// 职责: 定义目标实体、类型与运行报告
// 红线: 不含数据访问逻辑,不含转换逻辑
// ==========================================

pub mod customer;
pub mod inventory;
pub mod job;
pub mod record;
pub mod reference;
pub mod report;
pub mod staff;
pub mod types;

// 重导出核心类型
pub use customer::{Address, Client, Site, Subcontractor};
pub use inventory::{
    Equipment, EquipmentAssignment, InventoryCount, InventoryCountDetail, SiteSupply,
    SupplyCatalogItem,
};
pub use job::{JobTask, SiteJob};
pub use record::EntityRecord;
pub use reference::{Lookup, Service, ServiceTask, StaffPosition, Task};
pub use report::{
    DedupEntry, DeferredPatch, FuzzyMatch, ImportReport, PatchSummary, PatchValue,
    PurgeStepOutcome, PurgeStepResult, RowWarning, SequenceUpdate, SkippedRecord, TableSummary,
    WarningKind,
};
pub use staff::{Staff, SupervisorLink};
pub use types::{EntityKind, StaffRole, Table, VariantRank};
