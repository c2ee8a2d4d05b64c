// ==========================================
// 清洁业务数据导入 - 参考数据实体
// ==========================================
// 职责: 查找值、岗位、服务、作业任务、服务任务
// 对齐: 目标库 lookups / staff_positions / services / tasks / service_tasks
// ==========================================

use crate::domain::record::entity_record;
use crate::domain::types::Table;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Lookup - 全局查找值
// ==========================================
// 全局表: tenant_id 恒为 null
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lookup {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>, // 全局表固定为 None
    pub category: String,        // 分类
    pub code: String,            // 代码
    pub label: String,           // 显示值
    pub sort_order: i64,         // 排序（默认 0）
    pub is_active: bool,         // 是否启用（默认 true）
}

entity_record!(Lookup, Table::Lookups, |r| format!("{}/{}", r.category, r.code));

// ==========================================
// StaffPosition - 岗位
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffPosition {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub position_code: String,
    pub title: String,
    pub pay_grade: Option<String>, // 源列 Skill Level
    pub notes: Option<String>,
    pub is_active: bool,
}

entity_record!(StaffPosition, Table::StaffPositions, position_code);

// ==========================================
// Service - 服务项目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub service_code: String,
    pub name: String,
    pub description: Option<String>,
}

entity_record!(Service, Table::Services, service_code);

// ==========================================
// Task - 作业任务
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub task_code: String,
    pub name: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub area_type: Option<String>,
    pub floor_type: Option<String>,
    pub priority_level: Option<String>,
    pub default_minutes: Option<i64>,
    pub production_rate_sqft_per_hour: Option<f64>, // 源列 Production Rate
    pub unit_code: String,                           // 默认 SQFT_1000
    pub spec_description: Option<String>,
    pub work_description: Option<String>,
    pub tools_materials: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
}

entity_record!(Task, Table::Tasks, task_code);

// ==========================================
// ServiceTask - 服务包含的任务
// ==========================================
// 去重键: (service_id, task_id)，保留首行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTask {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub service_id: Uuid,
    pub task_id: Uuid,
    pub frequency_default: String, // 频次（默认 DAILY）
    pub sequence_order: i64,
    pub priority_level: Option<String>,
    pub is_required: bool,
    pub estimated_minutes: Option<i64>,
    pub quality_weight: f64, // 默认 1
    pub notes: Option<String>,

    #[serde(skip)]
    pub source_codes: String, // "SER-001/TSK-002"，仅用于日志
}

entity_record!(ServiceTask, Table::ServiceTasks, source_codes);
