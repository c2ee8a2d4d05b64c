// ==========================================
// 清洁业务数据导入 - 作业实体
// ==========================================
// 职责: 站点作业与作业任务
// 对齐: 目标库 site_jobs / job_tasks
// ==========================================

use crate::domain::record::entity_record;
use crate::domain::types::Table;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// SiteJob - 站点作业
// ==========================================
// 必需引用: site_id；可选引用: service_id / subcontractor_id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteJob {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub site_id: Uuid,
    pub job_code: String,
    pub job_name: String,
    pub status: String,
    pub frequency: String, // FREQ 映射，默认 WEEKLY
    pub service_id: Option<Uuid>,
    pub job_type: Option<String>,
    pub priority_level: Option<String>,
    pub schedule_days: Option<String>,
    pub staff_needed: Option<i64>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub estimated_hours_per_service: Option<f64>,
    pub estimated_hours_per_month: Option<f64>,
    pub last_service_date: Option<NaiveDate>,
    pub next_service_date: Option<NaiveDate>,
    pub quality_score: Option<f64>,
    pub billing_uom: String, // 默认 MONTHLY
    pub billing_amount: Option<f64>,
    pub job_assigned_to: Option<String>,
    pub subcontractor_id: Option<Uuid>,
    pub invoice_description: Option<String>,
    pub specifications: Option<String>,
    pub special_requirements: Option<String>,
    pub notes: Option<String>,
}

entity_record!(SiteJob, Table::SiteJobs, job_code);

// ==========================================
// JobTask - 作业任务
// ==========================================
// 去重键: (job_id, task_id)，保留末行
// qc_weight 以整数写入，精确小数值由延迟补丁写回
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobTask {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub job_id: Uuid,
    pub task_id: Uuid,
    pub task_code: String,
    pub planned_minutes: i64,
    pub qc_weight: i64,
    pub is_required: bool,
    pub status: String,
    pub notes: Option<String>,
}

entity_record!(JobTask, Table::JobTasks, task_code);
