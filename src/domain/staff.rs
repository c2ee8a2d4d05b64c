// ==========================================
// 清洁业务数据导入 - 员工实体
// ==========================================
// 职责: 员工记录（变体去重后的唯一行）
// 对齐: 目标库 staff（supervisor_id 由延迟补丁写入）
// ==========================================

use crate::domain::customer::Address;
use crate::domain::record::entity_record;
use crate::domain::types::{StaffRole, Table};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub staff_code: String, // 基础代码（已去除 -A/-B 后缀）
    pub full_name: String,  // 姓名拼接，均为空时回退为员工代码
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferred_name: Option<String>,
    pub role: StaffRole,
    pub staff_status: String,
    pub staff_type: Option<String>,
    pub employment_type: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub termination_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub pay_rate: Option<f64>,
    pub schedule_type: Option<String>,
    pub address: Option<Address>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub emergency_contact_relationship: Option<String>,
    pub certifications: Option<String>,
    pub performance_rating: Option<f64>,
    pub background_check_date: Option<NaiveDate>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
}

entity_record!(Staff, Table::Staff, staff_code);

/// 上级关系（基础代码 → 上级基础代码），员工表写入后解析
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorLink {
    pub row_number: usize,
    pub staff_code: String,
    pub supervisor_code: String,
}
