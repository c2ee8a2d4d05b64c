// ==========================================
// 清洁业务数据导入 - 客户侧实体
// ==========================================
// 职责: 客户、站点、分包商及其地址
// 对齐: 目标库 clients / sites / subcontractors
// ==========================================

use crate::domain::record::entity_record;
use crate::domain::types::Table;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Address - 地址（JSON 列）
// ==========================================
// 仅在街道存在时构建；空字段不序列化
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        self.street.is_none()
    }
}

// ==========================================
// Client - 客户
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub client_code: String,
    pub name: String,
    pub status: String,                   // CLIENT_STATUS 映射，默认 ACTIVE
    pub billing_address: Option<Address>, // 无账单街道时为 null
    pub client_since: Option<NaiveDate>,
    pub client_type: Option<String>,
    pub industry: Option<String>,
    pub bill_to_name: Option<String>,
    pub payment_terms: Option<String>,
    pub po_required: bool,
    pub insurance_required: bool,
    pub insurance_expiry: Option<NaiveDate>,
    pub credit_limit: Option<f64>,
    pub website: Option<String>,
    pub tax_id: Option<String>,
    pub contract_start_date: Option<NaiveDate>,
    pub contract_end_date: Option<NaiveDate>,
    pub auto_renewal: bool,
    pub invoice_frequency: Option<String>,
    pub notes: Option<String>,
}

entity_record!(Client, Table::Clients, client_code);

// ==========================================
// Site - 服务站点
// ==========================================
// 必需引用: client_id；可选引用: supervisor_id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub client_id: Uuid,
    pub site_code: String,
    pub name: String,
    pub status: String,
    pub status_date: Option<NaiveDate>,
    pub status_reason: Option<String>,
    pub service_start_date: Option<NaiveDate>,
    pub address: Address, // 站点地址非空列，缺失时写入 {}
    pub alarm_code: Option<String>,
    pub alarm_system: Option<String>,
    pub alarm_company: Option<String>,
    pub security_protocol: Option<String>,
    pub access_notes: Option<String>,
    pub entry_instructions: Option<String>,
    pub parking_instructions: Option<String>,
    pub square_footage: Option<f64>,
    pub number_of_floors: Option<i64>,
    pub employees_on_site: Option<i64>,
    pub earliest_start_time: Option<NaiveTime>,
    pub latest_start_time: Option<NaiveTime>,
    pub business_hours_start: Option<NaiveTime>,
    pub business_hours_end: Option<NaiveTime>,
    pub weekend_access: bool,
    pub janitorial_closet_location: Option<String>,
    pub supply_storage_location: Option<String>,
    pub water_source_location: Option<String>,
    pub dumpster_location: Option<String>,
    pub supervisor_id: Option<Uuid>,
    pub risk_level: Option<String>,
    pub priority_level: Option<String>,
    pub osha_compliance_required: bool,
    pub background_check_required: bool,
    pub last_inspection_date: Option<NaiveDate>,
    pub next_inspection_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

entity_record!(Site, Table::Sites, site_code);

// ==========================================
// Subcontractor - 分包商
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcontractor {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub subcontractor_code: String,
    pub company_name: String,
    pub contact_name: Option<String>,
    pub contact_title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub business_phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<Address>,
    pub status: String, // 固定 ACTIVE
    pub services_provided: Option<String>,
    pub license_number: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    pub insurance_company: Option<String>,
    pub insurance_policy_number: Option<String>,
    pub insurance_expiry: Option<NaiveDate>,
    pub hourly_rate: Option<f64>,
    pub payment_terms: Option<String>,
    pub tax_id: Option<String>,
    pub w9_on_file: bool,
    pub notes: Option<String>,
}

entity_record!(Subcontractor, Table::Subcontractors, subcontractor_code);
