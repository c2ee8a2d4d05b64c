// ==========================================
// 清洁业务数据导入 - 清理编排
// ==========================================
// 职责: 按固定的反向依赖顺序删除租户数据（最深子表先删）
// 红线: 删除不重试；单步失败记录后继续；表不存在不是错误
// ==========================================

use crate::domain::report::{PurgeStepOutcome, PurgeStepResult};
use crate::domain::types::Table;
use crate::repository::batch_loader::{BatchLoader, PurgeScope};
use tracing::{info, warn};
use uuid::Uuid;

/// 租户范围的删除顺序（子表在前）
pub const PURGE_ORDER: &[&str] = &[
    // 销售管线子表
    "sales_followup_sends",
    "sales_followup_sequences",
    "sales_email_events",
    "sales_proposal_sends",
    "sales_proposal_marketing_inserts",
    "sales_proposal_attachments",
    "sales_proposal_signatures",
    "sales_proposal_pricing_options",
    "sales_proposals",
    "sales_bid_pricing_results",
    "sales_bid_workload_results",
    "sales_bid_burden",
    "sales_bid_labor_rates",
    "sales_bid_schedule",
    "sales_bid_area_tasks",
    "sales_bid_areas",
    "sales_bid_sites",
    "sales_bid_general_tasks",
    "sales_bid_consumables",
    "sales_bid_supply_allowances",
    "sales_bid_supply_kits",
    "sales_bid_equipment_plan_items",
    "sales_bid_overhead",
    "sales_bid_pricing_strategy",
    "sales_bid_versions",
    "sales_bids",
    "sales_opportunities",
    "sales_prospect_contacts",
    "sales_prospects",
    "sales_marketing_inserts",
    "sales_followup_templates",
    "sales_production_rates",
    // 转化 / 运营
    "sales_conversion_events",
    "sales_bid_conversions",
    "ticket_asset_checkouts",
    "site_asset_requirements",
    "ticket_photos",
    "ticket_checklist_items",
    "ticket_checklists",
    "checklist_template_items",
    "checklist_templates",
    "ticket_assignments",
    "work_tickets",
    "recurrence_rules",
    // 巡检
    "inspection_issues",
    "inspection_items",
    "inspections",
    "inspection_template_items",
    "inspection_templates",
    // 考勤
    "timesheet_approvals",
    "timesheets",
    "time_exceptions",
    "time_entries",
    "time_events",
    "alerts",
    "geofences",
    // 培训 / 安全
    "training_completions",
    "training_courses",
    "safety_documents",
    "key_event_log",
    "vehicle_checkouts",
    "pay_rate_history",
    "staff_certifications",
    "user_access_grants",
    "user_team_memberships",
    // 物资 / 资产
    "inventory_count_details",
    "inventory_counts",
    "supply_kit_items",
    "supply_kits",
    "supply_orders",
    "vehicle_maintenance",
    "equipment_assignments",
    "equipment",
    "key_inventory",
    "vehicles",
    "site_supplies",
    "supply_catalog",
    // 员工 / 作业
    "job_staff_assignments",
    "job_tasks",
    "job_logs",
    "site_jobs",
    "subcontractors",
    "staff_positions",
    // CRM
    "timeline_events",
    "contacts",
    "service_tasks",
    "task_production_rates",
    "tasks",
    "services",
    "sites",
    "clients",
    "staff",
    // 用户 / 权限
    "user_profiles",
    "user_client_access",
    // 系统
    "audit_events",
    "notifications",
    "files",
];

/// 全局表（不按租户过滤），最后删除
pub const GLOBAL_PURGE_ORDER: &[&str] = &["lookups", "status_transitions"];

/// 一个清理步骤
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeStep {
    pub table: String,
    pub global: bool,
}

// ==========================================
// PurgePlan - 清理计划
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgePlan {
    steps: Vec<PurgeStep>,
}

impl PurgePlan {
    /// 完整清理（全部租户表 + 全局表）
    pub fn full() -> Self {
        Self::with_order(PURGE_ORDER, GLOBAL_PURGE_ORDER)
    }

    /// 自定义顺序（测试用）
    pub fn with_order(tenant_tables: &[&str], global_tables: &[&str]) -> Self {
        let steps = tenant_tables
            .iter()
            .map(|t| PurgeStep {
                table: t.to_string(),
                global: false,
            })
            .chain(global_tables.iter().map(|t| PurgeStep {
                table: t.to_string(),
                global: true,
            }))
            .collect();
        Self { steps }
    }

    /// 子集重载: 仅清理选中的表，保持完整顺序中的相对次序
    pub fn subset(tables: &[Table]) -> Self {
        let selected = |name: &str| tables.iter().any(|t| t.as_str() == name);
        let tenant: Vec<&str> = PURGE_ORDER.iter().copied().filter(|&t| selected(t)).collect();
        let global: Vec<&str> = GLOBAL_PURGE_ORDER
            .iter()
            .copied()
            .filter(|&t| selected(t))
            .collect();
        Self::with_order(&tenant, &global)
    }

    pub fn steps(&self) -> &[PurgeStep] {
        &self.steps
    }

    /// 顺序执行全部步骤
    pub async fn execute(&self, loader: &BatchLoader, tenant_id: Uuid) -> Vec<PurgeStepResult> {
        info!(steps = self.steps.len(), tenant = %tenant_id, "开始清理");
        let mut results = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let scope = if step.global {
                PurgeScope::Global
            } else {
                PurgeScope::Tenant(tenant_id)
            };
            results.push(loader.purge(&step.table, scope).await);
        }

        let failed = results
            .iter()
            .filter(|r| r.outcome == PurgeStepOutcome::Failed)
            .count();
        if failed > 0 {
            warn!(failed, "清理完成，部分步骤失败");
        } else {
            info!("清理完成");
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(name: &str) -> usize {
        PURGE_ORDER.iter().position(|t| *t == name).unwrap()
    }

    #[test]
    fn test_loaded_tables_purged_children_first() {
        for table in Table::LOAD_ORDER {
            if table.is_global() {
                assert!(GLOBAL_PURGE_ORDER.contains(&table.as_str()));
            } else {
                assert!(PURGE_ORDER.contains(&table.as_str()), "缺少 {}", table);
            }
        }
        assert!(position("inventory_count_details") < position("inventory_counts"));
        assert!(position("job_tasks") < position("site_jobs"));
        assert!(position("site_jobs") < position("sites"));
        assert!(position("sites") < position("clients"));
        assert!(position("sites") < position("staff"));
        assert!(position("service_tasks") < position("tasks"));
    }

    #[test]
    fn test_full_plan_ends_with_global_tables() {
        let plan = PurgePlan::full();
        let tail: Vec<_> = plan.steps().iter().rev().take(2).collect();
        assert!(tail.iter().all(|s| s.global));
        assert_eq!(plan.steps().last().unwrap().table, "status_transitions");
    }

    #[test]
    fn test_subset_keeps_relative_order() {
        let plan = PurgePlan::subset(&[Table::Clients, Table::Sites, Table::Lookups]);
        let names: Vec<_> = plan.steps().iter().map(|s| s.table.as_str()).collect();
        assert_eq!(names, vec!["sites", "clients", "lookups"]);
        assert!(plan.steps()[2].global);
    }
}
