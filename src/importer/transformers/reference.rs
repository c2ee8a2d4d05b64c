// ==========================================
// 参考数据转换: Lookups / Staff Position / Service / Task / Service Task
// ==========================================

use super::{first_per_code, text};
use crate::domain::reference::{Lookup, Service, ServiceTask, StaffPosition, Task};
use crate::domain::types::{EntityKind, Table};
use crate::importer::context::LoadContext;
use crate::importer::deduplicator::keep_first;
use crate::importer::field_normalizer::{
    normalize_boolean, normalize_enum_label, normalize_integer, normalize_number,
};
use crate::importer::label_maps::FREQUENCY;
use crate::importer::sheet::SheetRow;
use tracing::debug;
use uuid::Uuid;

pub fn transform_lookups(rows: &[SheetRow], ctx: &mut LoadContext) -> Vec<Lookup> {
    let table = Table::Lookups;
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let (Some(category), Some(code), Some(label)) =
            (text(row, "Category"), text(row, "Code"), text(row, "Value"))
        else {
            ctx.missing_identifier(table, row.row_number, "Category/Code/Value");
            continue;
        };

        out.push(Lookup {
            id: Uuid::new_v4(),
            tenant_id: None,
            category,
            code,
            label,
            sort_order: normalize_integer(row.get("Sort"), Some(0)).unwrap_or(0),
            is_active: normalize_boolean(row.get("Active"), true),
        });
    }

    out
}

pub fn transform_staff_positions(rows: &[SheetRow], ctx: &mut LoadContext) -> Vec<StaffPosition> {
    let table = Table::StaffPositions;
    let rows = first_per_code(rows, table, ctx, |row| text(row, "Position Code"));
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let (Some(code), Some(title)) = (text(row, "Position Code"), text(row, "Position Name"))
        else {
            ctx.missing_identifier(table, row.row_number, "Position Code/Position Name");
            continue;
        };

        let id = Uuid::new_v4();
        ctx.identities.register(EntityKind::StaffPosition, &code, id);
        out.push(StaffPosition {
            id,
            tenant_id: ctx.tenant_id,
            position_code: code,
            title,
            pay_grade: text(row, "Skill Level"),
            notes: text(row, "Notes"),
            is_active: normalize_boolean(row.get("Is Active"), true),
        });
    }

    out
}

pub fn transform_services(rows: &[SheetRow], ctx: &mut LoadContext) -> Vec<Service> {
    let table = Table::Services;
    let rows = first_per_code(rows, table, ctx, |row| text(row, "Service Code"));
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let (Some(code), Some(name)) = (text(row, "Service Code"), text(row, "Service Name"))
        else {
            ctx.missing_identifier(table, row.row_number, "Service Code/Service Name");
            continue;
        };

        let id = Uuid::new_v4();
        ctx.identities.register(EntityKind::Service, &code, id);
        out.push(Service {
            id,
            tenant_id: ctx.tenant_id,
            service_code: code,
            name,
            description: text(row, "Description"),
        });
    }

    out
}

pub fn transform_tasks(rows: &[SheetRow], ctx: &mut LoadContext) -> Vec<Task> {
    let table = Table::Tasks;
    let rows = first_per_code(rows, table, ctx, |row| text(row, "Task Code"));
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let (Some(code), Some(name)) = (text(row, "Task Code"), text(row, "Task Name")) else {
            ctx.missing_identifier(table, row.row_number, "Task Code/Task Name");
            continue;
        };

        let id = Uuid::new_v4();
        ctx.identities.register(EntityKind::Task, &code, id);
        out.push(Task {
            id,
            tenant_id: ctx.tenant_id,
            task_code: code,
            name,
            category: text(row, "Category"),
            subcategory: text(row, "Subcategory"),
            area_type: text(row, "Area Type"),
            floor_type: text(row, "Floor Type"),
            priority_level: text(row, "Priority Level"),
            default_minutes: normalize_integer(row.get("Default Minutes"), None),
            production_rate_sqft_per_hour: normalize_number(row.get("Production Rate"), None),
            unit_code: text(row, "Default UOM").unwrap_or_else(|| "SQFT_1000".to_string()),
            spec_description: text(row, "Spec Description"),
            work_description: text(row, "Work Description"),
            tools_materials: text(row, "Tools Materials"),
            notes: text(row, "Notes"),
            is_active: normalize_boolean(row.get("Is Active"), true),
        });
    }

    out
}

/// 服务任务: 服务与任务均为必需引用；(service_id, task_id) 保留首行
pub fn transform_service_tasks(rows: &[SheetRow], ctx: &mut LoadContext) -> Vec<ServiceTask> {
    let table = Table::ServiceTasks;
    let mut candidates = Vec::with_capacity(rows.len());

    for row in rows {
        let (Some(service_code), Some(task_code)) =
            (text(row, "Service Code"), text(row, "Task Code"))
        else {
            ctx.missing_identifier(table, row.row_number, "Service Code/Task Code");
            continue;
        };

        let Some(service_id) =
            ctx.resolve_required(table, row.row_number, EntityKind::Service, &service_code)
        else {
            continue;
        };
        let Some(task_id) = ctx.resolve_required(table, row.row_number, EntityKind::Task, &task_code)
        else {
            continue;
        };

        let frequency = normalize_enum_label(
            text(row, "Typical Frequency").as_deref(),
            FREQUENCY,
            "DAILY",
        );

        candidates.push(ServiceTask {
            id: Uuid::new_v4(),
            tenant_id: ctx.tenant_id,
            service_id,
            task_id,
            frequency_default: frequency,
            sequence_order: normalize_integer(row.get("Sequence Order"), Some(0)).unwrap_or(0),
            priority_level: text(row, "Priority Level"),
            is_required: normalize_boolean(row.get("Is Required"), true),
            estimated_minutes: normalize_integer(row.get("Estimated Minutes"), None),
            quality_weight: normalize_number(row.get("Quality Weight"), Some(1.0)).unwrap_or(1.0),
            notes: text(row, "Notes"),
            source_codes: format!("{}/{}", service_code, task_code),
        });
    }

    let outcome = keep_first(candidates, |st| (st.service_id, st.task_id));
    let labels: Vec<(String, usize)> = outcome
        .collisions
        .iter()
        .map(|((service_id, task_id), n)| (format!("{}/{}", service_id, task_id), *n))
        .collect();
    ctx.record_dedup(table, labels);

    debug!(kept = outcome.kept.len(), "服务任务转换完成");
    outcome.kept
}
