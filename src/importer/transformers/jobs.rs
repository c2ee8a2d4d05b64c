// ==========================================
// 作业转换: Site Job / Job Task
// ==========================================
// 作业: 重复作业代码保留首行；站点必需，服务/分包商可选
// 作业任务: (job_id, task_id) 保留末行；qc_weight 整数写入 + 小数补丁
// ==========================================

use super::text;
use crate::domain::job::{JobTask, SiteJob};
use crate::domain::report::{DeferredPatch, PatchValue, WarningKind};
use crate::domain::types::{EntityKind, Table};
use crate::importer::context::LoadContext;
use crate::importer::deduplicator::{keep_first, keep_last};
use crate::importer::field_normalizer::{
    normalize_boolean, normalize_date, normalize_enum_label, normalize_integer, normalize_number,
    normalize_time,
};
use crate::importer::label_maps::{DEFAULT_STATUS, FREQUENCY, JOB_STATUS};
use crate::importer::sheet::SheetRow;
use tracing::debug;
use uuid::Uuid;

/// 小数补丁阈值
const QC_WEIGHT_TOLERANCE: f64 = 0.01;

pub fn transform_site_jobs(rows: &[SheetRow], ctx: &mut LoadContext) -> Vec<SiteJob> {
    let table = Table::SiteJobs;

    // 先按作业代码去重（在引用解析之前）
    let mut coded = Vec::with_capacity(rows.len());
    for row in rows {
        match (text(row, "Job Code"), text(row, "Job Name")) {
            (Some(code), Some(name)) => coded.push((row, code, name)),
            _ => ctx.missing_identifier(table, row.row_number, "Job Code/Job Name"),
        }
    }

    let outcome = keep_first(coded, |(_, code, _)| code.clone());
    for (code, absorbed) in &outcome.collisions {
        let row_number = outcome
            .kept
            .iter()
            .find(|(_, kept_code, _)| kept_code == code)
            .map(|(row, _, _)| row.row_number)
            .unwrap_or(0);
        ctx.warn(
            table,
            row_number,
            Some(code),
            WarningKind::DuplicateCode,
            format!("重复作业代码 {}（{} 行），保留首行", code, absorbed),
        );
    }
    ctx.record_dedup(table, outcome.collisions.iter().cloned());

    let mut out = Vec::with_capacity(outcome.kept.len());
    for (row, code, name) in outcome.kept {
        let Some(site_code) = text(row, "Site Code") else {
            ctx.missing_identifier(table, row.row_number, "Site Code");
            continue;
        };
        let Some(site_id) = ctx.resolve_required(table, row.row_number, EntityKind::Site, &site_code)
        else {
            continue;
        };

        let service_id = ctx.resolve_optional(
            table,
            row.row_number,
            EntityKind::Service,
            text(row, "Service Code").as_deref(),
        );
        let subcontractor_id = ctx.resolve_optional(
            table,
            row.row_number,
            EntityKind::Subcontractor,
            text(row, "Subcontractor Code").as_deref(),
        );

        let id = Uuid::new_v4();
        ctx.identities.register(EntityKind::SiteJob, &code, id);

        out.push(SiteJob {
            id,
            tenant_id: ctx.tenant_id,
            site_id,
            job_code: code,
            job_name: name,
            status: normalize_enum_label(
                text(row, "Job Status").as_deref(),
                JOB_STATUS,
                DEFAULT_STATUS,
            ),
            frequency: normalize_enum_label(text(row, "Frequency").as_deref(), FREQUENCY, "WEEKLY"),
            service_id,
            job_type: text(row, "Job Type"),
            priority_level: text(row, "Priority Level"),
            schedule_days: text(row, "Schedule Days"),
            staff_needed: normalize_integer(row.get("Staff Needed"), None),
            start_time: normalize_time(row.get("Start Time")),
            end_time: normalize_time(row.get("End Time")),
            estimated_hours_per_service: normalize_number(row.get("Estimated Hours Svc"), None),
            estimated_hours_per_month: normalize_number(row.get("Estimated Hours Mo"), None),
            last_service_date: normalize_date(row.get("Last Service Date")),
            next_service_date: normalize_date(row.get("Next Service Date")),
            quality_score: normalize_number(row.get("Quality Score"), None),
            billing_uom: text(row, "Billing UOM").unwrap_or_else(|| "MONTHLY".to_string()),
            billing_amount: normalize_number(row.get("Billing Amount"), None),
            job_assigned_to: text(row, "Job Assigned To"),
            subcontractor_id,
            invoice_description: text(row, "Invoice Service Description"),
            specifications: text(row, "Job Specifications"),
            special_requirements: text(row, "Special Requirements"),
            notes: text(row, "Notes"),
        });
    }

    out
}

/// qc_weight 拆分: (写入的整数, 需补丁的精确值)
pub fn split_qc_weight(raw: f64) -> (i64, Option<f64>) {
    let rounded = raw.round();
    let patch = if (rounded - raw).abs() > QC_WEIGHT_TOLERANCE {
        Some(raw)
    } else {
        None
    };
    (rounded as i64, patch)
}

pub fn transform_job_tasks(rows: &[SheetRow], ctx: &mut LoadContext) -> Vec<JobTask> {
    let table = Table::JobTasks;
    let mut candidates = Vec::with_capacity(rows.len());

    for row in rows {
        let (Some(job_code), Some(task_code)) = (text(row, "Job Code"), text(row, "Task Code"))
        else {
            ctx.missing_identifier(table, row.row_number, "Job Code/Task Code");
            continue;
        };

        let Some(job_id) = ctx.resolve_required(table, row.row_number, EntityKind::SiteJob, &job_code)
        else {
            continue;
        };
        let Some(task_id) = ctx.resolve_required(table, row.row_number, EntityKind::Task, &task_code)
        else {
            continue;
        };

        let raw_weight = normalize_number(row.get("Qc Weight"), Some(1.0)).unwrap_or(1.0);
        let (qc_weight, exact) = split_qc_weight(raw_weight);

        let record = JobTask {
            id: Uuid::new_v4(),
            tenant_id: ctx.tenant_id,
            job_id,
            task_id,
            task_code,
            planned_minutes: normalize_integer(row.get("Planned Minutes"), Some(0)).unwrap_or(0),
            qc_weight,
            is_required: normalize_boolean(row.get("Is Required"), true),
            status: text(row, "Status").unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            notes: text(row, "Notes"),
        };
        candidates.push((record, exact));
    }

    let outcome = keep_last(candidates, |(jt, _)| (jt.job_id, jt.task_id));
    let labels: Vec<(String, usize)> = outcome
        .collisions
        .iter()
        .map(|((job_id, task_id), n)| (format!("{}/{}", job_id, task_id), *n))
        .collect();
    ctx.record_dedup(table, labels);

    // 补丁只针对保留下来的记录
    let mut out = Vec::with_capacity(outcome.kept.len());
    for (record, exact) in outcome.kept {
        if let Some(value) = exact {
            ctx.queue_patch(DeferredPatch {
                table,
                record_id: record.id,
                field: "qc_weight".to_string(),
                value: PatchValue::Decimal(value),
                code: record.task_code.clone(),
            });
        }
        out.push(record);
    }

    debug!(
        kept = out.len(),
        patches = ctx.pending_patches.len(),
        "作业任务转换完成"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::sheet::CellValue;
    use chrono::NaiveDate;

    fn ctx() -> LoadContext {
        LoadContext::new(Uuid::new_v4(), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap())
    }

    fn row(n: usize, pairs: &[(&str, CellValue)]) -> SheetRow {
        SheetRow::from_pairs(n, pairs)
    }

    fn seeded() -> (LoadContext, Uuid, Uuid) {
        let mut ctx = ctx();
        let job = Uuid::new_v4();
        let task = Uuid::new_v4();
        ctx.identities.register(EntityKind::SiteJob, "JOB-001", job);
        ctx.identities.register(EntityKind::Task, "TSK-001", task);
        (ctx, job, task)
    }

    fn job_task_row(n: usize, weight: CellValue) -> SheetRow {
        row(n, &[
            ("Job Code", "JOB-001".into()),
            ("Task Code", "TSK-001".into()),
            ("Qc Weight", weight),
        ])
    }

    #[test]
    fn test_split_qc_weight() {
        assert_eq!(split_qc_weight(2.5), (3, Some(2.5)));
        assert_eq!(split_qc_weight(3.0), (3, None));
        assert_eq!(split_qc_weight(2.005), (2, None));
    }

    #[test]
    fn test_decimal_weight_queues_exactly_one_patch() {
        let (mut ctx, _, _) = seeded();
        let out = transform_job_tasks(&[job_task_row(2, CellValue::Number(2.5))], &mut ctx);

        assert_eq!(out[0].qc_weight, 3);
        let patches = ctx.take_patches(Table::JobTasks);
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].record_id, out[0].id);
        assert_eq!(patches[0].value, PatchValue::Decimal(2.5));
    }

    #[test]
    fn test_integral_weight_queues_no_patch() {
        let (mut ctx, _, _) = seeded();
        let out = transform_job_tasks(&[job_task_row(2, CellValue::Number(3.0))], &mut ctx);
        assert_eq!(out[0].qc_weight, 3);
        assert!(ctx.pending_patches.is_empty());
    }

    #[test]
    fn test_job_tasks_keep_last_and_patch_only_survivor() {
        let (mut ctx, job, task) = seeded();
        let rows = vec![
            job_task_row(2, CellValue::Number(1.5)),
            job_task_row(3, CellValue::Number(4.0)),
        ];
        let out = transform_job_tasks(&rows, &mut ctx);

        assert_eq!(out.len(), 1);
        assert_eq!((out[0].job_id, out[0].task_id), (job, task));
        assert_eq!(out[0].qc_weight, 4);
        assert!(ctx.pending_patches.is_empty());
        assert_eq!(ctx.dedup[0].absorbed, 1);
    }

    #[test]
    fn test_site_jobs_duplicate_codes_and_optional_refs() {
        let mut ctx = ctx();
        ctx.identities.register(EntityKind::Site, "SIT-001", Uuid::new_v4());
        let rows = vec![
            row(2, &[
                ("Job Code", "JOB-001".into()),
                ("Job Name", "Nightly".into()),
                ("Site Code", "SIT-001".into()),
                ("Service Code", "SER-404".into()),
                ("Frequency", "5x Weekly".into()),
            ]),
            row(3, &[
                ("Job Code", "JOB-001".into()),
                ("Job Name", "Dup".into()),
                ("Site Code", "SIT-001".into()),
            ]),
        ];
        let jobs = transform_site_jobs(&rows, &mut ctx);

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_name, "Nightly");
        assert_eq!(jobs[0].frequency, "5X_WEEK");
        assert_eq!(jobs[0].billing_uom, "MONTHLY");
        assert_eq!(jobs[0].service_id, None);
        assert!(ctx.warnings.iter().any(|w| w.kind == WarningKind::DuplicateCode
            && w.code.as_deref() == Some("JOB-001")));
        assert!(ctx.warnings.iter().any(|w| w.kind == WarningKind::NulledReference
            && w.code.as_deref() == Some("SER-404")));
    }
}
