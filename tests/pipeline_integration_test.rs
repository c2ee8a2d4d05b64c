// ==========================================
// 导入流水线集成测试
// ==========================================
// 测试目标: 在外键约束开启的 SQLite 目标上验证完整装载流程
// ==========================================


use gleamops_import::domain::{Table, WarningKind};
use gleamops_import::engine::{ImportPipeline, PipelineOptions};
use gleamops_import::importer::{open_workbook, InMemoryWorkbook};
use gleamops_import::logging;
use gleamops_import::repository::DataApi;
use std::sync::Arc;
use tempfile::TempDir;
use test_helpers::{
    cells, count_rows, create_test_target, find_by_code, rows_of, sample_workbook, str_field,
    tenant, today, write_csv_sheet,
};

fn pipeline(api: Arc<dyn DataApi>, tables: Option<Vec<Table>>) -> ImportPipeline {
    let mut options = PipelineOptions::new(tenant(), today());
    options.tables = tables;
    ImportPipeline::new(api, 100, options)
}

#[tokio::test]
async fn test_full_run_loads_core_tables() {
    logging::init_test();

    let target = create_test_target();
    let api: Arc<dyn DataApi> = target.clone();
    let mut workbook = sample_workbook();

    let report = pipeline(api.clone(), None).run(&mut workbook).await.unwrap();

    assert_eq!(count_rows(api.as_ref(), "services").await, 3);
    assert_eq!(count_rows(api.as_ref(), "tasks").await, 3);
    assert_eq!(count_rows(api.as_ref(), "service_tasks").await, 2);
    assert_eq!(count_rows(api.as_ref(), "clients").await, 2);
    assert_eq!(count_rows(api.as_ref(), "staff").await, 2);
    assert_eq!(count_rows(api.as_ref(), "sites").await, 2);
    assert_eq!(count_rows(api.as_ref(), "site_jobs").await, 2);
    assert_eq!(count_rows(api.as_ref(), "job_tasks").await, 3);

    let service_tasks = report.table(Table::ServiceTasks).unwrap();
    assert_eq!(service_tasks.source_rows, 4);
    assert_eq!(service_tasks.inserted, 2);
    assert_eq!(report.total_skipped(), 0);
    assert_eq!(report.failed_purge_steps(), 0);

    // 缺失的工作表按 0 行处理
    assert!(report
        .warnings
        .iter()
        .any(|w| w.table == Table::Lookups && w.kind == WarningKind::MissingSheet));
    assert_eq!(report.table(Table::Lookups).unwrap().attempted, 0);
}

#[tokio::test]
async fn test_unresolved_references_are_reported_by_code() {
    let api: Arc<dyn DataApi> = create_test_target();
    let mut workbook = sample_workbook();

    let report = pipeline(api.clone(), None).run(&mut workbook).await.unwrap();

    // 必需引用: 行被丢弃
    let dropped = report
        .warnings
        .iter()
        .find(|w| w.kind == WarningKind::UnresolvedReference && w.table == Table::Sites)
        .expect("站点客户引用告警");
    assert_eq!(dropped.code.as_deref(), Some("CLI-404"));
    assert!(find_by_code(api.as_ref(), "sites", "site_code", "SIT-003", &["id"])
        .await
        .is_none());

    // 可选引用: 写入 null
    assert!(report.warnings.iter().any(|w| w.kind == WarningKind::NulledReference
        && w.code.as_deref() == Some("STF-9999")));
    let plant = find_by_code(api.as_ref(), "sites", "site_code", "SIT-002", &["supervisor_id"])
        .await
        .unwrap();
    assert!(plant["supervisor_id"].is_null());

    assert!(report.warnings.iter().any(|w| w.kind == WarningKind::UnresolvedReference
        && w.code.as_deref() == Some("SER-999")));
    assert!(report.warnings.iter().any(|w| w.kind == WarningKind::JunkRow));
}

#[tokio::test]
async fn test_staff_variants_and_supervisor_patch() {
    let api: Arc<dyn DataApi> = create_test_target();
    let mut workbook = sample_workbook();

    let report = pipeline(api.clone(), None).run(&mut workbook).await.unwrap();

    let lead = find_by_code(
        api.as_ref(),
        "staff",
        "staff_code",
        "STF-1001",
        &["id", "last_name", "mobile_phone", "role"],
    )
    .await
    .expect("STF-1001 已写入");
    // B 行优先
    assert_eq!(str_field(&lead, "last_name"), Some("Full"));
    assert_eq!(str_field(&lead, "mobile_phone"), Some("555-0101"));
    assert_eq!(str_field(&lead, "role"), Some("SUPERVISOR"));

    let ben = find_by_code(api.as_ref(), "staff", "staff_code", "STF-1002", &["supervisor_id"])
        .await
        .unwrap();
    assert_eq!(ben["supervisor_id"], lead["id"]);

    // 站点主管通过原始变体代码解析
    let hq = find_by_code(api.as_ref(), "sites", "site_code", "SIT-001", &["supervisor_id"])
        .await
        .unwrap();
    assert_eq!(hq["supervisor_id"], lead["id"]);

    let staff_patch = report
        .patches
        .iter()
        .find(|p| p.table == Some(Table::Staff))
        .unwrap();
    assert_eq!(staff_patch.applied, 1);
    assert_eq!(staff_patch.failed, 0);
}

#[tokio::test]
async fn test_decimal_qc_weight_is_patched_after_insert() {
    let api: Arc<dyn DataApi> = create_test_target();
    let mut workbook = sample_workbook();

    let report = pipeline(api.clone(), None).run(&mut workbook).await.unwrap();

    let rows = rows_of(api.as_ref(), "job_tasks", &["task_code", "qc_weight"]).await;
    let weight = |code: &str| {
        rows.iter()
            .find(|r| str_field(r, "task_code") == Some(code))
            .and_then(|r| r["qc_weight"].as_f64())
            .unwrap()
    };
    assert_eq!(weight("TSK-001"), 2.5);
    assert_eq!(weight("TSK-002"), 3.0);
    assert_eq!(weight("TSK-010"), 1.0);

    let qc_patch = report
        .patches
        .iter()
        .find(|p| p.table == Some(Table::JobTasks))
        .unwrap();
    assert_eq!(qc_patch.field, "qc_weight");
    assert_eq!(qc_patch.queued, 1);
    assert_eq!(qc_patch.applied, 1);
}

#[tokio::test]
async fn test_rerun_with_purge_is_repeatable() {
    let api: Arc<dyn DataApi> = create_test_target();

    let first = pipeline(api.clone(), None)
        .run(&mut sample_workbook())
        .await
        .unwrap();
    let second = pipeline(api.clone(), None)
        .run(&mut sample_workbook())
        .await
        .unwrap();

    assert_eq!(first.total_inserted(), second.total_inserted());
    assert_eq!(second.failed_purge_steps(), 0);
    assert_eq!(count_rows(api.as_ref(), "staff").await, 2);
    assert_eq!(count_rows(api.as_ref(), "job_tasks").await, 3);
}

#[tokio::test]
async fn test_subset_reload_seeds_identities_from_target() {
    let api: Arc<dyn DataApi> = create_test_target();
    pipeline(api.clone(), None)
        .run(&mut sample_workbook())
        .await
        .unwrap();

    let job = find_by_code(api.as_ref(), "site_jobs", "job_code", "JOB-001", &["id"])
        .await
        .unwrap();

    // 仅重载作业任务: 作业 / 任务身份来自目标库
    let report = pipeline(api.clone(), Some(vec![Table::JobTasks]))
        .run(&mut sample_workbook())
        .await
        .unwrap();

    assert_eq!(report.tables.len(), 1);
    assert_eq!(report.purge.len(), 1);
    assert_eq!(report.purge[0].table, "job_tasks");
    assert_eq!(report.table(Table::JobTasks).unwrap().inserted, 3);
    assert!(report
        .warnings
        .iter()
        .all(|w| w.kind != WarningKind::UnresolvedReference));

    let rows = rows_of(api.as_ref(), "job_tasks", &["job_id", "task_code"]).await;
    assert_eq!(rows.len(), 3);
    let hq_tasks = rows.iter().filter(|r| r["job_id"] == job["id"]).count();
    assert_eq!(hq_tasks, 2);

    // 未选中的表保持不变
    assert_eq!(count_rows(api.as_ref(), "site_jobs").await, 2);
}

#[tokio::test]
async fn test_csv_directory_workbook() {
    let dir = TempDir::new().unwrap();
    write_csv_sheet(
        dir.path(),
        "Service",
        &["Service Code,Service Name", "SER-001,Office Cleaning", "SER-002,Carpet Care"],
    )
    .unwrap();
    write_csv_sheet(
        dir.path(),
        "Client",
        &[
            "Client Code,Client Name,Client Status",
            "CLI-001,Acme Corp,Active",
            ",Nameless,Active",
        ],
    )
    .unwrap();

    let api: Arc<dyn DataApi> = create_test_target();
    let mut workbook = open_workbook(dir.path()).unwrap();
    let report = pipeline(api.clone(), None)
        .run(workbook.as_mut())
        .await
        .unwrap();

    assert_eq!(count_rows(api.as_ref(), "services").await, 2);
    assert_eq!(count_rows(api.as_ref(), "clients").await, 1);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.table == Table::Clients && w.kind == WarningKind::MissingIdentifier));

    let acme = find_by_code(api.as_ref(), "clients", "client_code", "CLI-001", &["status"])
        .await
        .unwrap();
    assert_eq!(str_field(&acme, "status"), Some("ACTIVE"));
}

#[tokio::test]
async fn test_duplicate_parent_code_keeps_children_linked() {
    let api: Arc<dyn DataApi> = create_test_target();
    let mut workbook = InMemoryWorkbook::new()
        .with_sheet(
            "Client",
            &["Client Code", "Client Name"],
            vec![cells(&["CLI-001", "Acme Corp"]), cells(&["CLI-001", "Acme Corp (copy)"])],
        )
        .with_sheet(
            "Site",
            &["Site Code", "Site Name", "Client Code"],
            vec![cells(&["SIT-001", "Acme HQ", "CLI-001"])],
        );

    let report = pipeline(api.clone(), None).run(&mut workbook).await.unwrap();

    let clients = report.table(Table::Clients).unwrap();
    assert_eq!((clients.attempted, clients.inserted), (1, 1));
    let sites = report.table(Table::Sites).unwrap();
    assert_eq!(sites.inserted, 1);
    assert!(sites.skipped.is_empty());

    let acme = find_by_code(api.as_ref(), "clients", "client_code", "CLI-001", &["id", "name"])
        .await
        .unwrap();
    assert_eq!(str_field(&acme, "name"), Some("Acme Corp"));
    let hq = find_by_code(api.as_ref(), "sites", "site_code", "SIT-001", &["client_id"])
        .await
        .unwrap();
    assert_eq!(hq["client_id"], acme["id"]);

    assert!(report
        .dedup
        .iter()
        .any(|d| d.table == Table::Clients && d.key == "CLI-001" && d.absorbed == 1));
    assert!(report.warnings.iter().any(|w| w.table == Table::Clients
        && w.kind == WarningKind::DuplicateCode
        && w.code.as_deref() == Some("CLI-001")));
}

#[tokio::test]
async fn test_subset_reload_resolves_staff_variant_codes() {
    let api: Arc<dyn DataApi> = create_test_target();
    pipeline(api.clone(), None)
        .run(&mut sample_workbook())
        .await
        .unwrap();

    let lead = find_by_code(api.as_ref(), "staff", "staff_code", "STF-1001", &["id"])
        .await
        .unwrap();

    // 站点表以 STF-1001-B 引用主管；员工身份来自目标库
    let report = pipeline(
        api.clone(),
        Some(vec![Table::Sites, Table::SiteJobs, Table::JobTasks]),
    )
    .run(&mut sample_workbook())
    .await
    .unwrap();

    let nulled: Vec<_> = report
        .warnings
        .iter()
        .filter(|w| w.kind == WarningKind::NulledReference)
        .filter_map(|w| w.code.as_deref())
        .collect();
    assert_eq!(nulled, vec!["STF-9999"]);

    let hq = find_by_code(api.as_ref(), "sites", "site_code", "SIT-001", &["supervisor_id"])
        .await
        .unwrap();
    assert_eq!(hq["supervisor_id"], lead["id"]);
}
