// ==========================================
// 批量装载器集成测试
// ==========================================
// 测试目标: 批次失败降级为逐条写入；表不存在整批跳过；补丁排除失败记录
// ==========================================


use gleamops_import::domain::{DeferredPatch, PatchValue, Service, ServiceTask, Table, Task};
use gleamops_import::db::open_sqlite_connection;
use gleamops_import::repository::{BatchLoader, DataApi, SqliteDataApi};
use std::collections::HashSet;
use std::sync::Arc;
use test_helpers::{count_rows, create_test_target, tenant};
use uuid::Uuid;

fn service(code: &str) -> Service {
    Service {
        id: Uuid::new_v4(),
        tenant_id: tenant(),
        service_code: code.to_string(),
        name: format!("Service {}", code),
        description: None,
    }
}

fn task(code: &str) -> Task {
    Task {
        id: Uuid::new_v4(),
        tenant_id: tenant(),
        task_code: code.to_string(),
        name: format!("Task {}", code),
        category: None,
        subcategory: None,
        area_type: None,
        floor_type: None,
        priority_level: None,
        default_minutes: Some(10),
        production_rate_sqft_per_hour: None,
        unit_code: "SQFT_1000".to_string(),
        spec_description: None,
        work_description: None,
        tools_materials: None,
        notes: None,
        is_active: true,
    }
}

fn service_task(service_id: Uuid, task_id: Uuid, n: usize) -> ServiceTask {
    ServiceTask {
        id: Uuid::new_v4(),
        tenant_id: tenant(),
        service_id,
        task_id,
        frequency_default: "DAILY".to_string(),
        sequence_order: n as i64,
        priority_level: None,
        is_required: true,
        estimated_minutes: None,
        quality_weight: 1.0,
        notes: None,
        source_codes: format!("ST-{}", n),
    }
}

#[tokio::test]
async fn test_one_malformed_record_degrades_batch() {
    let api: Arc<dyn DataApi> = create_test_target();
    let loader = BatchLoader::new(api.clone(), 100);

    let ser = service("SER-001");
    let tsk = task("TSK-001");
    assert_eq!(loader.insert(std::slice::from_ref(&ser)).await.inserted, 1);
    assert_eq!(loader.insert(std::slice::from_ref(&tsk)).await.inserted, 1);

    // 100 条中第 42 条引用不存在的任务
    let mut records: Vec<ServiceTask> = (0..100)
        .map(|n| service_task(ser.id, tsk.id, n))
        .collect();
    records[42].task_id = Uuid::new_v4();
    let bad_id = records[42].id;

    let outcome = loader.insert(&records).await;

    assert_eq!(outcome.inserted, 99);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].code, "ST-42");
    assert!(outcome.skipped[0].detail.contains("409"));
    assert!(outcome.failed_ids.contains(&bad_id));
    assert_eq!(count_rows(api.as_ref(), "service_tasks").await, 99);
}

#[tokio::test]
async fn test_duplicate_codes_are_ignored_not_failed() {
    let api: Arc<dyn DataApi> = create_test_target();
    let loader = BatchLoader::new(api.clone(), 10);

    let first = loader.insert(&[service("SER-001")]).await;
    let again = loader.insert(&[service("SER-001"), service("SER-002")]).await;

    assert_eq!(first.inserted, 1);
    assert!(again.skipped.is_empty());
    assert_eq!(count_rows(api.as_ref(), "services").await, 2);
}

#[tokio::test]
async fn test_missing_table_skips_without_retry() {
    // 未建立目标表结构的连接
    let conn = open_sqlite_connection(":memory:").unwrap();
    let api: Arc<dyn DataApi> = Arc::new(SqliteDataApi::from_connection(conn, "empty".to_string()));
    let loader = BatchLoader::new(api.clone(), 5);

    let records: Vec<Service> = (0..7).map(|n| service(&format!("SER-{:03}", n))).collect();
    let outcome = loader.insert(&records).await;

    assert_eq!(outcome.inserted, 0);
    assert_eq!(outcome.skipped.len(), 7);
    assert!(outcome.skipped.iter().all(|s| s.detail.contains("404")));
}

#[tokio::test]
async fn test_patches_skip_failed_records() {
    let api: Arc<dyn DataApi> = create_test_target();
    let loader = BatchLoader::new(api.clone(), 100);

    let tasks = vec![task("TSK-001"), task("TSK-002")];
    loader.insert(&tasks).await;

    let field = "production_rate_sqft_per_hour";
    let patch = |record_id: Uuid| DeferredPatch {
        table: Table::Tasks,
        record_id,
        field: field.to_string(),
        value: PatchValue::Decimal(2.5),
        code: "TSK".to_string(),
    };
    let failed: HashSet<Uuid> = [tasks[1].id].into_iter().collect();
    let summary = loader
        .apply_patches(field, &[patch(tasks[0].id), patch(tasks[1].id)], &failed)
        .await;

    assert_eq!(summary.table, Some(Table::Tasks));
    assert_eq!(summary.queued, 2);
    assert_eq!(summary.applied, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
}
