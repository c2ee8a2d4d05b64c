// ==========================================
// 清理顺序集成测试
// ==========================================
// 测试目标: 固定顺序在外键约束下成功；交换相邻依赖表后明确失败
// ==========================================


use gleamops_import::domain::PurgeStepOutcome;
use gleamops_import::engine::{ImportPipeline, PipelineOptions, PurgePlan};
use gleamops_import::repository::{BatchLoader, DataApi};
use std::sync::Arc;
use test_helpers::{count_rows, create_test_target, sample_workbook, tenant, today};

async fn loaded_target() -> Arc<dyn DataApi> {
    let api: Arc<dyn DataApi> = create_test_target();
    ImportPipeline::new(api.clone(), 100, PipelineOptions::new(tenant(), today()))
        .run(&mut sample_workbook())
        .await
        .unwrap();
    api
}

#[tokio::test]
async fn test_fixed_order_purges_everything() {
    let api = loaded_target().await;
    let loader = BatchLoader::new(api.clone(), 100);

    let results = PurgePlan::full().execute(&loader, tenant()).await;

    assert!(results
        .iter()
        .all(|r| r.outcome != PurgeStepOutcome::Failed));
    // 目标库中不存在的表按正常结果处理
    assert!(results
        .iter()
        .any(|r| r.table == "work_tickets" && r.outcome == PurgeStepOutcome::TableAbsent));
    for table in ["job_tasks", "site_jobs", "sites", "staff", "clients", "services"] {
        assert_eq!(count_rows(api.as_ref(), table).await, 0, "{} 未清空", table);
    }
}

#[tokio::test]
async fn test_swapped_order_fails_on_foreign_key() {
    let api = loaded_target().await;
    let loader = BatchLoader::new(api.clone(), 100);

    // clients 先于 sites: 站点仍引用客户
    let swapped = PurgePlan::with_order(
        &["job_tasks", "site_jobs", "clients", "sites"],
        &[],
    );
    let results = swapped.execute(&loader, tenant()).await;

    let clients = results.iter().find(|r| r.table == "clients").unwrap();
    assert_eq!(clients.outcome, PurgeStepOutcome::Failed);
    assert!(clients.detail.as_deref().unwrap_or("").contains("409"));

    // 单步失败后继续执行
    let sites = results.iter().find(|r| r.table == "sites").unwrap();
    assert_eq!(sites.outcome, PurgeStepOutcome::Deleted);
    assert_eq!(count_rows(api.as_ref(), "clients").await, 2);
}
