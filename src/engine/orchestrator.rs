// ==========================================
// 清洁业务数据导入 - 流水线编排器
// ==========================================
// 用途: 协调 清理 → 身份预载 → 按依赖顺序装载 → 延迟补丁 → 序列对齐
// 约定: 单线程顺序执行；一张表完全写入后才处理下一张
// ==========================================

use crate::domain::record::EntityRecord;
use crate::domain::report::{ImportReport, TableSummary, WarningKind};
use crate::domain::types::Table;
use crate::engine::identity_seeder::seed_unselected;
use crate::engine::purge::PurgePlan;
use crate::engine::sequence::reconcile_sequences;
use crate::importer::context::LoadContext;
use crate::importer::sheet::{SheetRow, WorkbookSource};
use crate::importer::transformers::{self, resolve_supervisor_patches};
use crate::repository::batch_loader::{BatchLoader, InsertOutcome};
use crate::repository::data_api::DataApi;
use crate::repository::error::ApiError;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// 流水线致命错误（行级问题不在此列）
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("身份映射预载失败: {0}")]
    SeedFailed(#[from] ApiError),
}

// ==========================================
// PipelineOptions - 运行参数
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub tenant_id: Uuid,
    /// 运行当日（日期缺省值）
    pub today: NaiveDate,
    /// 子集重载；None 表示全部表
    pub tables: Option<Vec<Table>>,
    /// 装载前清理
    pub purge: bool,
    /// 演练标记（仅写入报告）
    pub dry_run: bool,
}

impl PipelineOptions {
    pub fn new(tenant_id: Uuid, today: NaiveDate) -> Self {
        Self {
            tenant_id,
            today,
            tables: None,
            purge: true,
            dry_run: false,
        }
    }

    /// 按装载顺序排列的选中表
    pub fn selected_tables(&self) -> Vec<Table> {
        match &self.tables {
            Some(subset) => Table::LOAD_ORDER
                .iter()
                .copied()
                .filter(|t| subset.contains(t))
                .collect(),
            None => Table::LOAD_ORDER.to_vec(),
        }
    }
}

// ==========================================
// ImportPipeline - 导入流水线
// ==========================================
pub struct ImportPipeline {
    loader: BatchLoader,
    options: PipelineOptions,
}

impl ImportPipeline {
    pub fn new(api: Arc<dyn DataApi>, batch_size: usize, options: PipelineOptions) -> Self {
        Self {
            loader: BatchLoader::new(api, batch_size),
            options,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// 执行完整流水线
    ///
    /// # 返回
    /// 运行报告；行级失败只体现在报告中，不作为错误返回
    #[instrument(skip(self, workbook), fields(
        tenant = %self.options.tenant_id,
        target = %self.loader.api().describe(),
        source = %workbook.describe(),
        dry_run = self.options.dry_run
    ))]
    pub async fn run(&self, workbook: &mut dyn WorkbookSource) -> Result<ImportReport, PipelineError> {
        let started = Instant::now();
        let tenant_id = self.options.tenant_id;
        let selected = self.options.selected_tables();
        let subset = self.options.tables.is_some();
        let mut report = ImportReport::new(tenant_id, self.options.dry_run);

        info!(tables = selected.len(), subset, "开始导入");

        // ===== 步骤1: 清理 =====
        if self.options.purge {
            let plan = if subset {
                PurgePlan::subset(&selected)
            } else {
                PurgePlan::full()
            };
            report.purge = plan.execute(&self.loader, tenant_id).await;
        }

        // ===== 步骤2: 身份预载（仅子集重载） =====
        let mut ctx = LoadContext::new(tenant_id, self.options.today);
        if subset {
            let seeded = seed_unselected(self.loader.api().as_ref(), &selected, &mut ctx).await?;
            info!(seeded, "未选中表的身份映射已预载");
        }

        // ===== 步骤3: 按依赖顺序装载 =====
        for table in selected {
            self.load_table(table, workbook, &mut ctx, &mut report).await;
        }

        // ===== 步骤4: 序列对齐 =====
        report.sequences = reconcile_sequences(&self.loader, tenant_id, &ctx.identities).await;

        report.warnings = std::mem::take(&mut ctx.warnings);
        report.dedup = std::mem::take(&mut ctx.dedup);
        report.fuzzy_matches = std::mem::take(&mut ctx.fuzzy_matches);
        report.elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            inserted = report.total_inserted(),
            skipped = report.total_skipped(),
            warnings = report.warnings.len(),
            elapsed_ms = report.elapsed_ms,
            "导入完成"
        );
        Ok(report)
    }

    /// 读取工作表；缺失或读取失败时返回空并告警
    fn read_rows(
        &self,
        table: Table,
        workbook: &mut dyn WorkbookSource,
        ctx: &mut LoadContext,
    ) -> Vec<SheetRow> {
        let sheet = table.sheet_name();
        match workbook.read_sheet(sheet) {
            Ok(Some(rows)) => rows,
            Ok(None) => {
                ctx.warn(
                    table,
                    0,
                    None,
                    WarningKind::MissingSheet,
                    format!("工作表 '{}' 不存在，按 0 行处理", sheet),
                );
                Vec::new()
            }
            Err(e) => {
                error!(sheet, error = %e, "工作表读取失败");
                ctx.warn(
                    table,
                    0,
                    None,
                    WarningKind::MissingSheet,
                    format!("工作表 '{}' 读取失败: {}", sheet, e),
                );
                Vec::new()
            }
        }
    }

    async fn insert_and_record<R: EntityRecord>(
        &self,
        source_rows: usize,
        records: &[R],
        report: &mut ImportReport,
    ) -> InsertOutcome {
        let outcome = self.loader.insert(records).await;
        report.tables.push(TableSummary {
            table: R::TABLE,
            source_rows,
            attempted: records.len(),
            inserted: outcome.inserted,
            skipped: outcome.skipped.clone(),
        });
        outcome
    }

    /// 单表: 读取 → 转换 → 写入（→ 补丁）
    async fn load_table(
        &self,
        table: Table,
        workbook: &mut dyn WorkbookSource,
        ctx: &mut LoadContext,
        report: &mut ImportReport,
    ) {
        let rows = self.read_rows(table, workbook, ctx);
        let n = rows.len();
        info!(table = %table, rows = n, "开始装载");

        match table {
            Table::Lookups => {
                let records = transformers::transform_lookups(&rows, ctx);
                self.insert_and_record(n, &records, report).await;
            }
            Table::StaffPositions => {
                let records = transformers::transform_staff_positions(&rows, ctx);
                self.insert_and_record(n, &records, report).await;
            }
            Table::Services => {
                let records = transformers::transform_services(&rows, ctx);
                self.insert_and_record(n, &records, report).await;
            }
            Table::Tasks => {
                let records = transformers::transform_tasks(&rows, ctx);
                self.insert_and_record(n, &records, report).await;
            }
            Table::ServiceTasks => {
                let records = transformers::transform_service_tasks(&rows, ctx);
                self.insert_and_record(n, &records, report).await;
            }
            Table::Clients => {
                let records = transformers::transform_clients(&rows, ctx);
                self.insert_and_record(n, &records, report).await;
            }
            Table::Staff => {
                let staff = transformers::transform_staff(&rows, ctx);
                let outcome = self.insert_and_record(n, &staff.records, report).await;
                // 上级关系在员工全部写入后补丁
                let patches = resolve_supervisor_patches(&staff.supervisor_links, ctx);
                let mut summary = self
                    .loader
                    .apply_patches("supervisor_id", &patches, &outcome.failed_ids)
                    .await;
                summary.table = Some(Table::Staff);
                report.patches.push(summary);
            }
            Table::Sites => {
                let records = transformers::transform_sites(&rows, ctx);
                self.insert_and_record(n, &records, report).await;
            }
            Table::Subcontractors => {
                let records = transformers::transform_subcontractors(&rows, ctx);
                self.insert_and_record(n, &records, report).await;
            }
            Table::SiteJobs => {
                let records = transformers::transform_site_jobs(&rows, ctx);
                self.insert_and_record(n, &records, report).await;
            }
            Table::JobTasks => {
                let records = transformers::transform_job_tasks(&rows, ctx);
                let outcome = self.insert_and_record(n, &records, report).await;
                let patches = ctx.take_patches(Table::JobTasks);
                let mut summary = self
                    .loader
                    .apply_patches("qc_weight", &patches, &outcome.failed_ids)
                    .await;
                summary.table = Some(Table::JobTasks);
                report.patches.push(summary);
            }
            Table::SupplyCatalog => {
                let records = transformers::transform_supply_catalog(&rows, ctx);
                self.insert_and_record(n, &records, report).await;
            }
            Table::Equipment => {
                let records = transformers::transform_equipment(&rows, ctx);
                self.insert_and_record(n, &records, report).await;
            }
            Table::EquipmentAssignments => {
                let records = transformers::transform_equipment_assignments(&rows, ctx);
                self.insert_and_record(n, &records, report).await;
            }
            Table::SiteSupplies => {
                let records = transformers::transform_site_supplies(&rows, ctx);
                self.insert_and_record(n, &records, report).await;
            }
            Table::InventoryCounts => {
                let records = transformers::transform_inventory_counts(&rows, ctx);
                self.insert_and_record(n, &records, report).await;
            }
            Table::InventoryCountDetails => {
                let records = transformers::transform_inventory_count_details(&rows, ctx);
                self.insert_and_record(n, &records, report).await;
            }
        }
    }
}
