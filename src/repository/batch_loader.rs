// ==========================================
// 清洁业务数据导入 - 批量装载器
// ==========================================
// 职责: 分批写入 → 失败批次降级为逐条写入；租户范围清理；部分更新
// 红线: 单条记录失败只跳过该条，不中断剩余记录或后续表
// 约定: 传输失败与约束违反同等对待（均触发降级），无退避重试
// ==========================================

use crate::domain::record::EntityRecord;
use crate::domain::report::{
    DeferredPatch, PatchSummary, PurgeStepOutcome, PurgeStepResult, SkippedRecord,
};
use crate::repository::data_api::{DataApi, Filter, Row};
use crate::repository::error::{ApiError, ApiResult};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 默认批大小
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// 清理范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeScope {
    /// 仅删除该租户的行
    Tenant(Uuid),
    /// 全局表: 删除全部行
    Global,
}

/// 单表写入结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertOutcome {
    pub inserted: usize,
    pub skipped: Vec<SkippedRecord>,
    pub failed_ids: HashSet<Uuid>,
}

impl InsertOutcome {
    fn skip(&mut self, id: Uuid, code: String, err: &ApiError) {
        self.failed_ids.insert(id);
        self.skipped.push(SkippedRecord {
            code,
            detail: err.to_string(),
        });
    }
}

// ==========================================
// BatchLoader
// ==========================================
pub struct BatchLoader {
    api: Arc<dyn DataApi>,
    batch_size: usize,
}

impl BatchLoader {
    pub fn new(api: Arc<dyn DataApi>, batch_size: usize) -> Self {
        Self {
            api,
            batch_size: batch_size.max(1),
        }
    }

    pub fn api(&self) -> &Arc<dyn DataApi> {
        &self.api
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// 分批写入记录
    ///
    /// # 返回
    /// 写入条数、跳过明细（业务代码 + 错误）、失败记录 id（供补丁阶段排除）
    pub async fn insert<R: EntityRecord>(&self, records: &[R]) -> InsertOutcome {
        let table = R::TABLE.as_str();
        let mut outcome = InsertOutcome::default();

        // 序列化失败的记录直接跳过
        let mut encoded: Vec<(&R, Value)> = Vec::with_capacity(records.len());
        for record in records {
            match serde_json::to_value(record) {
                Ok(v) => encoded.push((record, v)),
                Err(e) => {
                    let err = ApiError::encode(e.to_string());
                    error!(table, code = %record.business_code(), error = %err, "记录序列化失败，已跳过");
                    outcome.skip(record.id(), record.business_code(), &err);
                }
            }
        }

        for (batch_no, chunk) in encoded.chunks(self.batch_size).enumerate() {
            let values: Vec<Value> = chunk.iter().map(|(_, v)| v.clone()).collect();
            match self.api.insert(table, &values).await {
                Ok(()) => {
                    outcome.inserted += chunk.len();
                    debug!(table, batch = batch_no, rows = chunk.len(), "批次写入成功");
                }
                Err(err) if err.is_table_absent() => {
                    // 逐条重试没有意义
                    error!(table, rows = chunk.len(), error = %err, "目标表不存在，批次跳过");
                    for (record, _) in chunk {
                        outcome.skip(record.id(), record.business_code(), &err);
                    }
                }
                Err(err) => {
                    warn!(table, batch = batch_no, error = %err, "批次写入失败，降级为逐条写入");
                    for (record, value) in chunk {
                        match self.api.insert(table, std::slice::from_ref(value)).await {
                            Ok(()) => outcome.inserted += 1,
                            Err(err) => {
                                error!(
                                    table,
                                    code = %record.business_code(),
                                    error = %err,
                                    "记录写入失败，已跳过"
                                );
                                outcome.skip(record.id(), record.business_code(), &err);
                            }
                        }
                    }
                }
            }
        }

        info!(
            table,
            inserted = outcome.inserted,
            skipped = outcome.skipped.len(),
            "表写入完成"
        );
        outcome
    }

    /// 清理一张表；表不存在为正常结果
    pub async fn purge(&self, table: &str, scope: PurgeScope) -> PurgeStepResult {
        let mut filters = vec![Filter::not_null("id")];
        if let PurgeScope::Tenant(tenant_id) = scope {
            filters.push(Filter::eq("tenant_id", tenant_id));
        }

        match self.api.delete(table, &filters).await {
            Ok(()) => {
                debug!(table, "清理完成");
                PurgeStepResult {
                    table: table.to_string(),
                    outcome: PurgeStepOutcome::Deleted,
                    detail: None,
                }
            }
            Err(err) if err.is_table_absent() => {
                debug!(table, "表不存在，跳过清理");
                PurgeStepResult {
                    table: table.to_string(),
                    outcome: PurgeStepOutcome::TableAbsent,
                    detail: None,
                }
            }
            Err(err) => {
                error!(table, error = %err, "清理失败，继续后续步骤");
                PurgeStepResult {
                    table: table.to_string(),
                    outcome: PurgeStepOutcome::Failed,
                    detail: Some(err.to_string()),
                }
            }
        }
    }

    /// 按 id 部分更新一条记录
    pub async fn patch(&self, table: &str, id: Uuid, fields: &Row) -> ApiResult<()> {
        self.api.patch(table, &[Filter::eq("id", id)], fields).await
    }

    /// 执行同一字段的一组延迟补丁；目标记录写入失败的补丁跳过
    pub async fn apply_patches(
        &self,
        field: &str,
        patches: &[DeferredPatch],
        failed_ids: &HashSet<Uuid>,
    ) -> PatchSummary {
        let mut summary = PatchSummary {
            table: patches.first().map(|p| p.table),
            field: field.to_string(),
            queued: patches.len(),
            ..PatchSummary::default()
        };

        for patch in patches {
            if failed_ids.contains(&patch.record_id) {
                summary.skipped += 1;
                continue;
            }
            let mut fields = Row::new();
            fields.insert(patch.field.clone(), patch.value.to_json());
            match self.patch(patch.table.as_str(), patch.record_id, &fields).await {
                Ok(()) => summary.applied += 1,
                Err(err) => {
                    summary.failed += 1;
                    warn!(
                        table = %patch.table,
                        code = %patch.code,
                        field = %patch.field,
                        error = %err,
                        "补丁失败"
                    );
                }
            }
        }

        info!(
            field,
            applied = summary.applied,
            skipped = summary.skipped,
            failed = summary.failed,
            "补丁执行完成"
        );
        summary
    }
}
