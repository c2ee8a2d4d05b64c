// ==========================================
// 清洁业务数据导入 - 运行报告模型
// ==========================================
// 职责: 一次装载运行的全部可观测结果
// 用途: 日志摘要 + --report JSON 输出
// ==========================================

use crate::domain::types::Table;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// RowWarning - 行级告警
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningKind {
    MissingSheet,        // 工作表不存在
    SchemaDrift,         // 位置映射表头与预期不符
    MissingIdentifier,   // 必需代码/名称为空
    UnresolvedReference, // 必需引用无法解析，行被丢弃
    NulledReference,     // 可选引用无法解析，写入 null
    DuplicateCode,       // 重复业务代码
    JunkRow,             // 表头回显等无效行
    LowConfidenceMatch,  // 耗材名称前缀匹配
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowWarning {
    pub table: Table,
    pub row_number: usize,    // 工作表行号（表头为第 1 行）
    pub code: Option<String>, // 触发告警的代码
    pub kind: WarningKind,
    pub message: String,
}

// ==========================================
// 去重 / 模糊匹配台账
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedupEntry {
    pub table: Table,
    pub key: String,     // 冲突键
    pub absorbed: usize, // 被合并的行数
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyMatch {
    pub row_number: usize,
    pub source_name: String,  // 明细中的描述（已去除 [CODE]）
    pub matched_name: String, // 命中的目录名称
    pub supply_code: String,
}

// ==========================================
// DeferredPatch - 延迟补丁
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatchValue {
    Id(Uuid),
    Decimal(f64),
}

impl PatchValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PatchValue::Id(id) => serde_json::Value::String(id.to_string()),
            PatchValue::Decimal(v) => serde_json::json!(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredPatch {
    pub table: Table,
    pub record_id: Uuid,
    pub field: String,
    pub value: PatchValue,
    pub code: String, // 目标记录业务代码
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchSummary {
    pub table: Option<Table>,
    pub field: String,
    pub queued: usize,
    pub applied: usize,
    pub skipped: usize, // 目标记录未写入
    pub failed: usize,
}

// ==========================================
// 装载 / 清理 / 序列结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub code: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub table: Table,
    pub source_rows: usize, // 工作表非空行数
    pub attempted: usize,   // 转换后记录数
    pub inserted: usize,
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurgeStepOutcome {
    Deleted,
    TableAbsent,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurgeStepResult {
    pub table: String,
    pub outcome: PurgeStepOutcome,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceUpdate {
    pub prefix: String,
    pub value: i64,
    pub persisted: bool,
    pub error: Option<String>,
}

// ==========================================
// ImportReport - 运行报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub run_id: Uuid,
    pub tenant_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub dry_run: bool,
    pub purge: Vec<PurgeStepResult>,
    pub tables: Vec<TableSummary>,
    pub warnings: Vec<RowWarning>,
    pub dedup: Vec<DedupEntry>,
    pub fuzzy_matches: Vec<FuzzyMatch>,
    pub patches: Vec<PatchSummary>,
    pub sequences: Vec<SequenceUpdate>,
}

impl ImportReport {
    pub fn new(tenant_id: Uuid, dry_run: bool) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            tenant_id,
            started_at: Utc::now(),
            elapsed_ms: 0,
            dry_run,
            purge: Vec::new(),
            tables: Vec::new(),
            warnings: Vec::new(),
            dedup: Vec::new(),
            fuzzy_matches: Vec::new(),
            patches: Vec::new(),
            sequences: Vec::new(),
        }
    }

    pub fn table(&self, table: Table) -> Option<&TableSummary> {
        self.tables.iter().find(|s| s.table == table)
    }

    pub fn total_inserted(&self) -> usize {
        self.tables.iter().map(|s| s.inserted).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.tables.iter().map(|s| s.skipped.len()).sum()
    }

    pub fn failed_purge_steps(&self) -> usize {
        self.purge
            .iter()
            .filter(|p| p.outcome == PurgeStepOutcome::Failed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_value_serializes_untagged() {
        let id = Uuid::new_v4();
        assert_eq!(
            serde_json::to_value(PatchValue::Id(id)).unwrap(),
            serde_json::Value::String(id.to_string())
        );
        assert_eq!(PatchValue::Decimal(2.5).to_json(), serde_json::json!(2.5));
    }

    #[test]
    fn test_report_totals() {
        let mut report = ImportReport::new(Uuid::new_v4(), true);
        report.tables.push(TableSummary {
            table: Table::Clients,
            source_rows: 3,
            attempted: 3,
            inserted: 2,
            skipped: vec![SkippedRecord {
                code: "CLI-003".to_string(),
                detail: "rejected".to_string(),
            }],
        });
        assert_eq!(report.total_inserted(), 2);
        assert_eq!(report.total_skipped(), 1);
        assert!(report.table(Table::Clients).is_some());
        assert!(report.table(Table::Sites).is_none());
    }
}
