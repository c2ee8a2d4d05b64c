// ==========================================
// 清洁业务数据导入 - 装载上下文
// ==========================================
// 职责: 一次运行内的全部可变状态（身份映射、告警、延迟补丁、台账）
// 约定: 由流水线独占，以 &mut 传给各转换器；运行结束即丢弃
// ==========================================

use crate::domain::report::{DedupEntry, DeferredPatch, FuzzyMatch, RowWarning, WarningKind};
use crate::domain::types::{EntityKind, Table};
use crate::importer::identity_map::IdentityMap;
use crate::importer::supply_matcher::SupplyNameIndex;
use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug)]
pub struct LoadContext {
    pub tenant_id: Uuid,
    pub today: NaiveDate, // 日期缺省值（运行当日）
    pub identities: IdentityMap,
    pub supplies: SupplyNameIndex,
    pub warnings: Vec<RowWarning>,
    pub pending_patches: Vec<DeferredPatch>,
    pub fuzzy_matches: Vec<FuzzyMatch>,
    pub dedup: Vec<DedupEntry>,
}

impl LoadContext {
    pub fn new(tenant_id: Uuid, today: NaiveDate) -> Self {
        Self {
            tenant_id,
            today,
            identities: IdentityMap::new(),
            supplies: SupplyNameIndex::new(),
            warnings: Vec::new(),
            pending_patches: Vec::new(),
            fuzzy_matches: Vec::new(),
            dedup: Vec::new(),
        }
    }

    /// 记录行级告警（同时输出 WARN 日志）
    pub fn warn(
        &mut self,
        table: Table,
        row_number: usize,
        code: Option<&str>,
        kind: WarningKind,
        message: impl Into<String>,
    ) {
        let message = message.into();
        warn!(
            table = %table,
            row = row_number,
            code = code.unwrap_or("-"),
            kind = ?kind,
            "{}",
            message
        );
        self.warnings.push(RowWarning {
            table,
            row_number,
            code: code.map(str::to_string),
            kind,
            message,
        });
    }

    /// 必需字段为空
    pub fn missing_identifier(&mut self, table: Table, row_number: usize, field: &str) {
        self.warn(
            table,
            row_number,
            None,
            WarningKind::MissingIdentifier,
            format!("缺少必需字段 {}，行已跳过", field),
        );
    }

    /// 解析必需引用；失败时记录告警（含代码），调用方丢弃该行
    pub fn resolve_required(
        &mut self,
        table: Table,
        row_number: usize,
        kind: EntityKind,
        code: &str,
    ) -> Option<Uuid> {
        let resolved = self.identities.resolve(kind, code);
        if resolved.is_none() {
            self.warn(
                table,
                row_number,
                Some(code),
                WarningKind::UnresolvedReference,
                format!("未知的 {} 代码 {}，行已跳过", kind, code),
            );
        }
        resolved
    }

    /// 解析可选引用；代码存在但无法解析时写入 null 并告警
    pub fn resolve_optional(
        &mut self,
        table: Table,
        row_number: usize,
        kind: EntityKind,
        code: Option<&str>,
    ) -> Option<Uuid> {
        let code = code?;
        let resolved = self.identities.resolve(kind, code);
        if resolved.is_none() {
            self.warn(
                table,
                row_number,
                Some(code),
                WarningKind::NulledReference,
                format!("未知的 {} 代码 {}，引用置空", kind, code),
            );
        }
        resolved
    }

    /// 记录去重冲突（每个冲突键一条，含被合并行数）
    pub fn record_dedup<I>(&mut self, table: Table, collisions: I)
    where
        I: IntoIterator<Item = (String, usize)>,
    {
        let mut total = 0;
        for (key, absorbed) in collisions {
            total += absorbed;
            self.dedup.push(DedupEntry {
                table,
                key,
                absorbed,
            });
        }
        if total > 0 {
            info!(table = %table, absorbed = total, "去重: 合并重复行");
        }
    }

    pub fn queue_patch(&mut self, patch: DeferredPatch) {
        self.pending_patches.push(patch);
    }

    /// 取出某表的全部待执行补丁
    pub fn take_patches(&mut self, table: Table) -> Vec<DeferredPatch> {
        let (taken, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending_patches)
            .into_iter()
            .partition(|p| p.table == table);
        self.pending_patches = rest;
        taken
    }

    pub fn warnings_for(&self, table: Table) -> impl Iterator<Item = &RowWarning> {
        self.warnings.iter().filter(move |w| w.table == table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::PatchValue;

    fn ctx() -> LoadContext {
        LoadContext::new(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        )
    }

    #[test]
    fn test_resolve_required_warns_with_code() {
        let mut ctx = ctx();
        assert!(ctx
            .resolve_required(Table::Sites, 5, EntityKind::Client, "CLI-404")
            .is_none());

        let warning = &ctx.warnings[0];
        assert_eq!(warning.kind, WarningKind::UnresolvedReference);
        assert_eq!(warning.code.as_deref(), Some("CLI-404"));
        assert!(warning.message.contains("CLI-404"));
        assert_eq!(warning.row_number, 5);
    }

    #[test]
    fn test_resolve_optional_absent_code_is_silent() {
        let mut ctx = ctx();
        assert!(ctx
            .resolve_optional(Table::Sites, 2, EntityKind::Staff, None)
            .is_none());
        assert!(ctx.warnings.is_empty());

        assert!(ctx
            .resolve_optional(Table::Sites, 2, EntityKind::Staff, Some("STF-9"))
            .is_none());
        assert_eq!(ctx.warnings[0].kind, WarningKind::NulledReference);
    }

    #[test]
    fn test_take_patches_by_table() {
        let mut ctx = ctx();
        for table in [Table::Staff, Table::JobTasks, Table::Staff] {
            ctx.queue_patch(DeferredPatch {
                table,
                record_id: Uuid::new_v4(),
                field: "f".to_string(),
                value: PatchValue::Decimal(1.5),
                code: "X".to_string(),
            });
        }
        assert_eq!(ctx.take_patches(Table::Staff).len(), 2);
        assert_eq!(ctx.pending_patches.len(), 1);
        assert!(ctx.take_patches(Table::Staff).is_empty());
    }
}
