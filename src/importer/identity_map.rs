// ==========================================
// 清洁业务数据导入 - 身份映射（代码解析器）
// ==========================================
// 职责: (实体类型, 业务代码) → 生成的稳定标识
// 红线: resolve 为纯查询，从不创建；别名不计入规范代码
// ==========================================

use crate::domain::types::EntityKind;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    id: Uuid,
    canonical: bool,
}

#[derive(Debug, Default, Clone)]
pub struct IdentityMap {
    entries: HashMap<EntityKind, HashMap<String, Entry>>,
    // 登记顺序（规范代码），序列对账与报告按此顺序输出
    order: HashMap<EntityKind, Vec<String>>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记规范代码（转换器已按代码去重，同一代码只登记一次）
    pub fn register(&mut self, kind: EntityKind, code: &str, id: Uuid) {
        let codes = self.entries.entry(kind).or_default();
        let previous = codes.insert(code.to_string(), Entry { id, canonical: true });
        if !matches!(previous, Some(Entry { canonical: true, .. })) {
            self.order.entry(kind).or_default().push(code.to_string());
        }
    }

    /// 登记别名（如员工 -A/-B 原始代码）；不覆盖已有规范代码
    pub fn register_alias(&mut self, kind: EntityKind, alias: &str, id: Uuid) {
        let codes = self.entries.entry(kind).or_default();
        match codes.get(alias) {
            Some(Entry { canonical: true, .. }) => {}
            _ => {
                codes.insert(alias.to_string(), Entry { id, canonical: false });
            }
        }
    }

    pub fn resolve(&self, kind: EntityKind, code: &str) -> Option<Uuid> {
        self.entries
            .get(&kind)
            .and_then(|codes| codes.get(code))
            .map(|entry| entry.id)
    }

    /// 规范代码（按登记顺序，不含别名）
    pub fn canonical_codes(&self, kind: EntityKind) -> Vec<String> {
        self.order.get(&kind).cloned().unwrap_or_default()
    }

    /// 规范代码数量
    pub fn len(&self, kind: EntityKind) -> usize {
        self.order.get(&kind).map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.order.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve() {
        let mut map = IdentityMap::new();
        let id = Uuid::new_v4();
        map.register(EntityKind::Client, "CLI-001", id);

        assert_eq!(map.resolve(EntityKind::Client, "CLI-001"), Some(id));
        assert_eq!(map.resolve(EntityKind::Site, "CLI-001"), None);
        assert_eq!(map.resolve(EntityKind::Client, "CLI-002"), None);
    }

    #[test]
    fn test_aliases_share_id_but_are_not_canonical() {
        let mut map = IdentityMap::new();
        let id = Uuid::new_v4();
        map.register(EntityKind::Staff, "STF-1001", id);
        map.register_alias(EntityKind::Staff, "STF-1001-A", id);
        map.register_alias(EntityKind::Staff, "STF-1001-B", id);

        assert_eq!(map.resolve(EntityKind::Staff, "STF-1001-A"), Some(id));
        assert_eq!(map.resolve(EntityKind::Staff, "STF-1001-B"), Some(id));
        assert_eq!(map.canonical_codes(EntityKind::Staff), vec!["STF-1001".to_string()]);
        assert_eq!(map.len(EntityKind::Staff), 1);
    }

    #[test]
    fn test_alias_never_overrides_canonical() {
        let mut map = IdentityMap::new();
        let canonical = Uuid::new_v4();
        map.register(EntityKind::Staff, "STF-1001", canonical);
        map.register_alias(EntityKind::Staff, "STF-1001", Uuid::new_v4());
        assert_eq!(map.resolve(EntityKind::Staff, "STF-1001"), Some(canonical));
    }

    #[test]
    fn test_resolve_does_not_create() {
        let map = IdentityMap::new();
        assert_eq!(map.resolve(EntityKind::Task, "TSK-001"), None);
        assert!(map.is_empty());
    }
}
