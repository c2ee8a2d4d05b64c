// ==========================================
// 清洁业务数据导入 - 耗材名称匹配
// ==========================================
// 职责: 将 "DESCRIPTIVE NAME [CODE]" 形式的描述解析为耗材目录项
// 规则: (1) 大写名称精确匹配 (2) 前 30 字符前缀重叠，目录顺序首个命中
// 前缀命中视为低置信度，由调用方记入模糊匹配台账
// ==========================================

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use uuid::Uuid;

const PREFIX_CHARS: usize = 30;

static TRAILING_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\[.*?\]\s*$").expect("静态正则"));

/// 耗材目录项（名称索引用）
#[derive(Debug, Clone, PartialEq)]
pub struct SupplyEntry {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub category: Option<String>,
    pub sds_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchConfidence {
    Exact,
    Prefix,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupplyMatch<'a> {
    pub entry: &'a SupplyEntry,
    pub confidence: MatchConfidence,
    pub source_name: String, // 去除 [CODE] 并大写后的描述
}

#[derive(Debug, Default, Clone)]
pub struct SupplyNameIndex {
    entries: Vec<SupplyEntry>,
    by_name: HashMap<String, usize>, // 大写名称 → 位置
    by_code: HashMap<String, SupplyEntry>,
}

impl SupplyNameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按目录顺序登记；同名（大写）后者覆盖但保留原位置
    pub fn insert(&mut self, entry: SupplyEntry) {
        let key = entry.name.trim().to_uppercase();
        self.by_code.insert(entry.code.clone(), entry.clone());
        match self.by_name.get(&key).copied() {
            Some(slot) => self.entries[slot] = entry,
            None => {
                self.by_name.insert(key, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn by_code(&self, code: &str) -> Option<&SupplyEntry> {
        self.by_code.get(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 解析描述；空名称永不匹配
    pub fn match_description(&self, description: &str) -> Option<SupplyMatch<'_>> {
        let source_name = TRAILING_CODE
            .replace(description, "")
            .trim()
            .to_uppercase();
        if source_name.is_empty() {
            return None;
        }

        if let Some(&slot) = self.by_name.get(&source_name) {
            return Some(SupplyMatch {
                entry: &self.entries[slot],
                confidence: MatchConfidence::Exact,
                source_name,
            });
        }

        let source_prefix = prefix(&source_name);
        self.entries
            .iter()
            .find(|entry| {
                let name = entry.name.trim().to_uppercase();
                !name.is_empty()
                    && (name.starts_with(source_prefix) || source_name.starts_with(prefix(&name)))
            })
            .map(|entry| SupplyMatch {
                entry,
                confidence: MatchConfidence::Prefix,
                source_name: source_name.clone(),
            })
    }
}

/// 前 N 个字符（按字符而非字节截断）
fn prefix(s: &str) -> &str {
    match s.char_indices().nth(PREFIX_CHARS) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, name: &str) -> SupplyEntry {
        SupplyEntry {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: name.to_string(),
            category: Some("CHEMICAL".to_string()),
            sds_url: None,
        }
    }

    fn index() -> SupplyNameIndex {
        let mut idx = SupplyNameIndex::new();
        idx.insert(entry("SUP-001", "Glass Cleaner"));
        idx.insert(entry("SUP-002", "Neutral Floor Cleaner Concentrate Extra Strength 5 Gal"));
        idx.insert(entry("SUP-003", "Neutral Floor Cleaner Concentrate Extra Strength 1 Gal"));
        idx
    }

    #[test]
    fn test_exact_match_strips_bracketed_code() {
        let idx = index();
        let m = idx.match_description("glass cleaner [SUP-001]").unwrap();
        assert_eq!(m.entry.code, "SUP-001");
        assert_eq!(m.confidence, MatchConfidence::Exact);
        assert_eq!(m.source_name, "GLASS CLEANER");
    }

    #[test]
    fn test_prefix_match_first_catalog_hit_wins() {
        let idx = index();
        let m = idx
            .match_description("NEUTRAL FLOOR CLEANER CONCENTRATE EXTRA STRENGTH [X]")
            .unwrap();
        assert_eq!(m.entry.code, "SUP-002");
        assert_eq!(m.confidence, MatchConfidence::Prefix);
    }

    #[test]
    fn test_source_prefix_of_short_catalog_name() {
        let idx = index();
        let m = idx.match_description("Glass Cleaner Spray Bottle").unwrap();
        assert_eq!(m.entry.code, "SUP-001");
        assert_eq!(m.confidence, MatchConfidence::Prefix);
    }

    #[test]
    fn test_no_match_and_empty_names() {
        let idx = index();
        assert!(idx.match_description("Paper Towels [SUP-099]").is_none());
        assert!(idx.match_description("  [SUP-001] ").is_none());
    }

    #[test]
    fn test_duplicate_name_last_wins_in_place() {
        let mut idx = index();
        idx.insert(entry("SUP-010", "GLASS CLEANER"));
        assert_eq!(idx.len(), 3);
        let m = idx.match_description("Glass Cleaner").unwrap();
        assert_eq!(m.entry.code, "SUP-010");
        assert_eq!(idx.by_code("SUP-001").map(|e| e.name.as_str()), Some("Glass Cleaner"));
    }
}
