// ==========================================
// 清洁业务数据导入 - 序列对齐
// ==========================================
// 职责: 按已导入的业务代码计算各前缀最大编号，写回 system_sequences
// 约定: 所有表装载完成后执行；变体后缀代码（PREFIX-NNNN-A/B）显式排除；
//       第二段无法解析为整数的代码静默跳过
// ==========================================

use crate::domain::report::SequenceUpdate;
use crate::domain::types::EntityKind;
use crate::importer::identity_map::IdentityMap;
use crate::repository::batch_loader::BatchLoader;
use crate::repository::data_api::{Filter, Row};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

pub const SEQUENCE_TABLE: &str = "system_sequences";

/// 前缀 → 代码来源
pub const SEQUENCE_PREFIXES: [(&str, EntityKind); 7] = [
    ("CLI", EntityKind::Client),
    ("SIT", EntityKind::Site),
    ("SUP", EntityKind::Supply),
    ("STF", EntityKind::Staff),
    ("JOB", EntityKind::SiteJob),
    ("TSK", EntityKind::Task),
    ("SER", EntityKind::Service),
];

static VARIANT_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]+-\d+-[AB]$").expect("静态正则"));

/// 代码第二段的编号；变体代码与无法解析的代码返回 None
pub fn code_number(code: &str) -> Option<i64> {
    if VARIANT_CODE.is_match(code) {
        return None;
    }
    code.split('-').nth(1)?.parse::<i64>().ok()
}

/// 一组代码的最大编号
pub fn max_code_number<I, S>(codes: I) -> Option<i64>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    codes
        .into_iter()
        .filter_map(|c| code_number(c.as_ref()))
        .max()
}

/// 计算各前缀的最大编号（无可用代码的前缀不出现）
pub fn compute_sequences(identities: &IdentityMap) -> Vec<(&'static str, i64)> {
    SEQUENCE_PREFIXES
        .iter()
        .filter_map(|(prefix, kind)| {
            max_code_number(identities.canonical_codes(*kind)).map(|max| (*prefix, max))
        })
        .collect()
}

/// 写回 system_sequences（按租户 + 前缀过滤，直接覆盖 current_value）
pub async fn reconcile_sequences(
    loader: &BatchLoader,
    tenant_id: Uuid,
    identities: &IdentityMap,
) -> Vec<SequenceUpdate> {
    let mut updates = Vec::new();
    for (prefix, value) in compute_sequences(identities) {
        let mut fields = Row::new();
        fields.insert("current_value".to_string(), serde_json::json!(value));
        let filters = [
            Filter::eq("tenant_id", tenant_id),
            Filter::eq("prefix", prefix),
        ];

        let update = match loader.api().patch(SEQUENCE_TABLE, &filters, &fields).await {
            Ok(()) => {
                info!(prefix, value, "序列已更新");
                SequenceUpdate {
                    prefix: prefix.to_string(),
                    value,
                    persisted: true,
                    error: None,
                }
            }
            Err(err) => {
                warn!(prefix, value, error = %err, "序列更新失败");
                SequenceUpdate {
                    prefix: prefix.to_string(),
                    value,
                    persisted: false,
                    error: Some(err.to_string()),
                }
            }
        };
        updates.push(update);
    }
    updates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_number() {
        assert_eq!(code_number("SER-014"), Some(14));
        assert_eq!(code_number("STF-1001"), Some(1001));
        assert_eq!(code_number("STF-1001-A"), None);
        assert_eq!(code_number("JOB-X1"), None);
        assert_eq!(code_number("LEGACY"), None);
    }

    #[test]
    fn test_max_of_service_codes() {
        assert_eq!(max_code_number(["SER-001", "SER-014", "SER-007"]), Some(14));
        assert_eq!(max_code_number(Vec::<String>::new()), None);
    }

    #[test]
    fn test_compute_sequences_skips_empty_prefixes() {
        let mut ids = IdentityMap::new();
        ids.register(EntityKind::Staff, "STF-1002", Uuid::new_v4());
        ids.register_alias(EntityKind::Staff, "STF-2000-B", Uuid::new_v4());
        ids.register(EntityKind::Client, "CLI-010", Uuid::new_v4());

        let seqs = compute_sequences(&ids);
        assert_eq!(seqs, vec![("CLI", 10), ("STF", 1002)]);
    }
}
