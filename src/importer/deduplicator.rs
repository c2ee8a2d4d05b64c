// ==========================================
// 清洁业务数据导入 - 去重器
// ==========================================
// 职责: 实体级的行合并规则（保留首行 / 保留末行 / 保留最高优先级变体）
// 约定: 输出保持键的首次出现顺序；对已去重集合再次应用结果不变
// ==========================================

use std::collections::HashMap;
use std::hash::Hash;

/// 去重结果
#[derive(Debug, Clone)]
pub struct DedupOutcome<K, T> {
    pub kept: Vec<T>,
    /// (冲突键, 被合并行数)，按键首次出现顺序
    pub collisions: Vec<(K, usize)>,
}

impl<K, T> DedupOutcome<K, T> {
    pub fn absorbed(&self) -> usize {
        self.collisions.iter().map(|(_, n)| n).sum()
    }
}

/// 通用合并: `replace(existing, candidate)` 为 true 时候选行替换已保留行
fn collapse<K, T, F, R>(items: Vec<T>, key: F, replace: R) -> DedupOutcome<K, T>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
    R: Fn(&T, &T) -> bool,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut absorbed: HashMap<K, usize> = HashMap::new();
    let mut order: Vec<K> = Vec::new();
    let mut kept: Vec<T> = Vec::with_capacity(items.len());

    for item in items {
        let k = key(&item);
        let existing = slots.get(&k).copied();
        match existing {
            Some(slot) => {
                *absorbed.entry(k.clone()).or_insert(0) += 1;
                if replace(&kept[slot], &item) {
                    kept[slot] = item;
                }
            }
            None => {
                slots.insert(k.clone(), kept.len());
                order.push(k);
                kept.push(item);
            }
        }
    }

    let collisions = order
        .into_iter()
        .filter_map(|k| absorbed.remove(&k).map(|n| (k, n)))
        .collect();

    DedupOutcome { kept, collisions }
}

/// 保留首行（站点耗材、服务任务、站点作业）
pub fn keep_first<K, T, F>(items: Vec<T>, key: F) -> DedupOutcome<K, T>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    collapse(items, key, |_, _| false)
}

/// 保留末行（作业任务）；位置保持首次出现处
pub fn keep_last<K, T, F>(items: Vec<T>, key: F) -> DedupOutcome<K, T>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    collapse(items, key, |_, _| true)
}

/// 保留最高优先级（员工变体）；仅严格更高者替换，同级保留先出现者
pub fn keep_highest_priority<K, T, F, P, O>(items: Vec<T>, key: F, rank: P) -> DedupOutcome<K, T>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
    P: Fn(&T) -> O,
    O: Ord,
{
    collapse(items, key, |existing, candidate| rank(candidate) > rank(existing))
}
