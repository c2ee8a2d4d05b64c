// ==========================================
// 清洁业务数据导入 - 字段标准化
// ==========================================
// 职责: 原始单元格 → 类型化值
// 红线: 全部为全函数，不 panic，不返回错误；无法解析时返回默认值或 None
// ==========================================

use crate::domain::types::StaffRole;
use crate::importer::sheet::CellValue;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// 视为空值的占位文本
const NULL_SENTINELS: [&str; 5] = ["N/A", "n/a", "None", "NULL", "-"];

const TRUTHY: [&str; 5] = ["TRUE", "YES", "1", "Y", "ACTIVE"];
const FALSY: [&str; 5] = ["FALSE", "NO", "0", "N", "INACTIVE"];

// 日期格式按顺序尝试；年份位数由正则限定
static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").expect("静态正则"));
static US_DATE_LONG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("静态正则"));
static US_DATE_SHORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{2}$").expect("静态正则"));
static ISO_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}T\d{1,2}:\d{1,2}:\d{1,2}$").expect("静态正则")
});

const TIME_FORMATS: [&str; 5] = ["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M%p", "%I:%M:%S %p"];

static ROLE_DECORATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\W+").expect("静态正则"));

const ROLE_MAP: [(&str, StaffRole); 11] = [
    ("Owner", StaffRole::OwnerAdmin),
    ("Admin", StaffRole::OwnerAdmin),
    ("Manager", StaffRole::Manager),
    ("Account Manager", StaffRole::Manager),
    ("Operations Manager", StaffRole::Manager),
    ("Project Manager", StaffRole::Manager),
    ("Supervisor", StaffRole::Supervisor),
    ("Lead", StaffRole::Supervisor),
    ("Cleaner", StaffRole::Cleaner),
    ("Inspector", StaffRole::Inspector),
    ("Sales", StaffRole::Sales),
];

fn is_sentinel(s: &str) -> bool {
    s.is_empty() || NULL_SENTINELS.contains(&s)
}

/// 文本: 去除首尾空白；空或占位值返回 None
pub fn normalize_text(v: &CellValue) -> Option<String> {
    let raw = v.to_string();
    let trimmed = raw.trim();
    if is_sentinel(trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 数值: 去除 `,` `$` `%` 后解析；失败或非有限值返回默认值
pub fn normalize_number(v: &CellValue, default: Option<f64>) -> Option<f64> {
    let parsed = match v {
        CellValue::Number(n) => Some(*n),
        CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        CellValue::Text(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !matches!(c, ',' | '$' | '%'))
                .collect();
            let cleaned = cleaned.trim();
            if is_sentinel(cleaned) {
                None
            } else {
                cleaned.parse::<f64>().ok()
            }
        }
        _ => None,
    };

    match parsed {
        Some(n) if n.is_finite() => Some(n),
        _ => default,
    }
}

/// 整数: 数值后四舍五入（远离零）
pub fn normalize_integer(v: &CellValue, default: Option<i64>) -> Option<i64> {
    normalize_number(v, None)
        .map(|n| n.round() as i64)
        .or(default)
}

/// 布尔: 识别真/假文本（不区分大小写），否则返回默认值
pub fn normalize_boolean(v: &CellValue, default: bool) -> bool {
    match v {
        CellValue::Bool(b) => *b,
        CellValue::Number(n) if *n == 1.0 => true,
        CellValue::Number(n) if *n == 0.0 => false,
        CellValue::Text(s) => {
            let upper = s.trim().to_uppercase();
            if TRUTHY.contains(&upper.as_str()) {
                true
            } else if FALSY.contains(&upper.as_str()) {
                false
            } else {
                default
            }
        }
        _ => default,
    }
}

/// 日期: 原生日期单元格直接取用；文本依次尝试
/// `YYYY-MM-DD` / `MM/DD/YYYY` / `MM/DD/YY` / `YYYY-MM-DDTHH:MM:SS`
pub fn normalize_date(v: &CellValue) -> Option<NaiveDate> {
    match v {
        CellValue::Date(d) => Some(*d),
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Text(s) => parse_date_text(s.trim()),
        _ => None,
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if is_sentinel(s) {
        return None;
    }
    if ISO_DATE.is_match(s) {
        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(d);
        }
    }
    if US_DATE_LONG.is_match(s) {
        if let Ok(d) = NaiveDate::parse_from_str(s, "%m/%d/%Y") {
            return Some(d);
        }
    }
    if US_DATE_SHORT.is_match(s) {
        if let Ok(d) = NaiveDate::parse_from_str(s, "%m/%d/%y") {
            return Some(d);
        }
    }
    if ISO_DATETIME.is_match(s) {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
            return Some(dt.date());
        }
    }
    None
}

/// 时间: 原生时间/日期时间单元格直接取用；文本依次尝试 24 小时制与 AM/PM 格式
pub fn normalize_time(v: &CellValue) -> Option<NaiveTime> {
    match v {
        CellValue::Time(t) => Some(*t),
        CellValue::DateTime(dt) => Some(dt.time()),
        CellValue::Text(s) => {
            let s = s.trim();
            if is_sentinel(s) {
                return None;
            }
            TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        }
        _ => None,
    }
}

/// 大写 slug: 空白与 `-` 替换为 `_`
pub fn upper_slug(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c })
        .collect::<String>()
        .to_uppercase()
}

/// 枚举标签: 区分大小写的字典查找；未命中时取大写 slug；空值取默认
pub fn normalize_enum_label(raw: Option<&str>, mapping: &[(&str, &str)], default: &str) -> String {
    let raw = match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return default.to_string(),
    };

    mapping
        .iter()
        .find(|(label, _)| *label == raw)
        .map(|(_, value)| value.to_string())
        .unwrap_or_else(|| upper_slug(raw))
}

/// 员工角色: 去除前缀装饰与 `•`/`·` 后的级别说明，再查字典；未识别为 CLEANER
pub fn normalize_role_label(raw: Option<&str>) -> StaffRole {
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s,
        _ => return StaffRole::Cleaner,
    };

    let stripped = ROLE_DECORATION.replace(raw, "");
    let base = stripped
        .split('•')
        .next()
        .unwrap_or_default()
        .split('·')
        .next()
        .unwrap_or_default()
        .trim();

    ROLE_MAP
        .iter()
        .find(|(label, _)| *label == base)
        .map(|(_, role)| *role)
        .unwrap_or(StaffRole::Cleaner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_normalize_text_sentinels() {
        assert_eq!(normalize_text(&text("  Office  ")), Some("Office".to_string()));
        for sentinel in ["N/A", "n/a", "None", "NULL", "-", "   "] {
            assert_eq!(normalize_text(&text(sentinel)), None, "{}", sentinel);
        }
        assert_eq!(normalize_text(&CellValue::Empty), None);
        assert_eq!(normalize_text(&CellValue::Number(1001.0)), Some("1001".to_string()));
    }

    #[test]
    fn test_normalize_number_strips_symbols() {
        assert_eq!(normalize_number(&text("$1,250.50"), None), Some(1250.5));
        assert_eq!(normalize_number(&text("15%"), None), Some(15.0));
        assert_eq!(normalize_number(&text("abc"), Some(1.0)), Some(1.0));
        assert_eq!(normalize_number(&text("inf"), Some(0.0)), Some(0.0));
        assert_eq!(normalize_number(&CellValue::Empty, None), None);
    }

    #[test]
    fn test_normalize_integer_rounds_half_away_from_zero() {
        assert_eq!(normalize_integer(&CellValue::Number(2.5), None), Some(3));
        assert_eq!(normalize_integer(&CellValue::Number(-2.5), None), Some(-3));
        assert_eq!(normalize_integer(&text("7.4"), None), Some(7));
        assert_eq!(normalize_integer(&CellValue::Empty, Some(0)), Some(0));
    }

    #[test]
    fn test_normalize_boolean() {
        assert!(normalize_boolean(&text("yes"), false));
        assert!(normalize_boolean(&text("Active"), false));
        assert!(!normalize_boolean(&text("inactive"), true));
        assert!(!normalize_boolean(&CellValue::Number(0.0), true));
        assert!(normalize_boolean(&CellValue::Bool(true), false));
        assert!(normalize_boolean(&text("maybe"), true));
        assert!(!normalize_boolean(&CellValue::Empty, false));
    }

    #[test]
    fn test_normalize_date_formats() {
        let leap = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(normalize_date(&text("02/29/2024")), Some(leap));
        assert_eq!(normalize_date(&text("2024-02-29")), Some(leap));
        assert_eq!(normalize_date(&text("2/29/24")), Some(leap));
        assert_eq!(normalize_date(&text("2024-02-29T08:15:00")), Some(leap));
        assert_eq!(normalize_date(&text("02/29/2024")).unwrap().to_string(), "2024-02-29");
        assert_eq!(normalize_date(&text("not a date")), None);
        assert_eq!(normalize_date(&text("02/30/2024")), None);
        assert_eq!(normalize_date(&text("N/A")), None);
    }

    #[test]
    fn test_normalize_date_native_cells() {
        let dt = NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(normalize_date(&CellValue::DateTime(dt)), Some(dt.date()));
        assert_eq!(normalize_date(&CellValue::Number(45000.0)), None);
    }

    #[test]
    fn test_normalize_time_formats() {
        let t = NaiveTime::from_hms_opt(18, 30, 0).unwrap();
        assert_eq!(normalize_time(&text("18:30")), Some(t));
        assert_eq!(normalize_time(&text("18:30:00")), Some(t));
        assert_eq!(normalize_time(&text("6:30 PM")), Some(t));
        assert_eq!(normalize_time(&text("06:30PM")), Some(t));
        assert_eq!(normalize_time(&text("06:30:00 PM")), Some(t));
        assert_eq!(normalize_time(&CellValue::Time(t)), Some(t));
        assert_eq!(normalize_time(&text("evening")), None);
        assert_eq!(normalize_time(&text("18:30")).unwrap().to_string(), "18:30:00");
    }

    #[test]
    fn test_normalize_enum_label() {
        let mapping = [("On Hold", "ON_HOLD"), ("Cancelled", "CANCELED")];
        assert_eq!(normalize_enum_label(Some("Cancelled"), &mapping, "ACTIVE"), "CANCELED");
        assert_eq!(normalize_enum_label(Some("on hold"), &mapping, "ACTIVE"), "ON_HOLD");
        assert_eq!(normalize_enum_label(Some("Bi-Weekly Deep"), &[], "X"), "BI_WEEKLY_DEEP");
        assert_eq!(normalize_enum_label(None, &mapping, "ACTIVE"), "ACTIVE");
        assert_eq!(normalize_enum_label(Some("  "), &mapping, "ACTIVE"), "ACTIVE");
    }

    #[test]
    fn test_normalize_role_label() {
        assert_eq!(normalize_role_label(Some("👑 Owner")), StaffRole::OwnerAdmin);
        assert_eq!(
            normalize_role_label(Some("🧹 Supervisor • Level 2")),
            StaffRole::Supervisor
        );
        assert_eq!(
            normalize_role_label(Some("Account Manager · East")),
            StaffRole::Manager
        );
        assert_eq!(normalize_role_label(Some("Lead")), StaffRole::Supervisor);
        assert_eq!(normalize_role_label(Some("Janitor")), StaffRole::Cleaner);
        assert_eq!(normalize_role_label(None), StaffRole::Cleaner);
    }
}
