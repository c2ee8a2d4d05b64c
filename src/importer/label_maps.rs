// ==========================================
// 清洁业务数据导入 - 标签字典
// ==========================================
// 职责: 工作表显示标签 → 后端枚举值
// 约定: 区分大小写；未命中时由 normalize_enum_label 生成大写 slug
// ==========================================

pub const CLIENT_STATUS: &[(&str, &str)] = &[
    ("Active", "ACTIVE"),
    ("Inactive", "INACTIVE"),
    ("On Hold", "ON_HOLD"),
    ("Prospect", "PROSPECT"),
    ("Cancelled", "CANCELED"),
    ("Canceled", "CANCELED"),
];

pub const SITE_STATUS: &[(&str, &str)] = &[
    ("Active", "ACTIVE"),
    ("Inactive", "INACTIVE"),
    ("On Hold", "ON_HOLD"),
    ("Canceled", "CANCELED"),
    ("Cancelled", "CANCELED"),
];

pub const STAFF_STATUS: &[(&str, &str)] = &[
    ("Active", "ACTIVE"),
    ("Inactive", "INACTIVE"),
    ("On Leave", "ON_LEAVE"),
    ("Terminated", "TERMINATED"),
];

pub const JOB_STATUS: &[(&str, &str)] = &[
    ("Active", "ACTIVE"),
    ("Inactive", "INACTIVE"),
    ("On Hold", "ON_HOLD"),
    ("Canceled", "CANCELED"),
    ("Cancelled", "CANCELED"),
    ("Completed", "COMPLETED"),
];

pub const FREQUENCY: &[(&str, &str)] = &[
    ("Daily", "DAILY"),
    ("Weekly", "WEEKLY"),
    ("Monthly", "MONTHLY"),
    ("Bi-Weekly", "BIWEEKLY"),
    ("Biweekly", "BIWEEKLY"),
    ("2x Weekly", "2X_WEEK"),
    ("3x Weekly", "3X_WEEK"),
    ("4x Weekly", "4X_WEEK"),
    ("5x Weekly", "5X_WEEK"),
    ("As Needed", "AS_NEEDED"),
    ("One-Time", "AS_NEEDED"),
];

pub const DEFAULT_STATUS: &str = "ACTIVE";
