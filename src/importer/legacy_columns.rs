// ==========================================
// 清洁业务数据导入 - 错位列兼容层
// ==========================================
// 职责: 盘点单 / 盘点明细两个工作表的表头与数据错位，按位置读取
// 红线: 仅此模块知道位置映射；读取前校验表头，表头变化即停止按位置读取
// ==========================================

use crate::importer::sheet::{CellValue, SheetRow};
use std::fmt;

/// 位置字段: 数据实际所在列 + 该列当前（错误）表头
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionalField {
    pub field: &'static str,
    pub column: usize,
    pub expected_header: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyLayout {
    pub sheet: &'static str,
    pub fields: &'static [PositionalField],
}

// 盘点单: 列 0 为盘点代码，列 1 为站点代码，列 2 为盘点人（未使用），
// 列 3 为盘点日期，列 6 为备注
pub const INVENTORY_COUNT: LegacyLayout = LegacyLayout {
    sheet: "Inventory Count",
    fields: &[
        PositionalField {
            field: "count_code",
            column: 0,
            expected_header: "\u{1f4ca} Count ID",
        },
        PositionalField {
            field: "site_code",
            column: 1,
            expected_header: "\u{1f516} Count Code",
        },
        PositionalField {
            field: "counted_by",
            column: 2,
            expected_header: "\u{1f3e2} Site Code",
        },
        PositionalField {
            field: "count_date",
            column: 3,
            expected_header: "\u{1f4dd} Form Code",
        },
        PositionalField {
            field: "notes",
            column: 6,
            expected_header: "\u{23f0} Count Timestamp",
        },
    ],
};

// 盘点明细: 列 0 为父盘点代码，列 2 为 "名称 [CODE]" 描述，列 3 为实盘数量
pub const INVENTORY_COUNT_DETAIL: LegacyLayout = LegacyLayout {
    sheet: "Inventory Count Detail",
    fields: &[
        PositionalField {
            field: "count_code",
            column: 0,
            expected_header: "\u{1f522} Detail ID",
        },
        PositionalField {
            field: "supply_description",
            column: 2,
            expected_header: "\u{1f3f7}\u{fe0f} Supply Code",
        },
        PositionalField {
            field: "actual_qty",
            column: 3,
            expected_header: "\u{1f4e6} Supply Category",
        },
    ],
};

/// 表头漂移
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDrift {
    pub column: usize,
    pub expected: &'static str,
    pub found: Option<String>,
}

impl fmt::Display for HeaderDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "列 {} 表头应为 '{}'，实际为 '{}'",
            self.column + 1,
            self.expected,
            self.found.as_deref().unwrap_or("<缺失>")
        )
    }
}

impl LegacyLayout {
    /// 校验表头与位置映射一致
    pub fn check_headers(&self, headers: &[String]) -> Result<(), HeaderDrift> {
        for field in self.fields {
            let found = headers.get(field.column).map(|h| h.trim());
            if found != Some(field.expected_header) {
                return Err(HeaderDrift {
                    column: field.column,
                    expected: field.expected_header,
                    found: found.map(str::to_string),
                });
            }
        }
        Ok(())
    }

    /// 按字段名读取位置值；未登记字段视为空
    pub fn get<'r>(&self, row: &'r SheetRow, field: &str) -> &'r CellValue {
        match self.fields.iter().find(|f| f.field == field) {
            Some(f) => row.at(f.column),
            None => row.at(usize::MAX),
        }
    }
}
