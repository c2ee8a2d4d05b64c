// ==========================================
// 清洁业务数据导入 - 工作表行模型
// ==========================================
// 职责: 单元格值、按表头取值的行、工作簿读取接口
// 约定: 表头已去除首尾空白；空表头为 _col{N}（1 起）
// ==========================================

use crate::importer::error::ImportResult;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ==========================================
// CellValue - 原始单元格
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            // 整数值按整数显示（Excel 中的数字代码）
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

// ==========================================
// SheetRow - 表头→值 的行
// ==========================================
#[derive(Debug, Clone)]
pub struct SheetRow {
    pub row_number: usize, // 工作表行号（表头为第 1 行）
    headers: Arc<[String]>,
    values: Vec<CellValue>,
}

impl SheetRow {
    pub fn new(row_number: usize, headers: Arc<[String]>, values: Vec<CellValue>) -> Self {
        Self {
            row_number,
            headers,
            values,
        }
    }

    /// 测试/内存工作簿用: 由 (表头, 值) 对构建
    pub fn from_pairs(row_number: usize, pairs: &[(&str, CellValue)]) -> Self {
        let headers: Arc<[String]> = pairs.iter().map(|(h, _)| h.to_string()).collect();
        let values = pairs.iter().map(|(_, v)| v.clone()).collect();
        Self::new(row_number, headers, values)
    }

    /// 按表头取值；同名表头取最后一列；缺失列视为空
    pub fn get(&self, header: &str) -> &CellValue {
        self.headers
            .iter()
            .rposition(|h| h == header)
            .and_then(|idx| self.values.get(idx))
            .unwrap_or(&EMPTY_CELL)
    }

    /// 按位置取值（0 起）
    pub fn at(&self, idx: usize) -> &CellValue {
        self.values.get(idx).unwrap_or(&EMPTY_CELL)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn is_blank(&self) -> bool {
        self.values.iter().all(CellValue::is_empty)
    }
}

/// 规范化表头并组装行（跳过完全空白的行）
///
/// `data` 中每项为 (工作表行号, 单元格)。
pub fn build_rows<I>(raw_headers: Vec<CellValue>, data: I) -> Vec<SheetRow>
where
    I: IntoIterator<Item = (usize, Vec<CellValue>)>,
{
    let headers: Arc<[String]> = raw_headers
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let text = cell.to_string();
            let text = text.trim();
            if text.is_empty() {
                format!("_col{}", idx + 1)
            } else {
                text.to_string()
            }
        })
        .collect();

    data.into_iter()
        .filter_map(|(row_number, mut values)| {
            values.truncate(headers.len());
            let row = SheetRow::new(row_number, Arc::clone(&headers), values);
            if row.is_blank() {
                None
            } else {
                Some(row)
            }
        })
        .collect()
}

// ==========================================
// WorkbookSource - 工作簿读取接口
// ==========================================
pub trait WorkbookSource: Send {
    /// 描述（路径或名称），用于日志
    fn describe(&self) -> String;

    fn sheet_names(&self) -> Vec<String>;

    /// 读取工作表；不存在时返回 Ok(None)
    fn read_sheet(&mut self, name: &str) -> ImportResult<Option<Vec<SheetRow>>>;
}

// ==========================================
// InMemoryWorkbook - 内存工作簿
// ==========================================
#[derive(Debug, Default, Clone)]
pub struct InMemoryWorkbook {
    order: Vec<String>,
    sheets: HashMap<String, (Vec<CellValue>, Vec<Vec<CellValue>>)>,
}

impl InMemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: &str, headers: &[&str], rows: Vec<Vec<CellValue>>) -> Self {
        let header_cells = headers.iter().map(|h| CellValue::from(*h)).collect();
        if !self.sheets.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.sheets.insert(name.to_string(), (header_cells, rows));
        self
    }
}

impl WorkbookSource for InMemoryWorkbook {
    fn describe(&self) -> String {
        "<memory>".to_string()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.order.clone()
    }

    fn read_sheet(&mut self, name: &str) -> ImportResult<Option<Vec<SheetRow>>> {
        Ok(self.sheets.get(name).map(|(headers, rows)| {
            let data = rows
                .iter()
                .enumerate()
                .map(|(idx, values)| (idx + 2, values.clone()));
            build_rows(headers.clone(), data)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_rows_names_blank_headers_and_skips_empty_rows() {
        let headers = vec![CellValue::from(" Code "), CellValue::Empty, CellValue::from("Name")];
        let rows = build_rows(
            headers,
            vec![
                (2, vec!["A".into(), "x".into(), "Alpha".into()]),
                (3, vec![CellValue::Empty, CellValue::Empty, CellValue::Empty]),
                (4, vec!["B".into()]),
            ],
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].headers(), &["Code", "_col2", "Name"]);
        assert_eq!(rows[0].get("_col2"), &CellValue::Text("x".to_string()));
        assert_eq!(rows[1].row_number, 4);
        assert!(rows[1].get("Name").is_empty());
        assert!(rows[1].get("Missing").is_empty());
    }

    #[test]
    fn test_integral_number_displays_without_fraction() {
        assert_eq!(CellValue::Number(1001.0).to_string(), "1001");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_in_memory_workbook_missing_sheet() {
        let mut wb = InMemoryWorkbook::new().with_sheet("Service", &["Service Code"], vec![]);
        assert!(wb.read_sheet("Service").unwrap().is_some());
        assert!(wb.read_sheet("Task").unwrap().is_none());
    }
}
