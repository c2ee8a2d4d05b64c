// ==========================================
// 清洁业务数据导入 - 工作簿解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls/.xlsm/.xlsb/.ods) / CSV 目录 (<工作表名>.csv)
// 约定: 第 1 行为表头，之后为数据行
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::sheet::{build_rows, CellValue, SheetRow, WorkbookSource};
use calamine::{open_workbook_auto, Data, DataType, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

const EXCEL_EXTENSIONS: [&str; 5] = ["xlsx", "xls", "xlsm", "xlsb", "ods"];

// ==========================================
// Excel Workbook 实现
// ==========================================
pub struct ExcelWorkbook {
    path: PathBuf,
    inner: Sheets<BufReader<File>>,
}

impl ExcelWorkbook {
    pub fn open(path: &Path) -> ImportResult<Self> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let inner = open_workbook_auto(path)?;
        debug!(path = %path.display(), "Excel 工作簿已打开");

        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }
}

impl WorkbookSource for ExcelWorkbook {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names()
    }

    fn read_sheet(&mut self, name: &str) -> ImportResult<Option<Vec<SheetRow>>> {
        if !self.inner.sheet_names().iter().any(|s| s == name) {
            return Ok(None);
        }

        let range = self
            .inner
            .worksheet_range(name)
            .map_err(|e| ImportError::SheetReadError {
                sheet: name.to_string(),
                message: e.to_string(),
            })?;

        // 区域可能不从 A1 开始：按绝对位置补齐
        let (start_row, start_col) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));
        let width = start_col + range.width();

        let mut grid: Vec<(usize, Vec<CellValue>)> = range
            .rows()
            .enumerate()
            .map(|(idx, cells)| {
                let mut values = vec![CellValue::Empty; start_col];
                values.extend(cells.iter().map(convert_cell));
                (start_row + idx, values)
            })
            .collect();

        let header = if start_row == 0 && !grid.is_empty() {
            grid.remove(0).1
        } else {
            vec![CellValue::Empty; width]
        };

        // 行号: 绝对行索引 + 1
        let data = grid.into_iter().map(|(abs_row, values)| (abs_row + 1, values));
        Ok(Some(build_rows(header, data)))
    }
}

/// calamine 单元格 → CellValue
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            if (0.0..1.0).contains(&serial) {
                // 纯时间（Excel 序列值小数部分）
                let secs = (serial * 86_400.0).round() as u32;
                NaiveTime::from_num_seconds_from_midnight_opt(secs % 86_400, 0)
                    .map(CellValue::Time)
                    .unwrap_or(CellValue::Empty)
            } else {
                cell.as_datetime()
                    .map(CellValue::DateTime)
                    .unwrap_or(CellValue::Number(serial))
            }
        }
        Data::DateTimeIso(s) => parse_iso_cell(s),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

fn parse_iso_cell(raw: &str) -> CellValue {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return CellValue::DateTime(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return CellValue::Date(d);
    }
    if let Ok(t) = NaiveTime::parse_from_str(raw, "%H:%M:%S%.f") {
        return CellValue::Time(t);
    }
    CellValue::Text(raw.to_string())
}

// ==========================================
// CSV 目录实现
// ==========================================
// 每个工作表一个文件: <dir>/<工作表名>.csv
pub struct CsvWorkbook {
    dir: PathBuf,
}

impl CsvWorkbook {
    pub fn open(dir: &Path) -> ImportResult<Self> {
        if !dir.is_dir() {
            return Err(ImportError::FileNotFound(dir.display().to_string()));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn sheet_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", name))
    }
}

impl WorkbookSource for CsvWorkbook {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    fn sheet_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| p.extension().map(|x| x == "csv").unwrap_or(false))
                    .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().to_string()))
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    fn read_sheet(&mut self, name: &str) -> ImportResult<Option<Vec<SheetRow>>> {
        let path = self.sheet_path(name);
        if !path.is_file() {
            return Ok(None);
        }

        let file = File::open(&path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let mut records = reader.records();
        let header: Vec<CellValue> = match records.next() {
            Some(record) => record?.iter().map(CellValue::from).collect(),
            None => return Ok(Some(Vec::new())),
        };

        let mut data = Vec::new();
        for (idx, record) in records.enumerate() {
            let record = record?;
            data.push((idx + 2, record.iter().map(CellValue::from).collect()));
        }

        debug!(sheet = name, rows = data.len(), "CSV 工作表已读取");
        Ok(Some(build_rows(header, data)))
    }
}

// ==========================================
// 统一入口（根据路径自动选择解析器）
// ==========================================
pub fn open_workbook(path: &Path) -> ImportResult<Box<dyn WorkbookSource>> {
    if path.is_dir() {
        return Ok(Box::new(CsvWorkbook::open(path)?));
    }
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if EXCEL_EXTENSIONS.contains(&ext.as_str()) {
        Ok(Box::new(ExcelWorkbook::open(path)?))
    } else {
        Err(ImportError::UnsupportedFormat(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_csv_workbook_reads_named_sheet() {
        let dir = TempDir::new().unwrap();
        let mut file = File::create(dir.path().join("Service.csv")).unwrap();
        writeln!(file, "Service Code,Service Name,").unwrap();
        writeln!(file, "SER-001,Office Cleaning,x").unwrap();
        writeln!(file, ",,").unwrap();
        writeln!(file, "SER-002,Floor Care").unwrap();

        let mut wb = open_workbook(dir.path()).unwrap();
        assert_eq!(wb.sheet_names(), vec!["Service".to_string()]);

        let rows = wb.read_sheet("Service").unwrap().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Service Name").to_string(), "Office Cleaning");
        assert_eq!(rows[0].get("_col3").to_string(), "x");
        assert_eq!(rows[1].row_number, 4);
        assert!(wb.read_sheet("Task").unwrap().is_none());
    }

    #[test]
    fn test_open_workbook_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.txt");
        File::create(&path).unwrap();
        assert!(matches!(
            open_workbook(&path),
            Err(ImportError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            open_workbook(&dir.path().join("missing.xlsx")),
            Err(ImportError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_parse_iso_cell() {
        let cell = parse_iso_cell("2024-02-29");
        assert_eq!(cell, CellValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        let cell = parse_iso_cell("07:30:00");
        assert_eq!(cell, CellValue::Time(NaiveTime::from_hms_opt(7, 30, 0).unwrap()));
    }
}
