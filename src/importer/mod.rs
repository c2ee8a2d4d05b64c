// ==========================================
// 清洁业务数据导入 - 导入层
// ==========================================
// 职责: 工作簿读取 → 字段标准化 → 去重 / 身份解析 → 类型化记录
// 支持: Excel (xlsx/xls/xlsm/xlsb/ods), CSV 目录
// ==========================================

// 模块声明
pub mod context;
pub mod deduplicator;
pub mod error;
pub mod field_normalizer;
pub mod file_parser;
pub mod identity_map;
pub mod label_maps;
pub mod legacy_columns;
pub mod sheet;
pub mod supply_matcher;
pub mod transformers;

// 重导出核心类型
pub use context::LoadContext;
pub use error::{ImportError, ImportResult};
pub use file_parser::{open_workbook, CsvWorkbook, ExcelWorkbook};
pub use identity_map::IdentityMap;
pub use sheet::{CellValue, InMemoryWorkbook, SheetRow, WorkbookSource};
pub use supply_matcher::SupplyNameIndex;
