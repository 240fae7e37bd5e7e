// ==========================================
// MUD 世界数据导入器 - 导入层
// ==========================================
// 职责: 表格数据文件/压缩包 → 持久化记录
// 支持: CSV, Excel, zip 数据包/资源包
// ==========================================

// 模块声明
pub mod archive;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod record_importer;
pub mod tabular_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::{coerce_record, coerce_record_with_report, resolve_column_types, FieldError};
pub use file_parser::{
    CsvRowReader, ExcelRowReader, ReaderFactory, ReaderRegistry, RowReader, WorkbookFormat,
};
pub use record_importer::{import_records, HeaderLayout, ImportStats};
pub use tabular_importer::{BatchReport, SourceOptions, TabularImporter};
