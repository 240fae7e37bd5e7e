// ==========================================
// MUD 世界数据导入器 - 文件读取器实现
// ==========================================
// 支持: CSV (.csv) / Excel (.xlsx/.xls/.xlsm) / ODS (.ods)
// 约定: 拉取式读取, 首次调用返回表头, 之后逐行返回数据, Ok(None) 表示正常结束
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Data, Reader, Sheets};
use csv::{ReaderBuilder, StringRecordsIntoIter};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// ==========================================
// RowReader Trait
// ==========================================
pub trait RowReader {
    /// 读取下一行（首行为表头）
    ///
    /// # 返回
    /// - Ok(Some(row)): 一行原始文本值
    /// - Ok(None): 数据源已读完
    /// - Err: 读取/解析错误
    fn read_row(&mut self) -> ImportResult<Option<Vec<String>>>;
}

/// 读取器工厂: 打开指定路径的数据文件
pub type ReaderFactory = fn(&Path) -> ImportResult<Box<dyn RowReader>>;

/// 取文件格式（小写扩展名，不含点）
pub fn format_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .filter(|e| !e.is_empty())
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.is_file() {
        return Err(ImportError::SourceNotFound(path.display().to_string()));
    }
    Ok(())
}

// ==========================================
// CSV Reader 实现
// ==========================================
pub struct CsvRowReader {
    records: StringRecordsIntoIter<File>,
}

impl CsvRowReader {
    pub fn open(path: &Path) -> ImportResult<Self> {
        ensure_exists(path)?;

        let file = File::open(path)?;
        let reader = ReaderBuilder::new()
            .has_headers(false) // 表头由调用方按首行处理
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        Ok(Self {
            records: reader.into_records(),
        })
    }

    pub fn boxed(path: &Path) -> ImportResult<Box<dyn RowReader>> {
        Ok(Box::new(Self::open(path)?))
    }
}

impl RowReader for CsvRowReader {
    fn read_row(&mut self) -> ImportResult<Option<Vec<String>>> {
        match self.records.next() {
            Some(result) => {
                let record = result?;
                Ok(Some(record.iter().map(String::from).collect()))
            }
            None => Ok(None),
        }
    }
}

// ==========================================
// Excel Reader 实现
// ==========================================
// 读取第一个工作表; 整表载入后逐行返回
pub struct ExcelRowReader {
    rows: std::vec::IntoIter<Vec<String>>,
}

/// 工作簿格式（决定使用的解析器, 与文件扩展名无关）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookFormat {
    Xlsx, // xlsx / xlsm
    Xls,
    Ods,
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        // 与文本数据文件的布尔字面量保持一致
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn open_sheets(path: &Path, format: WorkbookFormat) -> Result<Sheets<BufReader<File>>, calamine::Error> {
    Ok(match format {
        WorkbookFormat::Xlsx => Sheets::Xlsx(open_workbook(path)?),
        WorkbookFormat::Xls => Sheets::Xls(open_workbook(path)?),
        WorkbookFormat::Ods => Sheets::Ods(open_workbook(path)?),
    })
}

impl ExcelRowReader {
    pub fn open(path: &Path, format: WorkbookFormat) -> ImportResult<Self> {
        ensure_exists(path)?;

        let mut workbook = open_sheets(path, format)?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();

        Ok(Self {
            rows: rows.into_iter(),
        })
    }

    pub fn boxed_xlsx(path: &Path) -> ImportResult<Box<dyn RowReader>> {
        Ok(Box::new(Self::open(path, WorkbookFormat::Xlsx)?))
    }

    pub fn boxed_xls(path: &Path) -> ImportResult<Box<dyn RowReader>> {
        Ok(Box::new(Self::open(path, WorkbookFormat::Xls)?))
    }

    pub fn boxed_ods(path: &Path) -> ImportResult<Box<dyn RowReader>> {
        Ok(Box::new(Self::open(path, WorkbookFormat::Ods)?))
    }
}

impl RowReader for ExcelRowReader {
    fn read_row(&mut self) -> ImportResult<Option<Vec<String>>> {
        Ok(self.rows.next())
    }
}

// ==========================================
// 读取器注册表（按小写扩展名选择）
// ==========================================
#[derive(Clone)]
pub struct ReaderRegistry {
    factories: HashMap<String, ReaderFactory>,
}

impl ReaderRegistry {
    /// 空注册表
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// 内置读取器: csv / xlsx / xls / xlsm / ods
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("csv", CsvRowReader::boxed);
        registry.register("xlsx", ExcelRowReader::boxed_xlsx);
        registry.register("xlsm", ExcelRowReader::boxed_xlsx);
        registry.register("xls", ExcelRowReader::boxed_xls);
        registry.register("ods", ExcelRowReader::boxed_ods);
        registry
    }

    /// 注册（或覆盖）读取器；格式名按小写保存
    pub fn register(&mut self, format: &str, factory: ReaderFactory) {
        self.factories.insert(format.to_lowercase(), factory);
    }

    pub fn supports(&self, format: &str) -> bool {
        self.factories.contains_key(&format.to_lowercase())
    }

    /// 以指定格式打开数据文件
    pub fn open(&self, format: &str, path: &Path) -> ImportResult<Box<dyn RowReader>> {
        let factory = self
            .factories
            .get(&format.to_lowercase())
            .ok_or_else(|| ImportError::UnsupportedFormat(format.to_string()))?;
        factory(path)
    }

    pub fn formats(&self) -> Vec<&str> {
        let mut formats: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        formats.sort_unstable();
        formats
    }
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn read_all(reader: &mut dyn RowReader) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        while let Some(row) = reader.read_row().unwrap() {
            rows.push(row);
        }
        rows
    }

    #[test]
    fn test_csv_reader_header_then_rows() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "key,name,level").unwrap();
        writeln!(temp_file, "room_1,Hall,1").unwrap();
        writeln!(temp_file, "room_2,\"Dark, Cave\",").unwrap();

        let mut reader = CsvRowReader::open(temp_file.path()).unwrap();
        let rows = read_all(&mut reader);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["key", "name", "level"]);
        assert_eq!(rows[2], vec!["room_2", "Dark, Cave", ""]);

        // 读完后持续返回 None
        assert!(reader.read_row().unwrap().is_none());
    }

    #[test]
    fn test_csv_reader_flexible_rows() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "key,value").unwrap();
        writeln!(temp_file, "a").unwrap();
        writeln!(temp_file, "b,2,extra").unwrap();

        let mut reader = CsvRowReader::open(temp_file.path()).unwrap();
        let rows = read_all(&mut reader);

        assert_eq!(rows[1], vec!["a"]);
        assert_eq!(rows[2], vec!["b", "2", "extra"]);
    }

    #[test]
    fn test_csv_reader_file_not_found() {
        let result = CsvRowReader::open(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::SourceNotFound(_))));
    }

    #[test]
    fn test_excel_reader_rejects_garbage() {
        let mut temp_file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        writeln!(temp_file, "this is not a workbook").unwrap();

        assert!(ExcelRowReader::open(temp_file.path(), WorkbookFormat::Xlsx).is_err());
    }

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    #[test]
    fn test_excel_reader_first_sheet_only() {
        let mut reader =
            ExcelRowReader::open(&fixture("game_settings.xlsx"), WorkbookFormat::Xlsx).unwrap();
        let rows = read_all(&mut reader);

        // 第二个工作表 (notes) 不读取
        assert_eq!(
            rows,
            vec![
                vec!["key", "value", "enabled"],
                vec!["max_level", "1", "True"],
                vec!["min_level", "50", "False"],
            ]
        );
        assert!(reader.read_row().unwrap().is_none());
    }

    #[test]
    fn test_registry_opens_xlsx_by_explicit_format() {
        let registry = ReaderRegistry::with_defaults();
        let mut reader = registry.open("xlsx", &fixture("game_settings.xlsx")).unwrap();

        let header = reader.read_row().unwrap();
        assert_eq!(header, Some(vec!["key".to_string(), "value".to_string(), "enabled".to_string()]));
    }

    #[test]
    fn test_cell_to_string_booleans() {
        assert_eq!(cell_to_string(&Data::Bool(true)), "True");
        assert_eq!(cell_to_string(&Data::Bool(false)), "False");
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
        assert_eq!(cell_to_string(&Data::Float(1.0)), "1");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
    }

    #[test]
    fn test_format_of_lowercases() {
        assert_eq!(format_of(Path::new("data/world_rooms.CSV")), Some("csv".to_string()));
        assert_eq!(format_of(Path::new("data/world_rooms")), None);
    }

    #[test]
    fn test_registry_defaults() {
        let registry = ReaderRegistry::with_defaults();
        assert!(registry.supports("csv"));
        assert!(registry.supports("XLSX"));
        assert!(!registry.supports("txt"));
        assert_eq!(registry.formats(), vec!["csv", "ods", "xls", "xlsm", "xlsx"]);

        let result = registry.open("txt", Path::new("world_rooms.txt"));
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
