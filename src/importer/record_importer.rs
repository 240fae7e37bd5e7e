// ==========================================
// MUD 世界数据导入器 - 记录导入
// ==========================================
// 流程: 表头 → 列类型 → 逐行转换 → 层级合并判定 → 落库
// 红线: 系统数据不得覆盖同 key 的自定义数据
// ==========================================

use crate::domain::{ColumnType, DataTier, FieldValue, RecordSchema, KEY_COLUMN, TIER_COLUMN};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{coerce_record_with_report, resolve_column_types};
use crate::importer::file_parser::RowReader;
use crate::repository::{Condition, RecordStore};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

// ==========================================
// HeaderLayout - 表头解析结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderLayout {
    pub column_names: Vec<String>,
    pub column_types: Vec<ColumnType>,

    /// key 列位置（分层记录类型必有）
    pub key_index: Option<usize>,
}

impl HeaderLayout {
    /// 由表头行构造
    ///
    /// # 返回
    /// - Err(MissingKeyColumn): 分层记录类型的表头缺少 key 列
    pub fn from_header(schema: &RecordSchema, header: Vec<String>) -> ImportResult<Self> {
        let column_names: Vec<String> = header.into_iter().map(|h| h.trim().to_string()).collect();
        let column_types = resolve_column_types(schema, &column_names);
        let key_index = column_names.iter().position(|name| name == KEY_COLUMN);

        // 表格导出常见的尾部空列: 该列数据不导入
        let empty_columns = column_names.iter().filter(|name| name.is_empty()).count();
        if empty_columns > 0 {
            warn!(kind = %schema.kind, count = empty_columns, "表头存在空列名, 对应列不导入");
        }

        if schema.is_tiered && key_index.is_none() {
            return Err(ImportError::MissingKeyColumn {
                kind: schema.kind.clone(),
            });
        }

        Ok(Self {
            column_names,
            column_types,
            key_index,
        })
    }

    /// 读取首行作为表头
    pub fn read(reader: &mut dyn RowReader, schema: &RecordSchema) -> ImportResult<Self> {
        let header = reader
            .read_row()?
            .ok_or_else(|| ImportError::EmptySource(schema.kind.clone()))?;
        Self::from_header(schema, header)
    }
}

// ==========================================
// ImportStats - 单个数据源导入统计
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    /// 读取的数据行数（不含表头）
    pub rows_read: usize,

    /// 成功写入的行数
    pub rows_written: usize,

    /// 因同 key 自定义数据存在而跳过的系统数据行数
    pub rows_kept_custom: usize,

    /// 写入失败的行数
    pub rows_failed: usize,

    /// 字段级转换失败次数
    pub field_errors: usize,
}

/// 从读取器导入全部记录（含表头读取）
#[instrument(skip_all, fields(kind = %schema.kind, tier = %tier))]
pub fn import_records<S>(
    store: &S,
    reader: &mut dyn RowReader,
    schema: &RecordSchema,
    tier: DataTier,
) -> ImportResult<ImportStats>
where
    S: RecordStore + ?Sized,
{
    let layout = HeaderLayout::read(reader, schema)?;
    import_rows(store, reader, schema, &layout, tier)
}

/// 表头已读取后，逐行导入直到数据源结束
pub fn import_rows<S>(
    store: &S,
    reader: &mut dyn RowReader,
    schema: &RecordSchema,
    layout: &HeaderLayout,
    tier: DataTier,
) -> ImportResult<ImportStats>
where
    S: RecordStore + ?Sized,
{
    let mut stats = ImportStats::default();

    while let Some(values) = reader.read_row()? {
        stats.rows_read += 1;

        let (mut record, field_errors) =
            coerce_record_with_report(&layout.column_names, &layout.column_types, &values);
        stats.field_errors += field_errors.len();

        if schema.is_tiered {
            // 系统数据与自定义数据合并: 自定义数据优先
            if tier.is_system() {
                let key = layout
                    .key_index
                    .and_then(|idx| values.get(idx))
                    .map(String::as_str)
                    .unwrap_or("");

                let conditions = [
                    Condition::eq(KEY_COLUMN, key),
                    Condition::eq(TIER_COLUMN, false),
                ];
                match store.count(schema, &conditions) {
                    Ok(0) => {}
                    Ok(_) => {
                        debug!(key = %key, "存在同 key 自定义数据, 跳过系统数据行");
                        stats.rows_kept_custom += 1;
                        continue;
                    }
                    Err(e) => {
                        warn!(row = ?values, error = %e, "自定义数据查询失败, 跳过该行");
                        stats.rows_failed += 1;
                        continue;
                    }
                }
            }

            record.insert(TIER_COLUMN, FieldValue::Boolean(tier.is_system()));
        }

        match store.create(schema, &record) {
            Ok(_) => stats.rows_written += 1,
            Err(e) => {
                warn!(row = ?values, error = %e, "记录写入失败, 跳过该行");
                stats.rows_failed += 1;
            }
        }
    }

    info!(
        rows = stats.rows_read,
        written = stats.rows_written,
        kept_custom = stats.rows_kept_custom,
        failed = stats.rows_failed,
        field_errors = stats.field_errors,
        "记录导入完成"
    );

    Ok(stats)
}
