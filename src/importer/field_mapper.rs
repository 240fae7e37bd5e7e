// ==========================================
// MUD 世界数据导入器 - 字段映射与类型转换
// ==========================================
// 职责: 表头列 → 声明类型; 原始文本 → 字段值
// 约束: 单字段转换失败只跳过该字段, 不中断整行
// ==========================================

use crate::domain::{ColumnType, FieldValue, Record, RecordSchema, ID_COLUMN};
use tracing::{debug, warn};

/// 解析表头各列的类型标签
///
/// 未声明的列按文本处理（不会失败）
pub fn resolve_column_types<S: AsRef<str>>(
    schema: &RecordSchema,
    column_names: &[S],
) -> Vec<ColumnType> {
    column_names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            schema.column_type(name).unwrap_or_else(|| {
                if name != ID_COLUMN {
                    debug!(kind = %schema.kind, column = %name, "列未在 schema 中声明, 按文本处理");
                }
                ColumnType::Text
            })
        })
        .collect()
}

/// 单字段转换失败明细
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub value: String,
    pub message: String,
}

/// 转换单个字段
///
/// # 返回
/// - Ok(Some(value)): 转换成功
/// - Ok(None): 该字段不写入（空值/外键/多对多）
/// - Err(message): 转换失败原因
pub fn coerce_value(column_type: ColumnType, raw: &str) -> Result<Option<FieldValue>, String> {
    match column_type {
        ColumnType::Text => Ok(Some(FieldValue::Text(raw.to_string()))),
        ColumnType::Boolean => {
            if raw.is_empty() {
                return Ok(None);
            }
            match raw {
                "True" => Ok(Some(FieldValue::Boolean(true))),
                "False" => Ok(Some(FieldValue::Boolean(false))),
                other => other
                    .trim()
                    .parse::<i64>()
                    .map(|v| Some(FieldValue::Boolean(v != 0)))
                    .map_err(|e| e.to_string()),
            }
        }
        ColumnType::Integer => {
            if raw.is_empty() {
                return Ok(None);
            }
            raw.trim()
                .parse::<i64>()
                .map(|v| Some(FieldValue::Integer(v)))
                .map_err(|e| e.to_string())
        }
        ColumnType::Float => {
            if raw.is_empty() {
                return Ok(None);
            }
            raw.trim()
                .parse::<f64>()
                .map(|v| Some(FieldValue::Float(v)))
                .map_err(|e| e.to_string())
        }
        ColumnType::Reference | ColumnType::MultiReference => Ok(None),
    }
}

/// 按位置组合列名/类型/原始值生成记录，并返回字段级错误
///
/// 三个序列按最短长度对齐; id 列与空列名总是跳过
pub fn coerce_record_with_report<N, V>(
    column_names: &[N],
    column_types: &[ColumnType],
    raw_values: &[V],
) -> (Record, Vec<FieldError>)
where
    N: AsRef<str>,
    V: AsRef<str>,
{
    let mut record = Record::new();
    let mut errors = Vec::new();

    for ((name, column_type), raw) in column_names
        .iter()
        .zip(column_types.iter())
        .zip(raw_values.iter())
    {
        let name = name.as_ref();
        // 空列名无对应字段; id 由存储分配; 外键/多对多列不做转换
        if name.is_empty() || name == ID_COLUMN || !column_type.is_coercible() {
            continue;
        }

        let raw = raw.as_ref();
        match coerce_value(*column_type, raw) {
            Ok(Some(value)) => record.insert(name, value),
            Ok(None) => {}
            Err(message) => {
                warn!(field = %name, value = %raw, error = %message, "字段值转换失败, 跳过该字段");
                errors.push(FieldError {
                    field: name.to_string(),
                    value: raw.to_string(),
                    message,
                });
            }
        }
    }

    (record, errors)
}

/// 按位置组合列名/类型/原始值生成记录
pub fn coerce_record<N, V>(column_names: &[N], column_types: &[ColumnType], raw_values: &[V]) -> Record
where
    N: AsRef<str>,
    V: AsRef<str>,
{
    coerce_record_with_report(column_names, column_types, raw_values).0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> RecordSchema {
        RecordSchema::new("world_objects")
            .with_column("key", ColumnType::Text)
            .with_column("visible", ColumnType::Boolean)
            .with_column("weight", ColumnType::Integer)
            .with_column("price", ColumnType::Float)
            .with_column("location", ColumnType::Reference)
            .with_column("tags", ColumnType::MultiReference)
    }

    #[test]
    fn test_resolve_column_types() {
        let names = ["key", "visible", "location", "tags", "unknown", "id"];
        let types = resolve_column_types(&schema(), &names);

        assert_eq!(
            types,
            vec![
                ColumnType::Text,
                ColumnType::Boolean,
                ColumnType::Reference,
                ColumnType::MultiReference,
                ColumnType::Text,
                ColumnType::Text,
            ]
        );
    }

    #[test]
    fn test_boolean_coercion_table() {
        let cases = [
            ("", None),
            ("True", Some(true)),
            ("False", Some(false)),
            ("0", Some(false)),
            ("1", Some(true)),
            ("2", Some(true)),
        ];

        for (raw, expected) in cases {
            let value = coerce_value(ColumnType::Boolean, raw).unwrap();
            assert_eq!(value.and_then(|v| v.as_bool()), expected, "raw = {:?}", raw);
        }
    }

    #[test]
    fn test_boolean_lowercase_literal_is_error() {
        // 只识别 "True"/"False" 字面量
        assert!(coerce_value(ColumnType::Boolean, "true").is_err());
        assert_eq!(
            coerce_value(ColumnType::Boolean, "-3").unwrap(),
            Some(FieldValue::Boolean(true))
        );
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(coerce_value(ColumnType::Integer, "").unwrap(), None);
        assert_eq!(coerce_value(ColumnType::Float, "").unwrap(), None);
        assert_eq!(
            coerce_value(ColumnType::Integer, "-42").unwrap(),
            Some(FieldValue::Integer(-42))
        );
        assert_eq!(
            coerce_value(ColumnType::Integer, " 7 ").unwrap(),
            Some(FieldValue::Integer(7))
        );
        assert_eq!(
            coerce_value(ColumnType::Float, "2.5").unwrap(),
            Some(FieldValue::Float(2.5))
        );
        assert!(coerce_value(ColumnType::Integer, "1.5").is_err());
        assert!(coerce_value(ColumnType::Float, "abc").is_err());
    }

    #[test]
    fn test_text_passthrough_and_references_omitted() {
        assert_eq!(
            coerce_value(ColumnType::Text, "").unwrap(),
            Some(FieldValue::Text(String::new()))
        );
        assert_eq!(coerce_value(ColumnType::Reference, "room_1").unwrap(), None);
        assert_eq!(coerce_value(ColumnType::MultiReference, "a,b").unwrap(), None);
    }

    #[test]
    fn test_coerce_record_skips_id_anywhere() {
        let names = ["key", "id", "weight"];
        let types = [ColumnType::Text, ColumnType::Integer, ColumnType::Integer];
        let values = ["sword", "99", "3"];

        let record = coerce_record(&names, &types, &values);
        assert!(!record.contains("id"));
        assert_eq!(record.get("weight"), Some(&FieldValue::Integer(3)));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_bad_field_does_not_abort_row() {
        let names = ["key", "weight", "price", "visible"];
        let types = resolve_column_types(&schema(), &names);
        let values = ["sword", "heavy", "10.5", "1"];

        let (record, errors) = coerce_record_with_report(&names, &types, &values);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "weight");
        assert_eq!(errors[0].value, "heavy");
        assert!(!record.contains("weight"));
        assert_eq!(record.get("price"), Some(&FieldValue::Float(10.5)));
        assert_eq!(record.get("visible"), Some(&FieldValue::Boolean(true)));
    }

    #[test]
    fn test_reference_and_empty_columns_skipped() {
        let names = ["key", "location", "tags", ""];
        let types = resolve_column_types(&schema(), &names);
        let values = ["sword", "room_1", "a,b", "stray"];

        let (record, errors) = coerce_record_with_report(&names, &types, &values);

        assert!(errors.is_empty());
        assert_eq!(record.len(), 1);
        assert!(!record.contains("location"));
        assert!(!record.contains(""));
    }

    #[test]
    fn test_short_row_truncates() {
        let names = ["key", "weight", "price"];
        let types = resolve_column_types(&schema(), &names);
        let values = ["sword"];

        let record = coerce_record(&names, &types, &values);
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("key"), Some(&FieldValue::Text("sword".to_string())));
    }
}
