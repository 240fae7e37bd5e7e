// ==========================================
// MUD 世界数据导入器 - SQLite 记录存储实现
// ==========================================
// 职责: 每个记录类型一张表，提供写入/过滤/计数/删除
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::{open_in_memory_connection, open_sqlite_connection};
use crate::domain::{ColumnType, FieldValue, Record, RecordSchema, ID_COLUMN, TIER_COLUMN};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record_store::{Condition, RecordStore};
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{params_from_iter, Connection};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            FieldValue::Boolean(v) => ToSqlOutput::Owned(Value::Integer(i64::from(*v))),
            FieldValue::Integer(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            FieldValue::Float(v) => ToSqlOutput::Owned(Value::Real(*v)),
            FieldValue::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
        })
    }
}

/// 标识符加双引号（内部双引号转义）
pub(crate) fn quote_ident(name: &str) -> RepositoryResult<String> {
    if name.is_empty() || name.contains('\0') {
        return Err(RepositoryError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// 生成 CREATE TABLE 语句
pub(crate) fn create_table_sql(schema: &RecordSchema) -> RepositoryResult<String> {
    let mut columns = vec![format!(
        "{} INTEGER PRIMARY KEY AUTOINCREMENT",
        quote_ident(ID_COLUMN)?
    )];

    for column in &schema.columns {
        // id 由存储层统一声明; 分层记录类型的 system_data 同样由存储层声明
        if column.name == ID_COLUMN || (schema.is_tiered && column.name == TIER_COLUMN) {
            continue;
        }
        columns.push(format!(
            "{} {}",
            quote_ident(&column.name)?,
            column.column_type.sql_affinity()
        ));
    }

    if schema.is_tiered {
        columns.push(format!(
            "{} INTEGER NOT NULL DEFAULT 0",
            quote_ident(TIER_COLUMN)?
        ));
    }

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_ident(&schema.kind)?,
        columns.join(", ")
    ))
}

/// 生成 WHERE 子句（条件按 ?1..?n 顺序绑定）
fn where_clause(conditions: &[Condition]) -> RepositoryResult<String> {
    if conditions.is_empty() {
        return Ok(String::new());
    }

    let parts = conditions
        .iter()
        .enumerate()
        .map(|(idx, c)| Ok(format!("{} = ?{}", quote_ident(&c.column)?, idx + 1)))
        .collect::<RepositoryResult<Vec<_>>>()?;

    Ok(format!(" WHERE {}", parts.join(" AND ")))
}

/// 读取列值并按 schema 还原类型
fn read_value(schema: &RecordSchema, column: &str, value: ValueRef<'_>) -> Option<FieldValue> {
    let is_boolean = column == TIER_COLUMN
        || schema.column_type(column) == Some(ColumnType::Boolean);

    match value {
        ValueRef::Null => None,
        ValueRef::Integer(v) if is_boolean => Some(FieldValue::Boolean(v != 0)),
        ValueRef::Integer(v) => Some(FieldValue::Integer(v)),
        ValueRef::Real(v) => Some(FieldValue::Float(v)),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(FieldValue::Text(String::from_utf8_lossy(bytes).into_owned()))
        }
    }
}

// ==========================================
// SqliteRecordStore
// ==========================================
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,

    // 已确认建表的记录类型
    ensured_kinds: Mutex<HashSet<String>>,
}

impl SqliteRecordStore {
    /// 创建新的 Store 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new<P: AsRef<Path>>(db_path: P) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self::with_connection(conn))
    }

    /// 内存数据库
    pub fn in_memory() -> RepositoryResult<Self> {
        let conn = open_in_memory_connection()?;
        Ok(Self::with_connection(conn))
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            ensured_kinds: Mutex::new(HashSet::new()),
        }
    }

    /// 确保记录类型对应的表存在（幂等）
    pub fn ensure_kind(&self, schema: &RecordSchema) -> RepositoryResult<()> {
        let mut ensured = self
            .ensured_kinds
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        if ensured.contains(&schema.kind) {
            return Ok(());
        }

        let sql = create_table_sql(schema)?;
        {
            let conn = self
                .conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            conn.execute(&sql, [])?;
        }
        debug!(kind = %schema.kind, "记录类型建表完成");

        ensured.insert(schema.kind.clone());
        Ok(())
    }
}

impl RecordStore for SqliteRecordStore {
    fn create(&self, schema: &RecordSchema, record: &Record) -> RepositoryResult<i64> {
        self.ensure_kind(schema)?;
        let table = quote_ident(&schema.kind)?;

        let sql = if record.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", table)
        } else {
            let columns = record
                .iter()
                .map(|(name, _)| quote_ident(name))
                .collect::<RepositoryResult<Vec<_>>>()?;
            let placeholders = (1..=columns.len())
                .map(|i| format!("?{}", i))
                .collect::<Vec<_>>();
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                columns.join(", "),
                placeholders.join(", ")
            )
        };

        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        conn.execute(&sql, params_from_iter(record.iter().map(|(_, v)| v)))?;
        Ok(conn.last_insert_rowid())
    }

    fn filter(
        &self,
        schema: &RecordSchema,
        conditions: &[Condition],
    ) -> RepositoryResult<Vec<Record>> {
        self.ensure_kind(schema)?;
        let sql = format!(
            "SELECT * FROM {}{} ORDER BY {}",
            quote_ident(&schema.kind)?,
            where_clause(conditions)?,
            quote_ident(ID_COLUMN)?
        );

        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let mut stmt = conn.prepare(&sql)?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let rows = stmt.query_map(params_from_iter(conditions.iter().map(|c| &c.value)), |row| {
            let mut record = Record::new();
            for (idx, name) in names.iter().enumerate() {
                if let Some(value) = read_value(schema, name, row.get_ref(idx)?) {
                    record.insert(name.clone(), value);
                }
            }
            Ok(record)
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn count(&self, schema: &RecordSchema, conditions: &[Condition]) -> RepositoryResult<usize> {
        self.ensure_kind(schema)?;
        let sql = format!(
            "SELECT COUNT(*) FROM {}{}",
            quote_ident(&schema.kind)?,
            where_clause(conditions)?
        );

        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let count: i64 = conn.query_row(
            &sql,
            params_from_iter(conditions.iter().map(|c| &c.value)),
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn delete_matching(
        &self,
        schema: &RecordSchema,
        conditions: &[Condition],
    ) -> RepositoryResult<usize> {
        self.ensure_kind(schema)?;
        let sql = format!(
            "DELETE FROM {}{}",
            quote_ident(&schema.kind)?,
            where_clause(conditions)?
        );

        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let deleted = conn.execute(&sql, params_from_iter(conditions.iter().map(|c| &c.value)))?;
        Ok(deleted)
    }
}
