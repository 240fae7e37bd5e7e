// ==========================================
// MUD 世界数据导入器 - 存储与 Schema 来源 Trait
// ==========================================
// 职责: 定义导入器依赖的窄接口（不包含实现）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::{FieldValue, Record, RecordSchema};
use crate::repository::error::RepositoryResult;

// ==========================================
// Condition - 等值过滤条件
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub value: FieldValue,
}

impl Condition {
    pub fn eq(column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

// ==========================================
// RecordStore Trait
// ==========================================
// 用途: 按记录类型写入/过滤/计数/删除
// 实现者: SqliteRecordStore（使用 rusqlite）
pub trait RecordStore {
    /// 写入一条新记录
    ///
    /// # 返回
    /// - Ok(i64): 存储分配的 id
    fn create(&self, schema: &RecordSchema, record: &Record) -> RepositoryResult<i64>;

    /// 查询满足全部条件的记录（条件为空时返回全部）
    fn filter(&self, schema: &RecordSchema, conditions: &[Condition])
        -> RepositoryResult<Vec<Record>>;

    /// 统计满足全部条件的记录数
    fn count(&self, schema: &RecordSchema, conditions: &[Condition]) -> RepositoryResult<usize>;

    /// 删除满足全部条件的记录（条件为空时清空）
    ///
    /// # 返回
    /// - Ok(usize): 删除的记录数
    fn delete_matching(
        &self,
        schema: &RecordSchema,
        conditions: &[Condition],
    ) -> RepositoryResult<usize>;
}

// ==========================================
// SchemaSource Trait
// ==========================================
// 用途: 按记录类型名提供 schema
// 实现者: SchemaRegistry
pub trait SchemaSource {
    /// 查询记录类型的 schema
    ///
    /// # 返回
    /// - Err(UnknownKind): 记录类型未注册
    fn schema(&self, kind: &str) -> RepositoryResult<RecordSchema>;
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn create(&self, schema: &RecordSchema, record: &Record) -> RepositoryResult<i64> {
        (**self).create(schema, record)
    }

    fn filter(
        &self,
        schema: &RecordSchema,
        conditions: &[Condition],
    ) -> RepositoryResult<Vec<Record>> {
        (**self).filter(schema, conditions)
    }

    fn count(&self, schema: &RecordSchema, conditions: &[Condition]) -> RepositoryResult<usize> {
        (**self).count(schema, conditions)
    }

    fn delete_matching(
        &self,
        schema: &RecordSchema,
        conditions: &[Condition],
    ) -> RepositoryResult<usize> {
        (**self).delete_matching(schema, conditions)
    }
}

impl<T: SchemaSource + ?Sized> SchemaSource for &T {
    fn schema(&self, kind: &str) -> RepositoryResult<RecordSchema> {
        (**self).schema(kind)
    }
}
