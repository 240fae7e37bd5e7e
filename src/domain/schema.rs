// ==========================================
// MUD 世界数据导入器 - 记录类型 Schema
// ==========================================
// 职责: 描述记录类型的列定义与是否分层
// 说明: is_tiered 在 schema 加载时确定, 导入过程中不再探测
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 分层标志列名
pub const TIER_COLUMN: &str = "system_data";

/// 存储分配的主键列名（导入时总是跳过）
pub const ID_COLUMN: &str = "id";

/// 自然键列名（分层合并时使用）
pub const KEY_COLUMN: &str = "key";

// ==========================================
// 列声明类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnType {
    Text,
    Boolean,
    Integer,
    Float,
    Reference,      // 外键, 不做类型转换
    MultiReference, // 多对多, 不做类型转换
}

impl ColumnType {
    /// 该类型是否参与值转换
    pub fn is_coercible(self) -> bool {
        !matches!(self, ColumnType::Reference | ColumnType::MultiReference)
    }

    /// SQLite 列亲和类型
    pub fn sql_affinity(self) -> &'static str {
        match self {
            ColumnType::Text | ColumnType::Reference | ColumnType::MultiReference => "TEXT",
            ColumnType::Boolean | ColumnType::Integer => "INTEGER",
            ColumnType::Float => "REAL",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Text => write!(f, "text"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Reference => write!(f, "reference"),
            ColumnType::MultiReference => write!(f, "multi-reference"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

// ==========================================
// RecordSchema - 记录类型描述
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    /// 记录类型名（同时作为表名）
    pub kind: String,

    /// 有序列定义（不含 id 与 system_data）
    #[serde(default)]
    pub columns: Vec<ColumnDef>,

    /// 是否区分系统/自定义数据
    #[serde(default, rename = "tiered")]
    pub is_tiered: bool,
}

impl RecordSchema {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            columns: Vec::new(),
            is_tiered: false,
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.push(ColumnDef::new(name, column_type));
        self
    }

    pub fn tiered(mut self, is_tiered: bool) -> Self {
        self.is_tiered = is_tiered;
        self
    }

    /// 查询列的声明类型
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.column_type)
    }
}
