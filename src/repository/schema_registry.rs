// ==========================================
// MUD 世界数据导入器 - Schema 注册表
// ==========================================
// 职责: 内存中的记录类型 schema 来源，可由 JSON 文件加载
// 格式: {"kinds": [{"kind": "...", "tiered": false, "columns": [...]}]}
// ==========================================

use crate::domain::RecordSchema;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record_store::SchemaSource;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    kinds: Vec<RecordSchema>,
}

// ==========================================
// SchemaRegistry
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, RecordSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册（或覆盖）一个记录类型
    pub fn register(&mut self, schema: RecordSchema) {
        self.schemas.insert(schema.kind.clone(), schema);
    }

    pub fn with_schema(mut self, schema: RecordSchema) -> Self {
        self.register(schema);
        self
    }

    /// 从 JSON 字符串加载
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let file: SchemaFile = serde_json::from_str(raw)?;
        let mut registry = Self::new();
        for schema in file.kinds {
            registry.register(schema);
        }
        Ok(registry)
    }

    /// 从 JSON 文件加载
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let schema_error = |message: String| RepositoryError::SchemaFileError {
            path: path.display().to_string(),
            message,
        };

        let raw = std::fs::read_to_string(path).map_err(|e| schema_error(e.to_string()))?;
        Self::from_json_str(&raw).map_err(|e| schema_error(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.schemas.contains_key(kind)
    }
}

impl SchemaSource for SchemaRegistry {
    fn schema(&self, kind: &str) -> RepositoryResult<RecordSchema> {
        self.schemas
            .get(kind)
            .cloned()
            .ok_or_else(|| RepositoryError::UnknownKind(kind.to_string()))
    }
}
