// ==========================================
// MUD 世界数据导入器 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 定位: 世界数据文件（CSV/Excel/zip）→ 持久化存储
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - schema/记录/类型
pub mod domain;

// 数据仓储层 - 存储与 schema 来源
pub mod repository;

// 导入层 - 读取/转换/落库
pub mod importer;

// 配置层 - 运行参数与记录类型目录
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{ImporterConfig, KindCatalog};
pub use domain::{ColumnType, DataPhase, DataTier, FieldValue, Record, RecordSchema};
pub use importer::{
    BatchReport, ImportError, ImportResult, ImportStats, ReaderRegistry, SourceOptions,
    TabularImporter,
};
pub use repository::{
    Condition, RecordStore, RepositoryError, SchemaRegistry, SchemaSource, SqliteRecordStore,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "MUD 世界数据导入器";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
