// ==========================================
// MUD 世界数据导入器 - 配置层
// ==========================================
// 职责: 运行参数与记录类型目录
// 存储: JSON 配置文件, 命令行参数可覆盖
// ==========================================

pub mod catalog;
pub mod importer_config;

// 重导出核心配置
pub use catalog::{CatalogPhase, KindCatalog};
pub use importer_config::{default_db_path, ConfigError, ImporterConfig, DB_PATH_ENV};
