// ==========================================
// MUD 世界数据导入器 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供存储与 schema 访问接口,屏蔽数据库细节
// 约束: 所有值使用参数化绑定, 标识符统一加引号
// ==========================================

pub mod error;
pub mod record_store;
pub mod schema_registry;
pub mod sqlite_record_store;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use record_store::{Condition, RecordStore, SchemaSource};
pub use schema_registry::SchemaRegistry;
pub use sqlite_record_store::SqliteRecordStore;
