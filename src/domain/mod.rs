// ==========================================
// MUD 世界数据导入器 - 领域模型层
// ==========================================
// 职责: 定义 schema、记录、数据层级等领域类型
// 红线: 不含数据访问逻辑, 不含导入流程
// ==========================================

pub mod record;
pub mod schema;
pub mod types;

// 重导出核心类型
pub use record::{FieldValue, Record};
pub use schema::{ColumnDef, ColumnType, RecordSchema, ID_COLUMN, KEY_COLUMN, TIER_COLUMN};
pub use types::{DataPhase, DataTier};
