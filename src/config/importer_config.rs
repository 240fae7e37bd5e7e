// ==========================================
// MUD 世界数据导入器 - 导入器配置
// ==========================================
// 职责: 数据库/世界数据/媒体目录等运行参数
// 存储: JSON 配置文件（缺失字段使用默认值）
// ==========================================

use crate::config::catalog::KindCatalog;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "WORLDDATA_DB_PATH";

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置文件格式错误 ({path}): {message}")]
    ParseError { path: String, message: String },
}

// ==========================================
// ImporterConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    /// SQLite 数据库文件
    pub database_path: PathBuf,

    /// 世界数据文件目录（按记录类型名查找数据文件）
    pub world_data_dir: PathBuf,

    /// 资源文件根目录
    pub media_root: PathBuf,

    /// 压缩包解压暂存目录的父目录（None 表示系统临时目录）
    pub scratch_root: Option<PathBuf>,

    /// schema 定义文件
    pub schema_path: Option<PathBuf>,

    /// 记录类型目录
    pub catalog: KindCatalog,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            world_data_dir: PathBuf::from("./worlddata"),
            media_root: PathBuf::from("./media"),
            scratch_root: None,
            schema_path: None,
            catalog: KindCatalog::default(),
        }
    }
}

impl ImporterConfig {
    /// 从 JSON 配置文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&raw).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 → 用户数据目录 → 当前目录
pub fn default_db_path() -> PathBuf {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    match dirs::data_dir() {
        Some(data_dir) => data_dir.join("worlddata-importer").join("worlddata.db"),
        None => PathBuf::from("./worlddata.db"),
    }
}
