// ==========================================
// MUD 世界数据导入器 - 表格数据导入器
// ==========================================
// 职责: 数据文件定位 → 选择读取器 → 清除旧数据 → 导入记录
// 约束: 单个数据源导入不向外抛错, 结果以 bool 返回并记录日志
// ==========================================

use crate::config::ImporterConfig;
use crate::domain::{DataTier, TIER_COLUMN};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{format_of, ReaderRegistry};
use crate::importer::record_importer::{import_rows, HeaderLayout, ImportStats};
use crate::repository::{Condition, RecordStore, SchemaSource};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, info_span, instrument, warn};
use uuid::Uuid;

// ==========================================
// SourceOptions - 单个数据源导入选项
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOptions {
    /// 指定文件格式（None 时取扩展名）
    pub file_type: Option<String>,

    /// 是否把定位符当作前缀匹配所有扩展名
    pub expand_wildcard: bool,

    /// 导入前是否清除旧数据
    pub clear_existing: bool,

    /// 导入的数据层级
    pub tier: DataTier,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            file_type: None,
            expand_wildcard: true,
            clear_existing: true,
            tier: DataTier::Custom,
        }
    }
}

// ==========================================
// BatchReport - 批量导入汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    /// 尝试导入的记录类型数
    pub attempted: usize,

    /// 成功导入的记录类型数
    pub imported: usize,

    /// 未导入的记录类型
    pub failed_kinds: Vec<String>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    fn start() -> Self {
        let now = Utc::now();
        Self {
            attempted: 0,
            imported: 0,
            failed_kinds: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    fn record(&mut self, kind: &str, imported: bool) {
        self.attempted += 1;
        if imported {
            self.imported += 1;
        } else {
            self.failed_kinds.push(kind.to_string());
        }
    }

    fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    /// 是否全部导入成功
    pub fn is_complete(&self) -> bool {
        self.failed_kinds.is_empty()
    }
}

// ==========================================
// TabularImporter
// ==========================================
pub struct TabularImporter<S, C>
where
    S: RecordStore,
    C: SchemaSource,
{
    // 持久化存储
    store: S,

    // schema 来源
    schemas: C,

    // 文件格式 → 读取器
    readers: ReaderRegistry,

    // 运行参数
    config: ImporterConfig,
}

impl<S, C> TabularImporter<S, C>
where
    S: RecordStore,
    C: SchemaSource,
{
    /// 创建新的 TabularImporter 实例
    ///
    /// # 参数
    /// - store: 记录存储
    /// - schemas: schema 来源
    /// - readers: 读取器注册表
    /// - config: 运行参数
    pub fn new(store: S, schemas: C, readers: ReaderRegistry, config: ImporterConfig) -> Self {
        Self {
            store,
            schemas,
            readers,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn schemas(&self) -> &C {
        &self.schemas
    }

    pub fn config(&self) -> &ImporterConfig {
        &self.config
    }

    /// 定位候选数据文件
    ///
    /// - expand_wildcard: 同目录下所有 "<文件名>." 开头的文件（按名称排序）
    /// - 否则: 定位符本身
    pub fn resolve_candidates(
        &self,
        locator: &Path,
        expand_wildcard: bool,
    ) -> ImportResult<Vec<PathBuf>> {
        if !expand_wildcard {
            return Ok(vec![locator.to_path_buf()]);
        }

        let prefix = match locator.file_name().and_then(|n| n.to_str()) {
            Some(name) => format!("{}.", name),
            None => return Ok(Vec::new()),
        };
        let dir = match locator.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut candidates = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            let matched = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(&prefix))
                .unwrap_or(false);
            if matched && path.is_file() {
                candidates.push(path);
            }
        }
        candidates.sort();

        Ok(candidates)
    }

    /// 从数据文件导入指定记录类型
    ///
    /// # 返回
    /// - true: 有数据源被导入
    /// - false: 没有可导入的数据源或导入失败（错误已记录日志）
    pub fn import_source(&self, locator: &Path, kind: &str, options: &SourceOptions) -> bool {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            "import_source",
            run_id = %run_id,
            kind = %kind,
            locator = %locator.display()
        );
        let _guard = span.enter();

        match self.try_import_source(locator, kind, options) {
            Ok(Some((source, stats))) => {
                info!(
                    source = %source.display(),
                    written = stats.rows_written,
                    failed = stats.rows_failed,
                    "{} 导入完成",
                    source.display()
                );
                true
            }
            Ok(None) => {
                warn!("无法导入 {}: 没有可读取的数据文件", locator.display());
                false
            }
            Err(e) => {
                error!(error = %e, "无法导入 {}", locator.display());
                false
            }
        }
    }

    fn try_import_source(
        &self,
        locator: &Path,
        kind: &str,
        options: &SourceOptions,
    ) -> ImportResult<Option<(PathBuf, ImportStats)>> {
        let candidates = self.resolve_candidates(locator, options.expand_wildcard)?;
        debug!(count = candidates.len(), "候选数据文件定位完成");

        for candidate in candidates {
            let format = match options
                .file_type
                .as_deref()
                .map(str::to_lowercase)
                .or_else(|| format_of(&candidate))
            {
                Some(format) => format,
                None => {
                    debug!(source = %candidate.display(), "无法确定文件格式, 跳过");
                    continue;
                }
            };

            if !self.readers.supports(&format) {
                debug!(source = %candidate.display(), format = %format, "文件格式不支持, 跳过");
                continue;
            }

            let mut reader = match self.readers.open(&format, &candidate) {
                Ok(reader) => reader,
                Err(e) => {
                    warn!(source = %candidate.display(), error = %e, "数据文件无法打开, 跳过");
                    continue;
                }
            };

            let schema = self.schemas.schema(kind)?;

            // 先校验表头, 再清除旧数据
            let layout = HeaderLayout::read(reader.as_mut(), &schema)?;

            if options.clear_existing {
                let conditions = if schema.is_tiered {
                    vec![Condition::eq(TIER_COLUMN, options.tier.is_system())]
                } else {
                    Vec::new()
                };
                let deleted = self.store.delete_matching(&schema, &conditions)?;
                debug!(deleted = deleted, tier = %options.tier, "旧数据已清除");
            }

            info!(source = %candidate.display(), "正在导入 {}", candidate.display());
            let stats = import_rows(&self.store, reader.as_mut(), &schema, &layout, options.tier)?;

            // 只处理第一个可读取的数据文件
            return Ok(Some((candidate, stats)));
        }

        Ok(None)
    }

    /// 按记录类型名从目录导入
    ///
    /// # 参数
    /// - base_path: 数据目录（None 时使用配置的世界数据目录）
    pub fn import_model(
        &self,
        kind: &str,
        base_path: Option<&Path>,
        clear_existing: bool,
        tier: DataTier,
    ) -> bool {
        let base = base_path.unwrap_or(self.config.world_data_dir.as_path());
        let options = SourceOptions {
            clear_existing,
            tier,
            ..SourceOptions::default()
        };
        self.import_source(&base.join(kind), kind, &options)
    }

    /// 按目录顺序导入全部记录类型（自定义数据）
    #[instrument(skip(self))]
    pub fn import_all_known_kinds(&self, base_path: Option<&Path>) -> BatchReport {
        let base = base_path.unwrap_or(self.config.world_data_dir.as_path());
        let mut report = BatchReport::start();

        for kind in self.config.catalog.ordered_kinds() {
            let imported = self.import_model(kind, Some(base), true, DataTier::Custom);
            report.record(kind, imported);
        }

        let report = report.finish();
        info!(
            attempted = report.attempted,
            imported = report.imported,
            failed = report.failed_kinds.len(),
            "世界数据批量导入完成"
        );
        report
    }

    /// 按目录顺序导入全部分层记录类型的系统数据
    ///
    /// 同 key 的自定义数据保持不变
    #[instrument(skip(self))]
    pub fn import_system_data(&self, base_path: &Path) -> BatchReport {
        let mut report = BatchReport::start();

        for kind in self.config.catalog.ordered_kinds() {
            match self.schemas.schema(kind) {
                Ok(schema) if schema.is_tiered => {
                    let imported = self.import_model(kind, Some(base_path), true, DataTier::System);
                    report.record(kind, imported);
                }
                Ok(_) => debug!(kind = %kind, "非分层记录类型, 跳过系统数据导入"),
                Err(e) => warn!(kind = %kind, error = %e, "记录类型未注册, 跳过系统数据导入"),
            }
        }

        let report = report.finish();
        info!(
            attempted = report.attempted,
            imported = report.imported,
            failed = report.failed_kinds.len(),
            "系统数据导入完成"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{SchemaRegistry, SqliteRecordStore};
    use tempfile::TempDir;

    fn importer() -> TabularImporter<SqliteRecordStore, SchemaRegistry> {
        TabularImporter::new(
            SqliteRecordStore::in_memory().unwrap(),
            SchemaRegistry::new(),
            ReaderRegistry::with_defaults(),
            ImporterConfig::default(),
        )
    }

    #[test]
    fn test_resolve_candidates_prefix_match() {
        let dir = TempDir::new().unwrap();
        for name in ["world_rooms.csv", "world_rooms.xlsx", "world_rooms_extra.csv", "world_exits.csv"] {
            std::fs::write(dir.path().join(name), "key\n").unwrap();
        }

        let candidates = importer()
            .resolve_candidates(&dir.path().join("world_rooms"), true)
            .unwrap();
        let names: Vec<String> = candidates
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["world_rooms.csv", "world_rooms.xlsx"]);
    }

    #[test]
    fn test_resolve_candidates_missing_dir() {
        let candidates = importer()
            .resolve_candidates(Path::new("/no/such/dir/world_rooms"), true)
            .unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_resolve_candidates_exact() {
        let locator = Path::new("data/world_rooms.csv");
        let candidates = importer().resolve_candidates(locator, false).unwrap();
        assert_eq!(candidates, vec![locator.to_path_buf()]);
    }

    #[test]
    fn test_batch_report_counts() {
        let mut report = BatchReport::start();
        report.record("a", true);
        report.record("b", false);
        let report = report.finish();

        assert_eq!(report.attempted, 2);
        assert_eq!(report.imported, 1);
        assert_eq!(report.failed_kinds, vec!["b"]);
        assert!(!report.is_complete());
        assert!(report.finished_at >= report.started_at);
    }
}
