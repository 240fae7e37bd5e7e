// ==========================================
// MUD 世界数据导入器 - 压缩包导入
// ==========================================
// 职责: zip 数据包解压到暂存目录后批量导入; 资源包解压到媒体目录
// 约束: 暂存目录在任何退出路径上都会被删除（TempDir 析构）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::tabular_importer::{BatchReport, TabularImporter};
use crate::repository::{RecordStore, SchemaSource};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tempfile::{Builder, TempDir};
use tracing::{debug, info, instrument, warn};
use zip::ZipArchive;

const SCRATCH_PREFIX: &str = "worlddata-";

fn open_archive(archive_path: &Path) -> ImportResult<ZipArchive<File>> {
    if !archive_path.is_file() {
        return Err(ImportError::SourceNotFound(
            archive_path.display().to_string(),
        ));
    }
    let file = File::open(archive_path)?;
    Ok(ZipArchive::new(file)?)
}

/// 创建解压暂存目录
fn create_scratch_dir(scratch_root: Option<&Path>) -> ImportResult<TempDir> {
    let mut builder = Builder::new();
    builder.prefix(SCRATCH_PREFIX);

    let dir = match scratch_root {
        Some(root) => {
            fs::create_dir_all(root)?;
            builder.tempdir_in(root)?
        }
        None => builder.tempdir()?,
    };
    Ok(dir)
}

impl<S, C> TabularImporter<S, C>
where
    S: RecordStore,
    C: SchemaSource,
{
    /// 从 zip 数据包导入全部记录类型
    ///
    /// # 返回
    /// - Ok(BatchReport): 批量导入汇总
    /// - Err: 压缩包打开/解压失败（暂存目录已清理）
    #[instrument(skip(self))]
    pub fn import_from_archive(&self, archive_path: &Path) -> ImportResult<BatchReport> {
        let scratch = create_scratch_dir(self.config().scratch_root.as_deref())?;
        debug!(scratch = %scratch.path().display(), "解压暂存目录已创建");

        let mut archive = open_archive(archive_path)?;
        archive.extract(scratch.path())?;
        info!(entries = archive.len(), "数据包解压完成");

        let report = self.import_all_known_kinds(Some(scratch.path()));

        if let Err(e) = scratch.close() {
            warn!(error = %e, "解压暂存目录删除失败");
        }
        Ok(report)
    }

    /// 将 zip 资源包解压到媒体目录（保留相对路径）
    ///
    /// # 返回
    /// - Ok(usize): 写入的文件数
    #[instrument(skip(self))]
    pub fn import_resources_from_archive(&self, archive_path: &Path) -> ImportResult<usize> {
        let media_root = self.config().media_root.as_path();
        fs::create_dir_all(media_root)?;

        let mut archive = open_archive(archive_path)?;
        let mut written = 0;

        for idx in 0..archive.len() {
            let mut entry = archive.by_index(idx)?;

            // 绝对路径或包含 .. 的条目不允许写出媒体目录
            let relative = match entry.enclosed_name() {
                Some(path) => path,
                None => {
                    warn!(entry = %entry.name(), "资源条目路径非法, 跳过");
                    continue;
                }
            };
            let target = media_root.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&target)?;
                continue;
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)?;
            io::copy(&mut entry, &mut out)?;
            written += 1;
        }

        info!(files = written, media_root = %media_root.display(), "资源包导入完成");
        Ok(written)
    }
}
