// ==========================================
// MUD 世界数据导入器 - 命令行入口
// ==========================================
// 用法:
//   worlddata-import --schemas schemas.json all --path ./worlddata
//   worlddata-import --schemas schemas.json kind world_rooms --system
//   worlddata-import --schemas schemas.json archive ./worlddata.zip
// ==========================================

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use worlddata_importer::{
    logging, BatchReport, DataTier, ImporterConfig, ReaderRegistry, SchemaRegistry,
    SourceOptions, SqliteRecordStore, TabularImporter,
};

// ==========================================
// 命令行参数
// ==========================================
#[derive(Parser, Debug)]
#[command(name = "worlddata-import", version, about = "MUD 世界数据导入器")]
struct Cli {
    /// JSON 配置文件
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// SQLite 数据库文件（覆盖配置）
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// schema 定义文件（覆盖配置）
    #[arg(long, value_name = "FILE")]
    schemas: Option<PathBuf>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 按目录顺序导入全部记录类型
    All {
        /// 世界数据目录
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// 导入单个记录类型
    Kind {
        kind: String,

        /// 世界数据目录
        #[arg(long)]
        path: Option<PathBuf>,

        /// 保留已有数据
        #[arg(long)]
        keep_existing: bool,

        /// 作为系统数据导入
        #[arg(long)]
        system: bool,
    },

    /// 从指定数据文件导入记录类型
    File {
        locator: PathBuf,
        kind: String,

        /// 指定文件格式（如 csv/xlsx）
        #[arg(long = "type")]
        file_type: Option<String>,

        /// 定位符即文件路径（不做前缀匹配）
        #[arg(long)]
        exact: bool,

        #[arg(long)]
        keep_existing: bool,

        #[arg(long)]
        system: bool,
    },

    /// 导入全部分层记录类型的系统数据
    System { path: PathBuf },

    /// 从 zip 数据包导入
    Archive { archive: PathBuf },

    /// 将 zip 资源包解压到媒体目录
    Resources { archive: PathBuf },
}

// ==========================================
// 配置装配
// ==========================================
fn load_config(cli: &Cli) -> Result<ImporterConfig> {
    let mut config = match &cli.config {
        Some(path) => ImporterConfig::from_file(path)?,
        None => ImporterConfig::default(),
    };

    // 命令行参数优先于配置文件
    if let Some(db) = &cli.db {
        config.database_path = db.clone();
    }
    if let Some(schemas) = &cli.schemas {
        config.schema_path = Some(schemas.clone());
    }
    Ok(config)
}

fn build_importer(config: ImporterConfig) -> Result<TabularImporter<SqliteRecordStore, SchemaRegistry>> {
    let schema_path = match &config.schema_path {
        Some(path) => path.clone(),
        None => bail!("未指定 schema 定义文件（--schemas 或配置项 schema_path）"),
    };
    let schemas = SchemaRegistry::from_json_file(&schema_path)?;
    tracing::info!(kinds = schemas.len(), path = %schema_path.display(), "schema 定义已加载");

    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("创建数据库目录失败: {}", parent.display())
            })?;
        }
    }
    let store = SqliteRecordStore::new(&config.database_path)
        .with_context(|| format!("打开数据库失败: {}", config.database_path.display()))?;
    tracing::info!(db = %config.database_path.display(), "数据库已打开");

    Ok(TabularImporter::new(
        store,
        schemas,
        ReaderRegistry::with_defaults(),
        config,
    ))
}

fn report_ok(report: &BatchReport) -> bool {
    if !report.is_complete() {
        tracing::warn!(kinds = ?report.failed_kinds, "部分记录类型未导入");
    }
    report.imported > 0
}

fn run(cli: Cli) -> Result<bool> {
    let config = load_config(&cli)?;
    let importer = build_importer(config)?;

    let ok = match cli.command {
        Command::All { path } => report_ok(&importer.import_all_known_kinds(path.as_deref())),
        Command::Kind {
            kind,
            path,
            keep_existing,
            system,
        } => importer.import_model(
            &kind,
            path.as_deref(),
            !keep_existing,
            DataTier::from_system_flag(system),
        ),
        Command::File {
            locator,
            kind,
            file_type,
            exact,
            keep_existing,
            system,
        } => {
            let options = SourceOptions {
                file_type,
                expand_wildcard: !exact,
                clear_existing: !keep_existing,
                tier: DataTier::from_system_flag(system),
            };
            importer.import_source(&locator, &kind, &options)
        }
        Command::System { path } => report_ok(&importer.import_system_data(&path)),
        Command::Archive { archive } => report_ok(&importer.import_from_archive(&archive)?),
        Command::Resources { archive } => {
            let written = importer.import_resources_from_archive(&archive)?;
            println!("{} 个资源文件已写入 {}", written, importer.config().media_root.display());
            true
        }
    };
    Ok(ok)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            tracing::error!("导入未完成");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = ?e, "导入失败");
            eprintln!("错误: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_command() {
        let cli = Cli::try_parse_from([
            "worlddata-import",
            "--schemas",
            "schemas.json",
            "file",
            "data/settings.export",
            "game_settings",
            "--type",
            "xlsx",
            "--exact",
            "--log-json",
        ])
        .unwrap();

        assert!(cli.log_json);
        assert_eq!(cli.schemas, Some(PathBuf::from("schemas.json")));
        match cli.command {
            Command::File {
                file_type,
                exact,
                keep_existing,
                system,
                ..
            } => {
                assert_eq!(file_type.as_deref(), Some("xlsx"));
                assert!(exact);
                assert!(!keep_existing);
                assert!(!system);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from(["worlddata-import", "--db", "/tmp/w.db", "all"]).unwrap();
        let config = load_config(&cli).unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/w.db"));
        assert!(!cli.log_json);
    }
}
