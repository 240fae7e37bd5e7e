// ==========================================
// 压缩包导入集成测试
// ==========================================
// 测试目标: 数据包导入、暂存目录清理、资源包解压
// ==========================================


use std::panic::{catch_unwind, AssertUnwindSafe};
use tempfile::TempDir;
use test_helpers::{
    create_test_importer, entry_count, rooms_schema, settings_schema, test_config, write_zip,
};
use worlddata_importer::repository::RepositoryResult;
use worlddata_importer::{
    FieldValue, ImportError, ReaderRegistry, RecordSchema, RecordStore, SchemaSource,
    SqliteRecordStore, TabularImporter,
};

/// 查询 schema 时 panic 的 schema 来源
struct PanickingSchemas;

impl SchemaSource for PanickingSchemas {
    fn schema(&self, kind: &str) -> RepositoryResult<RecordSchema> {
        panic!("schema lookup exploded for {}", kind);
    }
}

#[test]
fn test_import_from_archive() {
    let (root, importer) = create_test_importer().unwrap();
    let archive = root.path().join("worlddata.zip");
    write_zip(
        &archive,
        &[
            ("game_settings.csv", b"key,value\nmax_level,50\n"),
            ("world_rooms.csv", b"key,name\nroom_1,Hall\nroom_2,Gate\n"),
        ],
    )
    .unwrap();

    let report = importer.import_from_archive(&archive).unwrap();

    assert_eq!(report.attempted, 3);
    assert_eq!(report.imported, 2);
    assert_eq!(report.failed_kinds, vec!["world_exits"]);

    let settings = importer.store().filter(&settings_schema(), &[]).unwrap();
    assert_eq!(settings.len(), 1);
    assert_eq!(settings[0].get("value").and_then(FieldValue::as_integer), Some(50));
    assert_eq!(importer.store().count(&rooms_schema(), &[]).unwrap(), 2);

    // 暂存目录已删除
    assert_eq!(entry_count(&root.path().join("scratch")), 0);
}

#[test]
fn test_import_from_corrupt_archive_removes_scratch() {
    let (root, importer) = create_test_importer().unwrap();
    let archive = root.path().join("broken.zip");
    std::fs::write(&archive, b"this is not a zip archive").unwrap();

    let result = importer.import_from_archive(&archive);

    assert!(matches!(
        result,
        Err(ImportError::ArchiveError(_)) | Err(ImportError::FileReadError(_))
    ));
    assert_eq!(entry_count(&root.path().join("scratch")), 0);
}

#[test]
fn test_import_from_missing_archive() {
    let (root, importer) = create_test_importer().unwrap();

    let result = importer.import_from_archive(&root.path().join("missing.zip"));

    assert!(matches!(result, Err(ImportError::SourceNotFound(_))));
    assert_eq!(entry_count(&root.path().join("scratch")), 0);
}

#[test]
fn test_import_from_archive_removes_scratch_on_panic() {
    let root = TempDir::new().unwrap();
    let config = test_config(root.path());
    let store = SqliteRecordStore::new(&config.database_path).unwrap();
    let importer = TabularImporter::new(
        store,
        PanickingSchemas,
        ReaderRegistry::with_defaults(),
        config,
    );

    let archive = root.path().join("worlddata.zip");
    write_zip(&archive, &[("game_settings.csv", b"key,value\na,1\n")]).unwrap();

    let result = catch_unwind(AssertUnwindSafe(|| importer.import_from_archive(&archive)));

    assert!(result.is_err());
    assert_eq!(entry_count(&root.path().join("scratch")), 0);
}

#[test]
fn test_import_resources_from_archive() {
    let (root, importer) = create_test_importer().unwrap();
    let archive = root.path().join("resources.zip");
    let icon: &[u8] = &[0x89, b'P', b'N', b'G', 0x00, 0xff, 0x10];
    write_zip(
        &archive,
        &[
            ("images/", b""),
            ("images/icons/sword.png", icon),
            ("readme.txt", b"media pack"),
        ],
    )
    .unwrap();

    let written = importer.import_resources_from_archive(&archive).unwrap();

    assert_eq!(written, 2);
    let media = root.path().join("media");
    assert_eq!(std::fs::read(media.join("images/icons/sword.png")).unwrap(), icon);
    assert_eq!(std::fs::read(media.join("readme.txt")).unwrap(), b"media pack");
}

#[test]
fn test_import_resources_skips_escaping_entries() {
    let (root, importer) = create_test_importer().unwrap();
    let archive = root.path().join("resources.zip");
    write_zip(
        &archive,
        &[("../outside.txt", b"escape"), ("inside.txt", b"ok")],
    )
    .unwrap();

    let written = importer.import_resources_from_archive(&archive).unwrap();

    assert_eq!(written, 1);
    assert!(root.path().join("media").join("inside.txt").is_file());
    assert!(!root.path().join("outside.txt").exists());
}
