//! End-to-end tests for building a portable case from a SQLite source case

mod common;

use common::{SourceFixture, CASE_NAME, IMAGE_TAG_DATA, NOTES_BYTES, PHOTO_BYTES, REPORT_BYTES};
use portable_case::adapters::archive::SevenZipArchiver;
use portable_case::adapters::database::{IdSequence, KeyValueTable, PortableCaseStore, SourceCase};
use portable_case::adapters::sqlite::SqliteCaseDb;
use portable_case::config::PortableCaseConfig;
use portable_case::core::export::layout::{FILES_DIR_NAME, PORTABLE_SUFFIX};
use portable_case::core::export::{ExportCoordinator, ProgressPanel, ReportStatus};
use portable_case::core::state::SchemaBaseline;
use portable_case::domain::builtin::{
    CUSTOM_TYPE_ID_BASE, TSK_INTERESTING_ARTIFACT_HIT, TSK_INTERESTING_FILE_HIT,
};
use portable_case::domain::{
    ArtifactId, ArtifactRecord, ArtifactTag, ArtifactType, AttributeRecord,
    ContentKind, ContentNode, ContentTag, ObjectId, PortableCaseError, Result, TagDefinition,
    TagId, TagNameId,
};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

fn coordinator(fixture: &SourceFixture, config: PortableCaseConfig) -> ExportCoordinator {
    coordinator_with_source(fixture.source(), config, Arc::new(ProgressPanel::new()))
}

fn coordinator_with_source(
    source: Arc<dyn SourceCase>,
    config: PortableCaseConfig,
    progress: Arc<ProgressPanel>,
) -> ExportCoordinator {
    let archiver = Arc::new(SevenZipArchiver::from_config(&config.packaging));
    ExportCoordinator::from_parts(config, source, archiver, progress)
}

fn case_dir(config: &PortableCaseConfig) -> PathBuf {
    config
        .output
        .directory
        .join(format!("{CASE_NAME}{PORTABLE_SUFFIX}"))
}

fn open_portable(config: &PortableCaseConfig) -> SqliteCaseDb {
    SqliteCaseDb::open(&case_dir(config).join("case.db")).unwrap()
}

fn read_file(case: &SqliteCaseDb, id: ObjectId) -> Vec<u8> {
    let mut bytes = Vec::new();
    case.open_file(id).unwrap().read_to_end(&mut bytes).unwrap();
    bytes
}

fn tag_named(case: &SqliteCaseDb, name: &str) -> TagDefinition {
    case.tag_names_in_use()
        .unwrap()
        .into_iter()
        .find(|t| t.display_name == name)
        .unwrap()
}

fn file_named(case: &SqliteCaseDb, tags: &[ContentTag], name: &str) -> ContentNode {
    tags.iter()
        .map(|t| case.content(t.content_id).unwrap())
        .find(|node| matches!(&node.kind, ContentKind::LocalFile(info) if info.name == name))
        .unwrap()
}

fn sender(artifact: &ArtifactRecord) -> Option<&str> {
    artifact
        .attribute("CUSTOM_SENDER")
        .and_then(|a| a.value.as_str())
}

#[tokio::test]
async fn test_tagged_files_are_copied_with_ancestry() {
    let fixture = SourceFixture::build();
    let config = fixture.config(&["Bookmark"], &[]);

    let summary = coordinator(&fixture, config.clone())
        .execute_export()
        .await
        .unwrap();

    assert_eq!(summary.status, ReportStatus::Complete);
    assert!(summary.is_successful());
    assert_eq!(summary.case_name, format!("{CASE_NAME}{PORTABLE_SUFFIX}"));
    assert_eq!(summary.case_dir, case_dir(&config));
    assert_eq!(summary.counts.tag_definitions, 1);
    assert_eq!(summary.counts.content_tags, 2);
    assert_eq!(summary.counts.artifact_tags, 2);
    assert_eq!(summary.counts.files, 2);
    assert_eq!(
        summary.counts.bytes,
        (REPORT_BYTES.len() + PHOTO_BYTES.len()) as u64
    );

    let portable = open_portable(&config);
    assert_eq!(portable.display_name().unwrap(), summary.case_name);

    let bookmark = tag_named(&portable, "Bookmark");
    assert_eq!(bookmark.description, fixture.bookmark.description);
    assert_eq!(bookmark.color, fixture.bookmark.color);

    let tags = portable.content_tags_by_tag_name(bookmark.id).unwrap();
    assert_eq!(tags.len(), 2);

    let report = file_named(&portable, &tags, "report.pdf");
    assert_eq!(read_file(&portable, report.id), REPORT_BYTES);
    let ContentKind::LocalFile(info) = &report.kind else {
        unreachable!()
    };
    let local_path = info.local_path.clone().unwrap();
    assert!(local_path.starts_with(&format!("{FILES_DIR_NAME}/Documents/")));
    assert!(local_path.ends_with("report.pdf"));

    let photo = file_named(&portable, &tags, "photo.jpg");
    assert_eq!(read_file(&portable, photo.id), PHOTO_BYTES);
    let ContentKind::LocalFile(info) = &photo.kind else {
        unreachable!()
    };
    assert!(info
        .local_path
        .as_deref()
        .unwrap()
        .starts_with(&format!("{FILES_DIR_NAME}/Image/")));

    // docs -> file system -> volume -> volume system -> image
    let mut labels = Vec::new();
    let mut current = portable.parent(report.id).unwrap();
    while let Some(node) = current {
        labels.push(node.kind.label());
        current = portable.parent(node.id).unwrap();
    }
    assert_eq!(
        labels,
        vec!["local directory", "file system", "volume", "volume system", "image"]
    );

    assert!(case_dir(&config).join("Reports").is_dir());
    assert!(case_dir(&config).join("case.json").is_file());
}

#[tokio::test]
async fn test_shared_content_is_copied_once() {
    let fixture = SourceFixture::build();
    let config = fixture.config(&["Bookmark", "Notable Item"], &[]);

    let summary = coordinator(&fixture, config.clone())
        .execute_export()
        .await
        .unwrap();

    assert_eq!(summary.counts.content_tags, 3);
    assert_eq!(summary.counts.files, 2);

    let portable = open_portable(&config);
    let bookmark_tags = portable
        .content_tags_by_tag_name(tag_named(&portable, "Bookmark").id)
        .unwrap();
    let notable_tags = portable
        .content_tags_by_tag_name(tag_named(&portable, "Notable Item").id)
        .unwrap();
    assert_eq!(notable_tags.len(), 1);

    let report = file_named(&portable, &bookmark_tags, "report.pdf");
    assert_eq!(notable_tags[0].content_id, report.id);

    let files_on_disk: usize = std::fs::read_dir(case_dir(&config).join(FILES_DIR_NAME))
        .unwrap()
        .map(|category| std::fs::read_dir(category.unwrap().path()).unwrap().count())
        .sum();
    assert_eq!(files_on_disk, 2);
}

#[tokio::test]
async fn test_custom_types_are_recreated_once() {
    let fixture = SourceFixture::build();
    let config = fixture.config(&["Bookmark"], &[]);

    let summary = coordinator(&fixture, config.clone())
        .execute_export()
        .await
        .unwrap();
    assert_eq!(summary.counts.custom_artifact_types, 1);
    assert_eq!(summary.counts.custom_attribute_types, 1);
    assert_eq!(summary.counts.artifacts, 2);

    let portable = open_portable(&config);
    let messages = portable.artifacts_by_type("CUSTOM_MESSAGE").unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].artifact_type, messages[1].artifact_type);
    assert!(messages[0].artifact_type.id.get() >= CUSTOM_TYPE_ID_BASE);
    assert_eq!(messages[0].artifact_type.display_name, "Messages");

    // Attribute order and provenance survive the copy
    let from_report = messages
        .iter()
        .find(|m| sender(m) == Some("bob"))
        .unwrap();
    let names: Vec<&str> = from_report
        .attributes
        .iter()
        .map(|a| a.attribute_type.type_name.as_str())
        .collect();
    assert_eq!(names, vec!["CUSTOM_SENDER", "TSK_NAME"]);
    assert!(from_report
        .attributes
        .iter()
        .all(|a| a.sources == vec!["Fixture".to_string()]));

    let artifact_tags = portable
        .artifact_tags_by_tag_name(tag_named(&portable, "Bookmark").id)
        .unwrap();
    assert_eq!(artifact_tags.len(), 2);
    let first_contact = artifact_tags
        .iter()
        .find(|t| t.comment == "first contact")
        .unwrap();
    let tagged = portable.artifact(first_contact.artifact_id).unwrap();
    assert_eq!(sender(&tagged), Some("alice"));
    let source_file = portable.content(tagged.source_obj_id).unwrap();
    assert_eq!(source_file.name(), "photo.jpg");
}

#[tokio::test]
async fn test_interesting_sets_follow_associated_artifacts() {
    let fixture = SourceFixture::build();
    let config = fixture.config(&[], &["Malware"]);

    let summary = coordinator(&fixture, config.clone())
        .execute_export()
        .await
        .unwrap();

    assert_eq!(summary.counts.interesting_items, 2);
    assert_eq!(summary.counts.tag_definitions, 0);
    // file hit, artifact hit and the message the artifact hit points at
    assert_eq!(summary.counts.artifacts, 3);
    // notes.txt and report.pdf; photo.jpg is only in the unselected "Other" set
    assert_eq!(summary.counts.files, 2);
    let image_dir = case_dir(&config).join(FILES_DIR_NAME).join("Image");
    assert_eq!(std::fs::read_dir(image_dir).unwrap().count(), 0);

    let portable = open_portable(&config);
    let sets = portable.interesting_item_set_counts().unwrap();
    assert_eq!(sets.get("Malware"), Some(&2));
    assert!(!sets.contains_key("Other"));

    let file_hits = portable.artifacts_by_type(TSK_INTERESTING_FILE_HIT).unwrap();
    assert_eq!(file_hits.len(), 1);
    let notes = portable.content(file_hits[0].source_obj_id).unwrap();
    assert_eq!(notes.name(), "notes.txt");
    assert_eq!(read_file(&portable, notes.id), NOTES_BYTES);
    let data_source = portable.parent(notes.id).unwrap().unwrap();
    assert!(matches!(data_source.kind, ContentKind::LocalFilesDataSource(_)));

    let artifact_hits = portable
        .artifacts_by_type(TSK_INTERESTING_ARTIFACT_HIT)
        .unwrap();
    assert_eq!(artifact_hits.len(), 1);
    let (associated_id, _) = artifact_hits[0].associated_artifact().unwrap().unwrap();
    let associated = portable.artifact(associated_id).unwrap();
    assert_eq!(sender(&associated), Some("alice"));
    // The associated message hangs off the hit's new source, report.pdf
    assert_eq!(associated.source_obj_id, artifact_hits[0].source_obj_id);
    assert_eq!(
        portable.content(associated.source_obj_id).unwrap().name(),
        "report.pdf"
    );
}

#[tokio::test]
async fn test_source_case_file_is_left_unchanged() {
    let fixture = SourceFixture::build();
    PortableCaseStore::close(fixture.db.as_ref()).unwrap();
    rusqlite::Connection::open(&fixture.db_path)
        .unwrap()
        .query_row("PRAGMA journal_mode = DELETE", [], |_| Ok(()))
        .unwrap();
    let bytes_before = std::fs::read(&fixture.db_path).unwrap();
    let modified_before = std::fs::metadata(&fixture.db_path).unwrap().modified().unwrap();

    let config = fixture.config(&["Bookmark"], &["Malware"]);
    let summary = ExportCoordinator::new(config)
        .unwrap()
        .execute_export()
        .await
        .unwrap();
    assert!(summary.is_successful());

    let mode: String = rusqlite::Connection::open(&fixture.db_path)
        .unwrap()
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode, "delete");
    assert_eq!(std::fs::read(&fixture.db_path).unwrap(), bytes_before);
    assert_eq!(
        std::fs::metadata(&fixture.db_path).unwrap().modified().unwrap(),
        modified_before
    );
}

fn count_rows(config: &PortableCaseConfig, sql: &str) -> i64 {
    rusqlite::Connection::open(case_dir(config).join("case.db"))
        .unwrap()
        .query_row(sql, [], |row| row.get(0))
        .unwrap()
}

#[tokio::test]
async fn test_associated_artifact_cycle_is_rejected() {
    let fixture = SourceFixture::build();
    fixture.add_associated_cycle("Loop");
    let config = fixture.config(&["Loop"], &[]);

    let result = coordinator(&fixture, config.clone()).execute_export().await;

    assert!(matches!(result, Err(PortableCaseError::CycleDetected(_))));
    // Neither message of the loop was written
    assert_eq!(
        count_rows(&config, "SELECT COUNT(*) FROM blackboard_artifacts"),
        0
    );
    assert_eq!(
        count_rows(&config, "SELECT COUNT(*) FROM blackboard_artifact_tags"),
        0
    );
}

#[tokio::test]
async fn test_missing_file_bytes_leave_no_row_or_file() {
    let fixture = SourceFixture::build();
    std::fs::remove_file(fixture.dir.path().join("source/files/photo.jpg")).unwrap();
    let config = fixture.config(&["Bookmark"], &[]);

    let result = coordinator(&fixture, config.clone()).execute_export().await;

    assert!(result.is_err());
    assert_eq!(
        count_rows(&config, "SELECT COUNT(*) FROM tsk_files WHERE name = 'photo.jpg'"),
        0
    );
    let image_dir = case_dir(&config).join(FILES_DIR_NAME).join("Image");
    assert_eq!(std::fs::read_dir(image_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn test_image_tag_data_and_baseline_are_recorded() {
    let fixture = SourceFixture::build();
    let config = fixture.config(&["Bookmark"], &[]);

    coordinator(&fixture, config.clone())
        .execute_export()
        .await
        .unwrap();

    let portable = open_portable(&config);
    let tags = portable
        .content_tags_by_tag_name(tag_named(&portable, "Bookmark").id)
        .unwrap();
    let photo = file_named(&portable, &tags, "photo.jpg");
    let photo_tag = tags.iter().find(|t| t.content_id == photo.id).unwrap();
    assert_eq!(photo_tag.comment, fixture.photo_tag.comment);
    assert_eq!(
        portable.image_tag_data(photo_tag.id).unwrap().as_deref(),
        Some(IMAGE_TAG_DATA)
    );

    let baseline = SchemaBaseline::load(&portable).unwrap();
    for sequence in IdSequence::ALL {
        assert_eq!(
            baseline.max_id(sequence),
            Some(fixture.db.max_id(sequence).unwrap().unwrap_or(0)),
            "{sequence:?}"
        );
    }
}

#[tokio::test]
async fn test_all_tags_and_all_sets() {
    let fixture = SourceFixture::build();
    let mut config = fixture.config(&[], &[]);
    config.selection.all_tags = true;
    config.selection.all_sets = true;

    let summary = coordinator(&fixture, config.clone())
        .execute_export()
        .await
        .unwrap();

    // "Unused" has no assignments and is not selected
    assert_eq!(summary.counts.tag_definitions, 2);
    assert_eq!(summary.counts.interesting_items, 3);

    let portable = open_portable(&config);
    let sets = portable.interesting_item_set_counts().unwrap();
    assert_eq!(sets.get("Malware"), Some(&2));
    assert_eq!(sets.get("Other"), Some(&1));
}

#[tokio::test]
async fn test_empty_selection_is_rejected_before_anything_is_created() {
    let fixture = SourceFixture::build();
    let config = fixture.config(&[], &[]);
    let coordinator = coordinator(&fixture, config.clone());

    let err = coordinator.execute_export().await.unwrap_err();

    assert!(matches!(err, PortableCaseError::Validation(_)));
    assert!(!case_dir(&config).exists());
    assert_eq!(coordinator.progress().status(), ReportStatus::Error);
}

#[tokio::test]
async fn test_unknown_tag_name_is_rejected() {
    let fixture = SourceFixture::build();
    let config = fixture.config(&["Does Not Exist"], &[]);

    let err = coordinator(&fixture, config.clone())
        .execute_export()
        .await
        .unwrap_err();

    assert!(matches!(err, PortableCaseError::Validation(_)));
    assert!(!case_dir(&config).exists());
}

#[tokio::test]
async fn test_unknown_set_alone_selects_nothing() {
    let fixture = SourceFixture::build();
    let config = fixture.config(&[], &["No Such Set"]);

    let err = coordinator(&fixture, config.clone())
        .execute_export()
        .await
        .unwrap_err();

    assert!(matches!(err, PortableCaseError::Validation(_)));
    assert!(!case_dir(&config).exists());
}

#[tokio::test]
async fn test_missing_output_directory_is_rejected() {
    let fixture = SourceFixture::build();
    let mut config = fixture.config(&["Bookmark"], &[]);
    config.output.directory = fixture.dir.path().join("missing");

    let err = coordinator(&fixture, config)
        .execute_export()
        .await
        .unwrap_err();

    assert!(matches!(err, PortableCaseError::Validation(_)));
}

#[tokio::test]
async fn test_existing_case_folder_is_not_touched() {
    let fixture = SourceFixture::build();
    let config = fixture.config(&["Bookmark"], &[]);
    std::fs::create_dir(case_dir(&config)).unwrap();
    std::fs::write(case_dir(&config).join("keep.txt"), "previous export").unwrap();

    let err = coordinator(&fixture, config.clone())
        .execute_export()
        .await
        .unwrap_err();

    assert!(matches!(err, PortableCaseError::Validation(_)));
    assert!(!case_dir(&config).join("case.db").exists());
    assert_eq!(
        std::fs::read_to_string(case_dir(&config).join("keep.txt")).unwrap(),
        "previous export"
    );
}

#[tokio::test]
async fn test_configured_case_name_is_used() {
    let fixture = SourceFixture::build();
    let mut config = fixture.config(&["Notable Item"], &[]);
    config.source.case_name = Some("Handover".to_string());

    let summary = coordinator(&fixture, config.clone())
        .execute_export()
        .await
        .unwrap();

    let expected = config
        .output
        .directory
        .join(format!("Handover{PORTABLE_SUFFIX}"));
    assert_eq!(summary.case_dir, expected);
    assert!(expected.join("case.db").is_file());
}

/// Source that requests cancellation the first time file bytes are read
struct CancelingSource {
    inner: Arc<dyn SourceCase>,
    progress: Arc<ProgressPanel>,
}

impl SourceCase for CancelingSource {
    fn display_name(&self) -> Result<String> {
        self.inner.display_name()
    }

    fn artifact_types_in_use(&self) -> Result<Vec<ArtifactType>> {
        self.inner.artifact_types_in_use()
    }

    fn content(&self, id: ObjectId) -> Result<ContentNode> {
        self.inner.content(id)
    }

    fn parent(&self, id: ObjectId) -> Result<Option<ContentNode>> {
        self.inner.parent(id)
    }

    fn artifacts_by_type(&self, type_name: &str) -> Result<Vec<ArtifactRecord>> {
        self.inner.artifacts_by_type(type_name)
    }

    fn artifact(&self, id: ArtifactId) -> Result<ArtifactRecord> {
        self.inner.artifact(id)
    }

    fn attributes(&self, artifact_id: ArtifactId) -> Result<Vec<AttributeRecord>> {
        self.inner.attributes(artifact_id)
    }

    fn tag_names_in_use(&self) -> Result<Vec<TagDefinition>> {
        self.inner.tag_names_in_use()
    }

    fn content_tags_by_tag_name(&self, tag_name: TagNameId) -> Result<Vec<ContentTag>> {
        self.inner.content_tags_by_tag_name(tag_name)
    }

    fn artifact_tags_by_tag_name(&self, tag_name: TagNameId) -> Result<Vec<ArtifactTag>> {
        self.inner.artifact_tags_by_tag_name(tag_name)
    }

    fn interesting_item_set_counts(&self) -> Result<BTreeMap<String, u64>> {
        self.inner.interesting_item_set_counts()
    }

    fn max_id(&self, sequence: IdSequence) -> Result<Option<i64>> {
        self.inner.max_id(sequence)
    }

    fn open_file(&self, id: ObjectId) -> Result<Box<dyn Read + Send>> {
        self.progress.cancel();
        self.inner.open_file(id)
    }

    fn image_tag_data(&self, tag: TagId) -> Result<Option<String>> {
        self.inner.image_tag_data(tag)
    }

    fn key_value_rows(&self, table: &KeyValueTable) -> Result<Vec<(String, String)>> {
        self.inner.key_value_rows(table)
    }
}

#[tokio::test]
async fn test_cancellation_stops_between_items() {
    let fixture = SourceFixture::build();
    let config = fixture.config(&["Bookmark"], &["Malware"]);
    let progress = Arc::new(ProgressPanel::new());
    let source = Arc::new(CancelingSource {
        inner: fixture.source(),
        progress: Arc::clone(&progress),
    });

    let summary = coordinator_with_source(source, config.clone(), Arc::clone(&progress))
        .execute_export()
        .await
        .unwrap();

    assert!(summary.is_cancelled());
    assert_eq!(progress.status(), ReportStatus::Canceled);
    // The item in flight finishes, nothing after it starts
    assert_eq!(summary.counts.content_tags, 1);
    assert_eq!(summary.counts.files, 1);
    assert_eq!(summary.counts.interesting_items, 0);

    // The partial case is left in place and is a readable case
    let portable = open_portable(&config);
    assert_eq!(portable.tag_names_in_use().unwrap().len(), 1);
    assert!(!case_dir(&config).join("Reports").exists());
}

#[tokio::test]
async fn test_cancel_before_start_creates_nothing() {
    let fixture = SourceFixture::build();
    let config = fixture.config(&["Bookmark"], &[]);
    let progress = Arc::new(ProgressPanel::new());
    progress.cancel();

    let summary = coordinator_with_source(fixture.source(), config.clone(), progress)
        .execute_export()
        .await
        .unwrap();

    assert!(summary.is_cancelled());
    assert!(!case_dir(&config).exists());
}
