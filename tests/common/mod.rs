//! Shared fixtures for integration tests
//!
//! Builds a real SQLite source case through the store API, with file bytes
//! on disk next to the database.

#![allow(dead_code)]

use portable_case::adapters::database::{PortableCaseStore, SourceCase};
use portable_case::adapters::sqlite::SqliteCaseDb;
use portable_case::config::{
    ApplicationConfig, LoggingConfig, OutputConfig, PackagingConfig, PortableCaseConfig,
    SelectionConfig, SourceConfig,
};
use portable_case::domain::builtin::{TSK_INTERESTING_ARTIFACT_HIT, TSK_INTERESTING_FILE_HIT};
use portable_case::domain::{
    ArtifactRecord, AttributeRecord, AttributeType, AttributeValue, AttributeValueType, ContentTag,
    FileInfo, FileSystemInfo, ImageInfo, KnownStatus, LocalFilesDataSourceInfo, ObjectId,
    TagDefinition, TagNameId, VolumeInfo, VolumeSystemInfo,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const CASE_NAME: &str = "Case1";
pub const REPORT_BYTES: &[u8] = b"%PDF-1.4 quarterly report";
pub const PHOTO_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0 holiday photo";
pub const NOTES_BYTES: &[u8] = b"meet at the usual place";
pub const IMAGE_TAG_DATA: &str = r#"{"regions":[{"x":1,"y":2,"w":30,"h":40}]}"#;

/// A source case with:
///
/// - image / volume system / volume / file system / `docs` holding
///   `report.pdf` and `photo.jpg`
/// - a local files data source holding `notes.txt`
/// - tags `Bookmark` (both disk files, two custom messages) and
///   `Notable Item` (`report.pdf` again)
/// - interesting items in set `Malware` (a file hit on `notes.txt` and an
///   artifact hit on `report.pdf` associated with the first message) and
///   set `Other` (a file hit on `photo.jpg`)
pub struct SourceFixture {
    pub dir: TempDir,
    pub db_path: PathBuf,
    pub db: Arc<SqliteCaseDb>,
    pub report: ObjectId,
    pub photo: ObjectId,
    pub notes: ObjectId,
    pub message_on_photo: ArtifactRecord,
    pub message_on_report: ArtifactRecord,
    pub bookmark: TagDefinition,
    pub notable: TagDefinition,
    pub photo_tag: ContentTag,
}

impl SourceFixture {
    pub fn build() -> Self {
        let dir = TempDir::new().unwrap();
        let case_dir = dir.path().join("source");
        fs::create_dir_all(case_dir.join("files")).unwrap();
        fs::write(case_dir.join("files/report.pdf"), REPORT_BYTES).unwrap();
        fs::write(case_dir.join("files/photo.jpg"), PHOTO_BYTES).unwrap();
        fs::write(case_dir.join("files/notes.txt"), NOTES_BYTES).unwrap();

        let db_path = case_dir.join("autopsy.db");
        let db = Arc::new(SqliteCaseDb::create(&db_path, CASE_NAME).unwrap());
        let store: &dyn PortableCaseStore = db.as_ref();

        let image = store
            .add_image(&ImageInfo {
                name: "disk.e01".to_string(),
                image_type: 64,
                sector_size: 512,
                size: 1_048_576,
                paths: vec!["/evidence/disk.e01".to_string()],
                time_zone: "UTC".to_string(),
                md5: Some("d41d8cd98f00b204e9800998ecf8427e".to_string()),
                sha1: None,
                sha256: None,
                device_id: "device-1".to_string(),
            })
            .unwrap();
        let vs = store
            .add_volume_system(
                image,
                &VolumeSystemInfo {
                    vs_type: 1,
                    offset: 0,
                    block_size: 512,
                },
            )
            .unwrap();
        let volume = store
            .add_volume(
                vs,
                &VolumeInfo {
                    addr: 2,
                    start: 2048,
                    length: 2000,
                    description: "NTFS / exFAT (0x07)".to_string(),
                    flags: 1,
                },
            )
            .unwrap();
        let fs_id = store
            .add_file_system(
                volume,
                &FileSystemInfo {
                    name: "NTFS".to_string(),
                    image_offset: 1_048_576,
                    fs_type: 1,
                    block_size: 4096,
                    block_count: 250,
                    root_inum: 5,
                    first_inum: 0,
                    last_inum: 300,
                },
            )
            .unwrap();
        let docs = store.add_local_directory(fs_id, "docs").unwrap();
        let report = store
            .add_local_file(
                docs,
                &FileInfo::named("report.pdf", REPORT_BYTES.len() as i64)
                    .with_mime_type("application/pdf"),
                "files/report.pdf",
            )
            .unwrap();
        let photo = store
            .add_local_file(
                docs,
                &FileInfo::named("photo.jpg", PHOTO_BYTES.len() as i64)
                    .with_mime_type("image/jpeg"),
                "files/photo.jpg",
            )
            .unwrap();

        let logical = store
            .add_local_files_data_source(&LocalFilesDataSourceInfo {
                name: "Logical Files".to_string(),
                device_id: "device-2".to_string(),
                time_zone: "UTC".to_string(),
            })
            .unwrap();
        let notes = store
            .add_local_file(
                logical,
                &FileInfo::named("notes.txt", NOTES_BYTES.len() as i64)
                    .with_mime_type("text/plain"),
                "files/notes.txt",
            )
            .unwrap();

        let message_type = store.add_artifact_type("CUSTOM_MESSAGE", "Messages").unwrap();
        let sender = store
            .add_attribute_type("CUSTOM_SENDER", "Sender", AttributeValueType::String)
            .unwrap();
        let name = builtin_attribute(store, "TSK_NAME");

        let message_on_photo = store
            .add_artifact(
                message_type.id,
                photo,
                &[
                    attribute(&name, AttributeValue::String("hello".to_string())),
                    attribute(&sender, AttributeValue::String("alice".to_string())),
                ],
            )
            .unwrap();
        let message_on_report = store
            .add_artifact(
                message_type.id,
                report,
                &[
                    attribute(&sender, AttributeValue::String("bob".to_string())),
                    attribute(&name, AttributeValue::String("re: hello".to_string())),
                ],
            )
            .unwrap();

        let set_name = builtin_attribute(store, "TSK_SET_NAME");
        let associated = builtin_attribute(store, "TSK_ASSOCIATED_ARTIFACT");
        let file_hit = store
            .artifact_type_by_name(TSK_INTERESTING_FILE_HIT)
            .unwrap()
            .unwrap();
        let artifact_hit = store
            .artifact_type_by_name(TSK_INTERESTING_ARTIFACT_HIT)
            .unwrap()
            .unwrap();
        store
            .add_artifact(
                file_hit.id,
                notes,
                &[attribute(&set_name, AttributeValue::String("Malware".to_string()))],
            )
            .unwrap();
        store
            .add_artifact(
                artifact_hit.id,
                report,
                &[
                    attribute(&set_name, AttributeValue::String("Malware".to_string())),
                    attribute(
                        &associated,
                        AttributeValue::Long(message_on_photo.id.get()),
                    ),
                ],
            )
            .unwrap();
        store
            .add_artifact(
                file_hit.id,
                photo,
                &[attribute(&set_name, AttributeValue::String("Other".to_string()))],
            )
            .unwrap();

        let bookmark = store
            .add_or_update_tag_name(&tag_definition("Bookmark", KnownStatus::Unknown))
            .unwrap();
        let notable = store
            .add_or_update_tag_name(&tag_definition("Notable Item", KnownStatus::Notable))
            .unwrap();
        store
            .add_or_update_tag_name(&tag_definition("Unused", KnownStatus::Unknown))
            .unwrap();

        store
            .add_content_tag(report, bookmark.id, "quarterly numbers", None)
            .unwrap();
        let photo_tag_id = store
            .add_content_tag(photo, bookmark.id, "face in frame", None)
            .unwrap();
        store
            .add_content_tag(report, notable.id, "", None)
            .unwrap();
        store
            .add_artifact_tag(message_on_photo.id, bookmark.id, "first contact")
            .unwrap();
        store
            .add_artifact_tag(message_on_report.id, bookmark.id, "")
            .unwrap();

        store.ensure_image_tag_table().unwrap();
        store.add_image_tag(photo_tag_id, IMAGE_TAG_DATA).unwrap();

        let photo_tag = db
            .content_tags_by_tag_name(bookmark.id)
            .unwrap()
            .into_iter()
            .find(|t| t.id == photo_tag_id)
            .unwrap();

        Self {
            dir,
            db_path,
            db,
            report,
            photo,
            notes,
            message_on_photo,
            message_on_report,
            bookmark,
            notable,
            photo_tag,
        }
    }

    pub fn source(&self) -> Arc<dyn SourceCase> {
        Arc::clone(&self.db) as Arc<dyn SourceCase>
    }

    /// Empty directory for portable cases
    pub fn output_dir(&self) -> PathBuf {
        let out = self.dir.path().join("exports");
        fs::create_dir_all(&out).unwrap();
        out
    }

    /// Adds two messages on `report.pdf` whose associated-artifact
    /// attributes point at each other, and tags the first with `tag_name`
    pub fn add_associated_cycle(&self, tag_name: &str) -> (ArtifactRecord, ArtifactRecord) {
        let store: &dyn PortableCaseStore = self.db.as_ref();
        let message_type = self.message_on_photo.artifact_type.id;
        let associated = builtin_attribute(store, "TSK_ASSOCIATED_ARTIFACT");

        let first = store
            .add_artifact(
                message_type,
                self.report,
                &[attribute(
                    &associated,
                    AttributeValue::Long(self.message_on_report.id.get()),
                )],
            )
            .unwrap();
        let second = store
            .add_artifact(
                message_type,
                self.report,
                &[attribute(&associated, AttributeValue::Long(first.id.get()))],
            )
            .unwrap();
        // The store API cannot create a forward reference, so close the loop
        // directly
        rusqlite::Connection::open(&self.db_path)
            .unwrap()
            .execute(
                "UPDATE blackboard_attributes SET value_int64 = ?1 WHERE artifact_id = ?2",
                rusqlite::params![second.id.get(), first.id.get()],
            )
            .unwrap();

        let tag = store
            .add_or_update_tag_name(&tag_definition(tag_name, KnownStatus::Unknown))
            .unwrap();
        store.add_artifact_tag(first.id, tag.id, "").unwrap();
        (first, second)
    }

    pub fn config(&self, tags: &[&str], sets: &[&str]) -> PortableCaseConfig {
        export_config(&self.db_path, &self.output_dir(), tags, sets)
    }
}

pub fn export_config(
    source: &Path,
    output: &Path,
    tags: &[&str],
    sets: &[&str],
) -> PortableCaseConfig {
    PortableCaseConfig {
        application: ApplicationConfig::default(),
        source: SourceConfig {
            case_database: source.to_path_buf(),
            case_name: None,
        },
        selection: SelectionConfig {
            tag_names: tags.iter().map(|t| t.to_string()).collect(),
            all_tags: false,
            interesting_set_names: sets.iter().map(|s| s.to_string()).collect(),
            all_sets: false,
        },
        output: OutputConfig {
            directory: output.to_path_buf(),
        },
        packaging: PackagingConfig::default(),
        logging: LoggingConfig::console_only(),
    }
}

fn builtin_attribute(store: &dyn PortableCaseStore, type_name: &str) -> AttributeType {
    store.attribute_type_by_name(type_name).unwrap().unwrap()
}

fn attribute(attribute_type: &AttributeType, value: AttributeValue) -> AttributeRecord {
    AttributeRecord::new(attribute_type.clone(), value, vec!["Fixture".to_string()]).unwrap()
}

fn tag_definition(name: &str, known_status: KnownStatus) -> TagDefinition {
    TagDefinition {
        id: TagNameId::new(0),
        display_name: name.to_string(),
        description: format!("{name} tag"),
        color: "#FF0000".to_string(),
        known_status,
    }
}
