//! Write side of the SQLite case database

use super::client::{checked_key_value_table, insert_failed, query_failed, SqliteCaseDb};
use super::models::{self, FILE_KIND_LOCAL, FILE_KIND_LOCAL_DIR, FILE_KIND_VIRTUAL_DIR};
use crate::adapters::database::traits::{KeyValueTable, PortableCaseStore};
use crate::domain::builtin::CUSTOM_TYPE_ID_BASE;
use crate::domain::{
    ArtifactId, ArtifactRecord, ArtifactType, ArtifactTypeId, AttributeRecord, AttributeType,
    AttributeValue, AttributeValueType, ByteRange, FileInfo, FileSystemInfo, ImageInfo,
    LocalFilesDataSourceInfo, ObjectId, ObjectType, Result, StoreError, TagDefinition, TagId,
    TagNameId, VolumeInfo, VolumeSystemInfo,
};
use rusqlite::{params, Connection};
use tracing::debug;

fn add_object(conn: &Connection, parent: Option<ObjectId>, object_type: ObjectType) -> Result<ObjectId> {
    conn.execute(
        "INSERT INTO tsk_objects (par_obj_id, type) VALUES (?1, ?2)",
        params![parent.map(ObjectId::get), object_type.code()],
    )
    .map_err(insert_failed)?;
    Ok(ObjectId::new(conn.last_insert_rowid()))
}

fn add_file_row(
    conn: &Connection,
    obj_id: ObjectId,
    file_kind: i64,
    info: &FileInfo,
) -> Result<()> {
    conn.prepare_cached(
        "INSERT INTO tsk_files (obj_id, type, name, size, ctime, crtime, atime, mtime, md5, known, mime_type, local_path) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )
    .and_then(|mut stmt| {
        stmt.execute(params![
            obj_id.get(),
            file_kind,
            info.name,
            info.size,
            info.ctime,
            info.crtime,
            info.atime,
            info.mtime,
            info.md5,
            info.known.code(),
            info.mime_type,
            info.local_path,
        ])
    })
    .map_err(insert_failed)?;
    Ok(())
}

fn find_artifact_type(conn: &Connection, type_name: &str) -> Result<Option<ArtifactType>> {
    let sql = format!(
        "SELECT {} FROM blackboard_artifact_types WHERE type_name = ?1",
        models::ARTIFACT_TYPE_COLUMNS
    );
    match conn.query_row(&sql, params![type_name], models::artifact_type) {
        Ok(t) => Ok(Some(t)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(query_failed(e)),
    }
}

fn find_attribute_type(conn: &Connection, type_name: &str) -> Result<Option<AttributeType>> {
    let sql = format!(
        "SELECT {} FROM blackboard_attribute_types WHERE type_name = ?1",
        models::ATTRIBUTE_TYPE_COLUMNS
    );
    match conn.query_row(&sql, params![type_name], models::attribute_type) {
        Ok(t) => Ok(Some(t)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(query_failed(e)),
    }
}

fn insert_attribute(conn: &Connection, artifact_id: ArtifactId, attr: &AttributeRecord) -> Result<()> {
    attr.attribute_type
        .value_type
        .check(&attr.attribute_type.type_name, &attr.value)?;

    let (mut byte, mut text, mut int32, mut int64, mut double) = (None, None, None, None, None);
    match &attr.value {
        AttributeValue::Bytes(v) => byte = Some(v.as_slice()),
        AttributeValue::String(v) => text = Some(v.as_str()),
        AttributeValue::Integer(v) => int32 = Some(*v),
        AttributeValue::Long(v) => int64 = Some(*v),
        AttributeValue::Double(v) => double = Some(*v),
    }

    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO blackboard_attributes \
             (artifact_id, source, attribute_type_id, value_type, value_byte, value_text, value_int32, value_int64, value_double) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .map_err(insert_failed)?;
    stmt.execute(params![
        artifact_id.get(),
        attr.joined_sources(),
        attr.attribute_type.id.get(),
        attr.attribute_type.value_type.code(),
        byte,
        text,
        int32,
        int64,
        double,
    ])
    .map_err(insert_failed)?;
    Ok(())
}

impl PortableCaseStore for SqliteCaseDb {
    fn add_image(&self, image: &ImageInfo) -> Result<ObjectId> {
        self.with_conn(|conn| {
            let obj_id = add_object(conn, None, ObjectType::Image)?;
            conn.execute(
                "INSERT INTO tsk_image_info (obj_id, type, ssize, tzone, size, md5, sha1, sha256, display_name, device_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    obj_id.get(),
                    image.image_type,
                    image.sector_size,
                    image.time_zone,
                    image.size,
                    image.md5,
                    image.sha1,
                    image.sha256,
                    image.name,
                    image.device_id,
                ],
            )
            .map_err(insert_failed)?;
            for (sequence, path) in image.paths.iter().enumerate() {
                conn.execute(
                    "INSERT INTO tsk_image_names (obj_id, name, sequence) VALUES (?1, ?2, ?3)",
                    params![obj_id.get(), path, sequence as i64],
                )
                .map_err(insert_failed)?;
            }
            Ok(obj_id)
        })
    }

    fn add_volume_system(&self, parent: ObjectId, info: &VolumeSystemInfo) -> Result<ObjectId> {
        self.with_conn(|conn| {
            let obj_id = add_object(conn, Some(parent), ObjectType::VolumeSystem)?;
            conn.execute(
                "INSERT INTO tsk_vs_info (obj_id, vs_type, img_offset, block_size) VALUES (?1, ?2, ?3, ?4)",
                params![obj_id.get(), info.vs_type, info.offset, info.block_size],
            )
            .map_err(insert_failed)?;
            Ok(obj_id)
        })
    }

    fn add_volume(&self, parent: ObjectId, info: &VolumeInfo) -> Result<ObjectId> {
        self.with_conn(|conn| {
            let obj_id = add_object(conn, Some(parent), ObjectType::Volume)?;
            conn.execute(
                "INSERT INTO tsk_vs_parts (obj_id, addr, start, length, descr, flags) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    obj_id.get(),
                    info.addr,
                    info.start,
                    info.length,
                    info.description,
                    info.flags
                ],
            )
            .map_err(insert_failed)?;
            Ok(obj_id)
        })
    }

    fn add_file_system(&self, parent: ObjectId, info: &FileSystemInfo) -> Result<ObjectId> {
        self.with_conn(|conn| {
            let obj_id = add_object(conn, Some(parent), ObjectType::FileSystem)?;
            conn.execute(
                "INSERT INTO tsk_fs_info (obj_id, img_offset, fs_type, block_size, block_count, root_inum, first_inum, last_inum, display_name) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    obj_id.get(),
                    info.image_offset,
                    info.fs_type,
                    info.block_size,
                    info.block_count,
                    info.root_inum,
                    info.first_inum,
                    info.last_inum,
                    info.name,
                ],
            )
            .map_err(insert_failed)?;
            Ok(obj_id)
        })
    }

    fn add_local_files_data_source(&self, info: &LocalFilesDataSourceInfo) -> Result<ObjectId> {
        self.with_conn(|conn| {
            let obj_id = add_object(conn, None, ObjectType::AbstractFile)?;
            add_file_row(conn, obj_id, FILE_KIND_VIRTUAL_DIR, &FileInfo::named(&info.name, 0))?;
            conn.execute(
                "INSERT INTO data_source_info (obj_id, device_id, time_zone) VALUES (?1, ?2, ?3)",
                params![obj_id.get(), info.device_id, info.time_zone],
            )
            .map_err(insert_failed)?;
            Ok(obj_id)
        })
    }

    fn add_local_directory(&self, parent: ObjectId, name: &str) -> Result<ObjectId> {
        self.with_conn(|conn| {
            let obj_id = add_object(conn, Some(parent), ObjectType::AbstractFile)?;
            add_file_row(conn, obj_id, FILE_KIND_LOCAL_DIR, &FileInfo::named(name, 0))?;
            Ok(obj_id)
        })
    }

    fn add_local_file(
        &self,
        parent: ObjectId,
        info: &FileInfo,
        relative_path: &str,
    ) -> Result<ObjectId> {
        let row = FileInfo {
            local_path: Some(relative_path.to_string()),
            ..info.clone()
        };
        self.with_conn(|conn| {
            let obj_id = add_object(conn, Some(parent), ObjectType::AbstractFile)?;
            add_file_row(conn, obj_id, FILE_KIND_LOCAL, &row)?;
            Ok(obj_id)
        })
    }

    fn artifact_type_by_name(&self, type_name: &str) -> Result<Option<ArtifactType>> {
        self.with_conn(|conn| find_artifact_type(conn, type_name))
    }

    fn add_artifact_type(&self, type_name: &str, display_name: &str) -> Result<ArtifactType> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO blackboard_artifact_types (artifact_type_id, type_name, display_name) \
                 SELECT MAX(COALESCE(MAX(artifact_type_id), 0) + 1, ?3), ?1, ?2 FROM blackboard_artifact_types",
                params![type_name, display_name, CUSTOM_TYPE_ID_BASE],
            )
            .map_err(insert_failed)?;
            let created = find_artifact_type(conn, type_name)?.ok_or_else(|| {
                StoreError::NotFound(format!("artifact type {type_name} after insert"))
            })?;
            debug!(type_name, id = %created.id, "Created artifact type");
            Ok(created)
        })
    }

    fn attribute_type_by_name(&self, type_name: &str) -> Result<Option<AttributeType>> {
        self.with_conn(|conn| find_attribute_type(conn, type_name))
    }

    fn add_attribute_type(
        &self,
        type_name: &str,
        display_name: &str,
        value_type: AttributeValueType,
    ) -> Result<AttributeType> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO blackboard_attribute_types (attribute_type_id, type_name, display_name, value_type) \
                 SELECT MAX(COALESCE(MAX(attribute_type_id), 0) + 1, ?4), ?1, ?2, ?3 FROM blackboard_attribute_types",
                params![type_name, display_name, value_type.code(), CUSTOM_TYPE_ID_BASE],
            )
            .map_err(insert_failed)?;
            let created = find_attribute_type(conn, type_name)?.ok_or_else(|| {
                StoreError::NotFound(format!("attribute type {type_name} after insert"))
            })?;
            debug!(type_name, id = %created.id, "Created attribute type");
            Ok(created)
        })
    }

    fn add_artifact(
        &self,
        artifact_type: ArtifactTypeId,
        source: ObjectId,
        attributes: &[AttributeRecord],
    ) -> Result<ArtifactRecord> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM blackboard_artifact_types WHERE artifact_type_id = ?1",
                models::ARTIFACT_TYPE_COLUMNS
            );
            let stored_type = match conn.query_row(&sql, params![artifact_type.get()], models::artifact_type) {
                Ok(t) => t,
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    return Err(StoreError::NotFound(format!("artifact type {artifact_type}")).into())
                }
                Err(e) => return Err(query_failed(e)),
            };

            let obj_id = add_object(conn, Some(source), ObjectType::Artifact)?;
            conn.execute(
                "INSERT INTO blackboard_artifacts (obj_id, artifact_obj_id, artifact_type_id) VALUES (?1, ?2, ?3)",
                params![source.get(), obj_id.get(), artifact_type.get()],
            )
            .map_err(insert_failed)?;
            let id = ArtifactId::new(conn.last_insert_rowid());

            for attr in attributes {
                insert_attribute(conn, id, attr)?;
            }

            Ok(ArtifactRecord {
                id,
                obj_id,
                artifact_type: stored_type,
                source_obj_id: source,
                attributes: attributes.to_vec(),
            })
        })
    }

    fn add_or_update_tag_name(&self, tag: &TagDefinition) -> Result<TagDefinition> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tag_names (display_name, description, color, known_status) VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT(display_name) DO UPDATE SET \
                 description = excluded.description, color = excluded.color, known_status = excluded.known_status",
                params![
                    tag.display_name,
                    tag.description,
                    tag.color,
                    tag.known_status.code()
                ],
            )
            .map_err(insert_failed)?;
            let sql = format!(
                "SELECT {} FROM tag_names WHERE display_name = ?1",
                models::TAG_NAME_COLUMNS
            );
            conn.query_row(&sql, params![tag.display_name], models::tag_definition)
                .map_err(query_failed)
        })
    }

    fn add_content_tag(
        &self,
        content: ObjectId,
        tag_name: TagNameId,
        comment: &str,
        byte_range: Option<ByteRange>,
    ) -> Result<TagId> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO content_tags (obj_id, tag_name_id, comment, begin_byte_offset, end_byte_offset) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    content.get(),
                    tag_name.get(),
                    comment,
                    byte_range.map(|r| r.begin),
                    byte_range.map(|r| r.end),
                ],
            )
            .map_err(insert_failed)?;
            Ok(TagId::new(conn.last_insert_rowid()))
        })
    }

    fn add_artifact_tag(
        &self,
        artifact: ArtifactId,
        tag_name: TagNameId,
        comment: &str,
    ) -> Result<TagId> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO blackboard_artifact_tags (artifact_id, tag_name_id, comment) VALUES (?1, ?2, ?3)",
                params![artifact.get(), tag_name.get(), comment],
            )
            .map_err(insert_failed)?;
            Ok(TagId::new(conn.last_insert_rowid()))
        })
    }

    fn ensure_image_tag_table(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS content_viewer_tags (
                     tag_id INTEGER PRIMARY KEY REFERENCES content_tags(tag_id),
                     app_data TEXT NOT NULL
                 );",
            )
            .map_err(|e| StoreError::SchemaFailed(e.to_string()).into())
        })
    }

    fn add_image_tag(&self, tag: TagId, app_data: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO content_viewer_tags (tag_id, app_data) VALUES (?1, ?2)",
                params![tag.get(), app_data],
            )
            .map_err(insert_failed)?;
            Ok(())
        })
    }

    fn create_key_value_table(&self, table: &KeyValueTable) -> Result<()> {
        let (name, key, value) = checked_key_value_table(table)?;
        self.with_conn(|conn| {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS \"{name}\" (\"{key}\" TEXT PRIMARY KEY, \"{value}\" TEXT)"
            ))
            .map_err(|e| StoreError::SchemaFailed(e.to_string()).into())
        })
    }

    fn put_key_value(&self, table: &KeyValueTable, key: &str, value: &str) -> Result<()> {
        let (name, key_column, value_column) = checked_key_value_table(table)?;
        self.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO \"{name}\" (\"{key_column}\", \"{value_column}\") VALUES (?1, ?2)"
                ),
                params![key, value],
            )
            .map_err(insert_failed)?;
            Ok(())
        })
    }

    fn begin_transaction(&self) -> Result<()> {
        self.begin()
    }

    fn commit_transaction(&self) -> Result<()> {
        self.commit()
    }

    fn rollback_transaction(&self) -> Result<()> {
        self.rollback()
    }

    fn close(&self) -> Result<()> {
        self.close_connection()
    }
}
