//! Read side of the SQLite case database

use super::client::{checked_key_value_table, query_failed, SqliteCaseDb};
use super::models::{self, FILE_KIND_LOCAL, FILE_KIND_LOCAL_DIR, FILE_KIND_VIRTUAL_DIR};
use crate::adapters::database::traits::{IdSequence, KeyValueTable, SourceCase};
use crate::domain::builtin::INTERESTING_ITEM_TYPES;
use crate::domain::artifact::SET_NAME_ATTRIBUTE;
use crate::domain::{
    ArtifactId, ArtifactRecord, ArtifactTag, ArtifactType, ArtifactTypeId, AttributeRecord,
    ContentKind, ContentNode, ContentTag, FileSystemInfo, ImageInfo, LocalFilesDataSourceInfo,
    ObjectId, ObjectType, Result, StoreError, TagDefinition, TagId, TagNameId, VolumeInfo,
    VolumeSystemInfo,
};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;

fn load_artifact(conn: &Connection, clause: &str, key: i64) -> Result<ArtifactRecord> {
    let sql = format!(
        "SELECT a.artifact_id, a.artifact_obj_id, a.obj_id, t.artifact_type_id, t.type_name, t.display_name \
         FROM blackboard_artifacts a \
         JOIN blackboard_artifact_types t ON t.artifact_type_id = a.artifact_type_id \
         WHERE {clause} = ?1"
    );
    let header = conn.query_row(&sql, params![key], |row| {
        Ok((
            ArtifactId::new(row.get(0)?),
            ObjectId::new(row.get(1)?),
            ObjectId::new(row.get(2)?),
            ArtifactType {
                id: ArtifactTypeId::new(row.get(3)?),
                type_name: row.get(4)?,
                display_name: row.get(5)?,
            },
        ))
    });
    let (id, obj_id, source_obj_id, artifact_type) = match header {
        Ok(header) => header,
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            return Err(StoreError::NotFound(format!("artifact {key}")).into())
        }
        Err(e) => return Err(query_failed(e)),
    };

    Ok(ArtifactRecord {
        id,
        obj_id,
        artifact_type,
        source_obj_id,
        attributes: load_attributes(conn, id)?,
    })
}

impl SqliteCaseDb {
    fn resolve_local_path(&self, local_path: &str) -> PathBuf {
        let path = PathBuf::from(local_path);
        if path.is_absolute() {
            path
        } else {
            self.root().join(path)
        }
    }
}

fn load_content(conn: &Connection, id: ObjectId) -> Result<ContentNode> {
    let object = conn.query_row(
        "SELECT par_obj_id, type FROM tsk_objects WHERE obj_id = ?1",
        params![id.get()],
        |row| Ok((row.get::<_, Option<i64>>(0)?, row.get::<_, i64>(1)?)),
    );
    let (parent, type_code) = match object {
        Ok(object) => object,
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            return Err(StoreError::NotFound(format!("content object {id}")).into())
        }
        Err(e) => return Err(query_failed(e)),
    };
    let object_type = ObjectType::from_code(type_code).ok_or_else(|| {
        StoreError::InvalidData(format!("object {id} has unknown type {type_code}"))
    })?;

    let kind = match object_type {
        ObjectType::Image => ContentKind::Image(load_image(conn, id)?),
        ObjectType::VolumeSystem => ContentKind::VolumeSystem(
            conn.query_row(
                "SELECT vs_type, img_offset, block_size FROM tsk_vs_info WHERE obj_id = ?1",
                params![id.get()],
                |row| {
                    Ok(VolumeSystemInfo {
                        vs_type: row.get(0)?,
                        offset: row.get(1)?,
                        block_size: row.get(2)?,
                    })
                },
            )
            .map_err(|e| detail_error(id, "tsk_vs_info", e))?,
        ),
        ObjectType::Volume => ContentKind::Volume(
            conn.query_row(
                "SELECT addr, start, length, descr, flags FROM tsk_vs_parts WHERE obj_id = ?1",
                params![id.get()],
                |row| {
                    Ok(VolumeInfo {
                        addr: row.get(0)?,
                        start: row.get(1)?,
                        length: row.get(2)?,
                        description: row.get(3)?,
                        flags: row.get(4)?,
                    })
                },
            )
            .map_err(|e| detail_error(id, "tsk_vs_parts", e))?,
        ),
        ObjectType::FileSystem => ContentKind::FileSystem(
            conn.query_row(
                "SELECT display_name, img_offset, fs_type, block_size, block_count, \
                 root_inum, first_inum, last_inum FROM tsk_fs_info WHERE obj_id = ?1",
                params![id.get()],
                |row| {
                    Ok(FileSystemInfo {
                        name: row.get(0)?,
                        image_offset: row.get(1)?,
                        fs_type: row.get(2)?,
                        block_size: row.get(3)?,
                        block_count: row.get(4)?,
                        root_inum: row.get(5)?,
                        first_inum: row.get(6)?,
                        last_inum: row.get(7)?,
                    })
                },
            )
            .map_err(|e| detail_error(id, "tsk_fs_info", e))?,
        ),
        ObjectType::AbstractFile => load_file_kind(conn, id)?,
        ObjectType::Artifact => ContentKind::ArtifactAsContent(Box::new(load_artifact(
            conn,
            "a.artifact_obj_id",
            id.get(),
        )?)),
    };

    Ok(ContentNode::new(id, parent.map(ObjectId::new), kind))
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        params![name],
        |row| row.get(0),
    )
    .map_err(query_failed)
}

fn detail_error(id: ObjectId, table: &str, e: rusqlite::Error) -> crate::domain::PortableCaseError {
    match e {
        rusqlite::Error::QueryReturnedNoRows => {
            StoreError::InvalidData(format!("object {id} has no {table} row")).into()
        }
        e => query_failed(e),
    }
}

fn load_image(conn: &Connection, id: ObjectId) -> Result<ImageInfo> {
    let mut image = conn
        .query_row(
            "SELECT display_name, type, ssize, size, tzone, md5, sha1, sha256, device_id \
             FROM tsk_image_info WHERE obj_id = ?1",
            params![id.get()],
            |row| {
                Ok(ImageInfo {
                    name: row.get(0)?,
                    image_type: row.get(1)?,
                    sector_size: row.get(2)?,
                    size: row.get(3)?,
                    paths: Vec::new(),
                    time_zone: row.get(4)?,
                    md5: row.get(5)?,
                    sha1: row.get(6)?,
                    sha256: row.get(7)?,
                    device_id: row.get(8)?,
                })
            },
        )
        .map_err(|e| detail_error(id, "tsk_image_info", e))?;

    let mut stmt = conn
        .prepare_cached("SELECT name FROM tsk_image_names WHERE obj_id = ?1 ORDER BY sequence")
        .map_err(query_failed)?;
    image.paths = stmt
        .query_map(params![id.get()], |row| row.get(0))
        .map_err(query_failed)?
        .collect::<rusqlite::Result<Vec<String>>>()
        .map_err(query_failed)?;
    Ok(image)
}

fn load_file_kind(conn: &Connection, id: ObjectId) -> Result<ContentKind> {
    let sql = format!(
        "SELECT type, {} FROM tsk_files WHERE obj_id = ?1",
        models::FILE_COLUMNS
    );
    let (file_kind, info) = conn
        .query_row(&sql, params![id.get()], |row| {
            Ok((row.get::<_, i64>(0)?, models::file_info(row, 1)?))
        })
        .map_err(|e| detail_error(id, "tsk_files", e))?;

    match file_kind {
        FILE_KIND_LOCAL => Ok(ContentKind::LocalFile(info)),
        FILE_KIND_LOCAL_DIR => Ok(ContentKind::LocalDirectory { name: info.name }),
        FILE_KIND_VIRTUAL_DIR => {
            let (device_id, time_zone) = conn
                .query_row(
                    "SELECT device_id, time_zone FROM data_source_info WHERE obj_id = ?1",
                    params![id.get()],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .map_err(|e| detail_error(id, "data_source_info", e))?;
            Ok(ContentKind::LocalFilesDataSource(LocalFilesDataSourceInfo {
                name: info.name,
                device_id,
                time_zone,
            }))
        }
        other => Err(StoreError::InvalidData(format!(
            "file {id} has unsupported file type {other}"
        ))
        .into()),
    }
}

fn load_attributes(conn: &Connection, artifact_id: ArtifactId) -> Result<Vec<AttributeRecord>> {
    let sql = format!(
        "{} WHERE a.artifact_id = ?1 ORDER BY a.attr_id",
        models::ATTRIBUTE_ROW_QUERY
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(query_failed)?;
    let rows = stmt
        .query_map(params![artifact_id.get()], models::attribute_row)
        .map_err(query_failed)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(query_failed)?;
    rows.into_iter().map(models::AttributeRow::into_record).collect()
}

impl SourceCase for SqliteCaseDb {
    fn display_name(&self) -> Result<String> {
        self.read_case_name()
    }

    fn artifact_types_in_use(&self) -> Result<Vec<ArtifactType>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM blackboard_artifact_types WHERE artifact_type_id IN \
                 (SELECT DISTINCT artifact_type_id FROM blackboard_artifacts) \
                 ORDER BY artifact_type_id",
                models::ARTIFACT_TYPE_COLUMNS
            );
            let mut stmt = conn.prepare(&sql).map_err(query_failed)?;
            let types = stmt
                .query_map([], models::artifact_type)
                .map_err(query_failed)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(query_failed)?;
            Ok(types)
        })
    }

    fn content(&self, id: ObjectId) -> Result<ContentNode> {
        self.with_conn(|conn| load_content(conn, id))
    }

    fn parent(&self, id: ObjectId) -> Result<Option<ContentNode>> {
        self.with_conn(|conn| {
            let parent: Option<i64> = match conn.query_row(
                "SELECT par_obj_id FROM tsk_objects WHERE obj_id = ?1",
                params![id.get()],
                |row| row.get(0),
            ) {
                Ok(parent) => parent,
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    return Err(StoreError::NotFound(format!("content object {id}")).into())
                }
                Err(e) => return Err(query_failed(e)),
            };
            parent
                .map(|p| load_content(conn, ObjectId::new(p)))
                .transpose()
        })
    }

    fn artifacts_by_type(&self, type_name: &str) -> Result<Vec<ArtifactRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare_cached(
                    "SELECT a.artifact_id FROM blackboard_artifacts a \
                     JOIN blackboard_artifact_types t ON t.artifact_type_id = a.artifact_type_id \
                     WHERE t.type_name = ?1 ORDER BY a.artifact_id",
                )
                .map_err(query_failed)?;
            let ids = stmt
                .query_map(params![type_name], |row| row.get::<_, i64>(0))
                .map_err(query_failed)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(query_failed)?;
            ids.into_iter()
                .map(|id| load_artifact(conn, "a.artifact_id", id))
                .collect()
        })
    }

    fn artifact(&self, id: ArtifactId) -> Result<ArtifactRecord> {
        self.with_conn(|conn| load_artifact(conn, "a.artifact_id", id.get()))
    }

    fn attributes(&self, artifact_id: ArtifactId) -> Result<Vec<AttributeRecord>> {
        self.with_conn(|conn| load_attributes(conn, artifact_id))
    }

    fn tag_names_in_use(&self) -> Result<Vec<TagDefinition>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM tag_names WHERE tag_name_id IN \
                 (SELECT tag_name_id FROM content_tags UNION SELECT tag_name_id FROM blackboard_artifact_tags) \
                 ORDER BY display_name",
                models::TAG_NAME_COLUMNS
            );
            let mut stmt = conn.prepare(&sql).map_err(query_failed)?;
            let tags = stmt
                .query_map([], models::tag_definition)
                .map_err(query_failed)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(query_failed)?;
            Ok(tags)
        })
    }

    fn content_tags_by_tag_name(&self, tag_name: TagNameId) -> Result<Vec<ContentTag>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare_cached(
                    "SELECT tag_id, obj_id, comment, begin_byte_offset, end_byte_offset \
                     FROM content_tags WHERE tag_name_id = ?1 ORDER BY tag_id",
                )
                .map_err(query_failed)?;
            let tags = stmt
                .query_map(params![tag_name.get()], |row| {
                    Ok(ContentTag {
                        id: TagId::new(row.get(0)?),
                        tag_name,
                        content_id: ObjectId::new(row.get(1)?),
                        comment: row.get(2)?,
                        byte_range: models::byte_range(row.get(3)?, row.get(4)?),
                    })
                })
                .map_err(query_failed)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(query_failed)?;
            Ok(tags)
        })
    }

    fn artifact_tags_by_tag_name(&self, tag_name: TagNameId) -> Result<Vec<ArtifactTag>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare_cached(
                    "SELECT t.tag_id, t.artifact_id, a.obj_id, t.comment \
                     FROM blackboard_artifact_tags t \
                     JOIN blackboard_artifacts a ON a.artifact_id = t.artifact_id \
                     WHERE t.tag_name_id = ?1 ORDER BY t.tag_id",
                )
                .map_err(query_failed)?;
            let tags = stmt
                .query_map(params![tag_name.get()], |row| {
                    Ok(ArtifactTag {
                        id: TagId::new(row.get(0)?),
                        tag_name,
                        artifact_id: ArtifactId::new(row.get(1)?),
                        content_id: ObjectId::new(row.get(2)?),
                        comment: row.get(3)?,
                    })
                })
                .map_err(query_failed)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(query_failed)?;
            Ok(tags)
        })
    }

    fn interesting_item_set_counts(&self) -> Result<BTreeMap<String, u64>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare_cached(
                    "SELECT attr.value_text, COUNT(DISTINCT attr.artifact_id) \
                     FROM blackboard_attributes attr \
                     JOIN blackboard_attribute_types at ON at.attribute_type_id = attr.attribute_type_id \
                     JOIN blackboard_artifacts art ON art.artifact_id = attr.artifact_id \
                     JOIN blackboard_artifact_types t ON t.artifact_type_id = art.artifact_type_id \
                     WHERE at.type_name = ?1 AND t.type_name IN (?2, ?3) AND attr.value_text IS NOT NULL \
                     GROUP BY attr.value_text",
                )
                .map_err(query_failed)?;
            let counts = stmt
                .query_map(
                    params![
                        SET_NAME_ATTRIBUTE,
                        INTERESTING_ITEM_TYPES[0],
                        INTERESTING_ITEM_TYPES[1]
                    ],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
                )
                .map_err(query_failed)?
                .map(|r| r.map(|(name, count)| (name, count.max(0) as u64)))
                .collect::<rusqlite::Result<BTreeMap<_, _>>>()
                .map_err(query_failed)?;
            Ok(counts)
        })
    }

    fn max_id(&self, sequence: IdSequence) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT MAX({}) FROM {}",
                sequence.column(),
                sequence.table()
            );
            conn.query_row(&sql, [], |row| row.get(0))
                .map_err(query_failed)
        })
    }

    fn open_file(&self, id: ObjectId) -> Result<Box<dyn Read + Send>> {
        let node = self.content(id)?;
        let local_path = match &node.kind {
            ContentKind::LocalFile(info) => info.local_path.clone().ok_or_else(|| {
                StoreError::InvalidData(format!("file {id} has no local path"))
            })?,
            other => {
                return Err(StoreError::InvalidData(format!(
                    "object {id} is a {} and has no file content",
                    other.label()
                ))
                .into())
            }
        };

        let path = self.resolve_local_path(&local_path);
        let file = std::fs::File::open(&path).map_err(|e| {
            crate::domain::PortableCaseError::Io(format!(
                "Failed to open {} for object {id}: {e}",
                path.display()
            ))
        })?;
        Ok(Box::new(file))
    }

    fn image_tag_data(&self, tag: TagId) -> Result<Option<String>> {
        self.with_conn(|conn| {
            if !table_exists(conn, "content_viewer_tags")? {
                return Ok(None);
            }
            match conn.query_row(
                "SELECT app_data FROM content_viewer_tags WHERE tag_id = ?1",
                params![tag.get()],
                |row| row.get(0),
            ) {
                Ok(data) => Ok(Some(data)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(query_failed(e)),
            }
        })
    }

    fn key_value_rows(&self, table: &KeyValueTable) -> Result<Vec<(String, String)>> {
        let (name, key, value) = checked_key_value_table(table)?;
        self.with_conn(|conn| {
            if !table_exists(conn, name)? {
                return Ok(Vec::new());
            }
            let sql = format!("SELECT \"{key}\", \"{value}\" FROM \"{name}\" ORDER BY \"{key}\"");
            let mut stmt = conn.prepare(&sql).map_err(query_failed)?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
                .map_err(query_failed)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(query_failed)?;
            Ok(rows)
        })
    }
}
