//! Row decoding for case database tables

use crate::domain::{
    ArtifactId, ArtifactType, ArtifactTypeId, AttributeRecord, AttributeType, AttributeTypeId,
    AttributeValue, AttributeValueType, ByteRange, FileInfo, KnownStatus, PortableCaseError,
    StoreError, TagDefinition, TagNameId,
};
use rusqlite::Row;

/// `tsk_files.type` for the virtual root directory of a local files data source
pub const FILE_KIND_VIRTUAL_DIR: i64 = 5;
/// `tsk_files.type` for a logically added local file
pub const FILE_KIND_LOCAL: i64 = 6;
/// `tsk_files.type` for a logically added local directory
pub const FILE_KIND_LOCAL_DIR: i64 = 8;

pub const TAG_NAME_COLUMNS: &str = "tag_name_id, display_name, description, color, known_status";

pub fn tag_definition(row: &Row<'_>) -> rusqlite::Result<TagDefinition> {
    Ok(TagDefinition {
        id: TagNameId::new(row.get(0)?),
        display_name: row.get(1)?,
        description: row.get(2)?,
        color: row.get(3)?,
        known_status: KnownStatus::from_code(row.get(4)?),
    })
}

pub const ARTIFACT_TYPE_COLUMNS: &str = "artifact_type_id, type_name, display_name";

pub fn artifact_type(row: &Row<'_>) -> rusqlite::Result<ArtifactType> {
    Ok(ArtifactType {
        id: ArtifactTypeId::new(row.get(0)?),
        type_name: row.get(1)?,
        display_name: row.get(2)?,
    })
}

pub const ATTRIBUTE_TYPE_COLUMNS: &str = "attribute_type_id, type_name, display_name, value_type";

pub fn attribute_type(row: &Row<'_>) -> rusqlite::Result<AttributeType> {
    Ok(AttributeType {
        id: AttributeTypeId::new(row.get(0)?),
        type_name: row.get(1)?,
        display_name: row.get(2)?,
        value_type: AttributeValueType::from_code(row.get(3)?),
    })
}

pub const FILE_COLUMNS: &str =
    "name, size, ctime, crtime, atime, mtime, md5, known, mime_type, local_path";

/// Decodes [`FILE_COLUMNS`] starting at column `offset`
pub fn file_info(row: &Row<'_>, offset: usize) -> rusqlite::Result<FileInfo> {
    Ok(FileInfo {
        name: row.get(offset)?,
        size: row.get(offset + 1)?,
        ctime: row.get(offset + 2)?,
        crtime: row.get(offset + 3)?,
        atime: row.get(offset + 4)?,
        mtime: row.get(offset + 5)?,
        md5: row.get(offset + 6)?,
        known: KnownStatus::from_code(row.get(offset + 7)?),
        mime_type: row.get(offset + 8)?,
        local_path: row.get(offset + 9)?,
    })
}

pub fn byte_range(begin: Option<i64>, end: Option<i64>) -> Option<ByteRange> {
    match (begin, end) {
        (Some(begin), Some(end)) => Some(ByteRange { begin, end }),
        _ => None,
    }
}

/// Raw `blackboard_attributes` row joined with its attribute type
pub struct AttributeRow {
    pub artifact_id: ArtifactId,
    pub attribute_type: AttributeType,
    pub source: String,
    pub value_byte: Option<Vec<u8>>,
    pub value_text: Option<String>,
    pub value_int32: Option<i32>,
    pub value_int64: Option<i64>,
    pub value_double: Option<f64>,
}

pub const ATTRIBUTE_ROW_QUERY: &str = "SELECT a.artifact_id, t.attribute_type_id, t.type_name, t.display_name, t.value_type, \
     a.source, a.value_byte, a.value_text, a.value_int32, a.value_int64, a.value_double \
     FROM blackboard_attributes a \
     JOIN blackboard_attribute_types t ON t.attribute_type_id = a.attribute_type_id";

pub fn attribute_row(row: &Row<'_>) -> rusqlite::Result<AttributeRow> {
    Ok(AttributeRow {
        artifact_id: ArtifactId::new(row.get(0)?),
        attribute_type: AttributeType {
            id: AttributeTypeId::new(row.get(1)?),
            type_name: row.get(2)?,
            display_name: row.get(3)?,
            value_type: AttributeValueType::from_code(row.get(4)?),
        },
        source: row.get(5)?,
        value_byte: row.get(6)?,
        value_text: row.get(7)?,
        value_int32: row.get(8)?,
        value_int64: row.get(9)?,
        value_double: row.get(10)?,
    })
}

impl AttributeRow {
    /// Reads the value column selected by the declared value type
    ///
    /// An unrecognised value type keeps whichever column is populated, so the
    /// copier can reject it with a precise error rather than failing the read.
    pub fn into_record(self) -> Result<AttributeRecord, PortableCaseError> {
        let type_name = self.attribute_type.type_name.clone();
        let missing = |column: &str| {
            PortableCaseError::AttributeKindMismatch(format!(
                "attribute {type_name} on artifact {} is declared {:?} but {column} is empty",
                self.artifact_id, self.attribute_type.value_type
            ))
        };

        let value = match self.attribute_type.value_type {
            AttributeValueType::String | AttributeValueType::Json => {
                AttributeValue::String(self.value_text.clone().ok_or_else(|| missing("value_text"))?)
            }
            AttributeValueType::Integer => {
                AttributeValue::Integer(self.value_int32.ok_or_else(|| missing("value_int32"))?)
            }
            AttributeValueType::Long | AttributeValueType::DateTime => {
                AttributeValue::Long(self.value_int64.ok_or_else(|| missing("value_int64"))?)
            }
            AttributeValueType::Double => {
                AttributeValue::Double(self.value_double.ok_or_else(|| missing("value_double"))?)
            }
            AttributeValueType::Byte => {
                AttributeValue::Bytes(self.value_byte.clone().ok_or_else(|| missing("value_byte"))?)
            }
            AttributeValueType::Unrecognized(code) => self
                .any_value()
                .ok_or_else(|| {
                    StoreError::InvalidData(format!(
                        "attribute {type_name} has value type {code} and no value"
                    ))
                })?,
        };

        let sources = if self.source.is_empty() {
            Vec::new()
        } else {
            self.source.split(',').map(str::to_string).collect()
        };

        Ok(AttributeRecord {
            attribute_type: self.attribute_type,
            value,
            sources,
        })
    }

    fn any_value(&self) -> Option<AttributeValue> {
        if let Some(text) = &self.value_text {
            return Some(AttributeValue::String(text.clone()));
        }
        if let Some(v) = self.value_int64 {
            return Some(AttributeValue::Long(v));
        }
        if let Some(v) = self.value_int32 {
            return Some(AttributeValue::Integer(v));
        }
        if let Some(v) = self.value_double {
            return Some(AttributeValue::Double(v));
        }
        self.value_byte.clone().map(AttributeValue::Bytes)
    }
}
