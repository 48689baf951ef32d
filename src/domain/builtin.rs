//! Built-in artifact and attribute types
//!
//! Every case database is seeded with these rows at creation, so the same ids
//! mean the same types in any two stores and built-in types are copied by
//! identity. Anything at or above [`CUSTOM_TYPE_ID_BASE`] was created by a
//! module at runtime and has to be recreated by name in the portable case.

use super::artifact::AttributeValueType;

/// First id handed out to a custom artifact or attribute type
pub const CUSTOM_TYPE_ID_BASE: i32 = 10_000;

pub const TSK_INTERESTING_FILE_HIT: &str = "TSK_INTERESTING_FILE_HIT";
pub const TSK_INTERESTING_ARTIFACT_HIT: &str = "TSK_INTERESTING_ARTIFACT_HIT";

/// Artifact types whose set name attribute places them in an interesting-item set
pub const INTERESTING_ITEM_TYPES: [&str; 2] = [TSK_INTERESTING_FILE_HIT, TSK_INTERESTING_ARTIFACT_HIT];

/// `(id, type_name, display_name)`
pub const BUILTIN_ARTIFACT_TYPES: &[(i32, &str, &str)] = &[
    (1, "TSK_GEN_INFO", "General Info"),
    (2, "TSK_WEB_BOOKMARK", "Web Bookmarks"),
    (3, "TSK_WEB_COOKIE", "Web Cookies"),
    (4, "TSK_WEB_HISTORY", "Web History"),
    (5, "TSK_WEB_DOWNLOAD", "Web Downloads"),
    (6, "TSK_RECENT_OBJECT", "Recent Documents"),
    (7, "TSK_GPS_TRACKPOINT", "GPS Trackpoints"),
    (8, "TSK_INSTALLED_PROG", "Installed Programs"),
    (9, "TSK_KEYWORD_HIT", "Keyword Hits"),
    (10, "TSK_HASHSET_HIT", "Hashset Hits"),
    (11, "TSK_DEVICE_ATTACHED", "USB Device Attached"),
    (12, TSK_INTERESTING_FILE_HIT, "Interesting Files"),
    (13, "TSK_EMAIL_MSG", "E-Mail Messages"),
    (14, "TSK_EXTRACTED_TEXT", "Extracted Text"),
    (15, "TSK_WEB_SEARCH_QUERY", "Web Search"),
    (16, "TSK_METADATA_EXIF", "EXIF Metadata"),
    (24, TSK_INTERESTING_ARTIFACT_HIT, "Interesting Results"),
];

/// `(id, type_name, display_name, value_type)`
pub const BUILTIN_ATTRIBUTE_TYPES: &[(i32, &str, &str, AttributeValueType)] = &[
    (1, "TSK_URL", "URL", AttributeValueType::String),
    (2, "TSK_DATETIME", "Date/Time", AttributeValueType::DateTime),
    (3, "TSK_NAME", "Name", AttributeValueType::String),
    (4, "TSK_PROG_NAME", "Program Name", AttributeValueType::String),
    (6, "TSK_VALUE", "Value", AttributeValueType::String),
    (8, "TSK_PATH", "Path", AttributeValueType::String),
    (10, "TSK_KEYWORD", "Keyword", AttributeValueType::String),
    (33, "TSK_DATETIME_ACCESSED", "Date Accessed", AttributeValueType::DateTime),
    (37, "TSK_SET_NAME", "Set Name", AttributeValueType::String),
    (49, "TSK_COUNT", "Count", AttributeValueType::Integer),
    (56, "TSK_GEO_LATITUDE", "Latitude", AttributeValueType::Double),
    (57, "TSK_GEO_LONGITUDE", "Longitude", AttributeValueType::Double),
    (62, "TSK_HASH_MD5", "MD5 Hash", AttributeValueType::String),
    (100, "TSK_BYTES", "Raw Bytes", AttributeValueType::Byte),
    (136, "TSK_COMMENT", "Comment", AttributeValueType::String),
    (138, "TSK_ASSOCIATED_ARTIFACT", "Associated Artifact", AttributeValueType::Long),
];

pub fn is_builtin_artifact_type(id: i32) -> bool {
    id < CUSTOM_TYPE_ID_BASE
}

pub fn is_builtin_attribute_type(id: i32) -> bool {
    id < CUSTOM_TYPE_ID_BASE
}

pub fn builtin_artifact_type_id(type_name: &str) -> Option<i32> {
    BUILTIN_ARTIFACT_TYPES
        .iter()
        .find(|(_, name, _)| *name == type_name)
        .map(|(id, _, _)| *id)
}
