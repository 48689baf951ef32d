//! Schema baseline
//!
//! When a portable case is created, the source case's highest object, tag and
//! examiner ids are stored in the `portable_case_max_ids` table. Anything
//! above those marks was added to the portable case after the export.

use crate::adapters::database::{
    IdSequence, KeyValueTable, PortableCaseStore, SourceCase, TransactionGuard,
};
use crate::domain::{Result, StoreError};
use serde::Serialize;
use std::collections::BTreeMap;

pub const BASELINE_TABLE: KeyValueTable = KeyValueTable {
    name: "portable_case_max_ids",
    key_column: "table_name",
    value_column: "max_id",
};

/// High-water marks keyed by table name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaBaseline {
    max_ids: BTreeMap<String, i64>,
}

impl SchemaBaseline {
    pub fn max_id(&self, sequence: IdSequence) -> Option<i64> {
        self.max_ids.get(sequence.table()).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.max_ids.is_empty()
    }

    /// Reads the baseline back from a portable case
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidData` if a stored value is not an integer.
    pub fn load(case: &dyn SourceCase) -> Result<Self> {
        let mut max_ids = BTreeMap::new();
        for (table, value) in case.key_value_rows(&BASELINE_TABLE)? {
            let max_id = value.parse::<i64>().map_err(|e| {
                StoreError::InvalidData(format!("baseline for {table} is '{value}': {e}"))
            })?;
            max_ids.insert(table, max_id);
        }
        Ok(Self { max_ids })
    }
}

/// Records the source case's high-water marks in the portable case
///
/// An empty sequence is recorded as 0.
///
/// # Errors
///
/// Any failure leaves no baseline rows behind; the export must not continue.
pub fn record_baseline(
    source: &dyn SourceCase,
    store: &dyn PortableCaseStore,
) -> Result<SchemaBaseline> {
    store.create_key_value_table(&BASELINE_TABLE)?;

    let mut max_ids = BTreeMap::new();
    let guard = TransactionGuard::begin(store)?;
    for sequence in IdSequence::ALL {
        let max_id = source.max_id(sequence)?.unwrap_or(0);
        store.put_key_value(&BASELINE_TABLE, sequence.table(), &max_id.to_string())?;
        max_ids.insert(sequence.table().to_string(), max_id);
    }
    guard.commit()?;

    tracing::info!(
        objects = max_ids.get(IdSequence::Objects.table()).copied().unwrap_or(0),
        content_tags = max_ids.get(IdSequence::ContentTags.table()).copied().unwrap_or(0),
        artifact_tags = max_ids.get(IdSequence::ArtifactTags.table()).copied().unwrap_or(0),
        "Recorded schema baseline"
    );
    Ok(SchemaBaseline { max_ids })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::SqliteCaseDb;
    use crate::domain::{ImageInfo, LocalFilesDataSourceInfo};
    use tempfile::TempDir;

    #[test]
    fn test_record_and_load() {
        let dir = TempDir::new().unwrap();
        let source = SqliteCaseDb::create(&dir.path().join("src.db"), "Src").unwrap();
        source
            .add_image(&ImageInfo {
                name: "disk.E01".to_string(),
                image_type: 0,
                sector_size: 512,
                size: 1024,
                paths: vec!["disk.E01".to_string()],
                time_zone: "UTC".to_string(),
                md5: None,
                sha1: None,
                sha256: None,
                device_id: "dev-1".to_string(),
            })
            .unwrap();
        source
            .add_local_files_data_source(&LocalFilesDataSourceInfo {
                name: "Logical".to_string(),
                device_id: "dev-2".to_string(),
                time_zone: "UTC".to_string(),
            })
            .unwrap();
        source.add_examiner("examiner").unwrap();

        let dest_path = dir.path().join("dst.db");
        let dest = SqliteCaseDb::create(&dest_path, "Dst").unwrap();
        let recorded = record_baseline(&source, &dest).unwrap();
        assert_eq!(recorded.max_id(IdSequence::Objects), Some(2));
        assert_eq!(recorded.max_id(IdSequence::ContentTags), Some(0));
        assert_eq!(recorded.max_id(IdSequence::Examiners), Some(1));
        dest.close().unwrap();

        let reopened = SqliteCaseDb::open(&dest_path).unwrap();
        let loaded = SchemaBaseline::load(&reopened).unwrap();
        assert_eq!(loaded, recorded);
    }

    #[test]
    fn test_load_without_table_is_empty() {
        let dir = TempDir::new().unwrap();
        let case = SqliteCaseDb::create(&dir.path().join("case.db"), "Case").unwrap();
        assert!(SchemaBaseline::load(&case).unwrap().is_empty());
    }
}
