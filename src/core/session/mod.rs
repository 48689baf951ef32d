//! Export session state
//!
//! An [`ExportSession`] owns everything one export mutates: the identifier
//! map, the type registry, the tag definition map and the portable case
//! handle. Copy functions take it by `&mut` so all remapping goes through one
//! writer. [`ExportSession::teardown`] clears the maps and closes the store;
//! it also runs on drop, so every exit path releases the store.

mod identifier_map;
mod type_registry;

pub use identifier_map::IdentifierMap;
pub use type_registry::TypeRegistry;

use crate::adapters::database::{PortableCaseStore, SourceCase};
use crate::core::export::layout::CaseLayout;
use crate::core::export::progress::ProgressPanel;
use crate::domain::{PortableCaseError, Result, StoreError, TagDefinition, TagNameId};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Counts of what an export wrote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyStats {
    pub content_rows: usize,
    pub files: usize,
    pub bytes: u64,
    pub artifacts: usize,
    pub custom_artifact_types: usize,
    pub custom_attribute_types: usize,
    pub tag_definitions: usize,
    pub content_tags: usize,
    pub artifact_tags: usize,
    pub interesting_items: usize,
}

pub struct ExportSession {
    source: Arc<dyn SourceCase>,
    store: Option<Arc<dyn PortableCaseStore>>,
    layout: CaseLayout,
    progress: Arc<ProgressPanel>,
    pub(crate) ids: IdentifierMap,
    pub(crate) types: TypeRegistry,
    tag_names: HashMap<TagNameId, TagDefinition>,
    pub(crate) stats: CopyStats,
}

impl ExportSession {
    pub fn new(
        source: Arc<dyn SourceCase>,
        store: Arc<dyn PortableCaseStore>,
        layout: CaseLayout,
        progress: Arc<ProgressPanel>,
    ) -> Self {
        Self {
            source,
            store: Some(store),
            layout,
            progress,
            ids: IdentifierMap::new(),
            types: TypeRegistry::with_builtins(),
            tag_names: HashMap::new(),
            stats: CopyStats::default(),
        }
    }

    pub fn source(&self) -> Arc<dyn SourceCase> {
        Arc::clone(&self.source)
    }

    /// The portable case handle
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Closed` after teardown.
    pub fn store(&self) -> Result<Arc<dyn PortableCaseStore>> {
        self.store
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| StoreError::Closed.into())
    }

    pub fn layout(&self) -> &CaseLayout {
        &self.layout
    }

    pub fn progress(&self) -> &ProgressPanel {
        &self.progress
    }

    pub fn is_cancelled(&self) -> bool {
        self.progress.is_cancelled()
    }

    pub fn ids(&self) -> &IdentifierMap {
        &self.ids
    }

    /// Current counts, including types created so far
    pub fn stats(&self) -> CopyStats {
        CopyStats {
            custom_artifact_types: self.types.created_artifact_types(),
            custom_attribute_types: self.types.created_attribute_types(),
            ..self.stats.clone()
        }
    }

    pub(crate) fn map_tag_definition(&mut self, source: TagNameId, copied: TagDefinition) {
        self.tag_names.insert(source, copied);
    }

    pub fn has_tag_definition(&self, source: TagNameId) -> bool {
        self.tag_names.contains_key(&source)
    }

    /// Portable case tag definition for a source tag definition
    ///
    /// # Errors
    ///
    /// Returns `MissingTagMapping` if the definition was never copied.
    pub fn tag_definition(&self, source: TagNameId) -> Result<&TagDefinition> {
        self.tag_names.get(&source).ok_or_else(|| {
            PortableCaseError::MissingTagMapping(format!(
                "tag name {source} has not been copied to the portable case"
            ))
        })
    }

    /// Clears all maps and closes the portable case
    ///
    /// Safe to call more than once.
    pub fn teardown(&mut self) -> Result<()> {
        self.ids.clear();
        self.types.clear();
        self.tag_names.clear();
        match self.store.take() {
            Some(store) => {
                tracing::debug!(case = %self.layout.case_name(), "Closing portable case");
                store.close()
            }
            None => Ok(()),
        }
    }
}

impl Drop for ExportSession {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            tracing::warn!(error = %e, "Failed to close portable case during teardown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::SqliteCaseDb;
    use crate::domain::KnownStatus;
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> ExportSession {
        let source = Arc::new(SqliteCaseDb::create(&dir.path().join("src.db"), "Src").unwrap());
        let store = Arc::new(SqliteCaseDb::create(&dir.path().join("dst.db"), "Dst").unwrap());
        ExportSession::new(
            source,
            store,
            CaseLayout::new(dir.path(), "Src"),
            Arc::new(ProgressPanel::new()),
        )
    }

    #[test]
    fn test_missing_tag_mapping() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        assert!(matches!(
            session.tag_definition(TagNameId::new(4)),
            Err(PortableCaseError::MissingTagMapping(_))
        ));

        session.map_tag_definition(
            TagNameId::new(4),
            TagDefinition {
                id: TagNameId::new(1),
                display_name: "Bookmark".to_string(),
                description: String::new(),
                color: "None".to_string(),
                known_status: KnownStatus::Unknown,
            },
        );
        assert_eq!(
            session.tag_definition(TagNameId::new(4)).unwrap().id,
            TagNameId::new(1)
        );
    }

    #[test]
    fn test_teardown_closes_store_once() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let store = session.store().unwrap();

        session.teardown().unwrap();
        session.teardown().unwrap();
        assert!(matches!(
            session.store(),
            Err(PortableCaseError::Store(StoreError::Closed))
        ));
        assert!(matches!(
            store.begin_transaction(),
            Err(PortableCaseError::Store(StoreError::Closed))
        ));
    }
}
