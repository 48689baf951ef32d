//! Resolution of the user's selection into a work list

use crate::adapters::database::SourceCase;
use crate::config::SelectionConfig;
use crate::domain::builtin::INTERESTING_ITEM_TYPES;
use crate::domain::{ArtifactRecord, ArtifactTag, ContentTag, PortableCaseError, Result, TagDefinition};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Tag names and interesting-item sets chosen for export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub tag_names: BTreeSet<String>,
    pub all_tags: bool,
    pub set_names: BTreeSet<String>,
    pub all_sets: bool,
}

impl Selection {
    pub fn from_config(config: &SelectionConfig) -> Self {
        Self {
            tag_names: config.tag_names.iter().cloned().collect(),
            all_tags: config.all_tags,
            set_names: config.interesting_set_names.iter().cloned().collect(),
            all_sets: config.all_sets,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.all_tags && !self.all_sets && self.tag_names.is_empty() && self.set_names.is_empty()
    }

    /// Looks up the selected tags and interesting items in the source case
    ///
    /// # Errors
    ///
    /// Returns `PortableCaseError::Validation` if nothing is selected, if a
    /// selected tag name is not in use, or if the selection matches nothing.
    pub fn resolve(&self, source: &dyn SourceCase) -> Result<WorkList> {
        if self.is_empty() {
            return Err(PortableCaseError::Validation(
                "Nothing to export: select at least one tag or interesting item set".to_string(),
            ));
        }

        let tags = self.resolve_tags(source)?;
        let interesting = self.resolve_interesting_items(source)?;
        let work = WorkList { tags, interesting };

        if work.is_empty() {
            return Err(PortableCaseError::Validation(
                "Nothing to export: the selected tags and sets match no items".to_string(),
            ));
        }

        info!(
            tags = work.tags.len(),
            content_tags = work.content_tag_count(),
            artifact_tags = work.artifact_tag_count(),
            interesting_items = work.interesting.len(),
            "Resolved selection"
        );
        Ok(work)
    }

    fn resolve_tags(&self, source: &dyn SourceCase) -> Result<Vec<TagWork>> {
        if !self.all_tags && self.tag_names.is_empty() {
            return Ok(Vec::new());
        }

        let in_use = source.tag_names_in_use()?;
        if !self.all_tags {
            let unknown: Vec<&str> = self
                .tag_names
                .iter()
                .filter(|name| !in_use.iter().any(|t| &t.display_name == *name))
                .map(String::as_str)
                .collect();
            if !unknown.is_empty() {
                return Err(PortableCaseError::Validation(format!(
                    "Tag names not in use in the source case: {}",
                    unknown.join(", ")
                )));
            }
        }

        let mut tags = Vec::new();
        for definition in in_use {
            if !self.all_tags && !self.tag_names.contains(&definition.display_name) {
                continue;
            }
            let content_tags = source.content_tags_by_tag_name(definition.id)?;
            let artifact_tags = source.artifact_tags_by_tag_name(definition.id)?;
            tags.push(TagWork {
                definition,
                content_tags,
                artifact_tags,
            });
        }
        Ok(tags)
    }

    fn resolve_interesting_items(&self, source: &dyn SourceCase) -> Result<Vec<ArtifactRecord>> {
        if !self.all_sets && self.set_names.is_empty() {
            return Ok(Vec::new());
        }

        let counts = source.interesting_item_set_counts()?;
        for name in &self.set_names {
            if !counts.contains_key(name) {
                warn!(set_name = %name, "Interesting item set not found in source case");
            }
        }

        let mut items = Vec::new();
        for type_name in INTERESTING_ITEM_TYPES {
            for artifact in source.artifacts_by_type(type_name)? {
                let Some(set_name) = artifact.set_name() else {
                    warn!(
                        artifact_id = %artifact.id,
                        artifact_type = type_name,
                        "Interesting item has no set name, skipping"
                    );
                    continue;
                };
                if self.all_sets || self.set_names.contains(set_name) {
                    items.push(artifact);
                }
            }
        }
        Ok(items)
    }
}

/// One selected tag and everything carrying it
#[derive(Debug, Clone)]
pub struct TagWork {
    pub definition: TagDefinition,
    pub content_tags: Vec<ContentTag>,
    pub artifact_tags: Vec<ArtifactTag>,
}

impl TagWork {
    pub fn len(&self) -> usize {
        self.content_tags.len() + self.artifact_tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything an export will copy
#[derive(Debug, Clone, Default)]
pub struct WorkList {
    pub tags: Vec<TagWork>,
    pub interesting: Vec<ArtifactRecord>,
}

impl WorkList {
    pub fn is_empty(&self) -> bool {
        self.tags.iter().all(TagWork::is_empty) && self.interesting.is_empty()
    }

    pub fn definitions(&self) -> Vec<TagDefinition> {
        self.tags.iter().map(|t| t.definition.clone()).collect()
    }

    pub fn content_tag_count(&self) -> usize {
        self.tags.iter().map(|t| t.content_tags.len()).sum()
    }

    pub fn artifact_tag_count(&self) -> usize {
        self.tags.iter().map(|t| t.artifact_tags.len()).sum()
    }

    /// Number of progress steps: one per tag assignment and interesting item
    pub fn total_items(&self) -> usize {
        self.content_tag_count() + self.artifact_tag_count() + self.interesting.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection() {
        assert!(Selection::default().is_empty());

        let selection = Selection {
            all_sets: true,
            ..Selection::default()
        };
        assert!(!selection.is_empty());
    }

    #[test]
    fn test_from_config_deduplicates() {
        let config = SelectionConfig {
            tag_names: vec!["Bookmark".to_string(), "Bookmark".to_string()],
            all_tags: false,
            interesting_set_names: vec!["Set A".to_string()],
            all_sets: false,
        };
        let selection = Selection::from_config(&config);
        assert_eq!(selection.tag_names.len(), 1);
        assert!(selection.set_names.contains("Set A"));
    }

    #[test]
    fn test_work_list_counts() {
        let work = WorkList::default();
        assert!(work.is_empty());
        assert_eq!(work.total_items(), 0);
    }
}
