//! Source to portable case identifier remapping

use crate::domain::{ArtifactId, ArtifactRecord, ObjectId, PortableCaseError, Result};
use std::collections::{HashMap, HashSet};

/// Copy-once memo for content nodes and artifacts
///
/// A mapping is written once and never repointed. The in-progress sets mark
/// ids whose copy has started but not finished; meeting one of them again
/// means the source graph loops back on itself.
#[derive(Debug, Default)]
pub struct IdentifierMap {
    content: HashMap<ObjectId, ObjectId>,
    artifacts: HashMap<ArtifactId, ArtifactRecord>,
    content_in_progress: HashSet<ObjectId>,
    artifacts_in_progress: HashSet<ArtifactId>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self, source: ObjectId) -> Option<ObjectId> {
        self.content.get(&source).copied()
    }

    pub fn artifact(&self, source: ArtifactId) -> Option<&ArtifactRecord> {
        self.artifacts.get(&source)
    }

    /// Marks a content node as being copied
    ///
    /// # Errors
    ///
    /// Returns `CycleDetected` if the node is already being copied further up
    /// the call chain.
    pub fn enter_content(&mut self, source: ObjectId) -> Result<()> {
        if self.content_in_progress.insert(source) {
            Ok(())
        } else {
            Err(PortableCaseError::CycleDetected(format!(
                "object {source} is its own ancestor"
            )))
        }
    }

    pub fn leave_content(&mut self, source: ObjectId) {
        self.content_in_progress.remove(&source);
    }

    pub fn enter_artifact(&mut self, source: ArtifactId) -> Result<()> {
        if self.artifacts_in_progress.insert(source) {
            Ok(())
        } else {
            Err(PortableCaseError::CycleDetected(format!(
                "artifact {source} is reachable from its own associated artifacts"
            )))
        }
    }

    pub fn leave_artifact(&mut self, source: ArtifactId) {
        self.artifacts_in_progress.remove(&source);
    }

    /// # Errors
    ///
    /// Returns `PortableCaseError::Copy` if `source` is already mapped.
    pub fn record_content(&mut self, source: ObjectId, copied: ObjectId) -> Result<()> {
        if let Some(existing) = self.content.get(&source) {
            return Err(PortableCaseError::Copy(format!(
                "object {source} is already mapped to {existing}"
            )));
        }
        self.content.insert(source, copied);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `PortableCaseError::Copy` if `source` is already mapped.
    pub fn record_artifact(&mut self, source: ArtifactId, copied: ArtifactRecord) -> Result<()> {
        if let Some(existing) = self.artifacts.get(&source) {
            return Err(PortableCaseError::Copy(format!(
                "artifact {source} is already mapped to {}",
                existing.id
            )));
        }
        self.artifacts.insert(source, copied);
        Ok(())
    }

    pub fn content_count(&self) -> usize {
        self.content.len()
    }

    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.artifacts.clear();
        self.content_in_progress.clear();
        self.artifacts_in_progress.clear();
    }
}
