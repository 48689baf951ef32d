//! Artifact and attribute type remapping
//!
//! Built-in types share their ids across every case database and map to
//! themselves. Custom types are looked up by name in the portable case and
//! created there on first use.

use crate::adapters::database::PortableCaseStore;
use crate::domain::builtin::{BUILTIN_ARTIFACT_TYPES, BUILTIN_ATTRIBUTE_TYPES};
use crate::domain::{
    ArtifactType, ArtifactTypeId, AttributeType, AttributeTypeId, PortableCaseError, Result,
};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct TypeRegistry {
    artifact_types: HashMap<ArtifactTypeId, ArtifactTypeId>,
    attribute_types: HashMap<AttributeTypeId, AttributeType>,
    created_artifact_types: usize,
    created_attribute_types: usize,
}

impl TypeRegistry {
    /// A registry with every built-in type identity-mapped
    pub fn with_builtins() -> Self {
        let mut registry = Self::default();
        for (id, _, _) in BUILTIN_ARTIFACT_TYPES {
            let id = ArtifactTypeId::new(*id);
            registry.artifact_types.insert(id, id);
        }
        for (id, name, display, value_type) in BUILTIN_ATTRIBUTE_TYPES {
            let id = AttributeTypeId::new(*id);
            registry.attribute_types.insert(
                id,
                AttributeType {
                    id,
                    type_name: (*name).to_string(),
                    display_name: (*display).to_string(),
                    value_type: *value_type,
                },
            );
        }
        registry
    }

    /// Portable case id for a source artifact type, creating the type if needed
    pub fn resolve_artifact_type(
        &mut self,
        store: &dyn PortableCaseStore,
        source: &ArtifactType,
    ) -> Result<ArtifactTypeId> {
        if let Some(id) = self.artifact_types.get(&source.id) {
            return Ok(*id);
        }

        let resolved = match store.artifact_type_by_name(&source.type_name)? {
            Some(existing) => existing,
            None => {
                let created = store.add_artifact_type(&source.type_name, &source.display_name)?;
                self.created_artifact_types += 1;
                debug!(
                    type_name = %created.type_name,
                    source_id = %source.id,
                    new_id = %created.id,
                    "Created custom artifact type"
                );
                created
            }
        };
        self.artifact_types.insert(source.id, resolved.id);
        Ok(resolved.id)
    }

    /// Portable case attribute type for a source attribute type, creating the
    /// type if needed
    ///
    /// # Errors
    ///
    /// Returns `AttributeKindMismatch` if the portable case already holds a
    /// type of this name with a different value type.
    pub fn resolve_attribute_type(
        &mut self,
        store: &dyn PortableCaseStore,
        source: &AttributeType,
    ) -> Result<AttributeType> {
        if let Some(mapped) = self.attribute_types.get(&source.id) {
            check_value_type(source, mapped)?;
            return Ok(mapped.clone());
        }

        let resolved = match store.attribute_type_by_name(&source.type_name)? {
            Some(existing) => existing,
            None => {
                let created = store.add_attribute_type(
                    &source.type_name,
                    &source.display_name,
                    source.value_type,
                )?;
                self.created_attribute_types += 1;
                debug!(
                    type_name = %created.type_name,
                    source_id = %source.id,
                    new_id = %created.id,
                    "Created custom attribute type"
                );
                created
            }
        };
        check_value_type(source, &resolved)?;
        self.attribute_types.insert(source.id, resolved.clone());
        Ok(resolved)
    }

    pub fn created_artifact_types(&self) -> usize {
        self.created_artifact_types
    }

    pub fn created_attribute_types(&self) -> usize {
        self.created_attribute_types
    }

    pub fn clear(&mut self) {
        self.artifact_types.clear();
        self.attribute_types.clear();
    }
}

fn check_value_type(source: &AttributeType, mapped: &AttributeType) -> Result<()> {
    if source.value_type == mapped.value_type {
        Ok(())
    } else {
        Err(PortableCaseError::AttributeKindMismatch(format!(
            "attribute type {} is {:?} in the source case but {:?} in the portable case",
            source.type_name, source.value_type, mapped.value_type
        )))
    }
}
