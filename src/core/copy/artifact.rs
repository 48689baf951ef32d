use super::in_transaction;
use crate::core::session::ExportSession;
use crate::domain::{
    ArtifactId, ArtifactRecord, AttributeRecord, AttributeValue, AttributeValueType, ObjectId,
    PortableCaseError, Result,
};
use tracing::debug;

/// Copies an artifact onto `new_source`, a content node already in the
/// portable case
///
/// An artifact referenced through the associated-artifact attribute is copied
/// first onto the same `new_source`, and the attribute is rewritten to the
/// referenced artifact's new id. The referenced artifact's own source content
/// is not pulled into the portable case. Attribute types and the
/// artifact type are remapped through the session's type registry; all
/// attributes are written with the artifact in one transaction.
///
/// # Errors
///
/// Fails with `UnsupportedValueType` before anything is written if any
/// attribute declares an unknown value type, and with `CycleDetected` if an
/// associated-artifact chain loops.
pub fn copy_artifact(
    session: &mut ExportSession,
    new_source: ObjectId,
    artifact: &ArtifactRecord,
) -> Result<ArtifactRecord> {
    if let Some(copied) = session.ids.artifact(artifact.id) {
        return Ok(copied.clone());
    }

    check_value_types(artifact)?;

    session.ids.enter_artifact(artifact.id)?;
    let result = copy_new_artifact(session, new_source, artifact);
    session.ids.leave_artifact(artifact.id);
    let copied = result?;

    session.ids.record_artifact(artifact.id, copied.clone())?;
    if session.ids.content(artifact.obj_id).is_none() {
        session.ids.record_content(artifact.obj_id, copied.obj_id)?;
    }
    session.stats.artifacts += 1;
    debug!(
        artifact_type = %artifact.artifact_type.type_name,
        source_id = %artifact.id,
        new_id = %copied.id,
        "Copied artifact"
    );
    Ok(copied)
}

fn copy_new_artifact(
    session: &mut ExportSession,
    new_source: ObjectId,
    artifact: &ArtifactRecord,
) -> Result<ArtifactRecord> {
    let associated = match artifact.associated_artifact()? {
        Some((referenced, _)) => Some(copy_associated(session, new_source, referenced)?),
        None => None,
    };

    let store = session.store()?;
    let store = store.as_ref();

    let artifact_type = session
        .types
        .resolve_artifact_type(store, &artifact.artifact_type)?;

    let mut attributes = Vec::with_capacity(artifact.attributes.len());
    for attr in &artifact.attributes {
        let attribute_type = session
            .types
            .resolve_attribute_type(store, &attr.attribute_type)?;
        let value = match (&associated, attr.is_associated_artifact()) {
            (Some(copied), true) => AttributeValue::Long(copied.id.get()),
            _ => attr.value.clone(),
        };
        attributes.push(AttributeRecord::new(
            attribute_type,
            value,
            attr.sources.clone(),
        )?);
    }

    in_transaction(store, |s| s.add_artifact(artifact_type, new_source, &attributes))
}

fn copy_associated(
    session: &mut ExportSession,
    new_source: ObjectId,
    referenced: ArtifactId,
) -> Result<ArtifactRecord> {
    if let Some(copied) = session.ids.artifact(referenced) {
        return Ok(copied.clone());
    }

    let associated = session.source().artifact(referenced)?;
    copy_artifact(session, new_source, &associated)
}

fn check_value_types(artifact: &ArtifactRecord) -> Result<()> {
    for attr in &artifact.attributes {
        if let AttributeValueType::Unrecognized(code) = attr.attribute_type.value_type {
            return Err(PortableCaseError::UnsupportedValueType(format!(
                "attribute {} on artifact {} has value type {}",
                attr.attribute_type.type_name, artifact.id, code
            )));
        }
    }
    Ok(())
}
