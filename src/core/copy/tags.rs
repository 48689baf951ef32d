//! Tag definitions, tag assignments and interesting items

use super::{copy_artifact, copy_content, in_transaction};
use crate::core::session::ExportSession;
use crate::domain::{
    ArtifactRecord, ArtifactTag, ContentTag, ObjectId, Result, TagDefinition, TagId,
};
use tracing::debug;

/// Copies tag definitions into the portable case and records the mapping
///
/// Definitions already copied in this session are skipped. A definition whose
/// display name already exists in the portable case is updated in place.
pub fn copy_tag_definitions(
    session: &mut ExportSession,
    definitions: &[TagDefinition],
) -> Result<()> {
    let store = session.store()?;
    for definition in definitions {
        if session.has_tag_definition(definition.id) {
            continue;
        }
        let copied = in_transaction(store.as_ref(), |s| s.add_or_update_tag_name(definition))?;
        debug!(
            tag_name = %definition.display_name,
            source_id = %definition.id,
            new_id = %copied.id,
            "Copied tag definition"
        );
        session.map_tag_definition(definition.id, copied);
        session.stats.tag_definitions += 1;
    }
    Ok(())
}

/// Copies a content tag and the content it is attached to
///
/// Image tag data attached to the tag is written in the same transaction as
/// the tag itself.
pub fn copy_content_tag(session: &mut ExportSession, tag: &ContentTag) -> Result<TagId> {
    let tag_name = session.tag_definition(tag.tag_name)?.id;

    let source = session.source();
    let node = source.content(tag.content_id)?;
    let content = copy_content(session, &node)?;
    let image_data = source.image_tag_data(tag.id)?;

    let store = session.store()?;
    let new_id = in_transaction(store.as_ref(), |s| {
        let id = s.add_content_tag(content, tag_name, &tag.comment, tag.byte_range)?;
        if let Some(data) = &image_data {
            s.add_image_tag(id, data)?;
        }
        Ok(id)
    })?;

    session.stats.content_tags += 1;
    debug!(source_id = %tag.id, new_id = %new_id, content = %content, "Copied content tag");
    Ok(new_id)
}

/// Copies an artifact tag, the tagged artifact and the artifact's source
/// content
pub fn copy_artifact_tag(session: &mut ExportSession, tag: &ArtifactTag) -> Result<TagId> {
    let tag_name = session.tag_definition(tag.tag_name)?.id;

    let source = session.source();
    let artifact = source.artifact(tag.artifact_id)?;
    let source_node = source.content(artifact.source_obj_id)?;
    let new_source = copy_content(session, &source_node)?;
    let copied = copy_artifact(session, new_source, &artifact)?;

    let store = session.store()?;
    let new_id = in_transaction(store.as_ref(), |s| {
        s.add_artifact_tag(copied.id, tag_name, &tag.comment)
    })?;

    session.stats.artifact_tags += 1;
    debug!(source_id = %tag.id, new_id = %new_id, artifact = %copied.id, "Copied artifact tag");
    Ok(new_id)
}

/// Copies an interesting-item hit together with the content it was found on
///
/// Returns the hit's object id in the portable case.
pub fn copy_interesting_item(
    session: &mut ExportSession,
    artifact: &ArtifactRecord,
) -> Result<ObjectId> {
    let source = session.source();
    let node = source.content(artifact.obj_id)?;
    let copied = copy_content(session, &node)?;
    session.stats.interesting_items += 1;
    Ok(copied)
}
