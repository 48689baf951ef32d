use super::{copy_artifact, in_transaction};
use crate::adapters::database::{SourceCase, TransactionGuard};
use crate::core::export::layout::{escape_file_name, FileCategory};
use crate::core::session::ExportSession;
use crate::domain::context::ResultExt;
use crate::domain::{
    ContentKind, ContentNode, FileInfo, ObjectId, PortableCaseError, Result, StoreError,
};
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Copies a content node, and every ancestor not yet copied, into the
/// portable case
///
/// Returns the node's object id in the portable case. A node that was
/// already copied in this session is not copied again.
///
/// # Errors
///
/// Any store or file system failure aborts the copy of this node; the
/// transaction covering the failed row is rolled back. A parent chain that
/// loops back to the node fails with `CycleDetected`.
pub fn copy_content(session: &mut ExportSession, node: &ContentNode) -> Result<ObjectId> {
    if let Some(mapped) = session.ids.content(node.id) {
        return Ok(mapped);
    }

    session.ids.enter_content(node.id)?;
    let result = match copy_parent(session, node) {
        Ok(parent) => copy_node(session, node, parent),
        Err(e) => Err(e),
    };
    session.ids.leave_content(node.id);
    let new_id = result?;

    // Artifacts register their own object id when copied.
    if session.ids.content(node.id).is_none() {
        session.ids.record_content(node.id, new_id)?;
    }
    Ok(new_id)
}

fn copy_parent(session: &mut ExportSession, node: &ContentNode) -> Result<Option<ObjectId>> {
    let Some(parent_id) = node.parent else {
        return Ok(None);
    };
    if let Some(mapped) = session.ids.content(parent_id) {
        return Ok(Some(mapped));
    }

    let source = session.source();
    let parent = source.parent(node.id)?.ok_or_else(|| {
        PortableCaseError::from(StoreError::NotFound(format!(
            "parent {parent_id} of object {}",
            node.id
        )))
    })?;
    copy_content(session, &parent).map(Some)
}

fn copy_node(
    session: &mut ExportSession,
    node: &ContentNode,
    parent: Option<ObjectId>,
) -> Result<ObjectId> {
    let store = session.store()?;
    let store = store.as_ref();

    let new_id = match &node.kind {
        ContentKind::Image(info) => in_transaction(store, |s| s.add_image(info))?,
        ContentKind::VolumeSystem(info) => {
            let parent = require_parent(node, parent)?;
            in_transaction(store, |s| s.add_volume_system(parent, info))?
        }
        ContentKind::Volume(info) => {
            let parent = require_parent(node, parent)?;
            in_transaction(store, |s| s.add_volume(parent, info))?
        }
        ContentKind::FileSystem(info) => {
            let parent = require_parent(node, parent)?;
            in_transaction(store, |s| s.add_file_system(parent, info))?
        }
        ContentKind::LocalFilesDataSource(info) => {
            in_transaction(store, |s| s.add_local_files_data_source(info))?
        }
        ContentKind::LocalDirectory { name } => {
            let parent = require_parent(node, parent)?;
            in_transaction(store, |s| s.add_local_directory(parent, name))?
        }
        ContentKind::LocalFile(info) => {
            let parent = require_parent(node, parent)?;
            return copy_local_file(session, node.id, parent, info);
        }
        ContentKind::ArtifactAsContent(artifact) => {
            let parent = require_parent(node, parent)?;
            return copy_artifact(session, parent, artifact).map(|copied| copied.obj_id);
        }
    };

    session.stats.content_rows += 1;
    debug!(
        kind = node.kind.label(),
        source_id = %node.id,
        new_id = %new_id,
        "Copied content"
    );
    Ok(new_id)
}

fn copy_local_file(
    session: &mut ExportSession,
    source_id: ObjectId,
    parent: ObjectId,
    info: &FileInfo,
) -> Result<ObjectId> {
    let category = FileCategory::from_mime(info.mime_type.as_deref());
    let file_name = format!("{}-{}", source_id, escape_file_name(&info.name));
    let destination = session.layout().category_dir(category).join(&file_name);
    let relative_path = session.layout().relative_file_path(category, &file_name);

    let source = session.source();
    let store = session.store()?;
    let store = store.as_ref();

    let guard = TransactionGuard::begin(store)?;
    let written = copy_bytes(source.as_ref(), source_id, &destination).and_then(|bytes| {
        store
            .add_local_file(parent, info, &relative_path)
            .map(|id| (id, bytes))
    });
    let committed = match written {
        Ok(row) => guard.commit().map(|()| row),
        Err(e) => {
            drop(guard);
            Err(e)
        }
    };
    let (new_id, bytes) = committed.map_err(|e| {
        remove_partial_file(&destination);
        e
    })?;

    session.stats.content_rows += 1;
    session.stats.files += 1;
    session.stats.bytes += bytes;
    debug!(
        source_id = %source_id,
        new_id = %new_id,
        path = %relative_path,
        bytes,
        "Copied file"
    );
    Ok(new_id)
}

fn copy_bytes(source: &dyn SourceCase, id: ObjectId, destination: &Path) -> Result<u64> {
    let mut reader = source.open_file(id)?;
    let mut writer = File::create(destination)
        .with_context(|| format!("Failed to create {}", destination.display()))?;
    std::io::copy(&mut reader, &mut writer)
        .with_context(|| format!("Failed to copy object {id} to {}", destination.display()))
}

fn remove_partial_file(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial file");
        }
    }
}

fn require_parent(node: &ContentNode, parent: Option<ObjectId>) -> Result<ObjectId> {
    parent.ok_or_else(|| {
        PortableCaseError::Copy(format!(
            "{} {} has no parent",
            node.kind.label(),
            node.id
        ))
    })
}
