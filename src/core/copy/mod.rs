//! Graph copy from a source case into a portable case
//!
//! - [`copy_content`] copies a content node after its ancestors
//! - [`copy_artifact`] copies an artifact after the artifacts it references
//! - [`tags`] copies tag definitions, tag assignments and interesting items
//!
//! All of them are copy-once through the session's identifier map. Every row
//! is written inside its own [`TransactionGuard`].

mod artifact;
mod content;
pub mod tags;

pub use artifact::copy_artifact;
pub use content::copy_content;
pub use tags::{copy_artifact_tag, copy_content_tag, copy_interesting_item, copy_tag_definitions};

use crate::adapters::database::{PortableCaseStore, TransactionGuard};
use crate::domain::Result;

/// Runs `f` inside a transaction, committing only if it succeeds
pub(crate) fn in_transaction<T>(
    store: &dyn PortableCaseStore,
    f: impl FnOnce(&dyn PortableCaseStore) -> Result<T>,
) -> Result<T> {
    let guard = TransactionGuard::begin(store)?;
    let value = f(store)?;
    guard.commit()?;
    Ok(value)
}
