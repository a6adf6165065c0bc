//! Host seam: where snapshots come from.
//!
//! The engine never talks to a browser. A host automation driver captures
//! the page and hands it over through [`SnapshotSource`]; actions on the
//! resolved node (click, typing) stay on the host side.

use crate::locator::LocatorSpec;
use crate::resolution::{Resolved, Resolver, ResolverError};
use async_trait::async_trait;
use locus_common::{DocumentTree, PageSnapshot};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

#[async_trait]
pub trait SnapshotSource: Send {
    /// Capture the current page.
    async fn snapshot(&mut self) -> Result<DocumentTree, SourceError>;
}

/// Reads a JSON page snapshot from disk on every call.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshotSource {
    async fn snapshot(&mut self) -> Result<DocumentTree, SourceError> {
        debug!(path = %self.path.display(), "reading snapshot");
        let content = tokio::fs::read_to_string(&self.path).await?;
        let page: PageSnapshot = serde_json::from_str(&content)?;
        Ok(DocumentTree::from_snapshot(&page))
    }
}

/// Serves clones of an in-memory snapshot.
#[derive(Debug, Clone)]
pub struct MemorySnapshotSource {
    page: PageSnapshot,
}

impl MemorySnapshotSource {
    pub fn new(page: PageSnapshot) -> Self {
        Self { page }
    }
}

#[async_trait]
impl SnapshotSource for MemorySnapshotSource {
    async fn snapshot(&mut self) -> Result<DocumentTree, SourceError> {
        Ok(DocumentTree::from_snapshot(&self.page))
    }
}

#[derive(Debug, Error)]
pub enum LocateError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Resolve(#[from] ResolverError),
}

/// A resolved node together with the snapshot it belongs to.
#[derive(Debug)]
pub struct Located {
    pub tree: DocumentTree,
    pub resolved: Resolved,
}

/// Fetch-then-resolve convenience over a [`Resolver`].
pub struct Locator {
    resolver: Resolver,
}

impl Locator {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Capture a snapshot and resolve `spec` against its root.
    ///
    /// A stale snapshot is reported as [`ResolverError::Detached`]; retrying
    /// with a fresh capture is left to the caller.
    pub async fn locate<S>(&self, source: &mut S, spec: &LocatorSpec) -> Result<Located, LocateError>
    where
        S: SnapshotSource + ?Sized,
    {
        let tree = source.snapshot().await?;
        let outcome = self
            .resolver
            .resolve(spec, tree.root().map_err(ResolverError::from)?);
        match outcome {
            Ok(resolved) => Ok(Located { tree, resolved }),
            Err(err) => {
                if err.is_fatal() {
                    warn!(target_spec = %spec, error = %err, "snapshot went stale during resolution");
                }
                Err(err.into())
            }
        }
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::new(Resolver::default())
    }
}
