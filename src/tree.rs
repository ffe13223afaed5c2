//! Lazy, read-only folder/file tree over an open filesystem handle.
//!
//! Tree nodes are cheap values: each holds the entry metadata the driver
//! reported plus a shared reference to the owning adaptor's state, so a
//! node stays usable for as long as the caller retains it. Children are
//! enumerated on demand, one directory level per query — nothing is cached
//! beyond the traversal the caller drives, and re-querying an unmodified
//! image yields the same listing.

use crate::engine::{EntryKind, EntryMeta, EntryStatus, NodeId};
use crate::error::{EvidenceError, Result};
use crate::image::AdaptorShared;
use crate::reader::{check_range, ReadSource, Reader};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// A directory entry yielded by [`Folder::children`].
pub enum Entry {
    /// A subdirectory.
    Folder(Folder),
    /// A regular file.
    File(File),
    /// A symbolic link (target resolution is the driver's business).
    Symlink(Symlink),
}

impl Entry {
    /// Returns the entry name.
    pub fn name(&self) -> &str {
        match self {
            Entry::Folder(f) => f.name(),
            Entry::File(f) => f.name(),
            Entry::Symlink(s) => s.name(),
        }
    }

    /// Returns the entry kind.
    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Folder(_) => EntryKind::Folder,
            Entry::File(_) => EntryKind::File,
            Entry::Symlink(_) => EntryKind::Symlink,
        }
    }

    /// Returns the allocation status reported by the driver.
    pub fn status(&self) -> EntryStatus {
        match self {
            Entry::Folder(f) => f.status(),
            Entry::File(f) => f.status(),
            Entry::Symlink(s) => s.status(),
        }
    }

    /// Returns the folder if this entry is one.
    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Entry::Folder(f) => Some(f),
            _ => None,
        }
    }

    /// Returns the file if this entry is one.
    pub fn as_file(&self) -> Option<&File> {
        match self {
            Entry::File(f) => Some(f),
            _ => None,
        }
    }
}

/// A directory inside the image's filesystem.
pub struct Folder {
    meta: EntryMeta,
    shared: Arc<AdaptorShared>,
}

impl Folder {
    /// Creates the root folder of a filesystem.
    pub(crate) fn root(shared: Arc<AdaptorShared>, node: NodeId) -> Self {
        Self {
            meta: EntryMeta::new(node, "/", EntryKind::Folder, 0),
            shared,
        }
    }

    fn from_meta(meta: EntryMeta, shared: Arc<AdaptorShared>) -> Self {
        Self { meta, shared }
    }

    /// Returns the folder name (`"/"` for the root).
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Returns the allocation status reported by the driver.
    pub fn status(&self) -> EntryStatus {
        self.meta.status
    }

    /// Returns true if the driver recovered this folder from deleted or
    /// orphaned metadata.
    pub fn is_deleted(&self) -> bool {
        matches!(
            self.meta.status,
            EntryStatus::Deleted | EntryStatus::Orphaned
        )
    }

    /// Creation timestamp, if the filesystem records one.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.meta.created
    }

    /// Last-modification timestamp, if recorded.
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.meta.modified
    }

    /// Last-access timestamp, if recorded.
    pub fn accessed(&self) -> Option<DateTime<Utc>> {
        self.meta.accessed
    }

    /// Enumerates this directory's entries.
    ///
    /// Each call queries the filesystem driver afresh; the returned
    /// iterator is finite and yields entries in whatever order the driver
    /// reports (stable for a given unmodified image, no further guarantee).
    /// Entries the driver could not resolve appear with
    /// [`EntryStatus::Unresolved`] — one corrupt entry never aborts the
    /// traversal of its siblings.
    pub fn children(&self) -> Result<Children> {
        let node = self.meta.node;
        let entries = self.shared.with_handles(|handles| {
            handles.filesystem.read_dir(node).map_err(|detail| {
                EvidenceError::NotFound(format!(
                    "directory '{}': {}",
                    self.meta.name, detail
                ))
            })
        })?;

        debug!(folder = %self.meta.name, entries = entries.len(), "Enumerated directory");
        Ok(Children {
            entries: entries.into_iter(),
            shared: Arc::clone(&self.shared),
        })
    }

    /// Finds a direct child by name.
    pub fn child(&self, name: &str) -> Result<Entry> {
        self.children()?
            .find(|entry| entry.name() == name)
            .ok_or_else(|| EvidenceError::not_found("entry", name))
    }
}

/// Iterator over a folder's entries.
///
/// Finite and single-pass; to traverse again, call
/// [`Folder::children`] anew (idempotent against an unmodified image).
pub struct Children {
    entries: std::vec::IntoIter<EntryMeta>,
    shared: Arc<AdaptorShared>,
}

impl Iterator for Children {
    type Item = Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let meta = self.entries.next()?;
        let shared = Arc::clone(&self.shared);
        Some(match meta.kind {
            EntryKind::Folder => Entry::Folder(Folder::from_meta(meta, shared)),
            EntryKind::File => Entry::File(File { meta, shared }),
            EntryKind::Symlink => Entry::Symlink(Symlink { meta }),
        })
    }
}

/// A regular file inside the image's filesystem.
pub struct File {
    meta: EntryMeta,
    shared: Arc<AdaptorShared>,
}

impl File {
    /// Returns the file name.
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Returns the declared size in bytes.
    pub fn size(&self) -> u64 {
        self.meta.size
    }

    /// Returns the allocation status reported by the driver.
    pub fn status(&self) -> EntryStatus {
        self.meta.status
    }

    /// Returns true if the driver recovered this file from deleted or
    /// orphaned metadata.
    pub fn is_deleted(&self) -> bool {
        matches!(
            self.meta.status,
            EntryStatus::Deleted | EntryStatus::Orphaned
        )
    }

    /// Creation timestamp, if the filesystem records one.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.meta.created
    }

    /// Last-modification timestamp, if recorded.
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.meta.modified
    }

    /// Last-access timestamp, if recorded.
    pub fn accessed(&self) -> Option<DateTime<Utc>> {
        self.meta.accessed
    }

    /// Opens a fresh reader over exactly this file's content range.
    ///
    /// Every call returns an independent reader with no shared cursor, so
    /// readers over the same file may be used concurrently. Reads are
    /// bounds-checked against the declared size and served by the driver
    /// for this node only — never bytes of a neighbouring node.
    pub fn new_reader(&self) -> Result<Reader> {
        // Force the lazy open now so a later read cannot be the first
        // access that surfaces an open error.
        self.shared.with_handles(|_| Ok(()))?;

        Ok(Reader::new(FileContentSource {
            shared: Arc::clone(&self.shared),
            node: self.meta.node,
            size: self.meta.size,
        }))
    }
}

/// A symbolic link entry. Exposed for completeness; content and target
/// resolution stay with the driver.
pub struct Symlink {
    meta: EntryMeta,
}

impl Symlink {
    /// Returns the link name.
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Returns the allocation status reported by the driver.
    pub fn status(&self) -> EntryStatus {
        self.meta.status
    }
}

/// Read source serving one file node's content through the filesystem
/// driver.
struct FileContentSource {
    shared: Arc<AdaptorShared>,
    node: NodeId,
    size: u64,
}

impl ReadSource for FileContentSource {
    fn read_at(&self, offset: u64, length: usize) -> Result<Vec<u8>> {
        check_range(offset, length, self.size)?;
        if length == 0 {
            return Ok(Vec::new());
        }

        self.shared.with_handles(|handles| {
            handles
                .filesystem
                .read_file(self.node, offset, length)
                .map_err(|detail| {
                    std::io::Error::new(std::io::ErrorKind::InvalidData, detail).into()
                })
        })
    }

    fn size(&self) -> Option<u64> {
        Some(self.size)
    }
}
