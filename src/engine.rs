//! Seam to the external filesystem-forensics engine.
//!
//! This crate does not parse partition tables or filesystem structures
//! itself; that work belongs to an external engine (dozens of on-disk
//! formats, maintained separately). The traits here are the complete
//! surface that engine must provide: an opaque image handle opened over a
//! [`Reader`], an opaque filesystem handle opened at a partition offset,
//! and per-directory entry metadata.
//!
//! Engine failures are reported as plain `Err(String)` diagnostics; the
//! [`ImageAdaptor`](crate::image::ImageAdaptor) translates them into
//! [`EvidenceError`](crate::error::EvidenceError) kinds so no engine type
//! ever crosses this crate's public contract.

use crate::reader::Reader;
use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque identifier of a node inside one filesystem handle.
///
/// Ids are only meaningful to the handle that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntryKind {
    /// A directory.
    Folder,
    /// A regular file.
    File,
    /// A symbolic link.
    Symlink,
}

/// Allocation status of a directory entry.
///
/// Drivers that recover deleted or orphaned entries report them alongside
/// allocated ones; analysis code decides whether to skip them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntryStatus {
    /// Entry is live in the filesystem.
    Allocated,
    /// Entry was deleted but its metadata is still recoverable.
    Deleted,
    /// Entry has no parent directory (carved/orphan).
    Orphaned,
    /// The driver could not resolve this entry's metadata.
    Unresolved,
}

/// Metadata for one directory entry, as reported by the filesystem driver.
#[derive(Debug, Clone)]
pub struct EntryMeta {
    /// Node id within the owning filesystem handle.
    pub node: NodeId,

    /// Entry name, without any path components.
    pub name: String,

    /// Folder, file, or symlink.
    pub kind: EntryKind,

    /// Declared size in bytes (0 for folders on most drivers).
    pub size: u64,

    /// Allocation status.
    pub status: EntryStatus,

    /// Creation timestamp, if the filesystem records one.
    pub created: Option<DateTime<Utc>>,

    /// Last-modification timestamp, if recorded.
    pub modified: Option<DateTime<Utc>>,

    /// Last-access timestamp, if recorded.
    pub accessed: Option<DateTime<Utc>>,
}

impl EntryMeta {
    /// Creates metadata with the given identity and no timestamps.
    pub fn new(node: NodeId, name: impl Into<String>, kind: EntryKind, size: u64) -> Self {
        Self {
            node,
            name: name.into(),
            kind,
            size,
            status: EntryStatus::Allocated,
            created: None,
            modified: None,
            accessed: None,
        }
    }

    /// Sets the allocation status.
    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the modification timestamp.
    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }
}

/// An open image: the engine's parsed view of a raw evidence byte stream.
///
/// Handles are opaque to this crate and owned exclusively by one
/// [`ImageAdaptor`](crate::image::ImageAdaptor).
pub trait ImageHandle: Send + Sync {
    /// Total addressable size of the image in bytes.
    fn size(&self) -> u64;

    /// Short human-readable description of the detected container format.
    fn format(&self) -> &str;
}

/// An open filesystem found inside an image at some partition offset.
pub trait FilesystemHandle: Send + Sync {
    /// Node id of the top-level directory.
    fn root(&self) -> NodeId;

    /// Lists the entries of a directory.
    ///
    /// Entries whose metadata the driver cannot resolve are reported with
    /// [`EntryStatus::Unresolved`] rather than failing the listing; a
    /// whole-directory failure is an `Err` diagnostic.
    fn read_dir(&self, node: NodeId) -> std::result::Result<Vec<EntryMeta>, String>;

    /// Reads `length` bytes of a file node's content starting at `offset`.
    ///
    /// The driver serves exactly the byte range belonging to that node,
    /// never bytes of a neighbouring node.
    fn read_file(
        &self,
        node: NodeId,
        offset: u64,
        length: usize,
    ) -> std::result::Result<Vec<u8>, String>;

    /// Short human-readable name of the filesystem type (e.g. "ntfs").
    fn fs_type(&self) -> &str;
}

/// Factory for image and filesystem handles.
///
/// This is the narrow dependency on the external engine: two open
/// operations, each delegating all byte access to the supplied [`Reader`]
/// so no image bytes are duplicated.
pub trait FilesystemEngine: Send + Sync {
    /// Opens an image over raw evidence bytes.
    fn open_image(&self, reader: Reader) -> std::result::Result<Box<dyn ImageHandle>, String>;

    /// Opens a filesystem inside `image` at byte `offset`.
    fn open_filesystem(
        &self,
        image: &dyn ImageHandle,
        offset: u64,
    ) -> std::result::Result<Box<dyn FilesystemHandle>, String>;
}
