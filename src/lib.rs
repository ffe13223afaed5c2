//! # Evidence Access Layer
//!
//! A read-only evidence-access layer for digital forensics: disk images
//! and decoded Windows Registry values exposed as uniform, navigable data
//! structures for analysis code.
//!
//! ## Features
//!
//! - **Uniform byte access**: one [`Reader`] interface over memory,
//!   memory-mapped files, and windows into larger sources, with safe null
//!   defaults when nothing is configured
//! - **Lazy image adaptation**: an [`ImageAdaptor`] bridges raw image
//!   bytes plus a partition offset to an external filesystem engine,
//!   creating its handles on first use and never retrying a failed open
//! - **Navigable trees**: folders and files materialized one directory
//!   level at a time, each file readable through an independent,
//!   range-exact reader
//! - **Typed registry values**: [`RegistryData`] with type-directed
//!   accessors, and [`RegistryValue`] treating hive-backed views and
//!   synthesized in-memory values identically
//!
//! ## Architecture
//!
//! The layer is built bottom-up:
//!
//! 1. **Byte-Access Interfaces** (`reader`): capability traits and
//!    refcounted handles every other piece reads through
//! 2. **Engine Seam** (`engine`): the narrow trait surface an external
//!    filesystem-forensics engine plugs into
//! 3. **Image Adaptor** (`image`): lazy, cached, fail-sticky handle
//!    management with strict reverse-order teardown
//! 4. **Folder/File Tree** (`tree`): lazy enumeration and per-node
//!    content readers
//! 5. **Registry Model** (`regdata`, `regvalue`): typed data and
//!    backing-polymorphic values
//!
//! ## Examples
//!
//! ### Walking an image
//!
//! ```no_run
//! use evidence_access::engine::FilesystemEngine;
//! use evidence_access::{ImageAdaptor, MmapSource, Reader};
//!
//! fn walk(engine: impl FilesystemEngine + 'static) -> evidence_access::Result<()> {
//!     let reader = Reader::new(MmapSource::open("disk.img")?);
//!     let adaptor = ImageAdaptor::new(engine, reader, 0x10000);
//!
//!     let root = adaptor.root_folder()?;
//!     for entry in root.children()? {
//!         println!("{} ({:?})", entry.name(), entry.kind());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Typed registry values
//!
//! ```
//! use evidence_access::{RegistryData, RegistryValue};
//!
//! let value = RegistryValue::from_parts(
//!     "PendingFileRenameOperations",
//!     RegistryData::from_multi_string(&["\\??\\C:\\old", "\\??\\C:\\new"]),
//! );
//! let strings = value.data().as_multi_string().unwrap();
//! assert_eq!(strings.len(), 2);
//! ```
//!
//! ## Scope
//!
//! This crate never opens file paths on behalf of evidence (callers hand
//! it a [`Reader`]), never parses filesystem or hive binary structures
//! (external engines and parsers do), and never writes evidence back.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod image;
pub mod reader;
pub mod regdata;
pub mod regvalue;
pub mod tree;
pub mod utils;

// Re-export main types for convenience
pub use engine::{EntryKind, EntryMeta, EntryStatus, FilesystemEngine, FilesystemHandle, ImageHandle, NodeId};
pub use error::{EvidenceError, Result};
pub use image::ImageAdaptor;
pub use reader::{
    MemorySource, MemoryStream, MmapSource, NullSource, RangeSource, ReadSource, Reader, Stream,
    StreamSource, WriteSink, Writer,
};
pub use regdata::{RegType, RegistryData};
pub use regvalue::{DecodedHiveValue, RegistryValue};
pub use tree::{Children, Entry, File, Folder, Symlink};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
