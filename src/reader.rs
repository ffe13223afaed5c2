//! Byte-access interfaces over evidence sources.
//!
//! Everything else in this crate reads evidence through the [`Reader`]
//! handle: a value-typed, reference-counted view over a [`ReadSource`]
//! implementation. Sources are stateless with respect to reads — every
//! request carries an explicit offset, so independently-cloned handles can
//! read concurrently without a shared cursor.
//!
//! Each interface defaults to a safe null implementation when unconfigured:
//! the null reader reports size 0 and returns empty data, the null writer
//! fails closed with [`EvidenceError::NotSupported`].

use crate::error::{EvidenceError, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{debug, instrument};

/// A byte-addressable read-only source.
///
/// Implementations must satisfy identical range semantics so that generic
/// code never special-cases backings:
///
/// - a zero-length read at any offset up to the declared size succeeds and
///   returns an empty buffer;
/// - a read with `offset + length` past the declared size fails with
///   [`EvidenceError::OutOfRange`];
/// - unbounded sources (`size()` returns `None`) may return short reads
///   instead of failing.
///
/// No buffering is guaranteed across calls; caching policy belongs to
/// specific implementations, not to this interface.
pub trait ReadSource: Send + Sync {
    /// Reads `length` bytes starting at `offset`.
    fn read_at(&self, offset: u64, length: usize) -> Result<Vec<u8>>;

    /// Returns the declared size in bytes, or `None` for unbounded/streaming
    /// sources.
    fn size(&self) -> Option<u64>;

    /// Returns true if the source has a known size.
    fn is_sized(&self) -> bool {
        self.size().is_some()
    }

    /// Returns true if arbitrary offsets can be addressed.
    fn is_seekable(&self) -> bool {
        true
    }
}

/// A byte-addressable write sink.
pub trait WriteSink: Send + Sync {
    /// Writes `data` at `offset`, returning the number of bytes written.
    fn write_at(&self, offset: u64, data: &[u8]) -> Result<usize>;
}

/// A bidirectional resource composing read and write access.
pub trait StreamSource: ReadSource + WriteSink {}

impl<T: ReadSource + WriteSink> StreamSource for T {}

/// Validates a read request against a declared size.
///
/// Shared by every sized source so out-of-range and zero-length requests
/// behave identically across backings.
pub(crate) fn check_range(offset: u64, length: usize, size: u64) -> Result<()> {
    let end = offset
        .checked_add(length as u64)
        .ok_or_else(|| EvidenceError::out_of_range(offset, length, size))?;
    if end > size {
        return Err(EvidenceError::out_of_range(offset, length, size));
    }
    Ok(())
}

/// Value-typed handle to a [`ReadSource`].
///
/// Cloning a `Reader` shares the underlying implementation by reference
/// count; the implementation is released when the last clone is dropped.
#[derive(Clone)]
pub struct Reader {
    source: Arc<dyn ReadSource>,
}

impl Reader {
    /// Wraps a concrete source in a handle.
    pub fn new(source: impl ReadSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Wraps an already-shared source.
    pub fn from_arc(source: Arc<dyn ReadSource>) -> Self {
        Self { source }
    }

    /// Returns the null reader: size 0, reads return empty data.
    pub fn null() -> Self {
        Self::new(NullSource)
    }

    /// Reads `length` bytes starting at `offset`.
    pub fn read(&self, offset: u64, length: usize) -> Result<Vec<u8>> {
        self.source.read_at(offset, length)
    }

    /// Returns the declared size, or `None` for unbounded sources.
    pub fn size(&self) -> Option<u64> {
        self.source.size()
    }

    /// Returns true if the source has a known size.
    pub fn is_sized(&self) -> bool {
        self.source.is_sized()
    }

    /// Returns true if arbitrary offsets can be addressed.
    pub fn is_seekable(&self) -> bool {
        self.source.is_seekable()
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::null()
    }
}

impl std::fmt::Debug for Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader").field("size", &self.size()).finish()
    }
}

/// Value-typed handle to a [`WriteSink`].
#[derive(Clone)]
pub struct Writer {
    sink: Arc<dyn WriteSink>,
}

impl Writer {
    /// Wraps a concrete sink in a handle.
    pub fn new(sink: impl WriteSink + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    /// Returns the null writer: every write fails with `NotSupported`.
    pub fn null() -> Self {
        Self::new(NullSource)
    }

    /// Writes `data` at `offset`, returning the number of bytes written.
    pub fn write(&self, offset: u64, data: &[u8]) -> Result<usize> {
        self.sink.write_at(offset, data)
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::null()
    }
}

/// Value-typed handle to a bidirectional [`StreamSource`].
#[derive(Clone)]
pub struct Stream {
    source: Arc<dyn StreamSource>,
}

impl Stream {
    /// Wraps a concrete stream source in a handle.
    pub fn new(source: impl StreamSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Returns the null stream: reads empty, writes fail.
    pub fn null() -> Self {
        Self::new(NullSource)
    }

    /// Reads `length` bytes starting at `offset`.
    pub fn read(&self, offset: u64, length: usize) -> Result<Vec<u8>> {
        self.source.read_at(offset, length)
    }

    /// Writes `data` at `offset`, returning the number of bytes written.
    pub fn write(&self, offset: u64, data: &[u8]) -> Result<usize> {
        self.source.write_at(offset, data)
    }

    /// Returns the declared size, or `None` for unbounded sources.
    pub fn size(&self) -> Option<u64> {
        self.source.size()
    }
}

impl Default for Stream {
    fn default() -> Self {
        Self::null()
    }
}

/// The null byte source: never touches a real resource.
///
/// Reads always return empty data, the size is 0, and writes fail closed.
pub struct NullSource;

impl ReadSource for NullSource {
    fn read_at(&self, _offset: u64, _length: usize) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn size(&self) -> Option<u64> {
        Some(0)
    }
}

impl WriteSink for NullSource {
    fn write_at(&self, _offset: u64, _data: &[u8]) -> Result<usize> {
        Err(EvidenceError::NotSupported(
            "write through a null writer".to_string(),
        ))
    }
}

/// An owned in-memory byte source.
pub struct MemorySource {
    data: Vec<u8>,
}

impl MemorySource {
    /// Creates a source over owned bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl ReadSource for MemorySource {
    fn read_at(&self, offset: u64, length: usize) -> Result<Vec<u8>> {
        check_range(offset, length, self.data.len() as u64)?;
        let start = offset as usize;
        Ok(self.data[start..start + length].to_vec())
    }

    fn size(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }
}

/// A growable in-memory stream, readable and writable.
///
/// Writes past the current end extend the buffer with zero fill, matching
/// sparse-write semantics of the evidence containers this stands in for.
pub struct MemoryStream {
    data: RwLock<Vec<u8>>,
}

impl MemoryStream {
    /// Creates an empty stream.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(Vec::new()),
        }
    }

    /// Creates a stream pre-populated with `data`.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }
}

impl Default for MemoryStream {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadSource for MemoryStream {
    fn read_at(&self, offset: u64, length: usize) -> Result<Vec<u8>> {
        let data = self.data.read().expect("memory stream lock poisoned");
        check_range(offset, length, data.len() as u64)?;
        let start = offset as usize;
        Ok(data[start..start + length].to_vec())
    }

    fn size(&self) -> Option<u64> {
        let data = self.data.read().expect("memory stream lock poisoned");
        Some(data.len() as u64)
    }
}

impl WriteSink for MemoryStream {
    fn write_at(&self, offset: u64, data: &[u8]) -> Result<usize> {
        let mut buf = self.data.write().expect("memory stream lock poisoned");
        let end = offset as usize + data.len();
        if end > buf.len() {
            buf.resize(end, 0);
        }
        buf[offset as usize..end].copy_from_slice(data);
        Ok(data.len())
    }
}

/// A read-only memory-mapped file source.
pub struct MmapSource {
    mmap: Mmap,
}

impl MmapSource {
    /// Memory-maps a file read-only.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or mapped.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        let metadata = file.metadata()?;

        // SAFETY: This is safe because:
        // 1. The file is opened in read-only mode (no write access)
        // 2. The mmap lifetime is tied to the MmapSource lifetime
        // 3. All access to the mmap is bounds-checked via check_range()
        // 4. The file descriptor remains valid for the lifetime of the mmap
        let mmap = unsafe { Mmap::map(&file)? };
        debug!(size = metadata.len(), "Memory mapped evidence file");

        Ok(Self { mmap })
    }
}

impl ReadSource for MmapSource {
    fn read_at(&self, offset: u64, length: usize) -> Result<Vec<u8>> {
        check_range(offset, length, self.mmap.len() as u64)?;
        let start = offset as usize;
        Ok(self.mmap[start..start + length].to_vec())
    }

    fn size(&self) -> Option<u64> {
        Some(self.mmap.len() as u64)
    }
}

/// A window over another reader, exposing `[start, start + length)` as a
/// source of its own.
///
/// This is the building block for partition-scoped readers and per-file
/// content readers: the window delegates every read to the parent, so no
/// image bytes are duplicated.
pub struct RangeSource {
    parent: Reader,
    start: u64,
    length: u64,
}

impl RangeSource {
    /// Creates a window of `length` bytes into `parent` starting at `start`.
    pub fn new(parent: Reader, start: u64, length: u64) -> Self {
        Self {
            parent,
            start,
            length,
        }
    }
}

impl ReadSource for RangeSource {
    fn read_at(&self, offset: u64, length: usize) -> Result<Vec<u8>> {
        check_range(offset, length, self.length)?;
        self.parent.read(self.start + offset, length)
    }

    fn size(&self) -> Option<u64> {
        Some(self.length)
    }
}
