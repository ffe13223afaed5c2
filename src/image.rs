//! Image adaptor: presents raw image bytes as a navigable filesystem tree.
//!
//! The adaptor bridges a [`Reader`] over evidence bytes plus a partition
//! offset into the external engine's image and filesystem handles.
//! Construction performs no I/O; both handles are created lazily on the
//! first structural access, cached for the adaptor's lifetime, and torn
//! down in strict reverse order of creation. A failed open is terminal:
//! every later access replays the same translated error instead of
//! retrying against possibly-corrupt evidence.

use crate::engine::{FilesystemEngine, FilesystemHandle, ImageHandle};
use crate::error::{EvidenceError, Result};
use crate::reader::Reader;
use crate::tree::Folder;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, instrument, warn};

/// The open image/filesystem handle pair.
///
/// Field order is load-bearing: Rust drops fields in declaration order, so
/// the filesystem handle is released before the image handle it was opened
/// against — the reverse of creation order.
pub(crate) struct Handles {
    pub(crate) filesystem: Box<dyn FilesystemHandle>,
    #[allow(dead_code)]
    pub(crate) image: Box<dyn ImageHandle>,
}

/// Cached outcome of the one-shot lazy open.
enum LazyState {
    /// No structural access has happened yet.
    Unopened,
    /// Both handles are open and cached.
    Ready(Handles),
    /// The open failed; the failure is replayed on every later access.
    Failed(OpenFailure),
}

/// A recorded open failure, re-materialized as the identical error kind on
/// each access.
#[derive(Clone)]
enum OpenFailure {
    Image { detail: String },
    Filesystem { offset: u64, detail: String },
}

impl OpenFailure {
    fn to_error(&self) -> EvidenceError {
        match self {
            OpenFailure::Image { detail } => EvidenceError::image_open(detail.clone()),
            OpenFailure::Filesystem { offset, detail } => {
                EvidenceError::filesystem_open(*offset, detail.clone())
            }
        }
    }
}

/// State shared between an adaptor and the tree nodes derived from it.
///
/// Folder/File nodes clone the `Arc` around this struct, so the handles
/// stay alive as long as any derived node does.
pub(crate) struct AdaptorShared {
    engine: Box<dyn FilesystemEngine>,
    reader: Reader,
    offset: u64,
    state: RwLock<LazyState>,
}

impl AdaptorShared {
    /// Runs `f` against the open handles, opening them first if needed.
    pub(crate) fn with_handles<R>(&self, f: impl FnOnce(&Handles) -> Result<R>) -> Result<R> {
        {
            let state = self.state.read().expect("adaptor state lock poisoned");
            match &*state {
                LazyState::Ready(handles) => return f(handles),
                LazyState::Failed(failure) => return Err(failure.to_error()),
                LazyState::Unopened => {}
            }
        }

        let mut state = self.state.write().expect("adaptor state lock poisoned");
        // Another caller may have opened between the two lock acquisitions
        if let LazyState::Unopened = &*state {
            *state = match self.open_handles() {
                Ok(handles) => LazyState::Ready(handles),
                Err(failure) => {
                    warn!(error = %failure.to_error(), "Evidence open failed; failure is terminal for this adaptor");
                    LazyState::Failed(failure)
                }
            };
        }

        match &*state {
            LazyState::Ready(handles) => f(handles),
            LazyState::Failed(failure) => Err(failure.to_error()),
            LazyState::Unopened => unreachable!("state settled above"),
        }
    }

    /// One open attempt: image first, then the filesystem at `offset`.
    fn open_handles(&self) -> std::result::Result<Handles, OpenFailure> {
        debug!(offset = %format!("{:#x}", self.offset), "Opening image handle");
        let image = self
            .engine
            .open_image(self.reader.clone())
            .map_err(|detail| OpenFailure::Image { detail })?;

        debug!(format = image.format(), size = image.size(), "Image opened, opening filesystem");
        let filesystem = self
            .engine
            .open_filesystem(image.as_ref(), self.offset)
            .map_err(|detail| OpenFailure::Filesystem {
                offset: self.offset,
                detail,
            })?;

        info!(
            fs_type = filesystem.fs_type(),
            offset = %format!("{:#x}", self.offset),
            "Filesystem opened"
        );
        Ok(Handles { filesystem, image })
    }
}

/// Presents a partition inside a raw evidence image as a folder tree.
///
/// Construction stores the reader and offset without touching them; the
/// engine handles are created on the first call to [`root_folder`] and
/// owned by this adaptor until it is dropped. Lazy creation is serialized
/// internally, so first access from multiple threads is safe; per the
/// engine contract, concurrent reads through already-open handles share no
/// cursor state.
///
/// [`root_folder`]: ImageAdaptor::root_folder
pub struct ImageAdaptor {
    shared: Arc<AdaptorShared>,
}

impl ImageAdaptor {
    /// Creates an adaptor over `reader` with the filesystem expected at
    /// byte `offset` (the partition start). Performs no I/O.
    pub fn new(engine: impl FilesystemEngine + 'static, reader: Reader, offset: u64) -> Self {
        Self {
            shared: Arc::new(AdaptorShared {
                engine: Box::new(engine),
                reader,
                offset,
                state: RwLock::new(LazyState::Unopened),
            }),
        }
    }

    /// Returns the partition offset this adaptor was created with.
    pub fn partition_offset(&self) -> u64 {
        self.shared.offset
    }

    /// Returns true once both handles have been opened successfully.
    pub fn is_open(&self) -> bool {
        matches!(
            &*self.shared.state.read().expect("adaptor state lock poisoned"),
            LazyState::Ready(_)
        )
    }

    /// Returns the root folder of the filesystem.
    ///
    /// Triggers the lazy open on first call. Errors from the open —
    /// [`EvidenceError::ImageOpen`] or [`EvidenceError::FilesystemOpen`]
    /// with the engine's diagnostic text — propagate here and are replayed
    /// identically on every subsequent call.
    #[instrument(skip(self), fields(offset = self.shared.offset))]
    pub fn root_folder(&self) -> Result<Folder> {
        self.shared
            .with_handles(|handles| Ok(handles.filesystem.root()))
            .map(|root| Folder::root(Arc::clone(&self.shared), root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EntryMeta, NodeId};

    struct FailingEngine;

    impl FilesystemEngine for FailingEngine {
        fn open_image(
            &self,
            _reader: Reader,
        ) -> std::result::Result<Box<dyn ImageHandle>, String> {
            Err("bad sector map".to_string())
        }

        fn open_filesystem(
            &self,
            _image: &dyn ImageHandle,
            _offset: u64,
        ) -> std::result::Result<Box<dyn FilesystemHandle>, String> {
            unreachable!("image open never succeeds")
        }
    }

    struct EmptyImage;

    impl ImageHandle for EmptyImage {
        fn size(&self) -> u64 {
            0
        }

        fn format(&self) -> &str {
            "raw"
        }
    }

    struct NoFsEngine;

    impl FilesystemEngine for NoFsEngine {
        fn open_image(
            &self,
            _reader: Reader,
        ) -> std::result::Result<Box<dyn ImageHandle>, String> {
            Ok(Box::new(EmptyImage))
        }

        fn open_filesystem(
            &self,
            _image: &dyn ImageHandle,
            _offset: u64,
        ) -> std::result::Result<Box<dyn FilesystemHandle>, String> {
            Err("no filesystem signature".to_string())
        }
    }

    struct EmptyFs;

    impl FilesystemHandle for EmptyFs {
        fn root(&self) -> NodeId {
            NodeId(0)
        }

        fn read_dir(&self, _node: NodeId) -> std::result::Result<Vec<EntryMeta>, String> {
            Ok(Vec::new())
        }

        fn read_file(
            &self,
            _node: NodeId,
            _offset: u64,
            _length: usize,
        ) -> std::result::Result<Vec<u8>, String> {
            Err("not a file".to_string())
        }

        fn fs_type(&self) -> &str {
            "testfs"
        }
    }

    struct EmptyFsEngine;

    impl FilesystemEngine for EmptyFsEngine {
        fn open_image(
            &self,
            _reader: Reader,
        ) -> std::result::Result<Box<dyn ImageHandle>, String> {
            Ok(Box::new(EmptyImage))
        }

        fn open_filesystem(
            &self,
            _image: &dyn ImageHandle,
            _offset: u64,
        ) -> std::result::Result<Box<dyn FilesystemHandle>, String> {
            Ok(Box::new(EmptyFs))
        }
    }

    #[test]
    fn test_construction_does_no_io() {
        let adaptor = ImageAdaptor::new(FailingEngine, Reader::null(), 0);
        // No access yet, so the failing engine has not been asked to open
        assert!(!adaptor.is_open());
    }

    #[test]
    fn test_image_open_failure_is_sticky() {
        let adaptor = ImageAdaptor::new(FailingEngine, Reader::null(), 0);

        for _ in 0..3 {
            match adaptor.root_folder() {
                Err(EvidenceError::ImageOpen { detail }) => {
                    assert_eq!(detail, "bad sector map")
                }
                other => panic!("expected ImageOpen, got {:?}", other.map(|_| ())),
            }
        }
        assert!(!adaptor.is_open());
    }

    #[test]
    fn test_filesystem_open_failure_carries_offset() {
        let adaptor = ImageAdaptor::new(NoFsEngine, Reader::null(), 0x8000);

        match adaptor.root_folder() {
            Err(EvidenceError::FilesystemOpen { offset, detail }) => {
                assert_eq!(offset, 0x8000);
                assert_eq!(detail, "no filesystem signature");
            }
            other => panic!("expected FilesystemOpen, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_successful_open_is_cached() {
        let adaptor = ImageAdaptor::new(EmptyFsEngine, Reader::null(), 0);
        let root = adaptor.root_folder().unwrap();
        assert!(adaptor.is_open());
        assert_eq!(root.name(), "/");

        // Second access returns a root over the same cached handles
        let again = adaptor.root_folder().unwrap();
        assert_eq!(again.name(), root.name());
    }

    #[test]
    fn test_drop_without_open_is_noop() {
        let adaptor = ImageAdaptor::new(FailingEngine, Reader::null(), 0);
        drop(adaptor);
    }
}
