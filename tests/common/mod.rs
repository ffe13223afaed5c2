//! Table-driven test engine implementing the filesystem-engine seam.
//!
//! Serves a declarative entry table, reads file content through the image
//! reader it was opened with (so tests exercise the no-copy delegation
//! path), and records handle drops so teardown ordering is observable.

use evidence_access::engine::{
    EntryMeta, FilesystemEngine, FilesystemHandle, ImageHandle, NodeId,
};
use evidence_access::Reader;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One file's content location inside the image.
#[derive(Clone, Copy)]
pub struct ContentRange {
    pub start: u64,
    pub length: u64,
}

/// Declarative filesystem layout: entries per parent node plus content
/// ranges per file node.
#[derive(Clone, Default)]
pub struct FsTable {
    pub entries: HashMap<u64, Vec<EntryMeta>>,
    pub content: HashMap<u64, ContentRange>,
}

impl FsTable {
    pub fn add_entry(&mut self, parent: u64, meta: EntryMeta) {
        self.entries.entry(parent).or_default().push(meta);
    }

    pub fn add_content(&mut self, node: u64, start: u64, length: u64) {
        self.content.insert(node, ContentRange { start, length });
    }
}

/// Shared drop log; handles push their tag when released.
pub type DropLog = Arc<Mutex<Vec<&'static str>>>;

pub struct TableImage {
    reader: Reader,
    drops: DropLog,
}

impl ImageHandle for TableImage {
    fn size(&self) -> u64 {
        self.reader.size().unwrap_or(0)
    }

    fn format(&self) -> &str {
        "raw"
    }
}

impl Drop for TableImage {
    fn drop(&mut self) {
        self.drops.lock().unwrap().push("image");
    }
}

pub struct TableFs {
    table: FsTable,
    reader: Reader,
    drops: DropLog,
}

impl FilesystemHandle for TableFs {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn read_dir(&self, node: NodeId) -> Result<Vec<EntryMeta>, String> {
        match self.table.entries.get(&node.0) {
            Some(entries) => Ok(entries.clone()),
            None => Err(format!("node {} is not a directory", node.0)),
        }
    }

    fn read_file(&self, node: NodeId, offset: u64, length: usize) -> Result<Vec<u8>, String> {
        let range = self
            .table
            .content
            .get(&node.0)
            .ok_or_else(|| format!("node {} has no content", node.0))?;
        if offset + length as u64 > range.length {
            return Err(format!("read past node {} content", node.0));
        }
        self.reader
            .read(range.start + offset, length)
            .map_err(|e| e.to_string())
    }

    fn fs_type(&self) -> &str {
        "tablefs"
    }
}

impl Drop for TableFs {
    fn drop(&mut self) {
        self.drops.lock().unwrap().push("fs");
    }
}

/// How the engine behaves when asked to open.
#[derive(Clone)]
pub enum OpenBehavior {
    Succeed,
    FailImage(String),
    FailFilesystem(String),
}

pub struct TableEngine {
    table: FsTable,
    behavior: OpenBehavior,
    expected_offset: u64,
    drops: DropLog,
    // Stashed between open_image and open_filesystem; the adaptor calls
    // them back to back under its own lock.
    stashed_reader: Mutex<Option<Reader>>,
}

impl TableEngine {
    pub fn new(table: FsTable, expected_offset: u64) -> Self {
        Self {
            table,
            behavior: OpenBehavior::Succeed,
            expected_offset,
            drops: Arc::new(Mutex::new(Vec::new())),
            stashed_reader: Mutex::new(None),
        }
    }

    pub fn with_behavior(mut self, behavior: OpenBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn drop_log(&self) -> DropLog {
        Arc::clone(&self.drops)
    }
}

impl FilesystemEngine for TableEngine {
    fn open_image(&self, reader: Reader) -> Result<Box<dyn ImageHandle>, String> {
        if let OpenBehavior::FailImage(detail) = &self.behavior {
            return Err(detail.clone());
        }
        *self.stashed_reader.lock().unwrap() = Some(reader.clone());
        Ok(Box::new(TableImage {
            reader,
            drops: Arc::clone(&self.drops),
        }))
    }

    fn open_filesystem(
        &self,
        _image: &dyn ImageHandle,
        offset: u64,
    ) -> Result<Box<dyn FilesystemHandle>, String> {
        if let OpenBehavior::FailFilesystem(detail) = &self.behavior {
            return Err(detail.clone());
        }
        if offset != self.expected_offset {
            return Err(format!("no filesystem at offset {:#x}", offset));
        }
        let reader = self
            .stashed_reader
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| "filesystem opened before image".to_string())?;
        Ok(Box::new(TableFs {
            table: self.table.clone(),
            reader,
            drops: Arc::clone(&self.drops),
        }))
    }
}
