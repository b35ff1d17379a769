//! File-system collaborator boundary.
//!
//! [`BinaryFile`](crate::binary::BinaryFile) never touches `std::fs` directly.
//! It asks a [`FileSystem`] for lengths, whole-file buffers and stream handles,
//! and asks for a memory map only when the file system advertises the
//! [`MemoryMappable`] capability.

pub mod physical;

pub use physical::PhysicalFileSystem;

use crate::error::Result;
use memmap2::MmapMut;
use std::io::{self, Cursor, Read, Seek, Write};
use std::path::Path;

/// A readable, writable, seekable handle
///
/// `set_len` is optional: streams without a native resize keep the default,
/// which reports `ErrorKind::Unsupported`.
pub trait SeekableStream: Read + Write + Seek + Send {
    fn set_len(&mut self, length: u64) -> io::Result<()> {
        let _ = length;
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "stream does not support set_len",
        ))
    }
}

impl SeekableStream for std::fs::File {
    fn set_len(&mut self, length: u64) -> io::Result<()> {
        std::fs::File::set_len(self, length)
    }
}

impl SeekableStream for Cursor<Vec<u8>> {
    fn set_len(&mut self, length: u64) -> io::Result<()> {
        let length = usize::try_from(length)
            .map_err(|_| io::Error::from(io::ErrorKind::OutOfMemory))?;
        self.get_mut().resize(length, 0);
        Ok(())
    }
}

impl<S: SeekableStream + ?Sized> SeekableStream for Box<S> {
    fn set_len(&mut self, length: u64) -> io::Result<()> {
        (**self).set_len(length)
    }
}

/// Capability surface consumed by the binary-file orchestrator
pub trait FileSystem: Send + Sync {
    fn file_exists(&self, path: &Path) -> bool;

    /// Length of the file in bytes
    fn file_len(&self, path: &Path) -> Result<u64>;

    /// Load the whole file into memory
    ///
    /// # Errors
    /// * A `FileError` of kind `OutOfMemory` when the buffer cannot be
    ///   allocated; callers may treat that as recoverable
    fn read_all_bytes(&self, path: &Path) -> Result<Vec<u8>>;

    /// Replace the file's contents with `data`
    fn write_all_bytes(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Open an existing file for reading and writing
    fn open_read_write(&self, path: &Path) -> Result<Box<dyn SeekableStream>>;

    /// Create or truncate a file and open it for writing
    fn open_write_only(&self, path: &Path) -> Result<Box<dyn Write + Send>>;

    /// Memory-mapping capability, if this file system has one
    fn as_memory_mappable(&self) -> Option<&dyn MemoryMappable> {
        None
    }
}

/// Optional memory-mapping capability of a [`FileSystem`]
pub trait MemoryMappable: Send + Sync {
    /// Map the whole file writable
    fn open_memory_map(&self, path: &Path) -> Result<MmapMut>;
}
