//! Memory-mapped backend for files too large to load into memory
//!
//! This module provides the MemoryMappedBackend implementation over a writable
//! memory map. The mapping is created once with a fixed maximum length; it is
//! never resized in place. Growing or shrinking a memory-mapped file goes
//! through [`BinaryFile::set_len`](crate::binary::BinaryFile::set_len), which
//! closes the mapping and reopens the file.

use crate::binary::accessor::{Accessor, ReadAccessor, Seekable, WriteAccessor};
use crate::binary::validation::checked_range;
use crate::binary::view::{ReadView, View, WriteView};
use crate::error::{BinaryError, Result};
use async_trait::async_trait;
use memmap2::MmapMut;
use std::borrow::Cow;

/// Fixed-length backend over a writable memory map
///
/// Pages are loaded by the OS on first access. Reads copy out of the mapping so
/// the returned buffer does not pin the map. No internal synchronization.
#[derive(Debug)]
pub struct MemoryMappedBackend {
    /// Writable mapping of the file
    map: MmapMut,

    /// Usable length, never larger than the mapping
    length: u64,

    /// Cursor for sequential operations
    position: u64,
}

impl MemoryMappedBackend {
    /// Wrap `map`, exposing at most `max_length` bytes
    ///
    /// # Errors
    /// * `InvalidArgument` if `max_length` is larger than the mapping itself
    pub fn new(map: MmapMut, max_length: u64) -> Result<Self> {
        let capacity = map.len() as u64;
        if max_length > capacity {
            return Err(BinaryError::invalid_argument(format!(
                "maximum length {max_length} exceeds mapping capacity {capacity}"
            )));
        }

        // Advise kernel about our access pattern on Unix systems
        #[cfg(unix)]
        {
            if let Err(e) = map.advise(memmap2::Advice::Random) {
                // Non-fatal - log and continue
                log::warn!("Failed to set mmap advice: {e}");
            }
        }

        Ok(Self {
            map,
            length: max_length,
            position: 0,
        })
    }

    /// Number of bytes the mapping actually covers
    pub fn capacity(&self) -> u64 {
        self.map.len() as u64
    }

    /// Borrow the mapped bytes that belong to this backend
    pub fn as_bytes(&self) -> &[u8] {
        &self.map[..self.length as usize]
    }

    /// Flush outstanding writes to the file
    pub fn flush(&self) -> Result<()> {
        self.map
            .flush()
            .map_err(|e| BinaryError::file_error("Failed to flush memory map", e))
    }
}

impl Seekable for MemoryMappedBackend {
    fn len(&self) -> u64 {
        self.length
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn set_position(&mut self, position: u64) {
        self.position = position;
    }
}

#[async_trait]
impl ReadAccessor for MemoryMappedBackend {
    fn read_span(&self, index: u64, length: usize) -> Result<Cow<'_, [u8]>> {
        let range = checked_range(index, length, self.length)?;
        Ok(Cow::Owned(self.map[range].to_vec()))
    }

    fn slice(&self, offset: u64, length: u64) -> Result<ReadView<'_>> {
        ReadView::new(self, offset, length)
    }
}

#[async_trait]
impl WriteAccessor for MemoryMappedBackend {
    fn write(&mut self, index: u64, value: &[u8]) -> Result<()> {
        let range = checked_range(index, value.len(), self.length)?;
        self.map[range].copy_from_slice(value);
        Ok(())
    }

    fn slice_write(&mut self, offset: u64, length: u64) -> Result<WriteView<'_>> {
        WriteView::new(self, offset, length)
    }
}

impl Accessor for MemoryMappedBackend {
    fn slice_mut(&mut self, offset: u64, length: u64) -> Result<View<'_>> {
        View::new(self, offset, length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Create a test file with specific content
    fn create_test_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content)
            .expect("Failed to write test content");
        file.flush().expect("Failed to flush test file");
        file
    }

    fn map_file(file: &NamedTempFile) -> MmapMut {
        let handle = OpenOptions::new()
            .read(true)
            .write(true)
            .open(file.path())
            .expect("Failed to open temp file");
        unsafe { MmapMut::map_mut(&handle).expect("Failed to map temp file") }
    }

    #[test]
    fn test_new_memory_mapped_backend() {
        let file = create_test_file(b"0123456789");
        let backend = MemoryMappedBackend::new(map_file(&file), 10).unwrap();

        assert_eq!(backend.len(), 10);
        assert_eq!(backend.capacity(), 10);
        assert_eq!(backend.as_bytes(), b"0123456789");
    }

    #[test]
    fn test_max_length_larger_than_mapping() {
        let file = create_test_file(b"0123");
        let result = MemoryMappedBackend::new(map_file(&file), 8);

        assert!(matches!(result, Err(BinaryError::InvalidArgument { .. })));
    }

    #[test]
    fn test_max_length_limits_access() {
        let file = create_test_file(b"0123456789");
        let backend = MemoryMappedBackend::new(map_file(&file), 4).unwrap();

        assert_eq!(backend.read_all().unwrap(), b"0123".to_vec());
        assert!(backend.read_array(3, 2).is_err());
    }

    #[test]
    fn test_reads_copy() {
        let file = create_test_file(b"abc");
        let backend = MemoryMappedBackend::new(map_file(&file), 3).unwrap();

        assert!(matches!(backend.read_span(0, 3).unwrap(), Cow::Owned(_)));
    }

    #[test]
    fn test_writes_reach_the_file() {
        let file = create_test_file(b"aaaaaa");
        {
            let mut backend = MemoryMappedBackend::new(map_file(&file), 6).unwrap();
            backend.write(1, b"BCD").unwrap();
            assert_eq!(backend.read_array(0, 6).unwrap(), b"aBCDaa".to_vec());
            backend.flush().unwrap();
        }

        let on_disk = std::fs::read(file.path()).unwrap();
        assert_eq!(on_disk, b"aBCDaa".to_vec());
    }

    #[test]
    fn test_write_past_end_is_rejected() {
        let file = create_test_file(b"abc");
        let mut backend = MemoryMappedBackend::new(map_file(&file), 3).unwrap();

        assert!(matches!(
            backend.write(2, b"zz"),
            Err(BinaryError::OutOfBounds { .. })
        ));
    }
}
