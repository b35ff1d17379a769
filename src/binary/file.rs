//! The binary file orchestrator.
//!
//! A [`BinaryFile`] owns exactly one active [`Backend`]. Opening by path runs
//! the autodetection cascade, which trades memory for robustness:
//!
//! 1. Load the whole file into an [`ArrayBackend`] if it is small enough.
//!    Allocation failures fall through.
//! 2. Memory-map it if the file system can and the config allows it. Any
//!    failure other than "not found" falls through.
//! 3. Open a read/write stream. Always available, slowest.
//!
//! Files opened by path are `Owned`: the file knows its path and file system
//! and can close and reopen its backend when a resize needs it. Files built
//! from caller-supplied bytes, streams or mappings are `Detached` and never
//! reopen anything. If a reopen fails the file is left closed: it has no
//! backend, and every access reports `InvalidState` until a later `set_len`
//! reopens it.

use crate::binary::accessor::{Accessor, ReadAccessor, Seekable, VariableLength, WriteAccessor};
use crate::binary::array::ArrayBackend;
use crate::binary::mmap::MemoryMappedBackend;
use crate::binary::stream::StreamBackend;
use crate::binary::validation::MAX_BUFFER_LEN;
use crate::binary::view::{ReadView, View, WriteView};
use crate::config::BinaryFileConfig;
use crate::error::{BinaryError, Result};
use crate::fs::{FileSystem, PhysicalFileSystem, SeekableStream};
use async_trait::async_trait;
use memmap2::MmapMut;
use std::borrow::Cow;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The storage medium behind a [`BinaryFile`]
#[derive(Debug)]
pub enum Backend {
    /// Whole file in memory
    Array(ArrayBackend),
    /// Seekable stream, one operation at a time
    Stream(StreamBackend),
    /// Fixed-length memory mapping
    MemoryMapped(MemoryMappedBackend),
}

/// Which [`Backend`] variant is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Array,
    Stream,
    MemoryMapped,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Array => "in-memory",
            BackendKind::Stream => "stream",
            BackendKind::MemoryMapped => "memory-mapped",
        };
        f.write_str(name)
    }
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Array(_) => BackendKind::Array,
            Backend::Stream(_) => BackendKind::Stream,
            Backend::MemoryMapped(_) => BackendKind::MemoryMapped,
        }
    }

    fn as_accessor(&self) -> &dyn Accessor {
        match self {
            Backend::Array(backend) => backend,
            Backend::Stream(backend) => backend,
            Backend::MemoryMapped(backend) => backend,
        }
    }

    fn as_accessor_mut(&mut self) -> &mut dyn Accessor {
        match self {
            Backend::Array(backend) => backend,
            Backend::Stream(backend) => backend,
            Backend::MemoryMapped(backend) => backend,
        }
    }

    /// Resize in place, if this medium can
    fn set_len(&mut self, length: u64) -> Result<()> {
        match self {
            Backend::Array(backend) => backend.set_len(length),
            Backend::Stream(backend) => backend.set_len(length),
            Backend::MemoryMapped(_) => Err(BinaryError::unsupported(
                "memory-mapped backends cannot change length",
            )),
        }
    }
}

/// Who is responsible for the backend's underlying resource
enum Ownership {
    /// Opened from `path`; may be closed and reopened
    Owned {
        path: PathBuf,
        fs: Arc<dyn FileSystem>,
        config: BinaryFileConfig,
    },
    /// Supplied by the caller; never reopened
    Detached,
}

/// A binary file backed by whichever medium suits it
///
/// Implements the full accessor contract by delegating to the active backend.
/// Views sliced from a `BinaryFile` reference the backend directly and borrow
/// the file, so the backend cannot be swapped while a view is alive.
pub struct BinaryFile {
    /// `None` once a reopen has failed
    backend: Option<Backend>,
    ownership: Ownership,
    position: u64,
}

impl BinaryFile {
    /// Open `path` on the local file system with default settings
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(
            path,
            Arc::new(PhysicalFileSystem::new()),
            BinaryFileConfig::default(),
        )
    }

    /// Open `path` through `fs`, choosing a backend with the autodetection cascade
    ///
    /// # Errors
    /// * `FileNotFound` if `fs` has no such file
    /// * Any error from the last-resort stream step; failures recovered by
    ///   earlier steps are logged, never returned
    pub fn open_with(
        path: impl AsRef<Path>,
        fs: Arc<dyn FileSystem>,
        config: BinaryFileConfig,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let backend = autodetect(&path, fs.as_ref(), &config)?;

        Ok(Self {
            backend: Some(backend),
            ownership: Ownership::Owned { path, fs, config },
            position: 0,
        })
    }

    /// Wrap bytes the caller already holds
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::detached(Backend::Array(ArrayBackend::new(data.into())))
    }

    /// Wrap a caller-supplied stream
    ///
    /// The stream is only released when the caller takes it back with
    /// [`BinaryFile::into_backend`] or drops the file.
    pub fn from_stream(stream: Box<dyn SeekableStream>) -> Result<Self> {
        Ok(Self::detached(Backend::Stream(StreamBackend::new(stream)?)))
    }

    /// Wrap a caller-supplied mapping, exposing its first `length` bytes
    pub fn from_memory_map(map: MmapMut, length: u64) -> Result<Self> {
        Ok(Self::detached(Backend::MemoryMapped(
            MemoryMappedBackend::new(map, length)?,
        )))
    }

    fn detached(backend: Backend) -> Self {
        Self {
            backend: Some(backend),
            ownership: Ownership::Detached,
            position: 0,
        }
    }

    /// Active backend kind, `None` while the file is closed
    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.backend.as_ref().map(Backend::kind)
    }

    pub fn backend(&self) -> Option<&Backend> {
        self.backend.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.backend.is_none()
    }

    fn active(&self) -> Result<&Backend> {
        self.backend.as_ref().ok_or_else(closed)
    }

    fn accessor(&self) -> Result<&dyn Accessor> {
        self.active().map(Backend::as_accessor)
    }

    fn accessor_mut(&mut self) -> Result<&mut dyn Accessor> {
        self.backend
            .as_mut()
            .map(Backend::as_accessor_mut)
            .ok_or_else(closed)
    }

    /// Path this file was opened from, if any
    pub fn path(&self) -> Option<&Path> {
        match &self.ownership {
            Ownership::Owned { path, .. } => Some(path),
            Ownership::Detached => None,
        }
    }

    /// Release the file and hand back its backend, if it still has one
    pub fn into_backend(self) -> Option<Backend> {
        self.backend
    }

    /// Change the file's length
    ///
    /// Backends that can resize themselves do so in place. Otherwise the
    /// backend is released, the file is resized on disk through the file
    /// system, and the autodetection cascade runs again. A closed file is
    /// reopened the same way.
    ///
    /// Not synchronized: callers must have exclusive access, which `&mut self`
    /// already guarantees.
    ///
    /// # Errors
    /// * `NotAllowed` if a reopen is needed but the file was not opened from a path
    /// * Any reopen error; the file is then closed
    pub fn set_len(&mut self, length: u64) -> Result<()> {
        let Some(backend) = self.backend.as_mut() else {
            log::debug!("File is closed, reopening at length {length}");
            return self.resize_and_reopen(length);
        };

        match backend.set_len(length) {
            Err(BinaryError::Unsupported { operation }) => {
                log::debug!("In-place resize unsupported ({operation}), reopening");
                self.resize_and_reopen(length)
            }
            Err(BinaryError::LengthTooLarge { .. }) => {
                log::debug!("Length {length} does not fit the {} backend, reopening", backend.kind());
                self.resize_and_reopen(length)
            }
            other => other,
        }
    }

    fn resize_and_reopen(&mut self, length: u64) -> Result<()> {
        let Ownership::Owned { path, fs, config } = &self.ownership else {
            return Err(BinaryError::not_allowed(
                "resizing requires reopening, but this file was not opened from a path",
            ));
        };

        // Close the mapping or stream before resizing the file underneath it
        self.backend = None;

        let resized = fs.open_read_write(path).and_then(|mut stream| {
            stream.set_len(length).map_err(|e| {
                BinaryError::file_error(format!("Failed to resize {}", path.display()), e)
            })
        });
        if let Err(e) = &resized {
            log::warn!("Resize of {} failed, reopening unchanged: {e}", path.display());
        }

        let backend = autodetect(path, fs.as_ref(), config).map_err(|e| {
            log::warn!("Reopen of {} failed, file is closed: {e}", path.display());
            e
        })?;
        log::debug!(
            "Reopened {} as {} with length {}",
            path.display(),
            backend.kind(),
            backend.as_accessor().len()
        );
        self.backend = Some(backend);
        resized
    }

    /// Persist the contents to the path this file was opened from
    ///
    /// # Errors
    /// * `InvalidState` if the file was not opened from a path or is closed
    pub fn save(&self) -> Result<()> {
        match &self.ownership {
            Ownership::Owned { path, fs, .. } => self.save_to(fs.as_ref(), path),
            Ownership::Detached => Err(BinaryError::invalid_state(
                "cannot save a file that has no path; use save_to",
            )),
        }
    }

    /// Persist the contents to `path` on this file's own file system
    pub fn save_as(&self, path: impl AsRef<Path>) -> Result<()> {
        match &self.ownership {
            Ownership::Owned { fs, .. } => self.save_to(fs.as_ref(), path.as_ref()),
            Ownership::Detached => Err(BinaryError::invalid_state(
                "cannot save a file that has no file system; use save_to",
            )),
        }
    }

    /// Persist the contents to `path` on `fs`
    ///
    /// Memory-mapped and stream backends already write through to their own
    /// file, so saving to that same file on the same file system only flushes.
    /// Any other destination receives a full copy.
    pub fn save_to(&self, fs: &dyn FileSystem, path: &Path) -> Result<()> {
        let backend = self.active()?;
        let own_path = self.is_own_file(fs, path);

        match backend {
            Backend::Array(backend) => fs.write_all_bytes(path, backend.as_bytes()),
            Backend::MemoryMapped(_) if own_path => {
                log::debug!("{} is mapped in place, nothing to save", path.display());
                Ok(())
            }
            Backend::MemoryMapped(backend) => {
                let mut destination = fs.open_write_only(path)?;
                destination
                    .write_all(backend.as_bytes())
                    .and_then(|()| destination.flush())
                    .map_err(|e| {
                        BinaryError::file_error(format!("Failed to save {}", path.display()), e)
                    })
            }
            Backend::Stream(backend) if own_path => backend.flush(),
            Backend::Stream(backend) => {
                let mut destination = fs.open_write_only(path)?;
                backend.copy_to(&mut destination).map(|_| ())
            }
        }
    }

    /// Whether `path` on `fs` names the file this one was opened from
    fn is_own_file(&self, fs: &dyn FileSystem, path: &Path) -> bool {
        match &self.ownership {
            Ownership::Owned {
                path: own_path,
                fs: own_fs,
                ..
            } => {
                // Data pointers only; vtable pointers are not unique per type
                let same_fs = std::ptr::eq(
                    Arc::as_ptr(own_fs) as *const u8,
                    fs as *const _ as *const u8,
                );
                same_fs && own_path == path
            }
            Ownership::Detached => false,
        }
    }
}

fn closed() -> BinaryError {
    BinaryError::invalid_state("file is closed after a failed reopen")
}

/// Pick a backend for `path`, recovering from allocation and mapping failures
fn autodetect(path: &Path, fs: &dyn FileSystem, config: &BinaryFileConfig) -> Result<Backend> {
    if !fs.file_exists(path) {
        return Err(BinaryError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let length = fs.file_len(path)?;

    if length <= config.max_in_memory_len && length <= MAX_BUFFER_LEN {
        match fs.read_all_bytes(path) {
            Ok(data) => {
                log::debug!("Loaded {} ({length} bytes) into memory", path.display());
                return Ok(Backend::Array(ArrayBackend::new(data)));
            }
            Err(e) if e.is_out_of_memory() => {
                log::warn!("Could not load {} into memory, falling back: {e}", path.display());
            }
            Err(e) => return Err(e),
        }
    }

    if config.memory_map {
        if let Some(mappable) = fs.as_memory_mappable() {
            let mapped = mappable
                .open_memory_map(path)
                .and_then(|map| MemoryMappedBackend::new(map, length));
            match mapped {
                // Mapping errors can surface lazily; the capacity check is the probe
                Ok(backend) if backend.capacity() >= length => {
                    log::debug!("Memory-mapped {} ({length} bytes)", path.display());
                    return Ok(Backend::MemoryMapped(backend));
                }
                Ok(_) => {
                    log::warn!("Mapping of {} is shorter than the file, falling back", path.display());
                }
                Err(e) if e.is_not_found() => return Err(e),
                Err(e) => {
                    log::warn!("Could not memory-map {}, falling back: {e}", path.display());
                }
            }
        }
    }

    let stream = fs.open_read_write(path)?;
    log::debug!("Opened {} as a stream ({length} bytes)", path.display());
    Ok(Backend::Stream(StreamBackend::new(stream)?))
}

impl fmt::Debug for BinaryFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryFile")
            .field("backend", &self.backend)
            .field("path", &self.path())
            .field("position", &self.position)
            .finish()
    }
}

impl Seekable for BinaryFile {
    /// Zero while the file is closed
    fn len(&self) -> u64 {
        self.backend
            .as_ref()
            .map_or(0, |backend| backend.as_accessor().len())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn set_position(&mut self, position: u64) {
        self.position = position;
    }
}

#[async_trait]
impl ReadAccessor for BinaryFile {
    fn read_span(&self, index: u64, length: usize) -> Result<Cow<'_, [u8]>> {
        self.accessor()?.read_span(index, length)
    }

    /// Views reference the backend itself, not the file
    fn slice(&self, offset: u64, length: u64) -> Result<ReadView<'_>> {
        self.accessor()?.slice(offset, length)
    }

    fn read_array(&self, index: u64, length: usize) -> Result<Vec<u8>> {
        self.accessor()?.read_array(index, length)
    }

    fn read_all(&self) -> Result<Vec<u8>> {
        self.accessor()?.read_all()
    }

    async fn read_array_async(&self, index: u64, length: usize) -> Result<Vec<u8>> {
        self.accessor()?.read_array_async(index, length).await
    }
}

#[async_trait]
impl WriteAccessor for BinaryFile {
    fn write(&mut self, index: u64, value: &[u8]) -> Result<()> {
        self.accessor_mut()?.write(index, value)
    }

    fn slice_write(&mut self, offset: u64, length: u64) -> Result<WriteView<'_>> {
        self.accessor_mut()?.slice_write(offset, length)
    }

    async fn write_async(&mut self, index: u64, value: &[u8]) -> Result<()> {
        self.accessor_mut()?.write_async(index, value).await
    }
}

impl Accessor for BinaryFile {
    fn slice_mut(&mut self, offset: u64, length: u64) -> Result<View<'_>> {
        self.accessor_mut()?.slice_mut(offset, length)
    }
}

impl VariableLength for BinaryFile {
    fn set_len(&mut self, length: u64) -> Result<()> {
        BinaryFile::set_len(self, length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::codec::{ReadExt, WriteExt};
    use std::io::{Cursor, Write as _};
    use tempfile::NamedTempFile;

    /// Create a test file with specific content
    fn create_test_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content)
            .expect("Failed to write test content");
        file.flush().expect("Failed to flush test file");
        file
    }

    fn open_with(path: &Path, config: BinaryFileConfig) -> BinaryFile {
        BinaryFile::open_with(path, Arc::new(PhysicalFileSystem::new()), config)
            .expect("Failed to open binary file")
    }

    fn mmap_only() -> BinaryFileConfig {
        BinaryFileConfig {
            max_in_memory_len: 0,
            memory_map: true,
        }
    }

    fn stream_only() -> BinaryFileConfig {
        BinaryFileConfig {
            max_in_memory_len: 0,
            memory_map: false,
        }
    }

    #[test]
    fn test_small_file_loads_into_memory() {
        let file = create_test_file(b"hello");
        let binary = BinaryFile::open(file.path()).unwrap();

        assert_eq!(binary.backend_kind(), Some(BackendKind::Array));
        assert_eq!(binary.len(), 5);
        assert_eq!(binary.path(), Some(file.path()));
        assert_eq!(binary.read_all().unwrap(), b"hello".to_vec());
    }

    #[test]
    fn test_threshold_selects_memory_map() {
        let file = create_test_file(b"mapped content");
        let binary = open_with(file.path(), mmap_only());

        assert_eq!(binary.backend_kind(), Some(BackendKind::MemoryMapped));
        assert_eq!(binary.read_array(0, 6).unwrap(), b"mapped".to_vec());
    }

    #[test]
    fn test_disabled_mapping_falls_back_to_stream() {
        let file = create_test_file(b"streamed");
        let binary = open_with(file.path(), stream_only());

        assert_eq!(binary.backend_kind(), Some(BackendKind::Stream));
        assert_eq!(binary.read_all().unwrap(), b"streamed".to_vec());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let result = BinaryFile::open(dir.path().join("missing.bin"));

        assert!(matches!(result, Err(BinaryError::FileNotFound { .. })));
    }

    #[test]
    fn test_slices_reference_the_backend() {
        let binary = BinaryFile::from_bytes((0u8..32).collect::<Vec<_>>());
        let outer = binary.slice(8, 16).unwrap();
        let inner = outer.slice(2, 4).unwrap();

        assert_eq!(inner.offset(), 10);
        assert_eq!(inner.read_all().unwrap(), vec![10, 11, 12, 13]);
    }

    #[test]
    fn test_write_through_file_and_view() {
        let mut binary = BinaryFile::from_bytes(vec![0; 8]);

        binary.write_u16_be(0, 0xABCD).unwrap();
        {
            let mut view = binary.slice_mut(4, 4).unwrap();
            view.write_byte(1, 7).unwrap();
        }
        assert_eq!(binary.read_all().unwrap(), vec![0xAB, 0xCD, 0, 0, 0, 7, 0, 0]);
    }

    #[test]
    fn test_cursor_belongs_to_file() {
        let mut binary = BinaryFile::from_bytes(vec![1, 0, 2, 0]);

        assert_eq!(binary.read_next_u16().unwrap(), 1);
        assert_eq!(binary.read_next_u16().unwrap(), 2);
        assert_eq!(binary.position(), 4);
    }

    #[test]
    fn test_detached_array_resizes_in_place() {
        let mut binary = BinaryFile::from_bytes(vec![1, 2]);

        binary.set_len(4).unwrap();
        assert_eq!(binary.read_all().unwrap(), vec![1, 2, 0, 0]);
    }

    #[test]
    fn test_detached_stream_resizes_natively() {
        let stream: Box<dyn SeekableStream> = Box::new(Cursor::new(vec![5; 3]));
        let mut binary = BinaryFile::from_stream(stream).unwrap();

        binary.set_len(5).unwrap();
        assert_eq!(binary.len(), 5);
        assert_eq!(binary.read_all().unwrap(), vec![5, 5, 5, 0, 0]);
    }

    #[test]
    fn test_detached_mapping_cannot_reopen() {
        let file = create_test_file(b"abcd");
        let handle = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(file.path())
            .unwrap();
        let map = unsafe { MmapMut::map_mut(&handle).unwrap() };
        let mut binary = BinaryFile::from_memory_map(map, 4).unwrap();

        assert!(matches!(
            binary.set_len(8),
            Err(BinaryError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_resize_memory_mapped_reopens() {
        let file = create_test_file(b"prefix");
        let mut binary = open_with(file.path(), mmap_only());
        assert_eq!(binary.backend_kind(), Some(BackendKind::MemoryMapped));

        binary.set_len(10).unwrap();
        assert_eq!(binary.len(), 10);
        assert_eq!(binary.backend_kind(), Some(BackendKind::MemoryMapped));
        assert_eq!(binary.read_array(0, 6).unwrap(), b"prefix".to_vec());
        assert_eq!(binary.read_array(6, 4).unwrap(), vec![0; 4]);

        binary.set_len(3).unwrap();
        assert_eq!(binary.read_all().unwrap(), b"pre".to_vec());
    }

    #[test]
    fn test_save_array_to_own_path() {
        let file = create_test_file(b"aaaa");
        let mut binary = BinaryFile::open(file.path()).unwrap();

        binary.write(0, b"bb").unwrap();
        assert_eq!(std::fs::read(file.path()).unwrap(), b"aaaa".to_vec());

        binary.save().unwrap();
        assert_eq!(std::fs::read(file.path()).unwrap(), b"bbaa".to_vec());
    }

    #[test]
    fn test_save_as_copies_each_backend() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let file = create_test_file(b"copy me");

        for (name, config) in [
            ("array.bin", BinaryFileConfig::default()),
            ("mapped.bin", mmap_only()),
            ("stream.bin", stream_only()),
        ] {
            let binary = open_with(file.path(), config);
            let destination = dir.path().join(name);

            binary.save_as(&destination).unwrap();
            assert_eq!(std::fs::read(&destination).unwrap(), b"copy me".to_vec());
        }
    }

    #[test]
    fn test_stream_save_to_own_path_flushes() {
        let file = create_test_file(b"0000");
        let mut binary = open_with(file.path(), stream_only());

        binary.write(1, b"xy").unwrap();
        binary.save().unwrap();
        assert_eq!(std::fs::read(file.path()).unwrap(), b"0xy0".to_vec());
    }

    #[test]
    fn test_save_without_path() {
        let binary = BinaryFile::from_bytes(vec![1]);

        assert!(matches!(binary.save(), Err(BinaryError::InvalidState { .. })));
        assert!(matches!(
            binary.save_as("elsewhere.bin"),
            Err(BinaryError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_save_to_explicit_file_system() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let fs = PhysicalFileSystem::with_working_directory(dir.path());
        let binary = BinaryFile::from_bytes(b"detached".to_vec());

        binary.save_to(&fs, Path::new("out.bin")).unwrap();
        assert_eq!(
            std::fs::read(dir.path().join("out.bin")).unwrap(),
            b"detached".to_vec()
        );
    }

    #[test]
    fn test_save_to_other_file_system_copies_same_relative_path() {
        let source_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let target_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        std::fs::write(source_dir.path().join("data.bin"), b"original").unwrap();

        for config in [mmap_only(), stream_only()] {
            let source_fs = Arc::new(PhysicalFileSystem::with_working_directory(source_dir.path()));
            let binary = BinaryFile::open_with("data.bin", source_fs, config).unwrap();
            let target_fs = PhysicalFileSystem::with_working_directory(target_dir.path());

            binary.save_to(&target_fs, Path::new("data.bin")).unwrap();
            assert_eq!(
                std::fs::read(target_dir.path().join("data.bin")).unwrap(),
                b"original".to_vec()
            );
            std::fs::remove_file(target_dir.path().join("data.bin")).unwrap();
        }
    }

    #[test]
    fn test_save_to_own_file_system_and_path_does_not_copy() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        std::fs::write(dir.path().join("data.bin"), b"0000").unwrap();
        let fs: Arc<dyn FileSystem> = Arc::new(PhysicalFileSystem::with_working_directory(dir.path()));
        let mut binary = BinaryFile::open_with("data.bin", Arc::clone(&fs), mmap_only()).unwrap();

        binary.write(0, b"ab").unwrap();
        binary.save_to(fs.as_ref(), Path::new("data.bin")).unwrap();
        drop(binary);
        assert_eq!(std::fs::read(dir.path().join("data.bin")).unwrap(), b"ab00".to_vec());
    }

    #[tokio::test]
    async fn test_async_entry_points() {
        let file = create_test_file(&[0; 4]);
        let mut binary = open_with(file.path(), stream_only());

        binary.write_async(0, &[9, 8]).await.unwrap();
        assert_eq!(binary.read_array_async(0, 4).await.unwrap(), vec![9, 8, 0, 0]);
    }
}
