//! `std::fs` implementation of the file-system collaborator.

use crate::error::{BinaryError, Result};
use crate::fs::{FileSystem, MemoryMappable, SeekableStream};
use memmap2::MmapMut;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// The local file system
///
/// Relative paths are resolved against a working directory captured at
/// construction time.
#[derive(Debug, Clone)]
pub struct PhysicalFileSystem {
    working_directory: PathBuf,
}

impl PhysicalFileSystem {
    /// Use the process's current directory for relative paths
    pub fn new() -> Self {
        let working_directory = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { working_directory }
    }

    pub fn with_working_directory(working_directory: impl Into<PathBuf>) -> Self {
        Self {
            working_directory: working_directory.into(),
        }
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_directory.join(path)
        }
    }
}

impl Default for PhysicalFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Attach the path to NotFound errors, keep the io::Error for everything else
fn io_error(path: &Path, action: &str, err: io::Error) -> BinaryError {
    if err.kind() == io::ErrorKind::NotFound {
        BinaryError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        BinaryError::file_error(format!("Failed to {action}: {}", path.display()), err)
    }
}

impl FileSystem for PhysicalFileSystem {
    fn file_exists(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }

    fn file_len(&self, path: &Path) -> Result<u64> {
        let path = self.resolve(path);
        std::fs::metadata(&path)
            .map(|metadata| metadata.len())
            .map_err(|e| io_error(&path, "read file metadata", e))
    }

    fn read_all_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        let path = self.resolve(path);
        let mut file = File::open(&path).map_err(|e| io_error(&path, "open file", e))?;
        let length = file
            .metadata()
            .map_err(|e| io_error(&path, "read file metadata", e))?
            .len();

        // Reserve up front so an oversized file reports OutOfMemory instead of aborting
        let capacity = usize::try_from(length)
            .map_err(|_| io_error(&path, "load file", io::ErrorKind::OutOfMemory.into()))?;
        let mut content = Vec::new();
        content
            .try_reserve_exact(capacity)
            .map_err(|_| io_error(&path, "load file", io::ErrorKind::OutOfMemory.into()))?;

        file.read_to_end(&mut content)
            .map_err(|e| io_error(&path, "read file", e))?;
        Ok(content)
    }

    fn write_all_bytes(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = self.resolve(path);
        std::fs::write(&path, data).map_err(|e| io_error(&path, "write file", e))
    }

    fn open_read_write(&self, path: &Path) -> Result<Box<dyn SeekableStream>> {
        let path = self.resolve(path);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| io_error(&path, "open file for read/write", e))?;
        Ok(Box::new(file))
    }

    fn open_write_only(&self, path: &Path) -> Result<Box<dyn Write + Send>> {
        let path = self.resolve(path);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| io_error(&path, "open file for writing", e))?;
        Ok(Box::new(io::BufWriter::new(file)))
    }

    fn as_memory_mappable(&self) -> Option<&dyn MemoryMappable> {
        Some(self)
    }
}

impl MemoryMappable for PhysicalFileSystem {
    fn open_memory_map(&self, path: &Path) -> Result<MmapMut> {
        let path = self.resolve(path);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| io_error(&path, "open file for mapping", e))?;

        // The mapping stays valid after `file` is dropped
        unsafe {
            MmapMut::map_mut(&file).map_err(|e| {
                BinaryError::memory_mapping(format!("{}: {e}", path.display()))
            })
        }
    }
}
