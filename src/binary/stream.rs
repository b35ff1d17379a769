//! Stream-backed accessor for data that is only reachable through a seekable handle
//!
//! Every operation is a seek followed by a read or write on one shared handle.
//! That pair is not atomic on its own, so all operations pass through a single
//! gate that admits one operation at a time. The critical section never awaits,
//! so blocking and async callers take the same synchronous lock.

use crate::binary::accessor::{Accessor, ReadAccessor, Seekable, VariableLength, WriteAccessor};
use crate::binary::validation::checked_range;
use crate::binary::view::{ReadView, View, WriteView};
use crate::error::{BinaryError, Result};
use crate::fs::SeekableStream;
use async_trait::async_trait;
use parking_lot::{Mutex, MutexGuard};
use std::borrow::Cow;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Backend over a seekable stream handle
///
/// Reads always copy. Writes are confined to the current length; use
/// [`VariableLength::set_len`] to grow the stream first.
pub struct StreamBackend<S = Box<dyn SeekableStream>> {
    /// Stream handle guarded by a one-permit gate
    stream: Mutex<S>,

    /// Length known to this backend (cached from the stream)
    length: u64,

    /// Cursor for sequential operations
    position: u64,
}

impl<S: SeekableStream> StreamBackend<S> {
    /// Create a new stream backend
    ///
    /// # Errors
    /// * `FileError` if the stream length cannot be determined
    pub fn new(mut stream: S) -> Result<Self> {
        let length = stream
            .seek(SeekFrom::End(0))
            .map_err(|e| BinaryError::file_error("Failed to determine stream length", e))?;

        Ok(Self {
            stream: Mutex::new(stream),
            length,
            position: 0,
        })
    }

    /// Wait for exclusive use of the stream
    fn lock(&self) -> MutexGuard<'_, S> {
        self.stream.lock()
    }

    /// Read `length` bytes at `index`, waiting for exclusive use of the stream
    pub fn read_at(&self, index: u64, length: usize) -> Result<Vec<u8>> {
        checked_range(index, length, self.length)?;
        let mut stream = self.lock();
        read_locked(&mut *stream, index, length)
    }

    /// Write `value` at `index`, waiting for exclusive use of the stream
    ///
    /// Takes `&self` so one backend can be shared by several writers.
    pub fn write_at(&self, index: u64, value: &[u8]) -> Result<()> {
        checked_range(index, value.len(), self.length)?;
        let mut stream = self.lock();
        write_locked(&mut *stream, index, value)
    }

    /// Async form of [`StreamBackend::read_at`]
    ///
    /// The guard is never held across an await point.
    pub async fn read_at_async(&self, index: u64, length: usize) -> Result<Vec<u8>> {
        checked_range(index, length, self.length)?;
        let mut stream = self.lock();
        read_locked(&mut *stream, index, length)
    }

    /// Async form of [`StreamBackend::write_at`]
    pub async fn write_at_async(&self, index: u64, value: &[u8]) -> Result<()> {
        checked_range(index, value.len(), self.length)?;
        let mut stream = self.lock();
        write_locked(&mut *stream, index, value)
    }

    /// Flush buffered writes to the underlying medium
    pub fn flush(&self) -> Result<()> {
        self.lock()
            .flush()
            .map_err(|e| BinaryError::file_error("Failed to flush stream", e))
    }

    /// Copy the whole stream into `destination`
    ///
    /// # Returns
    /// * Number of bytes copied
    pub fn copy_to(&self, destination: &mut dyn Write) -> Result<u64> {
        let mut stream = self.lock();
        stream
            .seek(SeekFrom::Start(0))
            .map_err(|e| BinaryError::file_error("Failed to rewind stream", e))?;

        let copied = io::copy(&mut (&mut *stream).take(self.length), &mut *destination)
            .map_err(|e| BinaryError::file_error("Failed to copy stream contents", e))?;
        destination
            .flush()
            .map_err(|e| BinaryError::file_error("Failed to flush destination", e))?;
        Ok(copied)
    }

    /// Give the stream back to the caller
    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }
}

fn read_locked<S: Read + Seek + ?Sized>(stream: &mut S, index: u64, length: usize) -> Result<Vec<u8>> {
    stream
        .seek(SeekFrom::Start(index))
        .map_err(|e| BinaryError::file_error(format!("Failed to seek to {index}"), e))?;

    let mut buffer = vec![0u8; length];
    stream.read_exact(&mut buffer).map_err(|e| {
        BinaryError::file_error(format!("Failed to read {length} bytes at {index}"), e)
    })?;
    Ok(buffer)
}

fn write_locked<S: Write + Seek + ?Sized>(stream: &mut S, index: u64, value: &[u8]) -> Result<()> {
    stream
        .seek(SeekFrom::Start(index))
        .map_err(|e| BinaryError::file_error(format!("Failed to seek to {index}"), e))?;

    stream.write_all(value).map_err(|e| {
        BinaryError::file_error(format!("Failed to write {} bytes at {index}", value.len()), e)
    })
}

impl<S> fmt::Debug for StreamBackend<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamBackend")
            .field("length", &self.length)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl<S: SeekableStream> Seekable for StreamBackend<S> {
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
impl<S: SeekableStream> ReadAccessor for StreamBackend<S> {
    fn read_span(&self, index: u64, length: usize) -> Result<Cow<'_, [u8]>> {
        self.read_at(index, length).map(Cow::Owned)
    }

    fn slice(&self, offset: u64, length: u64) -> Result<ReadView<'_>> {
        ReadView::new(self, offset, length)
    }

    fn read_array(&self, index: u64, length: usize) -> Result<Vec<u8>> {
        self.read_at(index, length)
    }

    async fn read_array_async(&self, index: u64, length: usize) -> Result<Vec<u8>> {
        self.read_at_async(index, length).await
    }
}

#[async_trait]
impl<S: SeekableStream> WriteAccessor for StreamBackend<S> {
    fn write(&mut self, index: u64, value: &[u8]) -> Result<()> {
        self.write_at(index, value)
    }

    fn slice_write(&mut self, offset: u64, length: u64) -> Result<WriteView<'_>> {
        WriteView::new(self, offset, length)
    }

    async fn write_async(&mut self, index: u64, value: &[u8]) -> Result<()> {
        self.write_at_async(index, value).await
    }
}

impl<S: SeekableStream> Accessor for StreamBackend<S> {
    fn slice_mut(&mut self, offset: u64, length: u64) -> Result<View<'_>> {
        View::new(self, offset, length)
    }
}

impl<S: SeekableStream> VariableLength for StreamBackend<S> {
    /// Truncate or extend the stream natively
    ///
    /// # Errors
    /// * `Unsupported` when the stream has no native resize
    fn set_len(&mut self, length: u64) -> Result<()> {
        self.stream.get_mut().set_len(length)?;
        self.length = length;
        Ok(())
    }
}
