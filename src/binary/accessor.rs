//! Core binary data access abstraction.
//!
//! This module defines the capability traits every backend and view implements.
//! The required surface is intentionally small (length, cursor, byte-range read,
//! byte-range write, slicing); typed reads and writes live in
//! [`codec`](crate::binary::codec) and are layered on top of these primitives.

use crate::binary::validation::{buffer_len, offset_add};
use crate::binary::view::{ReadView, View, WriteView};
use crate::error::{BinaryError, Result};
use async_trait::async_trait;
use std::borrow::Cow;

/// Length and sequential cursor shared by readable and writable accessors
///
/// The cursor is only consulted by the `*_next` operations. Mutating it needs
/// `&mut self`, so sequential access is never shared between threads.
pub trait Seekable: Send + Sync {
    /// Total number of addressable bytes
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current cursor used by sequential reads and writes
    fn position(&self) -> u64;

    fn set_position(&mut self, position: u64);
}

/// Random-access reads over a byte range
///
/// Implementations must reject ranges past [`Seekable::len`] instead of
/// zero-filling them. All implementations must be thread-safe for reads.
#[async_trait]
pub trait ReadAccessor: Seekable {
    /// Read `length` bytes starting at `index`
    ///
    /// # Returns
    /// * `Cow::Borrowed` when the medium can hand out its own buffer (array backends)
    /// * `Cow::Owned` copy otherwise (stream and memory-mapped backends)
    fn read_span(&self, index: u64, length: usize) -> Result<Cow<'_, [u8]>>;

    /// Create a bounded, zero-copy view over `offset..offset + length`
    ///
    /// Views over views are flattened so that a view always references the
    /// underlying backend directly.
    fn slice(&self, offset: u64, length: u64) -> Result<ReadView<'_>>;

    /// Read `length` bytes starting at `index` into an owned buffer
    fn read_array(&self, index: u64, length: usize) -> Result<Vec<u8>> {
        Ok(self.read_span(index, length)?.into_owned())
    }

    fn read_byte(&self, index: u64) -> Result<u8> {
        self.read_span(index, 1)?
            .first()
            .copied()
            .ok_or_else(|| BinaryError::out_of_bounds(index, 1, self.len()))
    }

    /// Read the whole accessor into a single buffer
    ///
    /// # Errors
    /// * `LengthTooLarge` if the accessor cannot be materialized in memory
    fn read_all(&self) -> Result<Vec<u8>> {
        let length = buffer_len(self.len())?;
        self.read_array(0, length)
    }

    /// Read the next `length` bytes at the cursor and advance it by the number
    /// of bytes actually returned
    fn read_next_array(&mut self, length: usize) -> Result<Vec<u8>> {
        let value = self.read_array(self.position(), length)?;
        let next = offset_add(self.position(), value.len() as u64)?;
        self.set_position(next);
        Ok(value)
    }

    fn read_next_byte(&mut self) -> Result<u8> {
        let value = self.read_byte(self.position())?;
        let next = offset_add(self.position(), 1)?;
        self.set_position(next);
        Ok(value)
    }

    /// Non-blocking counterpart of [`ReadAccessor::read_array`]
    ///
    /// Same ordering and atomicity as the blocking call; backends that need to
    /// wait for exclusive access override this to wait without blocking.
    async fn read_array_async(&self, index: u64, length: usize) -> Result<Vec<u8>> {
        self.read_array(index, length)
    }

    async fn read_byte_async(&self, index: u64) -> Result<u8> {
        let value = self.read_array_async(index, 1).await?;
        value
            .first()
            .copied()
            .ok_or_else(|| BinaryError::out_of_bounds(index, 1, self.len()))
    }

    async fn read_all_async(&self) -> Result<Vec<u8>> {
        let length = buffer_len(self.len())?;
        self.read_array_async(0, length).await
    }
}

/// Random-access writes over a byte range
#[async_trait]
pub trait WriteAccessor: Seekable {
    /// Write all of `value` starting at `index`
    fn write(&mut self, index: u64, value: &[u8]) -> Result<()>;

    /// Create a bounded, write-only view over `offset..offset + length`
    fn slice_write(&mut self, offset: u64, length: u64) -> Result<WriteView<'_>>;

    fn write_byte(&mut self, index: u64, value: u8) -> Result<()> {
        self.write(index, &[value])
    }

    /// Write `value` at the start of the accessor
    fn write_all(&mut self, value: &[u8]) -> Result<()> {
        self.write(0, value)
    }

    /// Write `value` at the cursor and advance it past the written bytes
    fn write_next(&mut self, value: &[u8]) -> Result<()> {
        let position = self.position();
        self.write(position, value)?;
        self.set_position(offset_add(position, value.len() as u64)?);
        Ok(())
    }

    /// Non-blocking counterpart of [`WriteAccessor::write`]
    async fn write_async(&mut self, index: u64, value: &[u8]) -> Result<()> {
        self.write(index, value)
    }
}

/// Object-safe conversions from a read-write accessor to its capability halves
pub trait AccessorUpcast {
    fn as_read(&self) -> &dyn ReadAccessor;

    fn as_write(&mut self) -> &mut dyn WriteAccessor;
}

impl<T: ReadAccessor + WriteAccessor> AccessorUpcast for T {
    fn as_read(&self) -> &dyn ReadAccessor {
        self
    }

    fn as_write(&mut self) -> &mut dyn WriteAccessor {
        self
    }
}

/// An accessor that can both read and write
pub trait Accessor: ReadAccessor + WriteAccessor + AccessorUpcast {
    /// Create a bounded, read-write view over `offset..offset + length`
    fn slice_mut(&mut self, offset: u64, length: u64) -> Result<View<'_>>;
}

/// Backends that can change their length in place
pub trait VariableLength {
    /// Resize the underlying storage
    ///
    /// # Errors
    /// * `Unsupported` or `LengthTooLarge` when this medium cannot hold the
    ///   requested length; [`BinaryFile`](crate::binary::BinaryFile) reacts by
    ///   reopening the file instead
    fn set_len(&mut self, length: u64) -> Result<()>;
}
