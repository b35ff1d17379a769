//! In-memory backend for data that fits in a single buffer
//!
//! This module provides the ArrayBackend implementation that owns one contiguous
//! `Vec<u8>` and serves reads as borrowed slices of it.

use crate::binary::accessor::{Accessor, ReadAccessor, Seekable, VariableLength, WriteAccessor};
use crate::binary::validation::{buffer_len, checked_range};
use crate::binary::view::{ReadView, View, WriteView};
use crate::error::{BinaryError, Result};
use async_trait::async_trait;
use std::borrow::Cow;

/// In-memory backend over an owned byte buffer
///
/// Reads are O(1) borrows of the buffer; copies are O(length). The buffer can
/// grow or shrink through [`VariableLength::set_len`] up to the platform's
/// addressable limit. No internal synchronization: concurrent writers must be
/// coordinated by the caller, which `&mut self` on writes enforces.
#[derive(Debug, Default, Clone)]
pub struct ArrayBackend {
    /// Backing storage (source of truth)
    data: Vec<u8>,

    /// Cursor for sequential operations
    position: u64,
}

impl ArrayBackend {
    /// Create a new array backend that takes ownership of `data`
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, position: 0 }
    }

    /// Borrow the whole buffer
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Give the buffer back to the caller
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for ArrayBackend {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl Seekable for ArrayBackend {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn set_position(&mut self, position: u64) {
        self.position = position;
    }
}

#[async_trait]
impl ReadAccessor for ArrayBackend {
    fn read_span(&self, index: u64, length: usize) -> Result<Cow<'_, [u8]>> {
        let range = checked_range(index, length, self.len())?;
        Ok(Cow::Borrowed(&self.data[range]))
    }

    fn slice(&self, offset: u64, length: u64) -> Result<ReadView<'_>> {
        ReadView::new(self, offset, length)
    }

    fn read_all(&self) -> Result<Vec<u8>> {
        Ok(self.data.clone())
    }
}

#[async_trait]
impl WriteAccessor for ArrayBackend {
    fn write(&mut self, index: u64, value: &[u8]) -> Result<()> {
        let range = checked_range(index, value.len(), self.len())?;
        self.data[range].copy_from_slice(value);
        Ok(())
    }

    fn slice_write(&mut self, offset: u64, length: u64) -> Result<WriteView<'_>> {
        WriteView::new(self, offset, length)
    }
}

impl Accessor for ArrayBackend {
    fn slice_mut(&mut self, offset: u64, length: u64) -> Result<View<'_>> {
        View::new(self, offset, length)
    }
}

impl VariableLength for ArrayBackend {
    /// Reallocate the buffer, zero-filling any new tail
    ///
    /// # Errors
    /// * `LengthTooLarge` past the addressable limit or when the allocation fails
    fn set_len(&mut self, length: u64) -> Result<()> {
        let new_len = buffer_len(length)?;
        if new_len > self.data.len() {
            self.data
                .try_reserve_exact(new_len - self.data.len())
                .map_err(|_| BinaryError::LengthTooLarge { length })?;
        }
        self.data.resize(new_len, 0);
        Ok(())
    }
}
