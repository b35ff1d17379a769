//! Zero-copy views over a sub-range of another accessor.
//!
//! A view records `(offset, length)` and a borrowed reference to the accessor
//! it reads from. Slicing a view never wraps the view itself: offsets are summed
//! and the new view points at the same underlying accessor, so chains of
//! slices stay exactly one hop away from the backend. Because the reference is
//! a borrow, the borrow checker ensures a view cannot outlive its backend.
//!
//! Read and write requests longer than the view are clamped to the view's
//! length rather than rejected. Bounds at the backend are still enforced.

use crate::binary::accessor::{Accessor, ReadAccessor, Seekable, WriteAccessor};
use crate::binary::validation::offset_add;
use crate::error::Result;
use async_trait::async_trait;
use std::borrow::Cow;
use std::fmt;

fn clamp(requested: usize, bound: u64) -> usize {
    usize::try_from(bound).map_or(requested, |bound| requested.min(bound))
}

/// Read-only view over another accessor
#[derive(Clone, Copy)]
pub struct ReadView<'a> {
    source: &'a dyn ReadAccessor,
    offset: u64,
    length: u64,
    position: u64,
}

impl<'a> ReadView<'a> {
    /// Create a view directly over `source`
    ///
    /// `offset + length` is not checked against the source length here; the
    /// source rejects out-of-range access when the view is used.
    pub fn new(source: &'a dyn ReadAccessor, offset: u64, length: u64) -> Result<Self> {
        offset_add(offset, length)?;
        Ok(Self {
            source,
            offset,
            length,
            position: 0,
        })
    }

    /// Offset of this view inside the underlying accessor
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Slice this view, keeping the reference to the underlying accessor
    pub fn subview(&self, offset: u64, length: u64) -> Result<ReadView<'a>> {
        ReadView::new(self.source, offset_add(self.offset, offset)?, length)
    }
}

impl fmt::Debug for ReadView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadView")
            .field("offset", &self.offset)
            .field("length", &self.length)
            .field("position", &self.position)
            .finish()
    }
}

impl Seekable for ReadView<'_> {
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
impl<'a> ReadAccessor for ReadView<'a> {
    fn read_span(&self, index: u64, length: usize) -> Result<Cow<'_, [u8]>> {
        self.source
            .read_span(offset_add(self.offset, index)?, clamp(length, self.length))
    }

    fn slice(&self, offset: u64, length: u64) -> Result<ReadView<'_>> {
        self.subview(offset, length)
    }

    fn read_byte(&self, index: u64) -> Result<u8> {
        self.source.read_byte(offset_add(self.offset, index)?)
    }

    async fn read_array_async(&self, index: u64, length: usize) -> Result<Vec<u8>> {
        self.source
            .read_array_async(offset_add(self.offset, index)?, clamp(length, self.length))
            .await
    }
}

/// Write-only view over another accessor
///
/// Slicing a write-only accessor can only produce another write-only view, so
/// no read capability is gained through composition.
pub struct WriteView<'a> {
    source: &'a mut dyn WriteAccessor,
    offset: u64,
    length: u64,
    position: u64,
}

impl<'a> WriteView<'a> {
    pub fn new(source: &'a mut dyn WriteAccessor, offset: u64, length: u64) -> Result<Self> {
        offset_add(offset, length)?;
        Ok(Self {
            source,
            offset,
            length,
            position: 0,
        })
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl fmt::Debug for WriteView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteView")
            .field("offset", &self.offset)
            .field("length", &self.length)
            .field("position", &self.position)
            .finish()
    }
}

impl Seekable for WriteView<'_> {
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
impl<'a> WriteAccessor for WriteView<'a> {
    fn write(&mut self, index: u64, value: &[u8]) -> Result<()> {
        let take = clamp(value.len(), self.length);
        let target = offset_add(self.offset, index)?;
        self.source.write(target, &value[..take])
    }

    fn slice_write(&mut self, offset: u64, length: u64) -> Result<WriteView<'_>> {
        WriteView::new(&mut *self.source, offset_add(self.offset, offset)?, length)
    }

    async fn write_async(&mut self, index: u64, value: &[u8]) -> Result<()> {
        let take = clamp(value.len(), self.length);
        let target = offset_add(self.offset, index)?;
        self.source.write_async(target, &value[..take]).await
    }
}

/// Read-write view over another accessor
pub struct View<'a> {
    source: &'a mut dyn Accessor,
    offset: u64,
    length: u64,
    position: u64,
}

impl<'a> View<'a> {
    pub fn new(source: &'a mut dyn Accessor, offset: u64, length: u64) -> Result<Self> {
        offset_add(offset, length)?;
        Ok(Self {
            source,
            offset,
            length,
            position: 0,
        })
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl fmt::Debug for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("offset", &self.offset)
            .field("length", &self.length)
            .field("position", &self.position)
            .finish()
    }
}

impl Seekable for View<'_> {
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
impl<'a> ReadAccessor for View<'a> {
    fn read_span(&self, index: u64, length: usize) -> Result<Cow<'_, [u8]>> {
        self.source
            .read_span(offset_add(self.offset, index)?, clamp(length, self.length))
    }

    fn slice(&self, offset: u64, length: u64) -> Result<ReadView<'_>> {
        ReadView::new(
            self.source.as_read(),
            offset_add(self.offset, offset)?,
            length,
        )
    }

    fn read_byte(&self, index: u64) -> Result<u8> {
        self.source.read_byte(offset_add(self.offset, index)?)
    }

    async fn read_array_async(&self, index: u64, length: usize) -> Result<Vec<u8>> {
        self.source
            .read_array_async(offset_add(self.offset, index)?, clamp(length, self.length))
            .await
    }
}

#[async_trait]
impl<'a> WriteAccessor for View<'a> {
    fn write(&mut self, index: u64, value: &[u8]) -> Result<()> {
        let take = clamp(value.len(), self.length);
        let target = offset_add(self.offset, index)?;
        self.source.write(target, &value[..take])
    }

    fn slice_write(&mut self, offset: u64, length: u64) -> Result<WriteView<'_>> {
        let offset = offset_add(self.offset, offset)?;
        WriteView::new(self.source.as_write(), offset, length)
    }

    async fn write_async(&mut self, index: u64, value: &[u8]) -> Result<()> {
        let take = clamp(value.len(), self.length);
        let target = offset_add(self.offset, index)?;
        self.source.write_async(target, &value[..take]).await
    }
}

impl Accessor for View<'_> {
    fn slice_mut(&mut self, offset: u64, length: u64) -> Result<View<'_>> {
        View::new(&mut *self.source, offset_add(self.offset, offset)?, length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::array::ArrayBackend;

    fn numbered(len: u8) -> ArrayBackend {
        ArrayBackend::new((0..len).collect())
    }

    #[test]
    fn test_read_view_translates_offsets() {
        let backend = numbered(16);
        let view = backend.slice(4, 8).unwrap();

        assert_eq!(view.len(), 8);
        assert_eq!(view.read_array(0, 3).unwrap(), vec![4, 5, 6]);
        assert_eq!(view.read_byte(7).unwrap(), 11);
        assert_eq!(view.read_all().unwrap(), (4..12).collect::<Vec<u8>>());
    }

    #[test]
    fn test_reads_are_clamped_to_view_length() {
        let backend = numbered(16);
        let view = backend.slice(0, 4).unwrap();

        assert_eq!(view.read_array(0, 10).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_nested_views_flatten_offsets() {
        let backend = numbered(32);
        let outer = backend.slice(8, 16).unwrap();
        let inner = outer.slice(4, 4).unwrap();

        assert_eq!(inner.offset(), 12);
        assert_eq!(inner.read_all().unwrap(), vec![12, 13, 14, 15]);

        let direct = backend.slice(12, 4).unwrap();
        assert_eq!(inner.read_all().unwrap(), direct.read_all().unwrap());
    }

    #[test]
    fn test_view_past_backend_fails_on_use() {
        let backend = numbered(8);
        let view = backend.slice(6, 10).unwrap();

        assert!(view.read_array(0, 4).is_err());
        assert_eq!(view.read_array(0, 2).unwrap(), vec![6, 7]);
    }

    #[test]
    fn test_read_write_view_writes_through() {
        let mut backend = ArrayBackend::new(vec![0; 8]);
        {
            let mut view = backend.slice_mut(2, 4).unwrap();
            view.write(0, &[1, 2, 3, 4, 5, 6]).unwrap();

            let mut nested = view.slice_mut(1, 2).unwrap();
            assert_eq!(nested.offset(), 3);
            nested.write_byte(0, 9).unwrap();
        }
        assert_eq!(backend.as_bytes(), &[0, 0, 1, 9, 3, 4, 0, 0]);
    }

    #[test]
    fn test_write_view_is_write_only_and_flattens() {
        let mut backend = ArrayBackend::new(vec![0; 8]);
        {
            let mut view = backend.slice_write(1, 6).unwrap();
            let mut nested = view.slice_write(2, 2).unwrap();
            assert_eq!(nested.offset(), 3);
            nested.write(0, &[7, 7, 7]).unwrap();
        }
        assert_eq!(backend.as_bytes(), &[0, 0, 0, 7, 7, 0, 0, 0]);
    }

    #[test]
    fn test_view_cursor_is_independent() {
        let backend = numbered(8);
        let mut view = backend.slice(2, 4).unwrap();

        assert_eq!(view.read_next_byte().unwrap(), 2);
        assert_eq!(view.read_next_array(2).unwrap(), vec![3, 4]);
        assert_eq!(view.position(), 3);
        assert_eq!(backend.position(), 0);
    }

    #[tokio::test]
    async fn test_async_reads_go_through_view() {
        let backend = numbered(8);
        let view = backend.slice(3, 2).unwrap();

        assert_eq!(view.read_array_async(0, 8).await.unwrap(), vec![3, 4]);
        assert_eq!(view.read_byte_async(1).await.unwrap(), 4);
    }
}
