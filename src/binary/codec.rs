//! Endian-aware scalar and string codec.
//!
//! Everything here is built on the byte-range primitives of
//! [`ReadAccessor`] and [`WriteAccessor`]; nothing reaches into a backend.
//! The extension traits are blanket-implemented, so the helpers are available
//! on every backend, view, [`BinaryFile`](crate::binary::BinaryFile) and
//! `dyn` accessor alike.
//!
//! Integers are little-endian unless the `_be` variant is called. The
//! `read_next_*` and `write_next_*` helpers consume from the accessor's cursor
//! and advance it by exactly the number of bytes transferred; they take
//! `&mut self` and are therefore never shared across threads.

use crate::binary::accessor::{ReadAccessor, WriteAccessor};
use crate::binary::encoding::{TextEncoding, Utf16Le};
use crate::binary::validation::offset_add;
use crate::error::{BinaryError, Result};
use async_trait::async_trait;

/// Byte order of a multi-byte scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

mod sealed {
    pub trait Sealed {}
}

/// Fixed-width numeric values the codec can read and write
pub trait Scalar: sealed::Sealed + Copy + Send + Sync + 'static {
    /// Width in bytes
    const SIZE: usize;

    type Bytes: AsRef<[u8]> + Send;

    /// Decode from exactly [`Scalar::SIZE`] bytes, `None` for any other width
    fn decode(bytes: &[u8], order: ByteOrder) -> Option<Self>;

    fn encode(self, order: ByteOrder) -> Self::Bytes;
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl sealed::Sealed for $ty {}

        impl Scalar for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();

            type Bytes = [u8; std::mem::size_of::<$ty>()];

            fn decode(bytes: &[u8], order: ByteOrder) -> Option<Self> {
                let bytes: Self::Bytes = bytes.try_into().ok()?;
                Some(match order {
                    ByteOrder::Little => <$ty>::from_le_bytes(bytes),
                    ByteOrder::Big => <$ty>::from_be_bytes(bytes),
                })
            }

            fn encode(self, order: ByteOrder) -> Self::Bytes {
                match order {
                    ByteOrder::Little => self.to_le_bytes(),
                    ByteOrder::Big => self.to_be_bytes(),
                }
            }
        }
    )*};
}

impl_scalar!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

/// Bytes requested from the backend per step of a null-terminator scan
const SCAN_CHUNK: usize = 256;

/// Position and limits of a null-terminator scan in progress
struct TerminatorScan {
    start: u64,
    cursor: u64,
    unit: usize,
    chunk: usize,
    text: Vec<u8>,
}

impl TerminatorScan {
    /// # Errors
    /// * `InvalidArgument` for a zero-width terminator
    /// * `OutOfBounds` if `index` lies past the end of the accessor
    fn new(index: u64, unit: usize, available: u64) -> Result<Self> {
        if unit == 0 {
            return Err(BinaryError::invalid_argument("null terminator width is zero"));
        }
        if index > available {
            return Err(BinaryError::out_of_bounds(index, unit as u64, available));
        }

        Ok(Self {
            start: index,
            cursor: index,
            unit,
            chunk: (SCAN_CHUNK / unit).max(1) * unit,
            text: Vec::new(),
        })
    }

    /// Bytes to request next: whole code units only, at most one chunk
    fn next_len(&self, available: u64) -> Result<usize> {
        let remaining = available.saturating_sub(self.cursor);
        let whole_units = (remaining / self.unit as u64).min((self.chunk / self.unit) as u64) as usize;
        if whole_units == 0 {
            return Err(BinaryError::encoding(format!(
                "no null terminator found after offset {}",
                self.start
            )));
        }
        Ok(whole_units * self.unit)
    }

    /// Consume `span`; returns the text once a terminator has been seen
    fn feed(&mut self, span: &[u8]) -> Result<Option<Vec<u8>>> {
        let terminator = if self.unit == 1 {
            memchr::memchr(0, span)
        } else {
            span.chunks_exact(self.unit)
                .position(|code_unit| code_unit.iter().all(|b| *b == 0))
                .map(|position| position * self.unit)
        };

        match terminator {
            Some(end) => {
                self.text.extend_from_slice(&span[..end]);
                Ok(Some(std::mem::take(&mut self.text)))
            }
            None => {
                self.text.extend_from_slice(span);
                self.cursor = offset_add(self.cursor, span.len() as u64)?;
                Ok(None)
            }
        }
    }
}

/// Collect the bytes from `index` up to (not including) the first zero code
/// unit of width `unit`
///
/// Only whole code units aligned to `index` are considered.
fn scan_null_terminated<R>(accessor: &R, index: u64, unit: usize) -> Result<Vec<u8>>
where
    R: ReadAccessor + ?Sized,
{
    let mut scan = TerminatorScan::new(index, unit, accessor.len())?;
    loop {
        let length = scan.next_len(accessor.len())?;
        let span = accessor.read_span(scan.cursor, length)?;
        if let Some(text) = scan.feed(&span)? {
            return Ok(text);
        }
    }
}

/// [`scan_null_terminated`] over the async read path
async fn scan_null_terminated_async<R>(accessor: &R, index: u64, unit: usize) -> Result<Vec<u8>>
where
    R: ReadAccessor + ?Sized,
{
    let mut scan = TerminatorScan::new(index, unit, accessor.len())?;
    loop {
        let length = scan.next_len(accessor.len())?;
        let span = accessor.read_array_async(scan.cursor, length).await?;
        if let Some(text) = scan.feed(&span)? {
            return Ok(text);
        }
    }
}

macro_rules! scalar_reads {
    ($($ty:ty => $read:ident, $read_be:ident, $next:ident, $next_be:ident;)*) => {$(
        fn $read(&self, index: u64) -> Result<$ty> {
            self.read_scalar(index, ByteOrder::Little)
        }

        fn $read_be(&self, index: u64) -> Result<$ty> {
            self.read_scalar(index, ByteOrder::Big)
        }

        fn $next(&mut self) -> Result<$ty> {
            self.read_next_scalar(ByteOrder::Little)
        }

        fn $next_be(&mut self) -> Result<$ty> {
            self.read_next_scalar(ByteOrder::Big)
        }
    )*};
}

/// Typed reads for any [`ReadAccessor`]
#[async_trait]
pub trait ReadExt: ReadAccessor {
    /// Read one scalar at `index`
    ///
    /// # Errors
    /// * `OutOfBounds` if fewer than `T::SIZE` bytes are available, including
    ///   when a view clamps the request
    fn read_scalar<T: Scalar>(&self, index: u64, order: ByteOrder) -> Result<T> {
        let bytes = self.read_span(index, T::SIZE)?;
        T::decode(&bytes, order)
            .ok_or_else(|| BinaryError::out_of_bounds(index, T::SIZE as u64, self.len()))
    }

    fn read_next_scalar<T: Scalar>(&mut self, order: ByteOrder) -> Result<T> {
        let position = self.position();
        let value = self.read_scalar(position, order)?;
        self.set_position(offset_add(position, T::SIZE as u64)?);
        Ok(value)
    }

    async fn read_scalar_async<T: Scalar>(&self, index: u64, order: ByteOrder) -> Result<T> {
        let bytes = self.read_array_async(index, T::SIZE).await?;
        T::decode(&bytes, order)
            .ok_or_else(|| BinaryError::out_of_bounds(index, T::SIZE as u64, self.len()))
    }

    fn read_i8(&self, index: u64) -> Result<i8> {
        self.read_scalar(index, ByteOrder::Little)
    }

    fn read_next_i8(&mut self) -> Result<i8> {
        self.read_next_scalar(ByteOrder::Little)
    }

    scalar_reads! {
        i16 => read_i16, read_i16_be, read_next_i16, read_next_i16_be;
        u16 => read_u16, read_u16_be, read_next_u16, read_next_u16_be;
        i32 => read_i32, read_i32_be, read_next_i32, read_next_i32_be;
        u32 => read_u32, read_u32_be, read_next_u32, read_next_u32_be;
        i64 => read_i64, read_i64_be, read_next_i64, read_next_i64_be;
        u64 => read_u64, read_u64_be, read_next_u64, read_next_u64_be;
        f32 => read_f32, read_f32_be, read_next_f32, read_next_f32_be;
        f64 => read_f64, read_f64_be, read_next_f64, read_next_f64_be;
    }

    /// Decode `length` bytes at `index` as text
    fn read_string(&self, index: u64, length: usize, encoding: &dyn TextEncoding) -> Result<String> {
        let bytes = self.read_span(index, length)?;
        Ok(encoding.decode(&bytes))
    }

    /// Decode `char_count` UTF-16LE code units at `index`
    fn read_utf16_string(&self, index: u64, char_count: usize) -> Result<String> {
        let length = char_count.checked_mul(2).ok_or_else(|| {
            BinaryError::invalid_argument(format!("{char_count} UTF-16 code units overflow"))
        })?;
        self.read_string(index, length, &Utf16Le)
    }

    /// Decode text at `index` up to the encoding's null terminator
    ///
    /// # Errors
    /// * `EncodingError` when the accessor ends before a terminator is found
    fn read_null_terminated_string(&self, index: u64, encoding: &dyn TextEncoding) -> Result<String> {
        let bytes = scan_null_terminated(self, index, encoding.null_len())?;
        Ok(encoding.decode(&bytes))
    }

    fn read_null_terminated_utf16_string(&self, index: u64) -> Result<String> {
        self.read_null_terminated_string(index, &Utf16Le)
    }

    async fn read_string_async(
        &self,
        index: u64,
        length: usize,
        encoding: &dyn TextEncoding,
    ) -> Result<String> {
        let bytes = self.read_array_async(index, length).await?;
        Ok(encoding.decode(&bytes))
    }

    async fn read_utf16_string_async(&self, index: u64, char_count: usize) -> Result<String> {
        let length = char_count.checked_mul(2).ok_or_else(|| {
            BinaryError::invalid_argument(format!("{char_count} UTF-16 code units overflow"))
        })?;
        self.read_string_async(index, length, &Utf16Le).await
    }

    /// Async form of [`ReadExt::read_null_terminated_string`]; every chunk of
    /// the scan goes through [`ReadAccessor::read_array_async`]
    async fn read_null_terminated_string_async(
        &self,
        index: u64,
        encoding: &dyn TextEncoding,
    ) -> Result<String> {
        let bytes = scan_null_terminated_async(self, index, encoding.null_len()).await?;
        Ok(encoding.decode(&bytes))
    }

    async fn read_null_terminated_utf16_string_async(&self, index: u64) -> Result<String> {
        self.read_null_terminated_string_async(index, &Utf16Le).await
    }

    fn read_next_string(&mut self, length: usize, encoding: &dyn TextEncoding) -> Result<String> {
        let position = self.position();
        let bytes = self.read_array(position, length)?;
        self.set_position(offset_add(position, bytes.len() as u64)?);
        Ok(encoding.decode(&bytes))
    }

    /// Sequential null-terminated read; the cursor ends up past the terminator
    fn read_next_null_terminated_string(&mut self, encoding: &dyn TextEncoding) -> Result<String> {
        let position = self.position();
        let unit = encoding.null_len();
        let bytes = scan_null_terminated(self, position, unit)?;
        let consumed = offset_add(bytes.len() as u64, unit as u64)?;
        self.set_position(offset_add(position, consumed)?);
        Ok(encoding.decode(&bytes))
    }

    fn read_next_null_terminated_utf16_string(&mut self) -> Result<String> {
        self.read_next_null_terminated_string(&Utf16Le)
    }
}

impl<R: ReadAccessor + ?Sized> ReadExt for R {}

macro_rules! scalar_writes {
    ($($ty:ty => $write:ident, $write_be:ident, $next:ident, $next_be:ident;)*) => {$(
        fn $write(&mut self, index: u64, value: $ty) -> Result<()> {
            self.write_scalar(index, value, ByteOrder::Little)
        }

        fn $write_be(&mut self, index: u64, value: $ty) -> Result<()> {
            self.write_scalar(index, value, ByteOrder::Big)
        }

        fn $next(&mut self, value: $ty) -> Result<()> {
            self.write_next_scalar(value, ByteOrder::Little)
        }

        fn $next_be(&mut self, value: $ty) -> Result<()> {
            self.write_next_scalar(value, ByteOrder::Big)
        }
    )*};
}

/// Typed writes for any [`WriteAccessor`]
#[async_trait]
pub trait WriteExt: WriteAccessor {
    fn write_scalar<T: Scalar>(&mut self, index: u64, value: T, order: ByteOrder) -> Result<()> {
        self.write(index, value.encode(order).as_ref())
    }

    fn write_next_scalar<T: Scalar>(&mut self, value: T, order: ByteOrder) -> Result<()> {
        self.write_next(value.encode(order).as_ref())
    }

    async fn write_scalar_async<T: Scalar>(
        &mut self,
        index: u64,
        value: T,
        order: ByteOrder,
    ) -> Result<()> {
        let bytes = value.encode(order);
        self.write_async(index, bytes.as_ref()).await
    }

    fn write_i8(&mut self, index: u64, value: i8) -> Result<()> {
        self.write_scalar(index, value, ByteOrder::Little)
    }

    fn write_next_i8(&mut self, value: i8) -> Result<()> {
        self.write_next_scalar(value, ByteOrder::Little)
    }

    scalar_writes! {
        i16 => write_i16, write_i16_be, write_next_i16, write_next_i16_be;
        u16 => write_u16, write_u16_be, write_next_u16, write_next_u16_be;
        i32 => write_i32, write_i32_be, write_next_i32, write_next_i32_be;
        u32 => write_u32, write_u32_be, write_next_u32, write_next_u32_be;
        i64 => write_i64, write_i64_be, write_next_i64, write_next_i64_be;
        u64 => write_u64, write_u64_be, write_next_u64, write_next_u64_be;
        f32 => write_f32, write_f32_be, write_next_f32, write_next_f32_be;
        f64 => write_f64, write_f64_be, write_next_f64, write_next_f64_be;
    }

    /// Encode `text` at `index` without a terminator
    fn write_string(&mut self, index: u64, text: &str, encoding: &dyn TextEncoding) -> Result<()> {
        self.write(index, &encoding.encode(text))
    }

    /// Encode `text` at `index` followed by the encoding's null code unit
    fn write_null_terminated_string(
        &mut self,
        index: u64,
        text: &str,
        encoding: &dyn TextEncoding,
    ) -> Result<()> {
        let mut bytes = encoding.encode(text);
        bytes.resize(bytes.len() + encoding.null_len(), 0);
        self.write(index, &bytes)
    }

    fn write_utf16_string(&mut self, index: u64, text: &str) -> Result<()> {
        self.write_string(index, text, &Utf16Le)
    }

    async fn write_string_async(
        &mut self,
        index: u64,
        text: &str,
        encoding: &dyn TextEncoding,
    ) -> Result<()> {
        let bytes = encoding.encode(text);
        self.write_async(index, &bytes).await
    }

    async fn write_null_terminated_string_async(
        &mut self,
        index: u64,
        text: &str,
        encoding: &dyn TextEncoding,
    ) -> Result<()> {
        let mut bytes = encoding.encode(text);
        bytes.resize(bytes.len() + encoding.null_len(), 0);
        self.write_async(index, &bytes).await
    }

    fn write_next_string(&mut self, text: &str, encoding: &dyn TextEncoding) -> Result<()> {
        self.write_next(&encoding.encode(text))
    }

    fn write_next_null_terminated_string(
        &mut self,
        text: &str,
        encoding: &dyn TextEncoding,
    ) -> Result<()> {
        let mut bytes = encoding.encode(text);
        bytes.resize(bytes.len() + encoding.null_len(), 0);
        self.write_next(&bytes)
    }
}

impl<W: WriteAccessor + ?Sized> WriteExt for W {}
