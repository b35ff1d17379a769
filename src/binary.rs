//! Binary data access with interchangeable backends.
//!
//! This module provides the accessor contract and everything built on it:
//! three backends (in-memory, stream, memory-mapped), zero-copy views over any
//! accessor, the [`BinaryFile`] orchestrator that picks a backend for a path,
//! and the endian-aware codec layered on top.

pub mod accessor;
pub mod array;
pub mod codec;
pub mod encoding;
pub mod file;
pub mod mmap;
pub mod stream;
pub mod validation;
pub mod view;

pub use accessor::{Accessor, AccessorUpcast, ReadAccessor, Seekable, VariableLength, WriteAccessor};
pub use array::ArrayBackend;
pub use codec::{ByteOrder, ReadExt, Scalar, WriteExt};
pub use encoding::{encoding_for_label, Latin1, TextEncoding, Utf16Be, Utf16Le, Utf8};
pub use file::{Backend, BackendKind, BinaryFile};
pub use mmap::MemoryMappedBackend;
pub use stream::StreamBackend;
pub use view::{ReadView, View, WriteView};
