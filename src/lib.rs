//! # binfile - Uniform access to binary data
//!
//! One read/write contract over byte ranges, backed interchangeably by an
//! in-memory buffer, a memory-mapped file or a seekable stream.
//!
//! ## Features
//!
//! - **Automatic backend selection**: Small files load into memory, larger ones
//!   are memory-mapped, and a plain stream is the fallback that always works
//! - **Zero-copy views**: Slice any accessor; nested slices stay one hop from
//!   the backend
//! - **Resize with reopen**: Backends that cannot resize themselves are closed,
//!   resized on disk and reopened
//! - **Typed codec**: Little/big-endian scalars and fixed-length or
//!   null-terminated strings in several encodings
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`binary`] - Accessor contract, backends, views, [`BinaryFile`] and codec
//! - [`fs`] - File-system boundary consumed by [`BinaryFile`]
//! - [`config`] - Autodetection settings
//!
//! ```no_run
//! use binfile::{BinaryFile, ReadAccessor, ReadExt};
//!
//! # fn main() -> binfile::Result<()> {
//! let file = BinaryFile::open("archive.bin")?;
//! let header = file.slice(0, 16)?;
//! let magic = header.read_u32_be(0)?;
//! if let Some(kind) = file.backend_kind() {
//!     println!("{magic:#010x} via {kind}");
//! }
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod fs;

// Accessors and codec
pub mod binary;

// Re-export commonly used types for convenience
pub use error::{BinaryError, Result};

// Public API surface for external usage
pub use binary::{
    Accessor, BackendKind, BinaryFile, ByteOrder, ReadAccessor, ReadExt, Seekable, WriteAccessor,
    WriteExt,
};
pub use config::BinaryFileConfig;
pub use fs::{FileSystem, PhysicalFileSystem};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
