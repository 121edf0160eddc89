//! # memzip Core
//!
//! Core components for the memzip archive reader.
//!
//! This crate provides the building blocks shared by the codec and the
//! container layers:
//!
//! - [`bitstream`]: LSB-first bit reader over an in-memory slice
//! - [`crc`]: CRC-32 checksum with compile-time tables
//! - [`traits`]: The [`Decompressor`] seam between container and codec
//! - [`error`]: Error type and its category taxonomy
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Container                                           │
//! │     ZIP end-of-central-directory, central directory,   │
//! │     local headers, entry lookup (memzip-archive)       │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     DEFLATE inflate: Huffman trees, LZ77 copy          │
//! │     (memzip-deflate)                                    │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                              │
//! │     BitReader, CRC-32, errors                          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use memzip_core::bitstream::BitReader;
//! use memzip_core::crc::Crc32;
//!
//! let data = [0xAB, 0xCD];
//! let mut reader = BitReader::new(&data);
//! let bits = reader.read_bits(12).unwrap();
//! assert_eq!(bits, 0xDAB);
//!
//! let crc = Crc32::compute(b"Hello, World!");
//! assert_eq!(crc, 0xEC4AC3D0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod crc;
pub mod error;
pub mod traits;

// Re-exports for convenience
pub use bitstream::BitReader;
pub use crc::Crc32;
pub use error::{ErrorKind, MemzipError, Result};
pub use traits::{Decompressor, Stored};
