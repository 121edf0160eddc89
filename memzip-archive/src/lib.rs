//! # memzip Archive
//!
//! ZIP container support for memzip.
//!
//! The archive is a byte buffer the caller already holds. Opening it walks
//! the central directory once and builds a name-indexed file table; reading
//! an entry inflates (or copies) its data and checks the CRC-32.
//!
//! ## Example
//!
//! ```rust,no_run
//! use memzip_archive::ZipArchive;
//!
//! let data = std::fs::read("archive.zip").unwrap();
//! let archive = ZipArchive::open(&data).unwrap();
//!
//! for entry in archive.entries() {
//!     println!("{} ({} bytes)", entry.name, entry.uncompressed_size);
//! }
//!
//! let text = archive.read("readme.txt").unwrap();
//! println!("{}", text);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod text;
pub mod zip;

// Re-exports
pub use zip::{CompressionMethod, DosDateTime, ZipArchive, ZipEntry, ZipOptions, read_zip};
