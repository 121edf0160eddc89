//! # memzip Deflate
//!
//! Pure Rust DEFLATE decompression (RFC 1951) over in-memory buffers.
//!
//! ## Features
//!
//! - All three block types
//!   - Stored (uncompressed) blocks
//!   - Fixed Huffman codes
//!   - Dynamic Huffman codes
//! - Strict validation: bad distances, reserved symbols, over-subscribed
//!   trees and truncated input are errors, never silent garbage
//! - Optional exact output size, as declared by a container
//!
//! ## Example
//!
//! ```rust
//! use memzip_deflate::{DeflateDecoder, inflate};
//!
//! // "AAAA" as a single fixed-Huffman block
//! let compressed = [0x73, 0x74, 0x74, 0x74, 0x04, 0x00];
//! assert_eq!(inflate(&compressed).unwrap(), b"AAAA");
//!
//! // Reuse one decoder (and its fixed trees) across streams
//! let decoder = DeflateDecoder::new();
//! let data = decoder.inflate_with_size(&compressed, 4).unwrap();
//! assert_eq!(data, b"AAAA");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod huffman;
pub mod inflate;
pub mod tables;

// Re-exports
pub use huffman::HuffmanTree;
pub use inflate::{BlockType, DeflateDecoder, Inflater, inflate, inflate_with_size};
pub use tables::FixedTrees;
