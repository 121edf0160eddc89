//! Core traits shared by codecs and the archive layer.

use crate::error::{MemzipError, Result};

/// A whole-buffer decompressor.
///
/// The archive reader hands each implementation the compressed region of
/// one entry together with the size the archive declares for it. There is
/// no streaming interface: the entire input is available up front and the
/// entire output is produced in one call.
pub trait Decompressor {
    /// Short human-readable method name (for logs and diagnostics).
    fn name(&self) -> &'static str;

    /// Decompress `input`, producing exactly `expected_size` bytes.
    ///
    /// Implementations must fail rather than return a partially filled
    /// buffer.
    fn decompress(&self, input: &[u8], expected_size: usize) -> Result<Vec<u8>>;
}

/// Identity "decompressor" for stored entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stored;

impl Decompressor for Stored {
    fn name(&self) -> &'static str {
        "Stored"
    }

    fn decompress(&self, input: &[u8], expected_size: usize) -> Result<Vec<u8>> {
        match input.get(..expected_size) {
            Some(data) => Ok(data.to_vec()),
            None => Err(MemzipError::unexpected_eof(
                input.len(),
                expected_size - input.len(),
            )),
        }
    }
}
