//! Canonical Huffman trees for DEFLATE decoding.
//!
//! A tree is stored the way RFC 1951 describes canonical codes: a count of
//! codes per bit length plus the symbols listed in canonical order, sorted
//! by (code length, symbol index). The codes themselves are never
//! materialized; [`HuffmanTree::decode`] walks the count table one bit at a
//! time and resolves the finished code to its rank in `symbols`.
//!
//! # Alphabets
//!
//! - **Literal/Length**: 0-287 (0-255 literals, 256 EOB, 257-285 lengths)
//! - **Distance**: 0-31 (30 and 31 never occur in valid data)
//! - **Code Length**: 0-18 (for encoding dynamic Huffman trees)

use memzip_core::BitReader;
use memzip_core::bitstream::MAX_FILL_BITS;
use memzip_core::error::{MemzipError, Result};

/// Maximum code length in DEFLATE (15 bits).
pub const MAX_CODE_LENGTH: usize = 15;

/// Largest alphabet a tree can hold (fixed literal/length alphabet).
pub const MAX_SYMBOLS: usize = 288;

/// Size of the code length alphabet (0-18).
pub const CODELEN_ALPHABET_SIZE: usize = 19;

/// End of block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// A canonical Huffman decoding table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    /// `counts[len]` is the number of codes of length `len`; `counts[0]` is 0.
    counts: [u16; MAX_CODE_LENGTH + 1],
    /// Symbols in canonical order.
    symbols: [u16; MAX_SYMBOLS],
}

impl HuffmanTree {
    /// The fixed literal/length tree (RFC 1951 Section 3.2.6).
    ///
    /// 7-bit codes for 256-279, 8-bit codes for 0-143 and 280-287, 9-bit
    /// codes for 144-255. Listed directly in canonical order.
    pub fn fixed_litlen() -> Self {
        let mut counts = [0u16; MAX_CODE_LENGTH + 1];
        counts[7] = 24;
        counts[8] = 152;
        counts[9] = 112;

        let mut symbols = [0u16; MAX_SYMBOLS];
        let order = (256..280).chain(0..144).chain(280..288).chain(144..256);
        for (slot, symbol) in symbols.iter_mut().zip(order) {
            *slot = symbol;
        }

        Self { counts, symbols }
    }

    /// The fixed distance tree: 5-bit codes for symbols 0-31.
    pub fn fixed_distance() -> Self {
        let mut counts = [0u16; MAX_CODE_LENGTH + 1];
        counts[5] = 32;

        let mut symbols = [0u16; MAX_SYMBOLS];
        for (symbol, slot) in symbols.iter_mut().take(32).enumerate() {
            *slot = symbol as u16;
        }

        Self { counts, symbols }
    }

    /// Build a tree from per-symbol code lengths.
    ///
    /// `code_lengths[i]` is the bit length for symbol `i`; 0 means the symbol
    /// is unused. Incomplete codes are accepted (a lone distance code is
    /// legal DEFLATE), over-subscribed ones are not.
    pub fn from_code_lengths(code_lengths: &[u8]) -> Result<Self> {
        if code_lengths.len() > MAX_SYMBOLS {
            return Err(MemzipError::invalid_code_lengths(format!(
                "{} symbols exceeds maximum {}",
                code_lengths.len(),
                MAX_SYMBOLS
            )));
        }

        let mut counts = [0u16; MAX_CODE_LENGTH + 1];
        for &len in code_lengths {
            if len as usize > MAX_CODE_LENGTH {
                return Err(MemzipError::invalid_code_lengths(format!(
                    "Code length {} exceeds maximum {}",
                    len, MAX_CODE_LENGTH
                )));
            }
            counts[len as usize] += 1;
        }
        counts[0] = 0;

        // Each length doubles the code space; running out means two codes
        // would share a prefix.
        let mut left = 1i32;
        for &count in &counts[1..] {
            left = (left << 1) - count as i32;
            if left < 0 {
                return Err(MemzipError::invalid_code_lengths("Over-subscribed code"));
            }
        }

        // Offset of the first symbol of each length in canonical order
        let mut offsets = [0u16; MAX_CODE_LENGTH + 1];
        let mut sum = 0u16;
        for (offset, &count) in offsets.iter_mut().zip(&counts) {
            *offset = sum;
            sum += count;
        }

        let mut symbols = [0u16; MAX_SYMBOLS];
        for (symbol, &len) in code_lengths.iter().enumerate() {
            if len > 0 {
                let slot = &mut offsets[len as usize];
                symbols[*slot as usize] = symbol as u16;
                *slot += 1;
            }
        }

        Ok(Self { counts, symbols })
    }

    /// Number of codes of each length.
    pub fn counts(&self) -> &[u16; MAX_CODE_LENGTH + 1] {
        &self.counts
    }

    /// Decode one symbol from the bit stream.
    ///
    /// Bits are taken one at a time, most significant code bit first. After
    /// `len` bits, `code` minus the number of codes of that length going
    /// negative means a complete code has been read; its rank among all
    /// codes is then the count of shorter-or-equal codes plus that residual.
    #[inline]
    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<u16> {
        reader.fill(MAX_FILL_BITS);
        let bits = reader.buffered();
        let available = reader.available_bits() as usize;

        let mut code = 0i32;
        let mut sum = 0i32;
        let mut len = 0usize;

        loop {
            if len == MAX_CODE_LENGTH {
                return Err(MemzipError::invalid_huffman(reader.bit_position()));
            }
            if len == available {
                return Err(MemzipError::unexpected_eof(reader.byte_position(), 1));
            }

            code = 2 * code + ((bits >> len) & 1) as i32;
            len += 1;

            let count = self.counts[len] as i32;
            sum += count;
            code -= count;

            if code < 0 {
                break;
            }
        }

        reader.consume(len as u8);
        Ok(self.symbols[(sum + code) as usize])
    }
}
