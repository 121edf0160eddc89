//! Bit-level input for DEFLATE streams.
//!
//! [`BitReader`] reads from a borrowed byte slice, so the decoder never
//! leaves the compressed region it was handed. Bits are consumed
//! LSB-first within each byte, which is the order DEFLATE packs them.
//!
//! # Example
//!
//! ```
//! use memzip_core::bitstream::BitReader;
//!
//! let data = [0b1010_1101u8, 0xFF];
//! let mut reader = BitReader::new(&data);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(5).unwrap(), 0b10101);
//! assert_eq!(reader.read_bits(8).unwrap(), 0xFF);
//! ```

use crate::error::{MemzipError, Result};

/// Largest number of bits [`BitReader::fill`] will try to buffer.
pub const MAX_FILL_BITS: u8 = 24;

/// A bit-level reader over an in-memory byte slice.
///
/// The accumulator is a `u32`; it never holds more than 31 valid bits
/// because refills stop as soon as the requested count (at most 24) is
/// reached. The cursor only moves forward.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Source bytes; the end of the slice bounds every read.
    data: &'a [u8],
    /// Next byte to pull into the accumulator.
    pos: usize,
    /// Bit accumulator (LSB-first).
    buffer: u32,
    /// Number of valid bits in `buffer`.
    bits_in_buffer: u8,
    /// Total bits consumed (for error reporting).
    total_bits_read: u64,
}

impl<'a> BitReader<'a> {
    /// Create a reader starting at the first byte of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self::at_offset(data, 0)
    }

    /// Create a reader starting at byte `offset` of `data`.
    ///
    /// An offset past the end yields a reader that is already exhausted.
    pub fn at_offset(data: &'a [u8], offset: usize) -> Self {
        Self {
            data,
            pos: offset.min(data.len()),
            buffer: 0,
            bits_in_buffer: 0,
            total_bits_read: 0,
        }
    }

    /// Get the total number of bits consumed so far.
    pub fn bit_position(&self) -> u64 {
        self.total_bits_read
    }

    /// Byte offset of the first byte not yet fully consumed.
    ///
    /// Whole bytes still sitting in the accumulator count as unconsumed.
    pub fn byte_position(&self) -> usize {
        self.pos - (self.bits_in_buffer / 8) as usize
    }

    /// Number of valid bits currently buffered.
    #[inline]
    pub fn available_bits(&self) -> u8 {
        self.bits_in_buffer
    }

    /// The buffered bits, next bit to be read in the LSB position.
    #[inline]
    pub fn buffered(&self) -> u32 {
        self.buffer
    }

    /// Pull source bytes until at least `count` bits are buffered or the
    /// source runs out. Never fails; callers check [`available_bits`].
    ///
    /// [`available_bits`]: BitReader::available_bits
    #[inline]
    pub fn fill(&mut self, count: u8) {
        debug_assert!(count <= MAX_FILL_BITS, "Cannot fill more than 24 bits");

        while self.bits_in_buffer < count && self.pos < self.data.len() {
            self.buffer |= (self.data[self.pos] as u32) << self.bits_in_buffer;
            self.bits_in_buffer += 8;
            self.pos += 1;
        }
    }

    /// Drop `count` buffered bits.
    ///
    /// `count` must not exceed [`available_bits`](BitReader::available_bits).
    #[inline]
    pub fn consume(&mut self, count: u8) {
        debug_assert!(count <= self.bits_in_buffer);
        self.buffer = self.buffer.checked_shr(count as u32).unwrap_or(0);
        self.bits_in_buffer -= count;
        self.total_bits_read += count as u64;
    }

    /// Read up to 16 bits from the stream.
    ///
    /// The first bit read ends up in the LSB of the result. Reading zero
    /// bits returns 0 and leaves the reader untouched.
    #[inline]
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 16, "Cannot read more than 16 bits at once");

        if count == 0 {
            return Ok(0);
        }

        self.fill(count);
        if self.bits_in_buffer < count {
            return Err(MemzipError::unexpected_eof(
                self.pos,
                (count - self.bits_in_buffer).div_ceil(8) as usize,
            ));
        }

        let result = self.buffer & ((1u32 << count) - 1);
        self.consume(count);
        Ok(result)
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Align to the next byte boundary by discarding partial bits.
    pub fn align_to_byte(&mut self) {
        let remainder = self.bits_in_buffer % 8;
        if remainder > 0 {
            self.consume(remainder);
        }
    }

    /// Read whole bytes, draining the accumulator before the source.
    ///
    /// The reader must be byte-aligned. Fails without consuming anything
    /// if fewer than `buf.len()` bytes remain.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        debug_assert!(self.bits_in_buffer % 8 == 0, "read_bytes on unaligned reader");

        let buffered = (self.bits_in_buffer / 8) as usize;
        let remaining = buffered + (self.data.len() - self.pos);
        if buf.len() > remaining {
            return Err(MemzipError::unexpected_eof(
                self.pos,
                buf.len() - remaining,
            ));
        }

        let mut offset = 0;
        while self.bits_in_buffer >= 8 && offset < buf.len() {
            buf[offset] = (self.buffer & 0xFF) as u8;
            self.consume(8);
            offset += 1;
        }

        let rest = buf.len() - offset;
        if rest > 0 {
            buf[offset..].copy_from_slice(&self.data[self.pos..self.pos + rest]);
            self.pos += rest;
            self.total_bits_read += rest as u64 * 8;
        }

        Ok(())
    }
}
