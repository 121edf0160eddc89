//! DEFLATE decompression (inflate).
//!
//! This module implements the DEFLATE decompression algorithm as specified
//! in RFC 1951. It supports all three block types:
//! - Type 0: Stored (uncompressed)
//! - Type 1: Fixed Huffman codes
//! - Type 2: Dynamic Huffman codes
//!
//! The whole compressed stream must be in memory. Decoding runs block by
//! block until the final-block flag is seen; any error aborts the stream
//! and the partially written output is dropped with the [`Inflater`].

use crate::huffman::{CODELEN_ALPHABET_SIZE, END_OF_BLOCK, HuffmanTree};
use crate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_EXTRA_BITS, FixedTrees, LENGTH_EXTRA_BITS, decode_distance,
    decode_length,
};
use memzip_core::BitReader;
use memzip_core::error::{MemzipError, Result};
use memzip_core::traits::Decompressor;

/// Maximum back-reference distance in DEFLATE (32KB).
pub const MAX_DISTANCE: usize = 32768;

/// Largest expansion a DEFLATE stream can achieve (258 bytes per 2-bit code,
/// rounded up). Used only to cap up-front allocation.
const MAX_EXPANSION_RATIO: usize = 1032;

/// Largest literal/length alphabet a dynamic header may declare.
const MAX_LITLEN_CODES: usize = 286;

/// Largest distance alphabet a dynamic header may declare.
const MAX_DISTANCE_CODES: usize = 30;

/// DEFLATE block type from the 2-bit BTYPE field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    /// Raw bytes preceded by LEN/NLEN.
    Stored,
    /// Huffman codes from RFC 1951 Section 3.2.6.
    Fixed,
    /// Huffman codes transmitted in the block header.
    Dynamic,
}

impl BlockType {
    /// Map a BTYPE value; 3 is reserved.
    pub fn from_bits(btype: u32) -> Option<Self> {
        match btype {
            0 => Some(Self::Stored),
            1 => Some(Self::Fixed),
            2 => Some(Self::Dynamic),
            _ => None,
        }
    }
}

/// Decompression context for one DEFLATE stream.
#[derive(Debug)]
pub struct Inflater<'a> {
    /// Bit reader over the compressed region.
    reader: BitReader<'a>,
    /// Produced bytes; also the back-reference history.
    output: Vec<u8>,
    /// Maximum number of bytes the stream may produce.
    limit: usize,
    /// Shared fixed trees.
    fixed: &'a FixedTrees,
    /// Whether the final block has been decoded.
    finished: bool,
}

impl<'a> Inflater<'a> {
    /// Create an inflater with unbounded output.
    pub fn new(input: &'a [u8], fixed: &'a FixedTrees) -> Self {
        Self {
            reader: BitReader::new(input),
            output: Vec::new(),
            limit: usize::MAX,
            fixed,
            finished: false,
        }
    }

    /// Create an inflater whose output may not exceed `size` bytes.
    pub fn with_output_size(input: &'a [u8], fixed: &'a FixedTrees, size: usize) -> Self {
        let capacity = size.min(input.len().saturating_mul(MAX_EXPANSION_RATIO));
        Self {
            reader: BitReader::new(input),
            output: Vec::with_capacity(capacity),
            limit: size,
            fixed,
            finished: false,
        }
    }

    /// Decode blocks until the final block has been processed.
    pub fn run(&mut self) -> Result<()> {
        while !self.finished {
            self.inflate_block()?;
        }
        Ok(())
    }

    /// Whether the final block has been decoded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of input bytes consumed so far (a partially used last byte
    /// counts as consumed).
    pub fn consumed(&self) -> usize {
        self.reader.bit_position().div_ceil(8) as usize
    }

    /// Get the decompressed output.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Take ownership of the decompressed output.
    pub fn into_output(self) -> Vec<u8> {
        self.output
    }

    /// Decompress a single block.
    fn inflate_block(&mut self) -> Result<()> {
        let bfinal = self.reader.read_bit()?;
        let btype = self.reader.read_bits(2)?;

        let block_type = BlockType::from_bits(btype).ok_or_else(|| {
            MemzipError::corrupted(self.reader.byte_position(), "Reserved block type 3")
        })?;

        log::trace!(
            "inflate: {:?} block at bit {} (final: {})",
            block_type,
            self.reader.bit_position() - 3,
            bfinal
        );

        match block_type {
            BlockType::Stored => self.inflate_stored()?,
            BlockType::Fixed => {
                let fixed = self.fixed;
                self.inflate_huffman(&fixed.litlen, &fixed.distance)?;
            }
            BlockType::Dynamic => {
                let (litlen_tree, dist_tree) = self.decode_trees()?;
                self.inflate_huffman(&litlen_tree, &dist_tree)?;
            }
        }

        self.finished = bfinal;
        Ok(())
    }

    /// Decompress a stored (uncompressed) block.
    fn inflate_stored(&mut self) -> Result<()> {
        self.reader.align_to_byte();

        let len = self.reader.read_bits(16)? as u16;
        let nlen = self.reader.read_bits(16)? as u16;

        if len != !nlen {
            return Err(MemzipError::corrupted(
                self.reader.byte_position(),
                format!("LEN/NLEN mismatch: {} vs {}", len, !nlen),
            ));
        }

        let len = len as usize;
        self.reserve(len)?;

        let start = self.output.len();
        self.output.resize(start + len, 0);
        self.reader.read_bytes(&mut self.output[start..])
    }

    /// Read a dynamic block header and build its two trees.
    fn decode_trees(&mut self) -> Result<(HuffmanTree, HuffmanTree)> {
        let hlit = self.reader.read_bits(5)? as usize + 257; // literal/length codes
        let hdist = self.reader.read_bits(5)? as usize + 1; // distance codes
        let hclen = self.reader.read_bits(4)? as usize + 4; // code length codes

        if hlit > MAX_LITLEN_CODES || hdist > MAX_DISTANCE_CODES {
            return Err(MemzipError::corrupted(
                self.reader.byte_position(),
                format!("Too many codes: {} literal/length, {} distance", hlit, hdist),
            ));
        }

        let mut code_length_lengths = [0u8; CODELEN_ALPHABET_SIZE];
        for &slot in CODE_LENGTH_ORDER.iter().take(hclen) {
            code_length_lengths[slot] = self.reader.read_bits(3)? as u8;
        }
        let code_length_tree = HuffmanTree::from_code_lengths(&code_length_lengths)?;

        let total = hlit + hdist;
        let mut lengths = [0u8; MAX_LITLEN_CODES + MAX_DISTANCE_CODES];
        let mut i = 0;

        while i < total {
            let symbol = code_length_tree.decode(&mut self.reader)?;

            let (value, repeat) = match symbol {
                0..=15 => (symbol as u8, 1),
                16 => {
                    // Copy previous length 3-6 times
                    if i == 0 {
                        return Err(MemzipError::corrupted(
                            self.reader.byte_position(),
                            "Repeat code 16 with no previous length",
                        ));
                    }
                    (lengths[i - 1], self.reader.read_bits(2)? as usize + 3)
                }
                // Repeat 0 for 3-10 times
                17 => (0, self.reader.read_bits(3)? as usize + 3),
                // Repeat 0 for 11-138 times
                18 => (0, self.reader.read_bits(7)? as usize + 11),
                _ => return Err(MemzipError::invalid_huffman(self.reader.bit_position())),
            };

            if i + repeat > total {
                return Err(MemzipError::corrupted(
                    self.reader.byte_position(),
                    "Code length repeat overflows the declared code count",
                ));
            }
            lengths[i..i + repeat].fill(value);
            i += repeat;
        }

        if lengths[END_OF_BLOCK as usize] == 0 {
            return Err(MemzipError::corrupted(
                self.reader.byte_position(),
                "Dynamic block has no end-of-block code",
            ));
        }

        let litlen_tree = HuffmanTree::from_code_lengths(&lengths[..hlit])?;
        let dist_tree = HuffmanTree::from_code_lengths(&lengths[hlit..total])?;

        Ok((litlen_tree, dist_tree))
    }

    /// Decode literal/length and distance symbols until end of block.
    fn inflate_huffman(&mut self, litlen_tree: &HuffmanTree, dist_tree: &HuffmanTree) -> Result<()> {
        loop {
            let code = litlen_tree.decode(&mut self.reader)?;

            if code < 256 {
                self.reserve(1)?;
                self.output.push(code as u8);
            } else if code == END_OF_BLOCK {
                return Ok(());
            } else if code <= 285 {
                let length_idx = (code - 257) as usize;
                let extra = self.reader.read_bits(LENGTH_EXTRA_BITS[length_idx])? as u16;
                let length = decode_length(code, extra);

                let dist_code = dist_tree.decode(&mut self.reader)?;
                if dist_code >= 30 {
                    return Err(MemzipError::corrupted(
                        self.reader.byte_position(),
                        format!("Invalid distance code: {}", dist_code),
                    ));
                }

                let dist_extra = self
                    .reader
                    .read_bits(DISTANCE_EXTRA_BITS[dist_code as usize])?
                    as u16;
                let distance = decode_distance(dist_code, dist_extra);

                self.copy_match(distance as usize, length as usize)?;
            } else {
                return Err(MemzipError::corrupted(
                    self.reader.byte_position(),
                    format!("Invalid literal/length code: {}", code),
                ));
            }
        }
    }

    /// Append `length` bytes starting `distance` bytes back.
    ///
    /// Source and destination overlap whenever `distance < length`, so the
    /// copy runs one byte at a time, front to back, re-reading bytes it has
    /// just written.
    fn copy_match(&mut self, distance: usize, length: usize) -> Result<()> {
        let produced = self.output.len();
        if distance == 0 || distance > produced {
            return Err(MemzipError::invalid_distance(distance, produced));
        }
        self.reserve(length)?;

        let start = produced - distance;
        for i in start..start + length {
            let byte = self.output[i];
            self.output.push(byte);
        }

        Ok(())
    }

    /// Fail if `additional` more bytes would exceed the output limit.
    #[inline]
    fn reserve(&self, additional: usize) -> Result<()> {
        if additional > self.limit - self.output.len() {
            return Err(MemzipError::OutputOverflow { limit: self.limit });
        }
        Ok(())
    }
}

/// DEFLATE decoder owning its fixed Huffman trees.
///
/// Building one is the explicit initialization step for fixed-tree blocks;
/// afterwards it can decode any number of streams, from any thread.
#[derive(Debug, Clone, Default)]
pub struct DeflateDecoder {
    fixed: FixedTrees,
}

impl DeflateDecoder {
    /// Create a decoder, building the fixed trees.
    pub fn new() -> Self {
        Self {
            fixed: FixedTrees::new(),
        }
    }

    /// The fixed trees this decoder lends to each stream.
    pub fn fixed_trees(&self) -> &FixedTrees {
        &self.fixed
    }

    /// Decompress a stream of unknown output size.
    pub fn inflate(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut inflater = Inflater::new(data, &self.fixed);
        inflater.run()?;
        Ok(inflater.into_output())
    }

    /// Decompress a stream that must produce exactly `size` bytes.
    pub fn inflate_with_size(&self, data: &[u8], size: usize) -> Result<Vec<u8>> {
        let mut inflater = Inflater::with_output_size(data, &self.fixed, size);
        inflater.run()?;

        let output = inflater.into_output();
        if output.len() != size {
            return Err(MemzipError::SizeMismatch {
                expected: size,
                actual: output.len(),
            });
        }
        Ok(output)
    }
}

impl Decompressor for DeflateDecoder {
    fn name(&self) -> &'static str {
        "Deflate"
    }

    fn decompress(&self, input: &[u8], expected_size: usize) -> Result<Vec<u8>> {
        self.inflate_with_size(input, expected_size)
    }
}

/// Decompress DEFLATE data.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    DeflateDecoder::new().inflate(data)
}

/// Decompress DEFLATE data that must produce exactly `size` bytes.
pub fn inflate_with_size(data: &[u8], size: usize) -> Result<Vec<u8>> {
    DeflateDecoder::new().inflate_with_size(data, size)
}
