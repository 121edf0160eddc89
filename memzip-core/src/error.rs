//! Error types for memzip operations.
//!
//! Every fallible operation in the workspace returns [`Result`]. Errors are
//! grouped into coarse categories by [`MemzipError::kind`], so callers can
//! tell a malformed container from a corrupt stream or a checksum failure
//! without matching on individual variants.

use thiserror::Error;

/// Broad category of a [`MemzipError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The container structure is broken (missing signatures, short buffer,
    /// multi-disk archive). Fatal to opening an archive.
    MalformedContainer,
    /// The archive uses a feature this reader does not implement.
    UnsupportedFeature,
    /// The compressed stream is invalid. Fatal to one decompression call.
    DataError,
    /// Decompression succeeded but the checksum does not match.
    IntegrityError,
    /// The requested entry is not in the archive.
    NotFound,
}

/// The main error type for memzip operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MemzipError {
    /// Invalid signature in an archive record.
    #[error("Invalid magic number at offset {offset}: expected {expected:#010x}, found {found:#010x}")]
    InvalidMagic {
        /// Offset of the record in the archive buffer.
        offset: usize,
        /// Expected signature.
        expected: u32,
        /// Signature actually found.
        found: u32,
    },

    /// Invalid header format.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Input ended before a complete field or stream could be read.
    #[error("Unexpected end of data at offset {offset}: need {needed} more bytes")]
    UnexpectedEof {
        /// Byte offset where more data was required.
        offset: usize,
        /// Number of bytes that were expected but not available.
        needed: usize,
    },

    /// Archive spans several disks.
    #[error("Multi-disk archives are not supported (disk {disk}, central directory disk {cd_disk})")]
    MultiDisk {
        /// Number of this disk.
        disk: u16,
        /// Disk holding the start of the central directory.
        cd_disk: u16,
    },

    /// Entry requires a newer extractor than supported.
    #[error("Unsupported version needed to extract {version} for '{name}'")]
    UnsupportedVersion {
        /// Entry name.
        name: String,
        /// Required version field.
        version: u16,
    },

    /// Entry is encrypted.
    #[error("Encrypted entry '{name}' is not supported")]
    Encrypted {
        /// Entry name.
        name: String,
    },

    /// Unsupported compression method.
    #[error("Unsupported compression method {method} for '{name}'")]
    UnsupportedMethod {
        /// Entry name.
        name: String,
        /// The compression method identifier.
        method: u16,
    },

    /// Corrupted data in a compressed stream.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: usize,
        /// Description of the corruption.
        message: String,
    },

    /// Invalid Huffman code encountered during decompression.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Bit position where the invalid code was found.
        bit_position: u64,
    },

    /// Code length set does not describe a usable prefix code.
    #[error("Invalid Huffman code lengths: {message}")]
    InvalidCodeLengths {
        /// Description of the problem.
        message: String,
    },

    /// Back-reference reaches before the start of the output.
    #[error("Invalid back-reference distance: {distance} exceeds history size {history_size}")]
    InvalidDistance {
        /// The invalid distance value.
        distance: usize,
        /// Bytes produced so far.
        history_size: usize,
    },

    /// Decoder produced more bytes than the declared size.
    #[error("Output overflow: stream produces more than {limit} bytes")]
    OutputOverflow {
        /// Declared output size.
        limit: usize,
    },

    /// Decoder produced fewer bytes than the declared size.
    #[error("Size mismatch: expected {expected} bytes, produced {actual}")]
    SizeMismatch {
        /// Declared size.
        expected: usize,
        /// Bytes actually produced.
        actual: usize,
    },

    /// Entry exceeds the configured size ceiling.
    #[error("Entry '{name}' declares {size} bytes, limit is {limit}")]
    EntryTooLarge {
        /// Entry name.
        name: String,
        /// Declared uncompressed size.
        size: u64,
        /// Configured limit.
        limit: u64,
    },

    /// CRC checksum mismatch.
    #[error("CRC mismatch: expected {expected:#x}, computed {computed:#x}")]
    CrcMismatch {
        /// Expected CRC value from archive.
        expected: u32,
        /// Computed CRC value from data.
        computed: u32,
    },

    /// Entry not found in archive.
    #[error("File '{name}' doesn't exist in zip")]
    EntryNotFound {
        /// Name of the missing entry.
        name: String,
    },
}

/// Result type alias for memzip operations.
pub type Result<T> = std::result::Result<T, MemzipError>;

impl MemzipError {
    /// Create an invalid magic error.
    pub fn invalid_magic(offset: usize, expected: u32, found: u32) -> Self {
        Self::InvalidMagic {
            offset,
            expected,
            found,
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(offset: usize, needed: usize) -> Self {
        Self::UnexpectedEof { offset, needed }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: usize, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// Create an invalid code lengths error.
    pub fn invalid_code_lengths(message: impl Into<String>) -> Self {
        Self::InvalidCodeLengths {
            message: message.into(),
        }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, history_size: usize) -> Self {
        Self::InvalidDistance {
            distance,
            history_size,
        }
    }

    /// Create a CRC mismatch error.
    pub fn crc_mismatch(expected: u32, computed: u32) -> Self {
        Self::CrcMismatch { expected, computed }
    }

    /// Create an entry not found error.
    pub fn entry_not_found(name: impl Into<String>) -> Self {
        Self::EntryNotFound { name: name.into() }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMagic { .. } | Self::InvalidHeader { .. } | Self::MultiDisk { .. } => {
                ErrorKind::MalformedContainer
            }
            Self::UnsupportedVersion { .. }
            | Self::Encrypted { .. }
            | Self::UnsupportedMethod { .. }
            | Self::EntryTooLarge { .. } => ErrorKind::UnsupportedFeature,
            Self::UnexpectedEof { .. }
            | Self::CorruptedData { .. }
            | Self::InvalidHuffmanCode { .. }
            | Self::InvalidCodeLengths { .. }
            | Self::InvalidDistance { .. }
            | Self::OutputOverflow { .. }
            | Self::SizeMismatch { .. } => ErrorKind::DataError,
            Self::CrcMismatch { .. } => ErrorKind::IntegrityError,
            Self::EntryNotFound { .. } => ErrorKind::NotFound,
        }
    }
}
