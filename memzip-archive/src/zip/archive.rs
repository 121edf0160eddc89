//! In-memory ZIP archive handle.

use super::header::{
    CompressionMethod, END_OF_CENTRAL_DIR_SIZE, EndOfCentralDirectory, MAX_EOCD_SCAN, ZipEntry,
    read_central_entry,
};
use crate::text::decode_text;
use memzip_core::Crc32;
use memzip_core::error::{MemzipError, Result};
use memzip_core::traits::{Decompressor, Stored};
use memzip_deflate::DeflateDecoder;
use std::collections::HashMap;

/// Runtime limits and checks for reading an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZipOptions {
    /// Maximum trailing bytes searched for the end of central directory.
    pub max_eocd_scan: usize,
    /// Reject reads of entries declaring more uncompressed bytes than this.
    pub max_entry_size: Option<u64>,
    /// Compare the CRC-32 of every read against the stored value.
    pub verify_crc: bool,
}

impl Default for ZipOptions {
    fn default() -> Self {
        Self {
            max_eocd_scan: MAX_EOCD_SCAN,
            max_entry_size: None,
            verify_crc: true,
        }
    }
}

impl ZipOptions {
    /// Create options with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cap for the end of central directory scan.
    pub fn with_max_eocd_scan(mut self, max_eocd_scan: usize) -> Self {
        self.max_eocd_scan = max_eocd_scan.max(END_OF_CENTRAL_DIR_SIZE);
        self
    }

    /// Set a ceiling on declared uncompressed entry size.
    pub fn with_max_entry_size(mut self, max_entry_size: u64) -> Self {
        self.max_entry_size = Some(max_entry_size);
        self
    }

    /// Enable or disable CRC-32 verification on read.
    pub fn with_verify_crc(mut self, verify_crc: bool) -> Self {
        self.verify_crc = verify_crc;
        self
    }
}

/// A ZIP archive over a borrowed byte buffer.
///
/// Opening parses and validates the whole central directory; afterwards the
/// file table never changes and every read works on its own buffers, so a
/// shared reference can serve concurrent readers.
#[derive(Debug)]
pub struct ZipArchive<'a> {
    data: &'a [u8],
    comment: String,
    entries: Vec<ZipEntry>,
    index: HashMap<String, usize>,
    options: ZipOptions,
    decoder: DeflateDecoder,
}

impl<'a> ZipArchive<'a> {
    /// Open an archive with default options.
    pub fn open(data: &'a [u8]) -> Result<Self> {
        Self::open_with_options(data, ZipOptions::default())
    }

    /// Open an archive.
    ///
    /// Fails on the first malformed or unsupported record; no partially
    /// built file table is ever returned. When several records share a
    /// name the last one wins.
    pub fn open_with_options(data: &'a [u8], options: ZipOptions) -> Result<Self> {
        let eocd = EndOfCentralDirectory::find(data, options.max_eocd_scan)?;

        let count = eocd.total_entries as usize;
        let mut entries: Vec<ZipEntry> = Vec::with_capacity(count);
        let mut index = HashMap::with_capacity(count);
        let mut offset = eocd.cd_offset as usize;

        for _ in 0..count {
            let (entry, next) = read_central_entry(data, offset)?;
            offset = next;

            match index.get(&entry.name) {
                Some(&slot) => {
                    log::debug!("zip: duplicate entry '{}', later record wins", entry.name);
                    entries[slot] = entry;
                }
                None => {
                    index.insert(entry.name.clone(), entries.len());
                    entries.push(entry);
                }
            }
        }

        log::debug!(
            "zip: parsed {} central directory records at offset {} ({} unique names)",
            count,
            eocd.cd_offset,
            entries.len()
        );

        Ok(Self {
            data,
            comment: eocd.comment,
            entries,
            index,
            options,
            decoder: DeflateDecoder::new(),
        })
    }

    /// The archive comment.
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// All entries, in central directory order.
    pub fn entries(&self) -> &[ZipEntry] {
        &self.entries
    }

    /// Get entry by name.
    pub fn entry(&self, name: &str) -> Option<&ZipEntry> {
        self.index.get(name).map(|&slot| &self.entries[slot])
    }

    /// Entry names, in central directory order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Options the archive was opened with.
    pub fn options(&self) -> &ZipOptions {
        &self.options
    }

    /// Read an entry's decompressed bytes.
    pub fn read_binary(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .entry(name)
            .ok_or_else(|| MemzipError::entry_not_found(name))?;
        self.extract(entry)
    }

    /// Read an entry as text.
    ///
    /// UTF-8 content is returned as is; anything else is decoded as
    /// Windows-1252.
    pub fn read(&self, name: &str) -> Result<String> {
        let bytes = self.read_binary(name)?;
        Ok(decode_text(&bytes, false))
    }

    /// Extract an entry.
    pub fn extract(&self, entry: &ZipEntry) -> Result<Vec<u8>> {
        if let Some(limit) = self.options.max_entry_size {
            let size = entry.uncompressed_size as u64;
            if size > limit {
                return Err(MemzipError::EntryTooLarge {
                    name: entry.name.clone(),
                    size,
                    limit,
                });
            }
        }

        let codec: &dyn Decompressor = match entry.method {
            CompressionMethod::Stored => &Stored,
            CompressionMethod::Deflate => &self.decoder,
            CompressionMethod::Unknown(method) => {
                return Err(MemzipError::UnsupportedMethod {
                    name: entry.name.clone(),
                    method,
                });
            }
        };

        log::debug!(
            "zip: reading '{}' ({}, {} -> {} bytes)",
            entry.name,
            codec.name(),
            entry.compressed_size,
            entry.uncompressed_size
        );

        let region = self.compressed_region(entry)?;
        let data = codec.decompress(region, entry.uncompressed_size as usize)?;

        if self.options.verify_crc {
            let computed = Crc32::compute(&data);
            if computed != entry.crc32 {
                return Err(MemzipError::crc_mismatch(entry.crc32, computed));
            }
        }

        Ok(data)
    }

    /// The entry's compressed bytes, bounded by its declared size.
    fn compressed_region(&self, entry: &ZipEntry) -> Result<&'a [u8]> {
        let start = entry.content_offset;
        let end = start.saturating_add(entry.compressed_size as usize);
        self.data
            .get(start..end)
            .ok_or_else(|| MemzipError::unexpected_eof(self.data.len(), end - self.data.len()))
    }
}
