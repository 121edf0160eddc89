//! ZIP header structures.
//!
//! Every record is parsed straight out of the archive buffer with checked
//! little-endian reads; a field that would run past the end of the buffer
//! is an [`InvalidHeader`](MemzipError::InvalidHeader) error, never a panic.

use crate::text::decode_text;
use memzip_core::error::{MemzipError, Result};

/// ZIP local file header signature.
pub const LOCAL_FILE_HEADER_SIG: u32 = 0x04034B50;

/// ZIP central directory header signature.
pub const CENTRAL_DIR_HEADER_SIG: u32 = 0x02014B50;

/// ZIP end of central directory signature.
pub const END_OF_CENTRAL_DIR_SIG: u32 = 0x06054B50;

/// Fixed part of a local file header.
pub const LOCAL_FILE_HEADER_SIZE: usize = 30;

/// Fixed part of a central directory header.
pub const CENTRAL_DIR_HEADER_SIZE: usize = 46;

/// Fixed part of the end of central directory record.
pub const END_OF_CENTRAL_DIR_SIZE: usize = 22;

/// Largest end of central directory search window (record + max comment).
pub const MAX_EOCD_SCAN: usize = END_OF_CENTRAL_DIR_SIZE + u16::MAX as usize;

/// Highest "version needed to extract" this reader accepts (2.0).
pub const MAX_VERSION_NEEDED: u16 = 20;

/// General purpose flag: entry is encrypted.
pub const FLAG_ENCRYPTED: u16 = 0x0001;

/// General purpose flag: name and comment are UTF-8.
pub const FLAG_UTF8: u16 = 0x0800;

/// ZIP compression methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionMethod {
    /// Stored (no compression).
    Stored,
    /// Deflate compression.
    Deflate,
    /// Unknown method.
    Unknown(u16),
}

impl CompressionMethod {
    /// Create from a u16 value.
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => Self::Stored,
            8 => Self::Deflate,
            _ => Self::Unknown(value),
        }
    }

    /// The method identifier as stored in the archive.
    pub fn to_u16(self) -> u16 {
        match self {
            Self::Stored => 0,
            Self::Deflate => 8,
            Self::Unknown(id) => id,
        }
    }
}

impl std::fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stored => write!(f, "Stored"),
            Self::Deflate => write!(f, "Deflate"),
            Self::Unknown(id) => write!(f, "Unknown({})", id),
        }
    }
}

/// MS-DOS date and time as stored in ZIP headers.
///
/// Two-second resolution, no time zone. Fields are decoded on access and
/// are not validated; a zero date reads as 1980-00-00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DosDateTime {
    /// Raw date field: bits 9-15 year since 1980, 5-8 month, 0-4 day.
    pub date: u16,
    /// Raw time field: bits 11-15 hour, 5-10 minute, 0-4 second / 2.
    pub time: u16,
}

impl DosDateTime {
    /// Create from raw date and time fields.
    pub fn new(date: u16, time: u16) -> Self {
        Self { date, time }
    }

    /// Calendar year.
    pub fn year(&self) -> u16 {
        1980 + ((self.date >> 9) & 0x7F)
    }

    /// Month, 1-12.
    pub fn month(&self) -> u8 {
        ((self.date >> 5) & 0x0F) as u8
    }

    /// Day of month, 1-31.
    pub fn day(&self) -> u8 {
        (self.date & 0x1F) as u8
    }

    /// Hour, 0-23.
    pub fn hour(&self) -> u8 {
        ((self.time >> 11) & 0x1F) as u8
    }

    /// Minute, 0-59.
    pub fn minute(&self) -> u8 {
        ((self.time >> 5) & 0x3F) as u8
    }

    /// Second, always even.
    pub fn second(&self) -> u8 {
        ((self.time & 0x1F) * 2) as u8
    }
}

impl std::fmt::Display for DosDateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

/// One file in the archive, as described by its central directory record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntry {
    /// File name.
    pub name: String,
    /// File comment.
    pub comment: String,
    /// Compression method (only Stored and Deflate survive parsing).
    pub method: CompressionMethod,
    /// General purpose bit flag.
    pub flags: u16,
    /// Last modification time.
    pub modified: DosDateTime,
    /// CRC-32 of uncompressed data.
    pub crc32: u32,
    /// Compressed size.
    pub compressed_size: u32,
    /// Uncompressed size.
    pub uncompressed_size: u32,
    /// Offset of the local file header.
    pub local_header_offset: u32,
    /// Offset of the entry's data, just past its local header.
    pub content_offset: usize,
}

impl ZipEntry {
    /// Check if this entry names a directory.
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// End of central directory record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    /// Offset of the record in the buffer.
    pub offset: usize,
    /// Number of this disk.
    pub disk: u16,
    /// Disk where the central directory starts.
    pub cd_disk: u16,
    /// Number of central directory records.
    pub total_entries: u16,
    /// Size of the central directory in bytes.
    pub cd_size: u32,
    /// Offset of the first central directory record.
    pub cd_offset: u32,
    /// Archive comment.
    pub comment: String,
}

impl EndOfCentralDirectory {
    /// Locate and parse the record, scanning backward from the end.
    ///
    /// The scan starts at the last position a complete record fits and
    /// stops once it has looked at `max_scan` trailing bytes. The first
    /// signature found (closest to the end) wins.
    pub fn find(data: &[u8], max_scan: usize) -> Result<Self> {
        if data.len() < END_OF_CENTRAL_DIR_SIZE {
            return Err(MemzipError::invalid_header(format!(
                "Buffer of {} bytes is too short for a ZIP archive",
                data.len()
            )));
        }

        let last = data.len() - END_OF_CENTRAL_DIR_SIZE;
        let first = data.len().saturating_sub(max_scan.max(END_OF_CENTRAL_DIR_SIZE));
        let signature = END_OF_CENTRAL_DIR_SIG.to_le_bytes();

        let offset = (first..=last)
            .rev()
            .find(|&pos| data[pos..pos + 4] == signature)
            .ok_or_else(|| MemzipError::invalid_header("End of central directory not found"))?;

        let disk = read_u16(data, offset + 4)?;
        let cd_disk = read_u16(data, offset + 6)?;
        if disk != 0 || cd_disk != 0 {
            return Err(MemzipError::MultiDisk { disk, cd_disk });
        }

        let comment_len = read_u16(data, offset + 20)? as usize;
        let comment = read_slice(data, offset + END_OF_CENTRAL_DIR_SIZE, comment_len)?;

        Ok(Self {
            offset,
            disk,
            cd_disk,
            total_entries: read_u16(data, offset + 10)?,
            cd_size: read_u32(data, offset + 12)?,
            cd_offset: read_u32(data, offset + 16)?,
            comment: decode_text(comment, false),
        })
    }
}

/// Parse the central directory record at `offset`.
///
/// Validates the entry eagerly (version, encryption, method) and follows
/// its local header offset to find where the data starts. Returns the
/// entry and the offset of the next record.
pub fn read_central_entry(data: &[u8], offset: usize) -> Result<(ZipEntry, usize)> {
    let signature = read_u32(data, offset)?;
    if signature != CENTRAL_DIR_HEADER_SIG {
        return Err(MemzipError::invalid_magic(
            offset,
            CENTRAL_DIR_HEADER_SIG,
            signature,
        ));
    }

    let version_needed = read_u16(data, offset + 6)?;
    let flags = read_u16(data, offset + 8)?;
    let method = CompressionMethod::from_u16(read_u16(data, offset + 10)?);
    let time = read_u16(data, offset + 12)?;
    let date = read_u16(data, offset + 14)?;
    let crc32 = read_u32(data, offset + 16)?;
    let compressed_size = read_u32(data, offset + 20)?;
    let uncompressed_size = read_u32(data, offset + 24)?;
    let name_len = read_u16(data, offset + 28)? as usize;
    let extra_len = read_u16(data, offset + 30)? as usize;
    let comment_len = read_u16(data, offset + 32)? as usize;
    let local_header_offset = read_u32(data, offset + 42)?;

    let name_start = offset + CENTRAL_DIR_HEADER_SIZE;
    let utf8 = flags & FLAG_UTF8 != 0;

    // Rejections come before the variable fields are bounds-checked; the
    // name in the error is whatever part of it the buffer holds.
    if version_needed > MAX_VERSION_NEEDED
        || flags & FLAG_ENCRYPTED != 0
        || matches!(method, CompressionMethod::Unknown(_))
    {
        let available = data.get(name_start..).unwrap_or_default();
        let name = decode_text(&available[..name_len.min(available.len())], utf8);

        if version_needed > MAX_VERSION_NEEDED {
            return Err(MemzipError::UnsupportedVersion {
                name,
                version: version_needed,
            });
        }
        if flags & FLAG_ENCRYPTED != 0 {
            return Err(MemzipError::Encrypted { name });
        }
        if let CompressionMethod::Unknown(method) = method {
            return Err(MemzipError::UnsupportedMethod { name, method });
        }
    }

    let name = decode_text(read_slice(data, name_start, name_len)?, utf8);
    let comment = decode_text(
        read_slice(data, name_start + name_len + extra_len, comment_len)?,
        utf8,
    );

    let content_offset = local_content_offset(data, local_header_offset as usize)?;
    let next = name_start + name_len + extra_len + comment_len;

    Ok((
        ZipEntry {
            name,
            comment,
            method,
            flags,
            modified: DosDateTime::new(date, time),
            crc32,
            compressed_size,
            uncompressed_size,
            local_header_offset,
            content_offset,
        },
        next,
    ))
}

/// Validate the local file header at `offset` and return where its data
/// begins. Local name and extra lengths may differ from the central record.
pub fn local_content_offset(data: &[u8], offset: usize) -> Result<usize> {
    let signature = read_u32(data, offset)?;
    if signature != LOCAL_FILE_HEADER_SIG {
        return Err(MemzipError::invalid_magic(
            offset,
            LOCAL_FILE_HEADER_SIG,
            signature,
        ));
    }

    let name_len = read_u16(data, offset + 26)? as usize;
    let extra_len = read_u16(data, offset + 28)? as usize;
    Ok(offset + LOCAL_FILE_HEADER_SIZE + name_len + extra_len)
}

fn read_slice(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| {
            MemzipError::invalid_header(format!(
                "Field of {} bytes at offset {} runs past end of archive ({} bytes)",
                len,
                offset,
                data.len()
            ))
        })
}

fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    let bytes = read_slice(data, offset, 2)?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    let bytes = read_slice(data, offset, 4)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eocd(comment: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&END_OF_CENTRAL_DIR_SIG.to_le_bytes());
        buf.extend_from_slice(&[0; 6]); // disk, cd disk, entries on disk
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&(comment.len() as u16).to_le_bytes());
        buf.extend_from_slice(comment);
        buf
    }

    #[test]
    fn test_compression_method() {
        assert_eq!(CompressionMethod::from_u16(0), CompressionMethod::Stored);
        assert_eq!(CompressionMethod::from_u16(8), CompressionMethod::Deflate);
        assert_eq!(
            CompressionMethod::from_u16(99),
            CompressionMethod::Unknown(99)
        );
        assert_eq!(CompressionMethod::Deflate.to_u16(), 8);
        assert_eq!(CompressionMethod::Unknown(12).to_string(), "Unknown(12)");
    }

    #[test]
    fn test_dos_date_time() {
        // 2011-05-17 13:45:30
        let date = ((2011 - 1980) << 9) | (5 << 5) | 17;
        let time = (13 << 11) | (45 << 5) | 15;
        let dt = DosDateTime::new(date, time);

        assert_eq!(dt.year(), 2011);
        assert_eq!(dt.month(), 5);
        assert_eq!(dt.day(), 17);
        assert_eq!(dt.hour(), 13);
        assert_eq!(dt.minute(), 45);
        assert_eq!(dt.second(), 30);
        assert_eq!(dt.to_string(), "2011-05-17 13:45:30");
    }

    #[test]
    fn test_find_eocd_without_comment() {
        let record = eocd(b"");
        let found = EndOfCentralDirectory::find(&record, MAX_EOCD_SCAN).unwrap();
        assert_eq!(found.offset, 0);
        assert!(found.comment.is_empty());
    }

    #[test]
    fn test_find_eocd_with_comment() {
        let mut data = vec![0xEE; 10];
        data.extend_from_slice(&eocd(b"archive comment"));
        let found = EndOfCentralDirectory::find(&data, MAX_EOCD_SCAN).unwrap();
        assert_eq!(found.offset, 10);
        assert_eq!(found.comment, "archive comment");
    }

    #[test]
    fn test_find_eocd_scan_limit() {
        let comment = vec![b'x'; 100];
        let data = eocd(&comment);

        assert!(EndOfCentralDirectory::find(&data, 122).is_ok());
        let err = EndOfCentralDirectory::find(&data, 121).unwrap_err();
        assert!(matches!(err, MemzipError::InvalidHeader { .. }));
    }

    #[test]
    fn test_find_eocd_too_short() {
        let err = EndOfCentralDirectory::find(&[0x50, 0x4B, 0x05, 0x06], MAX_EOCD_SCAN);
        assert!(matches!(err, Err(MemzipError::InvalidHeader { .. })));
    }

    #[test]
    fn test_find_eocd_multi_disk() {
        let mut data = eocd(b"");
        data[6] = 1; // central directory starts on disk 1
        let err = EndOfCentralDirectory::find(&data, MAX_EOCD_SCAN).unwrap_err();
        assert_eq!(err, MemzipError::MultiDisk { disk: 0, cd_disk: 1 });
    }

    #[test]
    fn test_comment_past_end() {
        let mut data = eocd(b"abc");
        data.truncate(data.len() - 1);
        // Declared comment length 3, only 2 bytes follow
        let err = EndOfCentralDirectory::find(&data, MAX_EOCD_SCAN).unwrap_err();
        assert!(matches!(err, MemzipError::InvalidHeader { .. }));
    }

    fn central_record(
        version: u16,
        flags: u16,
        method: u16,
        name: &[u8],
        comment_len: u16,
    ) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&CENTRAL_DIR_HEADER_SIG.to_le_bytes());
        buf.extend_from_slice(&20u16.to_le_bytes()); // version made by
        buf.extend_from_slice(&version.to_le_bytes());
        buf.extend_from_slice(&flags.to_le_bytes());
        buf.extend_from_slice(&method.to_le_bytes());
        buf.extend_from_slice(&[0; 16]); // time, date, crc, sizes
        buf.extend_from_slice(&(name.len() as u16).to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes()); // extra
        buf.extend_from_slice(&comment_len.to_le_bytes());
        buf.extend_from_slice(&[0; 12]); // disk, attributes, local offset
        buf.extend_from_slice(name);
        buf
    }

    #[test]
    fn test_rejection_before_truncated_fields() {
        // Comment length 40, but the record ends right after the name
        let data = central_record(20, 0, 99, b"a.bin", 40);
        let err = read_central_entry(&data, 0).unwrap_err();
        assert_eq!(
            err,
            MemzipError::UnsupportedMethod {
                name: "a.bin".to_string(),
                method: 99
            }
        );

        let data = central_record(45, 0, 8, b"a.bin", 40);
        assert!(matches!(
            read_central_entry(&data, 0),
            Err(MemzipError::UnsupportedVersion { version: 45, .. })
        ));

        let data = central_record(20, FLAG_ENCRYPTED, 0, b"a.bin", 40);
        assert!(matches!(
            read_central_entry(&data, 0),
            Err(MemzipError::Encrypted { .. })
        ));

        // Name cut short too: the partial name is reported
        let mut data = central_record(20, 0, 12, b"abcdef", 0);
        data.truncate(data.len() - 3);
        assert_eq!(
            read_central_entry(&data, 0).unwrap_err(),
            MemzipError::UnsupportedMethod {
                name: "abc".to_string(),
                method: 12
            }
        );

        // A supported entry with the same truncation is malformed
        let data = central_record(20, 0, 8, b"a.bin", 40);
        assert!(matches!(
            read_central_entry(&data, 0),
            Err(MemzipError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_local_content_offset() {
        let mut data = Vec::new();
        data.extend_from_slice(&LOCAL_FILE_HEADER_SIG.to_le_bytes());
        data.extend_from_slice(&[0; 22]);
        data.extend_from_slice(&5u16.to_le_bytes()); // name
        data.extend_from_slice(&4u16.to_le_bytes()); // extra
        assert_eq!(local_content_offset(&data, 0).unwrap(), 39);

        data[0] = 0;
        assert!(matches!(
            local_content_offset(&data, 0),
            Err(MemzipError::InvalidMagic { offset: 0, .. })
        ));
        assert!(local_content_offset(&data, 20).is_err());
    }

    #[test]
    fn test_checked_reads() {
        let data = [1, 2, 3];
        assert_eq!(read_u16(&data, 1).unwrap(), 0x0302);
        assert!(read_u32(&data, 0).is_err());
        assert!(read_slice(&data, usize::MAX, 2).is_err());
    }
}
