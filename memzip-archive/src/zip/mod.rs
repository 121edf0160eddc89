//! ZIP archive format support.
//!
//! This module reads ZIP archives held entirely in memory, as specified in
//! the PKWARE APPNOTE. Only single-disk archives with stored or deflated,
//! unencrypted entries are accepted.

mod archive;
mod header;

pub use archive::{ZipArchive, ZipOptions};
pub use header::{
    CENTRAL_DIR_HEADER_SIG, CompressionMethod, DosDateTime, END_OF_CENTRAL_DIR_SIG,
    EndOfCentralDirectory, LOCAL_FILE_HEADER_SIG, MAX_EOCD_SCAN, MAX_VERSION_NEEDED, ZipEntry,
};

use memzip_core::error::Result;

/// Open a ZIP archive held in memory.
pub fn read_zip(data: &[u8]) -> Result<ZipArchive<'_>> {
    ZipArchive::open(data)
}
