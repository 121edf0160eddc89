//! Archive and stream builders shared by the integration tests.

#![allow(dead_code)]

use memzip_core::Crc32;

/// Fixed-Huffman block "AAAA" + end of block.
pub const DEFLATED_AAAA: [u8; 6] = [0x73, 0x74, 0x74, 0x74, 0x04, 0x00];

/// One entry to be written by [`ZipBuilder`].
#[derive(Debug, Clone)]
pub struct TestEntry {
    pub name: Vec<u8>,
    pub payload: Vec<u8>,
    pub method: u16,
    pub version: u16,
    pub flags: u16,
    pub crc: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub date: u16,
    pub time: u16,
    pub local_extra: Vec<u8>,
    pub central_extra: Vec<u8>,
    pub comment: Vec<u8>,
}

impl TestEntry {
    pub fn stored(name: &str, content: &[u8]) -> Self {
        Self::raw(name.as_bytes(), content.to_vec(), 0, content)
    }

    pub fn deflated(name: &str, compressed: &[u8], content: &[u8]) -> Self {
        Self::raw(name.as_bytes(), compressed.to_vec(), 8, content)
    }

    pub fn raw(name: &[u8], payload: Vec<u8>, method: u16, content: &[u8]) -> Self {
        Self {
            name: name.to_vec(),
            compressed_size: payload.len() as u32,
            payload,
            method,
            version: 20,
            flags: 0,
            crc: Crc32::compute(content),
            uncompressed_size: content.len() as u32,
            date: 0,
            time: 0,
            local_extra: Vec::new(),
            central_extra: Vec::new(),
            comment: Vec::new(),
        }
    }

    pub fn method(mut self, method: u16) -> Self {
        self.method = method;
        self
    }

    pub fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    pub fn flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    pub fn crc(mut self, crc: u32) -> Self {
        self.crc = crc;
        self
    }

    pub fn sizes(mut self, compressed: u32, uncompressed: u32) -> Self {
        self.compressed_size = compressed;
        self.uncompressed_size = uncompressed;
        self
    }

    pub fn modified(mut self, date: u16, time: u16) -> Self {
        self.date = date;
        self.time = time;
        self
    }

    pub fn local_extra(mut self, extra: &[u8]) -> Self {
        self.local_extra = extra.to_vec();
        self
    }

    pub fn central_extra(mut self, extra: &[u8]) -> Self {
        self.central_extra = extra.to_vec();
        self
    }

    pub fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }
}

/// Writes a single-disk ZIP archive byte for byte.
#[derive(Debug, Clone, Default)]
pub struct ZipBuilder {
    entries: Vec<TestEntry>,
    comment: Vec<u8>,
    disk: u16,
    cd_disk: u16,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, entry: TestEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    pub fn disks(mut self, disk: u16, cd_disk: u16) -> Self {
        self.disk = disk;
        self.cd_disk = cd_disk;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut local_offsets = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            local_offsets.push(out.len() as u32);
            put32(&mut out, 0x04034B50);
            put16(&mut out, entry.version);
            put16(&mut out, entry.flags);
            put16(&mut out, entry.method);
            put16(&mut out, entry.time);
            put16(&mut out, entry.date);
            put32(&mut out, entry.crc);
            put32(&mut out, entry.compressed_size);
            put32(&mut out, entry.uncompressed_size);
            put16(&mut out, entry.name.len() as u16);
            put16(&mut out, entry.local_extra.len() as u16);
            out.extend_from_slice(&entry.name);
            out.extend_from_slice(&entry.local_extra);
            out.extend_from_slice(&entry.payload);
        }

        let cd_offset = out.len() as u32;
        for (entry, &local_offset) in self.entries.iter().zip(&local_offsets) {
            put32(&mut out, 0x02014B50);
            put16(&mut out, 20); // version made by
            put16(&mut out, entry.version);
            put16(&mut out, entry.flags);
            put16(&mut out, entry.method);
            put16(&mut out, entry.time);
            put16(&mut out, entry.date);
            put32(&mut out, entry.crc);
            put32(&mut out, entry.compressed_size);
            put32(&mut out, entry.uncompressed_size);
            put16(&mut out, entry.name.len() as u16);
            put16(&mut out, entry.central_extra.len() as u16);
            put16(&mut out, entry.comment.len() as u16);
            put16(&mut out, 0); // disk number start
            put16(&mut out, 0); // internal attributes
            put32(&mut out, 0); // external attributes
            put32(&mut out, local_offset);
            out.extend_from_slice(&entry.name);
            out.extend_from_slice(&entry.central_extra);
            out.extend_from_slice(&entry.comment);
        }
        let cd_size = out.len() as u32 - cd_offset;

        put32(&mut out, 0x06054B50);
        put16(&mut out, self.disk);
        put16(&mut out, self.cd_disk);
        put16(&mut out, self.entries.len() as u16);
        put16(&mut out, self.entries.len() as u16);
        put32(&mut out, cd_size);
        put32(&mut out, cd_offset);
        put16(&mut out, self.comment.len() as u16);
        out.extend_from_slice(&self.comment);
        out
    }
}

fn put16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// One final fixed-Huffman block holding `content` as plain literals.
pub fn fixed_literals(content: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut acc = 0u32;
    let mut nbits = 0u32;

    let mut put = |value: u32, count: u32, bytes: &mut Vec<u8>| {
        // Huffman codes are sent most significant bit first
        for i in (0..count).rev() {
            acc |= ((value >> i) & 1) << nbits;
            nbits += 1;
            if nbits == 8 {
                bytes.push(acc as u8);
                acc = 0;
                nbits = 0;
            }
        }
    };

    // BFINAL = 1, BTYPE = 01 (bits go out LSB first, so write them singly)
    put(1, 1, &mut bytes);
    put(1, 1, &mut bytes);
    put(0, 1, &mut bytes);
    for &byte in content {
        match byte {
            0..=143 => put(0x30 + byte as u32, 8, &mut bytes),
            _ => put(0x190 + byte as u32 - 144, 9, &mut bytes),
        }
    }
    put(0, 7, &mut bytes);

    if nbits > 0 {
        bytes.push(acc as u8);
    }
    bytes
}
