//! Byte-to-text conversion for names, comments and entry contents.

use encoding_rs::WINDOWS_1252;

/// Decode archive bytes to a `String`.
///
/// With `utf8` set (general purpose flag bit 11) the bytes are UTF-8 and
/// invalid sequences are replaced. Otherwise valid UTF-8 is taken as is and
/// anything else is read as Windows-1252, which maps every byte to a
/// character.
pub fn decode_text(bytes: &[u8], utf8: bool) -> String {
    if utf8 {
        return String::from_utf8_lossy(bytes).into_owned();
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => WINDOWS_1252
            .decode_without_bom_handling(bytes)
            .0
            .into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_and_utf8() {
        assert_eq!(decode_text(b"a.txt", false), "a.txt");
        assert_eq!(decode_text("caf\u{e9}".as_bytes(), false), "caf\u{e9}");
        assert_eq!(decode_text("caf\u{e9}".as_bytes(), true), "caf\u{e9}");
    }

    #[test]
    fn test_legacy_fallback() {
        // 0xE9 alone is not UTF-8; in Windows-1252 it is 'é'
        assert_eq!(decode_text(b"caf\xE9", false), "caf\u{e9}");
        // 0x80 is the euro sign in Windows-1252
        assert_eq!(decode_text(b"\x80", false), "\u{20ac}");
    }

    #[test]
    fn test_flagged_utf8_is_lossy() {
        assert_eq!(decode_text(b"caf\xE9", true), "caf\u{fffd}");
    }
}
