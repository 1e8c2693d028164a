use crate::data::{windows_1252_byte, WINDOWS_1252};
use std::borrow::Cow;

/// Converts between text stored in master files and rust strings
///
/// Both dialects store text as windows-1252. Every byte decodes to exactly one
/// character, and encoding reverses the mapping, so text decoded from a file
/// always encodes back to the same bytes.
///
/// ```
/// use tesfile::Windows1252Encoding;
///
/// assert_eq!(Windows1252Encoding::decode(b"Gold001"), "Gold001");
/// assert_eq!(Windows1252Encoding::decode(b"Hauptdatei f\xfcr Morrowind"), "Hauptdatei für Morrowind");
/// assert_eq!(Windows1252Encoding::decode(b"\x80\x8a"), "€Š");
///
/// assert_eq!(Windows1252Encoding::encode("für").as_deref(), Some(&b"f\xfcr"[..]));
/// assert_eq!(Windows1252Encoding::encode("Ā"), None);
/// ```
#[derive(Debug, Default, Copy, Clone)]
pub struct Windows1252Encoding;

impl Windows1252Encoding {
    /// Creates a new windows 1252 codec
    pub fn new() -> Self {
        Windows1252Encoding
    }

    /// Decode windows-1252 bytes, borrowing when the data is ascii
    pub fn decode(data: &[u8]) -> Cow<'_, str> {
        decode_windows1252(data)
    }

    /// Encode text as windows-1252, borrowing when the text is ascii.
    /// Returns `None` when a character has no windows-1252 byte.
    pub fn encode(text: &str) -> Option<Cow<'_, [u8]>> {
        encode_windows1252(text)
    }
}

#[inline]
pub(crate) fn decode_windows1252(d: &[u8]) -> Cow<'_, str> {
    if d.is_ascii() {
        if let Ok(s) = std::str::from_utf8(d) {
            return Cow::Borrowed(s);
        }
    }

    Cow::Owned(d.iter().map(|&x| WINDOWS_1252[usize::from(x)]).collect())
}

#[inline]
pub(crate) fn encode_windows1252(s: &str) -> Option<Cow<'_, [u8]>> {
    if s.is_ascii() {
        return Some(Cow::Borrowed(s.as_bytes()));
    }

    s.chars()
        .map(windows_1252_byte)
        .collect::<Option<Vec<u8>>>()
        .map(Cow::Owned)
}
