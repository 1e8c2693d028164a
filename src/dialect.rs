use crate::Tag;

/// The two wire conventions of master and plugin files
///
/// The legacy dialect prefixes every sub-record value with a 4 byte length and
/// uses 16 byte record headers. The newer dialect uses 2 byte lengths, 24 byte
/// record headers that carry a form id, nested groups, and optionally
/// localized strings.
///
/// ```
/// use tesfile::Dialect;
///
/// assert_eq!(Dialect::Tes3.length_width(), 4);
/// assert_eq!(Dialect::Tes4.length_width(), 2);
/// assert_eq!(Dialect::Tes4.record_header_len(), 24);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Dialect {
    /// Morrowind era files
    Tes3,

    /// Skyrim era files
    Tes4,
}

impl Dialect {
    /// Number of bytes used to encode a sub-record length
    #[inline]
    pub const fn length_width(self) -> usize {
        match self {
            Dialect::Tes3 => 4,
            Dialect::Tes4 => 2,
        }
    }

    /// Largest length a sub-record may declare
    #[inline]
    pub const fn max_length(self) -> u32 {
        match self {
            Dialect::Tes3 => u32::MAX,
            Dialect::Tes4 => u16::MAX as u32,
        }
    }

    /// Number of bytes in a record header, tag included
    #[inline]
    pub const fn record_header_len(self) -> usize {
        match self {
            Dialect::Tes3 => 16,
            Dialect::Tes4 => 24,
        }
    }

    /// The tag every file of this dialect starts with
    #[inline]
    pub const fn magic(self) -> Tag {
        match self {
            Dialect::Tes3 => Tag::TES3,
            Dialect::Tes4 => Tag::TES4,
        }
    }

    /// Guess the dialect from the first four bytes of a file
    pub fn detect(data: &[u8]) -> Option<Dialect> {
        match data.first_chunk::<4>().map(|x| Tag(*x)) {
            Some(Tag::TES3) => Some(Dialect::Tes3),
            Some(Tag::TES4) => Some(Dialect::Tes4),
            _ => None,
        }
    }
}
