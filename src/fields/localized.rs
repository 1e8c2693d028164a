use crate::{
    subrecord::{SubRecordReader, SubRecordWriter},
    Error, StringTable, Tag,
};
use std::io::Write;

/// Text that is either stored inline or as an index into a string table
///
/// A localized plugin stores a 4 byte index for every localizable field. A
/// non-localized plugin stores NUL terminated text. Whichever form was read
/// is the form that is written back.
///
/// ```
/// use std::collections::HashMap;
/// use tesfile::{fields::LocalizedString, subrecord::SubRecordReader, Dialect, Tag};
///
/// let data = b"\x04\0\x7c\x26\x01\0";
/// let mut reader = SubRecordReader::new(&data[..], Dialect::Tes4);
/// let name = LocalizedString::read(&mut reader, Tag::FULL, true, 512)?;
/// assert_eq!(name, LocalizedString::Index(0x0001267C));
///
/// let mut table = HashMap::new();
/// table.insert(0x0001267C, "foo bar");
/// assert_eq!(name.resolve(&table), Some("foo bar"));
/// # Ok::<(), tesfile::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LocalizedString {
    /// The field is not present in the record
    #[default]
    Absent,

    /// Text stored directly in the record
    Inline(String),

    /// Index into an external string table
    Index(u32),
}

impl LocalizedString {
    /// Decode the field's length and value. The tag must already have been
    /// consumed.
    pub fn read(
        reader: &mut SubRecordReader,
        tag: Tag,
        localized: bool,
        cap: u32,
    ) -> Result<Self, Error> {
        if localized {
            reader.read_u32_value(tag).map(LocalizedString::Index)
        } else {
            reader.read_string(tag, cap).map(LocalizedString::Inline)
        }
    }

    /// Write the field in the form it was decoded with. Absent fields write
    /// nothing.
    pub fn write<W: Write>(&self, tag: Tag, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        match self {
            LocalizedString::Absent => Ok(()),
            LocalizedString::Inline(text) => writer.write_string(tag, text),
            LocalizedString::Index(index) => writer.write_u32_value(tag, *index),
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, LocalizedString::Absent)
    }

    pub fn as_inline(&self) -> Option<&str> {
        match self {
            LocalizedString::Inline(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_index(&self) -> Option<u32> {
        match self {
            LocalizedString::Index(index) => Some(*index),
            _ => None,
        }
    }

    /// The display text. Index zero is the empty string and never consults
    /// the table.
    pub fn resolve<'a, T>(&'a self, table: &'a T) -> Option<&'a str>
    where
        T: StringTable + ?Sized,
    {
        match self {
            LocalizedString::Absent => None,
            LocalizedString::Inline(text) => Some(text.as_str()),
            LocalizedString::Index(0) => Some(""),
            LocalizedString::Index(index) => table.lookup(*index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{subrecord::MAX_STRING, Dialect};
    use std::collections::HashMap;

    fn decode(data: &[u8], localized: bool) -> LocalizedString {
        let mut reader = SubRecordReader::new(data, Dialect::Tes4);
        reader.expect_tag(Tag::FULL).unwrap();
        let value = LocalizedString::read(&mut reader, Tag::FULL, localized, MAX_STRING).unwrap();
        assert!(reader.is_empty());
        value
    }

    fn encode(value: &LocalizedString) -> Vec<u8> {
        let mut out = Vec::new();
        value
            .write(Tag::FULL, &mut SubRecordWriter::new(&mut out, Dialect::Tes4))
            .unwrap();
        out
    }

    #[test]
    fn test_indexed_round_trip() {
        let data = b"FULL\x04\0\x7c\x26\x01\0";
        let value = decode(data, true);
        assert_eq!(value.as_index(), Some(0x0001_267C));
        assert_eq!(encode(&value).as_slice(), &data[..]);
    }

    #[test]
    fn test_inline_round_trip() {
        let data = b"FULL\x0A\0foo bar 3\0";
        let value = decode(data, false);
        assert_eq!(value.as_inline(), Some("foo bar 3"));
        assert_eq!(encode(&value).as_slice(), &data[..]);
    }

    #[test]
    fn test_absent_writes_nothing() {
        let value = LocalizedString::default();
        assert!(!value.is_present());
        assert!(encode(&value).is_empty());
    }

    #[test]
    fn test_resolve() {
        let mut table = HashMap::new();
        table.insert(0x0102_347Cu32, String::from("foo bar baz"));

        assert_eq!(LocalizedString::Index(0x0102_347C).resolve(&table), Some("foo bar baz"));
        assert_eq!(LocalizedString::Index(0).resolve(&table), Some(""));
        assert_eq!(LocalizedString::Index(5).resolve(&table), None);
        assert_eq!(
            LocalizedString::Inline(String::from("Gold")).resolve(&table),
            Some("Gold")
        );
        assert_eq!(LocalizedString::Absent.resolve(&table), None);
    }

    #[test]
    fn test_indexed_wrong_length() {
        let data = b"\x05\0\x7c\x26\x01\0\0";
        let mut reader = SubRecordReader::new(&data[..], Dialect::Tes4);
        assert!(LocalizedString::read(&mut reader, Tag::FULL, true, MAX_STRING).is_err());
    }
}
