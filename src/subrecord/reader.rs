use crate::{
    encoding::decode_windows1252,
    errors::{Error, ErrorKind},
    util::get_split,
    Dialect, Tag,
};

/// A bounds checked cursor over sub-record data
///
/// The reader keeps track of the absolute offset of its data within the file
/// so that errors raised from nested readers still point at the right byte.
#[derive(Debug, Clone)]
pub struct SubRecordReader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
    dialect: Dialect,
}

impl<'a> SubRecordReader<'a> {
    /// Creates a reader over data that starts at offset zero
    #[inline]
    pub fn new(data: &'a [u8], dialect: Dialect) -> Self {
        SubRecordReader::with_base(data, dialect, 0)
    }

    #[inline]
    pub(crate) fn with_base(data: &'a [u8], dialect: Dialect, base: usize) -> Self {
        SubRecordReader {
            data,
            pos: 0,
            base,
            dialect,
        }
    }

    /// The dialect that decides how lengths are read
    #[inline]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Absolute offset of the next byte to be read
    #[inline]
    pub fn position(&self) -> usize {
        self.base + self.pos
    }

    /// Bytes consumed from this reader's data
    #[inline]
    pub fn consumed(&self) -> usize {
        self.pos
    }

    /// Bytes still available
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unread data
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Consume exactly `len` bytes
    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        let rest = self.rest();
        if len > rest.len() {
            return Err(Error::truncated(self.position(), len - rest.len()));
        }

        let (head, _) = rest.split_at(len);
        self.pos += len;
        Ok(head)
    }

    /// Consume exactly `N` bytes as an array
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let (head, _) = get_split::<N>(self.rest())
            .ok_or_else(|| Error::truncated(self.position(), N - self.remaining()))?;
        self.pos += N;
        Ok(head)
    }

    /// Skip `len` bytes without looking at them
    #[inline]
    pub fn skip(&mut self, len: usize) -> Result<(), Error> {
        self.read_bytes(len).map(|_| ())
    }

    /// Split off the next `len` bytes into their own reader
    #[inline]
    pub fn take(&mut self, len: usize) -> Result<SubRecordReader<'a>, Error> {
        let base = self.position();
        let data = self.read_bytes(len)?;
        Ok(SubRecordReader::with_base(data, self.dialect, base))
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        self.read_array::<1>().map(|[x]| x)
    }

    #[inline]
    pub fn read_i8(&mut self) -> Result<i8, Error> {
        self.read_array::<1>().map(i8::from_le_bytes)
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16, Error> {
        self.read_array::<2>().map(u16::from_le_bytes)
    }

    #[inline]
    pub fn read_i16(&mut self) -> Result<i16, Error> {
        self.read_array::<2>().map(i16::from_le_bytes)
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32, Error> {
        self.read_array::<4>().map(u32::from_le_bytes)
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32, Error> {
        self.read_array::<4>().map(i32::from_le_bytes)
    }

    #[inline]
    pub fn read_u64(&mut self) -> Result<u64, Error> {
        self.read_array::<8>().map(u64::from_le_bytes)
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32, Error> {
        self.read_array::<4>().map(f32::from_le_bytes)
    }

    #[inline]
    pub fn read_tag(&mut self) -> Result<Tag, Error> {
        self.read_array::<4>().map(Tag)
    }

    /// The next tag, without consuming it
    #[inline]
    pub fn peek_tag(&self) -> Option<Tag> {
        get_split::<4>(self.rest()).map(|(head, _)| Tag(head))
    }

    /// Step back over the tag that was just read
    #[inline]
    pub fn rewind_tag(&mut self) {
        debug_assert!(self.pos >= 4, "rewind without a preceding tag");
        self.pos = self.pos.saturating_sub(4);
    }

    /// Read a tag and fail unless it is the expected one
    pub fn expect_tag(&mut self, expected: Tag) -> Result<(), Error> {
        let offset = self.position();
        let found = self.read_tag()?;
        if found == expected {
            Ok(())
        } else {
            Err(Error::unexpected_tag(Some(expected), found, offset))
        }
    }

    /// Read a sub-record length in this reader's dialect
    #[inline]
    pub fn read_length(&mut self) -> Result<u32, Error> {
        match self.dialect {
            Dialect::Tes3 => self.read_u32(),
            Dialect::Tes4 => self.read_u16().map(u32::from),
        }
    }

    /// The next sub-record length, without consuming it
    #[inline]
    pub fn peek_length(&self) -> Result<u32, Error> {
        self.clone().read_length()
    }

    /// Read a length and then the value it covers
    pub fn read_value(&mut self) -> Result<&'a [u8], Error> {
        let len = self.read_length()?;
        self.read_bytes(len as usize)
    }

    /// Read a value that must be exactly `N` bytes long
    pub fn read_fixed<const N: usize>(&mut self, tag: Tag) -> Result<[u8; N], Error> {
        let offset = self.position();
        let len = self.read_length()?;
        if len as usize != N {
            return Err(Error::invalid_length(tag, len, offset));
        }

        self.read_array::<N>()
    }

    /// Read a value that must be exactly `len` bytes long as its own reader,
    /// for fields that pack several numbers together
    pub fn read_struct(&mut self, tag: Tag, len: usize) -> Result<SubRecordReader<'a>, Error> {
        let offset = self.position();
        let declared = self.read_length()?;
        if declared as usize != len {
            return Err(Error::invalid_length(tag, declared, offset));
        }

        self.take(len)
    }

    pub fn read_u16_value(&mut self, tag: Tag) -> Result<u16, Error> {
        self.read_fixed::<2>(tag).map(u16::from_le_bytes)
    }

    pub fn read_u32_value(&mut self, tag: Tag) -> Result<u32, Error> {
        self.read_fixed::<4>(tag).map(u32::from_le_bytes)
    }

    pub fn read_i32_value(&mut self, tag: Tag) -> Result<i32, Error> {
        self.read_fixed::<4>(tag).map(i32::from_le_bytes)
    }

    pub fn read_f32_value(&mut self, tag: Tag) -> Result<f32, Error> {
        self.read_fixed::<4>(tag).map(f32::from_le_bytes)
    }

    pub fn read_u64_value(&mut self, tag: Tag) -> Result<u64, Error> {
        self.read_fixed::<8>(tag).map(u64::from_le_bytes)
    }

    /// Read a 4 byte form id that refers to another record. Zero is not a
    /// valid reference.
    pub fn read_form_id(&mut self, tag: Tag) -> Result<u32, Error> {
        let offset = self.position();
        match self.read_u32_value(tag)? {
            0 => Err(Error::out_of_range(tag, offset)),
            id => Ok(id),
        }
    }

    /// Read a value whose length may not exceed `cap`
    pub fn read_capped(&mut self, tag: Tag, cap: u32) -> Result<&'a [u8], Error> {
        let offset = self.position();
        let len = self.read_length()?;
        if len > cap {
            return Err(Error::new(ErrorKind::LengthTooLarge {
                tag,
                length: u64::from(len),
                max: u64::from(cap),
                offset,
            }));
        }

        self.read_bytes(len as usize)
    }

    /// Read a NUL terminated string. The declared length counts the
    /// terminator, which is stripped.
    pub fn read_string(&mut self, tag: Tag, cap: u32) -> Result<String, Error> {
        let offset = self.position();
        let value = self.read_capped(tag, cap)?;
        match value.split_last() {
            Some((0, text)) => Ok(decode_windows1252(text).into_owned()),
            _ => Err(Error::invalid_length(tag, value.len() as u32, offset)),
        }
    }

    /// Read a string stored without a terminator
    pub fn read_unterminated_string(&mut self, tag: Tag, cap: u32) -> Result<String, Error> {
        let value = self.read_capped(tag, cap)?;
        Ok(decode_windows1252(value).into_owned())
    }

    /// Read a string that may or may not carry a terminator, reporting which
    pub fn read_text(&mut self, tag: Tag, cap: u32) -> Result<(String, bool), Error> {
        let value = self.read_capped(tag, cap)?;
        match value.split_last() {
            Some((0, text)) => Ok((decode_windows1252(text).into_owned(), true)),
            _ => Ok((decode_windows1252(value).into_owned(), false)),
        }
    }

    /// Read an opaque value
    pub fn read_blob(&mut self, tag: Tag, cap: u32) -> Result<Vec<u8>, Error> {
        self.read_capped(tag, cap).map(|x| x.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn tes4(data: &[u8]) -> SubRecordReader<'_> {
        SubRecordReader::new(data, Dialect::Tes4)
    }

    #[test]
    fn test_read_string() {
        let mut reader = tes4(b"EDID\x08\0Gold001\0");
        assert_eq!(reader.read_tag().unwrap(), Tag::EDID);
        assert_eq!(reader.read_string(Tag::EDID, 512).unwrap(), "Gold001");
        assert!(reader.is_empty());
        assert_eq!(reader.position(), 14);
    }

    #[test]
    fn test_read_string_legacy_length() {
        let data = b"MAST\x0E\0\0\0Morrowind.esm\0";
        let mut reader = SubRecordReader::new(&data[..], Dialect::Tes3);
        reader.expect_tag(Tag::MAST).unwrap();
        assert_eq!(reader.read_string(Tag::MAST, 256).unwrap(), "Morrowind.esm");
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_string_requires_terminator() {
        let mut reader = tes4(b"\x07\0Gold001");
        let err = reader.read_string(Tag::EDID, 512).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidLength {
                tag: Tag::EDID,
                length: 7,
                offset: 0
            }
        ));

        let mut reader = tes4(b"\0\0");
        assert!(reader.read_string(Tag::EDID, 512).is_err());
    }

    #[test]
    fn test_read_string_cap() {
        let mut reader = tes4(b"\x08\0Gold001\0");
        let err = reader.read_string(Tag::EDID, 7).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::LengthTooLarge {
                length: 8,
                max: 7,
                ..
            }
        ));
    }

    #[test]
    fn test_string_truncated_at_every_offset() {
        let data = b"\x08\0Gold001\0";
        for i in 0..data.len() {
            let mut reader = tes4(&data[..i]);
            let err = reader.read_string(Tag::EDID, 512).unwrap_err();
            assert!(
                matches!(err.kind(), ErrorKind::Truncated { .. }),
                "offset {}",
                i
            );
        }
    }

    #[rstest]
    #[case(b"\x03\0\0\0\0", 3)]
    #[case(b"\x05\0\0\0\0\0\0\0", 5)]
    fn test_read_fixed_wrong_length(#[case] data: &[u8], #[case] length: u32) {
        let mut reader = tes4(data);
        let err = reader.read_u32_value(Tag::QUAL).unwrap_err();
        match err.kind() {
            ErrorKind::InvalidLength { tag, length: l, .. } => {
                assert_eq!(*tag, Tag::QUAL);
                assert_eq!(*l, length);
            }
            x => panic!("unexpected error {:?}", x),
        }
    }

    #[test]
    fn test_read_struct() {
        let mut reader = tes4(b"\x08\0\x01\0\0\0\0\0\x80\x3F");
        let mut data = reader.read_struct(Tag::DATA, 8).unwrap();
        assert_eq!(data.position(), 2);
        assert_eq!(data.read_u32().unwrap(), 1);
        assert_eq!(data.read_f32().unwrap(), 1.0);
        assert!(data.is_empty());
        assert!(reader.is_empty());

        let mut reader = tes4(b"\x08\0\x01\0\0\0\0\0\x80\x3F");
        assert!(reader.read_struct(Tag::DATA, 12).is_err());
    }

    #[test]
    fn test_form_id_must_be_set() {
        let mut reader = tes4(b"\x04\0\x52\xE9\x03\0");
        assert_eq!(reader.read_form_id(Tag::YNAM).unwrap(), 0x0003_E952);

        let mut reader = tes4(b"\x04\0\0\0\0\0");
        let err = reader.read_form_id(Tag::YNAM).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::OutOfRange { tag: Tag::YNAM, .. }));
    }

    #[test]
    fn test_peek_and_rewind() {
        let mut reader = tes4(b"SCRIDATA");
        assert_eq!(reader.peek_tag(), Some(Tag::SCRI));
        assert_eq!(reader.consumed(), 0);
        assert_eq!(reader.read_tag().unwrap(), Tag::SCRI);
        assert_eq!(reader.read_tag().unwrap(), Tag::DATA);
        reader.rewind_tag();
        assert_eq!(reader.consumed(), 4);
        assert_eq!(reader.peek_tag(), Some(Tag::DATA));
    }

    #[test]
    fn test_peek_tag_short_input() {
        assert_eq!(tes4(b"SCR").peek_tag(), None);
        assert!(matches!(
            tes4(b"SCR").read_tag().unwrap_err().kind(),
            ErrorKind::Truncated { offset: 0, needed: 1 }
        ));
    }

    #[test]
    fn test_expect_tag() {
        let mut reader = tes4(b"FAIL");
        let err = reader.expect_tag(Tag::EDID).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnexpectedTag {
                expected: Some(Tag::EDID),
                found,
                offset: 0
            } if *found == Tag::new(b"FAIL")
        ));
    }

    #[test]
    fn test_take_keeps_absolute_offsets() {
        let mut reader = tes4(b"0123EDID\x02\0");
        reader.skip(4).unwrap();
        let mut sub = reader.take(6).unwrap();
        assert!(reader.is_empty());
        assert_eq!(sub.position(), 4);
        sub.read_tag().unwrap();
        let err = sub.read_value().unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::Truncated { offset: 10, needed: 2 }
        ));
    }

    #[test]
    fn test_read_text_terminators() {
        let data = b"\x05\0\0\0abcd\0\x04\0\0\0abcd";
        let mut reader = SubRecordReader::new(&data[..], Dialect::Tes3);
        assert_eq!(
            reader.read_text(Tag::DESC, 1024).unwrap(),
            (String::from("abcd"), true)
        );
        assert_eq!(
            reader.read_text(Tag::DESC, 1024).unwrap(),
            (String::from("abcd"), false)
        );
    }
}
