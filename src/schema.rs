//! Declarative description of which sub-records a record may contain.
//!
//! Every record type carries a static [`Schema`]: the legal tags, how often
//! each may appear, and what length each may declare. [`Schema::decode_fields`]
//! drives the tag loop, enforces all of that, and hands each validated field to
//! the record's visitor. Field order is not checked; a field's shape is.

use crate::{
    errors::{Error, ErrorKind},
    subrecord::SubRecordReader,
    Tag,
};

/// How many times a sub-record may appear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    RequiredOnce,
    OptionalOnce,
    OptionalRepeatable,
}

/// The lengths a sub-record may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    /// Exactly this many bytes
    Fixed(u32),

    /// Any one of the listed lengths
    OneOf(&'static [u32]),

    /// At most this many bytes
    Capped(u32),

    /// A non-zero multiple of the given width
    MultipleOf(u32),

    /// Validated by the field's own reader
    Any,
}

impl Length {
    pub fn check(&self, len: u32) -> bool {
        match *self {
            Length::Fixed(expected) => len == expected,
            Length::OneOf(options) => options.contains(&len),
            Length::Capped(max) => len <= max,
            Length::MultipleOf(width) => width != 0 && len != 0 && len % width == 0,
            Length::Any => true,
        }
    }
}

/// One legal sub-record of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub tag: Tag,
    pub cardinality: Cardinality,
    pub length: Length,
}

impl FieldSpec {
    pub const fn required(tag: Tag, length: Length) -> Self {
        FieldSpec {
            tag,
            cardinality: Cardinality::RequiredOnce,
            length,
        }
    }

    pub const fn optional(tag: Tag, length: Length) -> Self {
        FieldSpec {
            tag,
            cardinality: Cardinality::OptionalOnce,
            length,
        }
    }

    pub const fn repeatable(tag: Tag, length: Length) -> Self {
        FieldSpec {
            tag,
            cardinality: Cardinality::OptionalRepeatable,
            length,
        }
    }
}

/// How the end of a record's fields is found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    /// The header's size is the only terminator. Every tag inside it must be
    /// legal.
    SizeBounded,

    /// Fields continue until the declared size is reached or a tag that is
    /// not part of the schema appears. That tag is left unread for the caller.
    SentinelBounded,
}

/// A set of mutually exclusive value tags that may only appear after a given
/// source field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Branch {
    pub after: Tag,
    pub choices: &'static [Tag],
}

/// The legal layout of one record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub record: Tag,
    pub discipline: Discipline,
    pub fields: &'static [FieldSpec],
    pub branches: &'static [Branch],
}

impl Schema {
    /// Index and spec of the given tag, if it is legal in this record
    pub fn field(&self, tag: Tag) -> Option<(usize, &FieldSpec)> {
        self.fields.iter().enumerate().find(|(_, x)| x.tag == tag)
    }

    /// Decode sub-records, calling `visit` for each with the reader
    /// positioned at the field's length.
    ///
    /// `declared` is the payload size from the record header. Size bounded
    /// schemas expect the reader to cover exactly the payload and ignore it.
    pub fn decode_fields<'a, F>(
        &self,
        reader: &mut SubRecordReader<'a>,
        declared: usize,
        mut visit: F,
    ) -> Result<(), Error>
    where
        F: FnMut(Tag, &mut SubRecordReader<'a>) -> Result<(), Error>,
    {
        let start = reader.consumed();
        let mut seen = vec![0u32; self.fields.len()];

        loop {
            let consumed = reader.consumed() - start;
            let done = match self.discipline {
                Discipline::SizeBounded => reader.is_empty(),
                Discipline::SentinelBounded => consumed >= declared || reader.is_empty(),
            };

            if done {
                break;
            }

            let offset = reader.position();
            let tag = reader.read_tag()?;
            let (index, spec) = match self.field(tag) {
                Some(x) => x,
                None if self.discipline == Discipline::SentinelBounded => {
                    reader.rewind_tag();
                    break;
                }
                None => return Err(Error::unexpected_tag(None, tag, offset)),
            };

            if seen[index] > 0 && spec.cardinality != Cardinality::OptionalRepeatable {
                return Err(self.duplicate(tag, offset));
            }

            if let Some(branch) = self.branches.iter().find(|x| x.choices.contains(&tag)) {
                if !self.was_seen(&seen, branch.after) {
                    return Err(Error::unexpected_tag(Some(branch.after), tag, offset));
                }

                let other = branch
                    .choices
                    .iter()
                    .any(|&x| x != tag && self.was_seen(&seen, x));
                if other {
                    return Err(self.duplicate(tag, offset));
                }
            }

            let len = reader.peek_length()?;
            if !spec.length.check(len) {
                return Err(match spec.length {
                    Length::Capped(max) => Error::new(ErrorKind::LengthTooLarge {
                        tag,
                        length: u64::from(len),
                        max: u64::from(max),
                        offset: offset + 4,
                    }),
                    _ => Error::invalid_length(tag, len, offset + 4),
                });
            }

            visit(tag, reader)?;
            seen[index] += 1;
        }

        let missing = self
            .fields
            .iter()
            .zip(seen.iter())
            .find(|(spec, count)| spec.cardinality == Cardinality::RequiredOnce && **count == 0);

        if let Some((spec, _)) = missing {
            return Err(Error::missing_field(self.record, spec.tag));
        }

        let consumed = reader.consumed() - start;
        if self.discipline == Discipline::SentinelBounded && consumed != declared {
            tracing::warn!(
                record = %self.record,
                offset = reader.position(),
                declared,
                consumed,
                "record fields ended away from the declared size"
            );
        }

        Ok(())
    }

    fn was_seen(&self, seen: &[u32], tag: Tag) -> bool {
        self.field(tag).map_or(false, |(index, _)| seen[index] > 0)
    }

    fn duplicate(&self, field: Tag, offset: usize) -> Error {
        Error::new(ErrorKind::DuplicateField {
            record: self.record,
            field,
            offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dialect;
    use rstest::*;

    const NAME: Tag = Tag::new(b"NAME");
    const FLTV: Tag = Tag::new(b"FLTV");
    const INTV: Tag = Tag::new(b"INTV");

    static BOUNDED: Schema = Schema {
        record: Tag::new(b"TEST"),
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(NAME, Length::Capped(8)),
            FieldSpec::optional(Tag::new(b"DATA"), Length::Fixed(4)),
            FieldSpec::repeatable(Tag::new(b"ITEM"), Length::OneOf(&[1, 2])),
            FieldSpec::optional(FLTV, Length::Fixed(4)),
            FieldSpec::optional(INTV, Length::Fixed(4)),
        ],
        branches: &[Branch {
            after: NAME,
            choices: &[FLTV, INTV],
        }],
    };

    static SENTINEL: Schema = Schema {
        record: Tag::new(b"TEST"),
        discipline: Discipline::SentinelBounded,
        fields: &[
            FieldSpec::required(NAME, Length::Capped(8)),
            FieldSpec::optional(Tag::new(b"DATA"), Length::Fixed(4)),
        ],
        branches: &[],
    };

    fn decode(schema: &Schema, data: &[u8]) -> Result<(Vec<Tag>, usize), Error> {
        let mut reader = SubRecordReader::new(data, Dialect::Tes4);
        let mut tags = Vec::new();
        schema.decode_fields(&mut reader, data.len(), |tag, r| {
            tags.push(tag);
            r.read_value().map(|_| ())
        })?;
        Ok((tags, reader.consumed()))
    }

    fn decode_sized(data: &[u8], declared: usize) -> Result<(Vec<Tag>, usize), Error> {
        let mut reader = SubRecordReader::new(data, Dialect::Tes4);
        let mut tags = Vec::new();
        SENTINEL.decode_fields(&mut reader, declared, |tag, r| {
            tags.push(tag);
            r.read_value().map(|_| ())
        })?;
        Ok((tags, reader.consumed()))
    }

    #[test]
    fn test_bounded_decode() {
        let data = b"NAME\x02\0abITEM\x01\0\x01ITEM\x02\0\x01\x02DATA\x04\0\0\0\0\0";
        let (tags, consumed) = decode(&BOUNDED, data).unwrap();
        assert_eq!(tags.len(), 4);
        assert_eq!(consumed, data.len());
    }

    #[test]
    fn test_bounded_unknown_tag() {
        let err = decode(&BOUNDED, b"NAME\x02\0abXXXX\x01\0\x01").unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnexpectedTag {
                expected: None,
                offset: 8,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_required() {
        let err = decode(&BOUNDED, b"DATA\x04\0\0\0\0\0").unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::MissingField { field: NAME, .. }
        ));
    }

    #[test]
    fn test_duplicate_optional() {
        let err = decode(&BOUNDED, b"NAME\x01\0aDATA\x04\0\0\0\0\0DATA\x04\0\0\0\0\0").unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::DuplicateField { offset: 17, .. }
        ));
    }

    #[rstest]
    #[case(&b"NAME\x01\0aDATA\x03\0\0\0\0"[..], 3)]
    #[case(&b"NAME\x01\0aDATA\x05\0\0\0\0\0\0"[..], 5)]
    #[case(&b"NAME\x01\0aITEM\x03\0\0\0\0"[..], 3)]
    fn test_invalid_length(#[case] data: &[u8], #[case] expected: u32) {
        let err = decode(&BOUNDED, data).unwrap_err();
        match err.kind() {
            ErrorKind::InvalidLength { length, offset, .. } => {
                assert_eq!(*length, expected);
                assert_eq!(*offset, 11);
            }
            x => panic!("unexpected error {:?}", x),
        }
    }

    #[test]
    fn test_capped_length() {
        let err = decode(&BOUNDED, b"NAME\x09\0abcdefghi").unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::LengthTooLarge { length: 9, max: 8, .. }
        ));
    }

    #[test]
    fn test_branch_requires_source() {
        let err = decode(&BOUNDED, b"FLTV\x04\0\0\0\0\0NAME\x01\0a").unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnexpectedTag {
                expected: Some(NAME),
                found: FLTV,
                ..
            }
        ));
    }

    #[test]
    fn test_branch_is_exclusive() {
        let data = b"NAME\x01\0aFLTV\x04\0\0\0\0\0INTV\x04\0\0\0\0\0";
        let err = decode(&BOUNDED, data).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::DuplicateField { field: INTV, .. }
        ));
    }

    #[test]
    fn test_sentinel_rewinds_exactly() {
        let data = b"NAME\x01\0aDATA\x04\0\0\0\0\0MGEF";
        let (tags, consumed) = decode_sized(data, 100).unwrap();
        assert_eq!(tags, vec![NAME, Tag::DATA]);
        assert_eq!(consumed, 17);
        assert_eq!(&data[consumed..], b"MGEF");
    }

    #[test]
    fn test_sentinel_rewinds_without_continuation() {
        let data = b"NAME\x01\0aSPEL";
        let (tags, consumed) = decode_sized(data, 100).unwrap();
        assert_eq!(tags, vec![NAME]);
        assert_eq!(consumed, 7);
    }

    #[test]
    fn test_sentinel_stops_at_declared_size() {
        let data = b"NAME\x01\0aDATA\x04\0\0\0\0\0";
        let (tags, consumed) = decode_sized(data, 7).unwrap();
        assert_eq!(tags, vec![NAME]);
        assert_eq!(consumed, 7);
    }

    #[test]
    fn test_sentinel_partial_tag() {
        let err = decode_sized(b"NAME\x01\0aDA", 100).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::Truncated { offset: 7, needed: 2 }
        ));
    }

    #[rstest]
    #[case(Length::Fixed(4), 4, true)]
    #[case(Length::Fixed(4), 5, false)]
    #[case(Length::OneOf(&[40, 44]), 44, true)]
    #[case(Length::OneOf(&[40, 44]), 42, false)]
    #[case(Length::MultipleOf(8), 16, true)]
    #[case(Length::MultipleOf(8), 0, false)]
    #[case(Length::MultipleOf(8), 12, false)]
    #[case(Length::Capped(512), 512, true)]
    #[case(Length::Capped(512), 513, false)]
    fn test_length_check(#[case] length: Length, #[case] len: u32, #[case] expected: bool) {
        assert_eq!(length.check(len), expected);
    }
}
