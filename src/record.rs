//! Generic record decoding and encoding.
//!
//! A record type implements [`RecordKind`]: it names its header type, its
//! registry key, and its static [`Schema`], and it receives each validated
//! field through [`RecordKind::visit_field`]. [`decode_record`] and
//! [`encode_record`] do the rest: header handling, the deleted short-circuit,
//! compressed payloads, and exact size computation.

mod group;
mod header;

pub use group::GroupHeader;
pub use header::{RecordHeader, Tes3Header, Tes4Header};

use crate::{
    errors::{Error, ErrorKind},
    schema::{Discipline, Schema},
    subrecord::{SizeCounter, SubRecordReader, SubRecordWriter},
    util::{get_split, le_u32},
    Dialect, Tag,
};
use flate2::{read::ZlibDecoder, write::ZlibEncoder};
use std::{
    convert::TryFrom,
    fmt,
    hash::Hash,
    io::{Read, Write},
};

/// Largest inflated payload that is allocated up front
const MAX_PREALLOC: usize = 1 << 20;

/// Per-call decoding options
///
/// ```
/// use tesfile::record::DecodeOptions;
///
/// let options = DecodeOptions::new().localized(true);
/// assert!(options.is_localized());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    localized: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        DecodeOptions::default()
    }

    /// Whether localizable fields hold string table indices instead of text
    pub fn localized(mut self, localized: bool) -> Self {
        self.localized = localized;
        self
    }

    pub fn is_localized(&self) -> bool {
        self.localized
    }
}

/// A record type: its schema, key, and field handling
///
/// A value starts out as `Default::default()`, receives every field the
/// schema accepts, and is then checked by [`RecordKind::finish`].
pub trait RecordKind: Default + Clone + PartialEq + fmt::Debug {
    type Header: RecordHeader;
    type Key: Clone + Eq + Hash + fmt::Debug;

    const SCHEMA: Schema;

    /// Whether a payload size of zero marks the record deleted
    const EMPTY_IS_DELETED: bool = false;

    /// The registry identifier. `None` when the record has no usable id.
    fn key(record: &Record<Self>) -> Option<Self::Key>;

    /// Decode one field. The tag has been consumed and the reader is
    /// positioned at the field's length.
    fn visit_field(
        &mut self,
        tag: Tag,
        reader: &mut SubRecordReader,
        options: &DecodeOptions,
    ) -> Result<(), Error>;

    /// Cross-field checks once every field has been seen
    fn finish(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Write every field in canonical order
    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error>;
}

/// A header and, unless the record is deleted, its decoded payload
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(serialize = "T: serde::Serialize, T::Header: serde::Serialize"))
)]
pub struct Record<T: RecordKind> {
    pub header: T::Header,
    pub payload: Option<T>,
}

impl<T: RecordKind> Record<T> {
    pub fn new(header: T::Header, payload: T) -> Self {
        Record {
            header,
            payload: Some(payload),
        }
    }

    /// A record that only consists of its header
    pub fn deleted(header: T::Header) -> Self {
        Record {
            header,
            payload: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.payload.is_none()
    }

    pub fn key(&self) -> Option<T::Key> {
        T::key(self)
    }

    pub fn decode(reader: &mut SubRecordReader, options: &DecodeOptions) -> Result<Self, Error> {
        decode_record(reader, options)
    }

    pub fn encode<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        encode_record(self, writer)
    }

    /// Encode into a plain writer in the header's dialect, returning the
    /// number of bytes written
    pub fn write_to<W: Write>(&self, writer: W) -> Result<usize, Error> {
        let mut writer = SubRecordWriter::new(writer, T::Header::DIALECT);
        encode_record(self, &mut writer)?;
        Ok(writer.position())
    }

    /// Number of bytes [`Record::encode`] writes
    pub fn encoded_len(&self) -> Result<usize, Error> {
        let mut counter = SubRecordWriter::new(SizeCounter::new(), T::Header::DIALECT);
        encode_record(self, &mut counter)?;
        Ok(counter.position())
    }
}

/// Decode one record of type `T`, header included
///
/// A size bounded record consumes exactly its declared size. A sentinel
/// bounded record stops in front of the first tag that isn't one of its
/// fields, which may be short of the declared size.
pub fn decode_record<T: RecordKind>(
    reader: &mut SubRecordReader,
    options: &DecodeOptions,
) -> Result<Record<T>, Error> {
    let offset = reader.position();
    let header = T::Header::read(reader)?;
    let expected = T::SCHEMA.record;
    if header.tag() != expected {
        return Err(Error::unexpected_tag(Some(expected), header.tag(), offset));
    }

    let size = header.size() as usize;
    if header.is_deleted() || (T::EMPTY_IS_DELETED && size == 0) {
        reader.skip(size)?;
        return Ok(Record::deleted(header));
    }

    let mut payload = T::default();
    if header.is_compressed() {
        let body_offset = reader.position();
        let body = reader.read_bytes(size)?;
        let inflated = inflate(expected, body, body_offset)?;
        let mut inner = SubRecordReader::with_base(&inflated, T::Header::DIALECT, body_offset);
        decode_payload(&mut inner, inflated.len(), &mut payload, options)?;
    } else {
        match T::SCHEMA.discipline {
            Discipline::SizeBounded => {
                let mut inner = reader.take(size)?;
                decode_payload(&mut inner, size, &mut payload, options)?;
            }
            Discipline::SentinelBounded => {
                decode_payload(reader, size, &mut payload, options)?;
            }
        }
    }

    Ok(Record::new(header, payload))
}

fn decode_payload<T: RecordKind>(
    reader: &mut SubRecordReader,
    declared: usize,
    payload: &mut T,
    options: &DecodeOptions,
) -> Result<(), Error> {
    T::SCHEMA.decode_fields(reader, declared, |tag, r| {
        payload.visit_field(tag, r, options)
    })?;
    payload.finish()
}

fn inflate(tag: Tag, body: &[u8], offset: usize) -> Result<Vec<u8>, Error> {
    let compression = || Error::new(ErrorKind::Compression { tag, offset });
    let (head, data) = get_split::<4>(body).ok_or_else(compression)?;
    let expected = le_u32(head) as usize;

    let mut out = Vec::with_capacity(expected.min(MAX_PREALLOC));
    ZlibDecoder::new(data)
        .take(expected as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|_| compression())?;

    if out.len() != expected {
        return Err(compression());
    }

    tracing::trace!(tag = %tag, offset, inflated = expected, "inflated record");
    Ok(out)
}

/// Encode a record, header included
///
/// The header's size is recomputed from the fields. Deleted records are
/// written as a bare header with a size of zero.
pub fn encode_record<T: RecordKind, W: Write>(
    record: &Record<T>,
    writer: &mut SubRecordWriter<W>,
) -> Result<(), Error> {
    let payload = match &record.payload {
        Some(payload) => payload,
        None => return record.header.write(writer, 0),
    };

    let dialect = T::Header::DIALECT;
    if record.header.is_compressed() {
        let mut raw = SubRecordWriter::new(Vec::new(), dialect);
        payload.encode_fields(&mut raw)?;
        let raw = raw.into_inner();

        let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&raw)?;
        let compressed = encoder.finish()?;

        let size = payload_size(record.header.tag(), compressed.len() + 4, writer)?;
        let inflated = payload_size(record.header.tag(), raw.len(), writer)?;
        record.header.write(writer, size)?;
        writer.write_u32(inflated)?;
        writer.write_bytes(&compressed)
    } else {
        let mut counter = SubRecordWriter::new(SizeCounter::new(), dialect);
        payload.encode_fields(&mut counter)?;
        let size = payload_size(record.header.tag(), counter.position(), writer)?;
        record.header.write(writer, size)?;
        payload.encode_fields(writer)
    }
}

fn payload_size<W: Write>(tag: Tag, len: usize, writer: &SubRecordWriter<W>) -> Result<u32, Error> {
    u32::try_from(len).map_err(|_| {
        Error::new(ErrorKind::LengthTooLarge {
            tag,
            length: len as u64,
            max: u64::from(u32::MAX),
            offset: writer.position(),
        })
    })
}

/// Consume one record, or one whole group, without interpreting it
///
/// Returns the tag that was skipped.
pub fn skip_record(reader: &mut SubRecordReader) -> Result<Tag, Error> {
    let offset = reader.position();
    match reader.dialect() {
        Dialect::Tes3 => {
            let header = Tes3Header::read(reader)?;
            reader.skip(header.size as usize)?;
            Ok(header.tag)
        }
        Dialect::Tes4 if reader.peek_tag() == Some(Tag::GRUP) => {
            let header = GroupHeader::read(reader)?;
            reader.skip(header.content_len())?;
            tracing::debug!(offset, size = header.size, "skipped group");
            Ok(Tag::GRUP)
        }
        Dialect::Tes4 => {
            let header = Tes4Header::read(reader)?;
            reader.skip(header.size as usize)?;
            Ok(header.tag)
        }
    }
}
