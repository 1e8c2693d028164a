//! Typed records of both dialects.
//!
//! Each type implements [`RecordKind`](crate::record::RecordKind) and is
//! decoded and encoded through [`Record`](crate::record::Record).

pub mod tes3;
pub mod tes4;

use crate::{
    fields::Blob,
    subrecord::{SubRecordReader, SubRecordWriter},
    Error, Tag,
};
use std::io::Write;

/// A master file named in a file header, with its recorded size
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MasterFile<S = String> {
    pub name: S,
    pub data: u64,
}

/// The error for a tag that the schema let through but the record doesn't
/// handle. The reader sits just past the tag.
pub(crate) fn unhandled(tag: Tag, reader: &SubRecordReader) -> Error {
    Error::unexpected_tag(None, tag, reader.position().saturating_sub(4))
}

pub(crate) fn write_opt_string<W: Write>(
    writer: &mut SubRecordWriter<W>,
    tag: Tag,
    value: &Option<String>,
) -> Result<(), Error> {
    match value {
        Some(text) => writer.write_string(tag, text),
        None => Ok(()),
    }
}

pub(crate) fn write_opt_u32<W: Write>(
    writer: &mut SubRecordWriter<W>,
    tag: Tag,
    value: Option<u32>,
) -> Result<(), Error> {
    match value {
        Some(x) => writer.write_u32_value(tag, x),
        None => Ok(()),
    }
}

pub(crate) fn write_opt_blob<W: Write>(
    writer: &mut SubRecordWriter<W>,
    tag: Tag,
    value: &Option<Blob>,
) -> Result<(), Error> {
    match value {
        Some(blob) => blob.write(tag, writer),
        None => Ok(()),
    }
}
