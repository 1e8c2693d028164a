use crate::{
    subrecord::{SubRecordReader, SubRecordWriter},
    Error, Tag,
};
use std::{io::Write, ops::Deref};

/// Sub-record content kept verbatim so that it can be written back unchanged
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Blob(pub Vec<u8>);

impl Blob {
    /// Decode the length and value. The tag must already have been consumed.
    pub fn read(reader: &mut SubRecordReader, tag: Tag, cap: u32) -> Result<Self, Error> {
        reader.read_blob(tag, cap).map(Blob)
    }

    pub fn write<W: Write>(&self, tag: Tag, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_value(tag, &self.0)
    }
}

impl Deref for Blob {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<u8>> for Blob {
    fn from(data: Vec<u8>) -> Self {
        Blob(data)
    }
}
