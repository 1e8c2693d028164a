use crate::{
    subrecord::{SubRecordReader, SubRecordWriter},
    Error, Tag,
};
use std::io::Write;

/// Header of a `GRUP` container in the newer dialect
///
/// The size covers the 24 byte header itself plus everything nested inside
/// the group.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GroupHeader {
    pub size: u32,
    pub label: [u8; 4],
    pub group_type: u32,
    pub stamp: u16,
    pub unknown1: u16,
    pub version: u16,
    pub unknown2: u16,
}

impl GroupHeader {
    pub const LEN: usize = 24;

    /// Read a group header, `GRUP` tag included
    pub fn read(reader: &mut SubRecordReader) -> Result<Self, Error> {
        let offset = reader.position();
        reader.expect_tag(Tag::GRUP)?;
        let size = reader.read_u32()?;
        if (size as usize) < Self::LEN {
            return Err(Error::malformed_header(
                Tag::GRUP,
                offset,
                "group size is smaller than its header",
            ));
        }

        Ok(GroupHeader {
            size,
            label: reader.read_array::<4>()?,
            group_type: reader.read_u32()?,
            stamp: reader.read_u16()?,
            unknown1: reader.read_u16()?,
            version: reader.read_u16()?,
            unknown2: reader.read_u16()?,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_tag(Tag::GRUP)?;
        writer.write_u32(self.size)?;
        writer.write_bytes(&self.label)?;
        writer.write_u32(self.group_type)?;
        writer.write_u16(self.stamp)?;
        writer.write_u16(self.unknown1)?;
        writer.write_u16(self.version)?;
        writer.write_u16(self.unknown2)
    }

    /// The record type a top level group holds. Other group types label
    /// themselves with form ids or cell coordinates.
    pub fn record_type(&self) -> Option<Tag> {
        if self.group_type == 0 {
            Some(Tag(self.label))
        } else {
            None
        }
    }

    /// Bytes nested inside the group. Zero for a size smaller than the
    /// header itself.
    pub fn content_len(&self) -> usize {
        (self.size as usize).saturating_sub(Self::LEN)
    }
}
