use crate::{
    subrecord::{SubRecordReader, SubRecordWriter},
    util::{le_u16, le_u32},
    Dialect, Error, Tag,
};
use std::{fmt, io::Write};

/// The fixed header in front of every record's payload
pub trait RecordHeader: Sized + Clone + PartialEq + fmt::Debug {
    /// The dialect whose length widths the payload uses
    const DIALECT: Dialect;

    /// Size of the header in bytes, tag included
    const LEN: usize;

    /// Read the header, tag included
    fn read(reader: &mut SubRecordReader) -> Result<Self, Error>;

    /// Write the header with the given payload size in place of the stored
    /// one
    fn write<W: Write>(&self, writer: &mut SubRecordWriter<W>, size: u32) -> Result<(), Error>;

    fn tag(&self) -> Tag;

    /// Payload size declared in the header
    fn size(&self) -> u32;

    fn set_size(&mut self, size: u32);

    fn is_deleted(&self) -> bool;

    fn is_compressed(&self) -> bool {
        false
    }
}

/// 24 byte record header of the newer dialect
///
/// ```
/// use tesfile::{record::{RecordHeader, Tes4Header}, subrecord::SubRecordReader, Dialect, Tag};
///
/// let data = b"MISC\0\0\0\0\x20\0\0\0\x0F\0\0\0\x1B\x69\x55\0\x28\0\x0C\0";
/// let header = Tes4Header::read(&mut SubRecordReader::new(&data[..], Dialect::Tes4))?;
/// assert_eq!(header.tag, Tag::MISC);
/// assert_eq!(header.form_id, 0x0F);
/// assert!(header.is_deleted());
/// # Ok::<(), tesfile::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tes4Header {
    pub tag: Tag,
    pub size: u32,
    pub flags: u32,
    pub form_id: u32,
    pub revision: u32,
    pub version: u16,
    pub unknown: u16,
}

impl Tes4Header {
    pub const FLAG_DELETED: u32 = 0x0000_0020;
    pub const FLAG_IGNORED: u32 = 0x0000_1000;
    pub const FLAG_COMPRESSED: u32 = 0x0004_0000;

    /// A header for a new record with the current form version
    pub fn new(tag: Tag, form_id: u32) -> Self {
        Tes4Header {
            tag,
            size: 0,
            flags: 0,
            form_id,
            revision: 0,
            version: 40,
            unknown: 0,
        }
    }

    pub fn is_ignored(&self) -> bool {
        self.flags & Self::FLAG_IGNORED != 0
    }
}

impl RecordHeader for Tes4Header {
    const DIALECT: Dialect = Dialect::Tes4;
    const LEN: usize = 24;

    fn read(reader: &mut SubRecordReader) -> Result<Self, Error> {
        let data = reader.read_array::<24>()?;
        let u32_at = |i: usize| le_u32([data[i], data[i + 1], data[i + 2], data[i + 3]]);
        Ok(Tes4Header {
            tag: Tag([data[0], data[1], data[2], data[3]]),
            size: u32_at(4),
            flags: u32_at(8),
            form_id: u32_at(12),
            revision: u32_at(16),
            version: le_u16([data[20], data[21]]),
            unknown: le_u16([data[22], data[23]]),
        })
    }

    fn write<W: Write>(&self, writer: &mut SubRecordWriter<W>, size: u32) -> Result<(), Error> {
        writer.write_tag(self.tag)?;
        writer.write_u32(size)?;
        writer.write_u32(self.flags)?;
        writer.write_u32(self.form_id)?;
        writer.write_u32(self.revision)?;
        writer.write_u16(self.version)?;
        writer.write_u16(self.unknown)
    }

    fn tag(&self) -> Tag {
        self.tag
    }

    fn size(&self) -> u32 {
        self.size
    }

    fn set_size(&mut self, size: u32) {
        self.size = size;
    }

    fn is_deleted(&self) -> bool {
        self.flags & Self::FLAG_DELETED != 0
    }

    fn is_compressed(&self) -> bool {
        self.flags & Self::FLAG_COMPRESSED != 0
    }
}

/// 16 byte record header of the legacy dialect
///
/// Legacy records mark deletion with a sub-record rather than a flag, so the
/// header never reports a deleted record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tes3Header {
    pub tag: Tag,
    pub size: u32,
    pub header_one: u32,
    pub flags: u32,
}

impl Tes3Header {
    pub fn new(tag: Tag) -> Self {
        Tes3Header {
            tag,
            size: 0,
            header_one: 0,
            flags: 0,
        }
    }
}

impl RecordHeader for Tes3Header {
    const DIALECT: Dialect = Dialect::Tes3;
    const LEN: usize = 16;

    fn read(reader: &mut SubRecordReader) -> Result<Self, Error> {
        let tag = reader.read_tag()?;
        let size = reader.read_u32()?;
        let header_one = reader.read_u32()?;
        let flags = reader.read_u32()?;
        Ok(Tes3Header {
            tag,
            size,
            header_one,
            flags,
        })
    }

    fn write<W: Write>(&self, writer: &mut SubRecordWriter<W>, size: u32) -> Result<(), Error> {
        writer.write_tag(self.tag)?;
        writer.write_u32(size)?;
        writer.write_u32(self.header_one)?;
        writer.write_u32(self.flags)
    }

    fn tag(&self) -> Tag {
        self.tag
    }

    fn size(&self) -> u32 {
        self.size
    }

    fn set_size(&mut self, size: u32) {
        self.size = size;
    }

    fn is_deleted(&self) -> bool {
        false
    }
}
