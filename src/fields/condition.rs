use crate::{
    errors::Error,
    subrecord::{SubRecordReader, SubRecordWriter, MAX_STRING},
    Tag,
};
use std::io::Write;

/// The sub-record that may carry a condition's extra string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraName {
    Cis1,
    Cis2,
}

impl ExtraName {
    pub const fn tag(self) -> Tag {
        match self {
            ExtraName::Cis1 => Tag::CIS1,
            ExtraName::Cis2 => Tag::CIS2,
        }
    }
}

/// A `CTDA` condition optionally followed by a `CIS1` or `CIS2` string
///
/// The 32 condition bytes are kept verbatim. `name` is `None` when the string
/// sub-record is absent. A present but empty string is `Some("")` and is
/// written back as such.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Condition {
    pub data: [u8; 32],
    pub name: Option<String>,
}

impl Default for Condition {
    fn default() -> Self {
        Condition {
            data: [0; 32],
            name: None,
        }
    }
}

impl Condition {
    /// Decode after the `CTDA` tag has been consumed. When the next tag is the
    /// extra name tag, it is consumed too.
    pub fn read(reader: &mut SubRecordReader, extra: ExtraName) -> Result<Self, Error> {
        read_condition(reader, extra, false)
    }

    /// Like [`Condition::read`] but an extra name that is present must not be
    /// empty
    pub fn read_named(reader: &mut SubRecordReader, extra: ExtraName) -> Result<Self, Error> {
        read_condition(reader, extra, true)
    }

    pub fn write<W: Write>(
        &self,
        extra: ExtraName,
        writer: &mut SubRecordWriter<W>,
    ) -> Result<(), Error> {
        writer.write_value(Tag::CTDA, &self.data)?;
        if let Some(name) = &self.name {
            writer.write_string(extra.tag(), name)?;
        }
        Ok(())
    }
}

fn read_condition(
    reader: &mut SubRecordReader,
    extra: ExtraName,
    non_empty: bool,
) -> Result<Condition, Error> {
    let data = reader.read_fixed::<32>(Tag::CTDA)?;
    let tag = extra.tag();
    if reader.peek_tag() != Some(tag) {
        return Ok(Condition { data, name: None });
    }

    reader.read_tag()?;
    let offset = reader.position();
    let name = reader.read_string(tag, MAX_STRING)?;
    if non_empty && name.is_empty() {
        return Err(Error::invalid_length(tag, 1, offset));
    }

    Ok(Condition {
        data,
        name: Some(name),
    })
}
