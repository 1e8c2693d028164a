use crate::{
    record::{DecodeOptions, Record, RecordKind, Tes3Header},
    records::{
        tes3::{name_key, read_legacy_string, write_legacy_string, LegacyString},
        unhandled,
    },
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_LEGACY_STRING},
    Error, Tag,
};
use std::io::Write;

/// The declared type of a global variable, stored as one character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum GlobalKind {
    Short,
    Long,
    Float,
}

impl GlobalKind {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            b's' => Some(GlobalKind::Short),
            b'l' => Some(GlobalKind::Long),
            b'f' => Some(GlobalKind::Float),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            GlobalKind::Short => b's',
            GlobalKind::Long => b'l',
            GlobalKind::Float => b'f',
        }
    }
}

impl Default for GlobalKind {
    fn default() -> Self {
        GlobalKind::Short
    }
}

/// A legacy global variable (`GLOB`)
///
/// The value is always stored as a float whatever the declared type. It is
/// kept as read; [`Tes3Global::as_long`] and [`Tes3Global::as_short`] apply
/// the engine's truncation.
///
/// ```
/// use tesfile::records::tes3::{GlobalKind, LegacyString, Tes3Global};
///
/// let global = Tes3Global {
///     name: LegacyString::from("PCRace"),
///     kind: GlobalKind::Long,
///     value: 3.0,
/// };
/// assert_eq!(global.as_long(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tes3Global {
    pub name: LegacyString,
    pub kind: GlobalKind,
    pub value: f32,
}

impl Tes3Global {
    pub fn as_long(&self) -> i32 {
        self.value as i32
    }

    pub fn as_short(&self) -> i16 {
        self.value as i16
    }
}

impl RecordKind for Tes3Global {
    type Header = Tes3Header;
    type Key = String;

    const SCHEMA: Schema = Schema {
        record: Tag::GLOB,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::NAME, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::required(Tag::FNAM, Length::Fixed(1)),
            FieldSpec::required(Tag::FLTV, Length::Fixed(4)),
        ],
        branches: &[],
    };

    fn key(record: &Record<Self>) -> Option<String> {
        name_key(record.payload.as_ref().map(|x| &x.name))
    }

    fn visit_field(
        &mut self,
        tag: Tag,
        reader: &mut SubRecordReader,
        _options: &DecodeOptions,
    ) -> Result<(), Error> {
        match tag {
            Tag::NAME => self.name = read_legacy_string(reader, tag)?,
            Tag::FNAM => {
                let offset = reader.position();
                let [code] = reader.read_fixed::<1>(tag)?;
                self.kind =
                    GlobalKind::from_code(code).ok_or_else(|| Error::out_of_range(tag, offset))?;
            }
            Tag::FLTV => self.value = reader.read_f32_value(tag)?,
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        write_legacy_string(writer, Tag::NAME, &self.name)?;
        writer.write_value(Tag::FNAM, &[self.kind.code()])?;
        writer.write_f32_value(Tag::FLTV, self.value)
    }
}
