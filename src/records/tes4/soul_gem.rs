use crate::{
    fields::{Blob, Keywords, LocalizedString, ObjectBounds},
    record::{DecodeOptions, Record, RecordKind, Tes4Header},
    records::{tes4::form_key, unhandled, write_opt_blob, write_opt_u32},
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_STRING, MAX_TEXT},
    Error, Tag,
};
use std::io::Write;

/// Size of a soul, both the one held and the one a gem can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SoulSize {
    Empty,
    Petty,
    Lesser,
    Common,
    Greater,
    Grand,
}

impl SoulSize {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(SoulSize::Empty),
            1 => Some(SoulSize::Petty),
            2 => Some(SoulSize::Lesser),
            3 => Some(SoulSize::Common),
            4 => Some(SoulSize::Greater),
            5 => Some(SoulSize::Grand),
            _ => None,
        }
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl Default for SoulSize {
    fn default() -> Self {
        SoulSize::Empty
    }
}

/// A soul gem (`SLGM`)
///
/// `linked_to` names the gem this one turns into once filled.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SoulGem {
    pub editor_id: String,
    pub bounds: ObjectBounds,
    pub name: LocalizedString,
    pub model_path: String,
    pub model_hashes: Option<Blob>,
    pub keywords: Keywords,
    pub value: u32,
    pub weight: f32,
    pub soul: SoulSize,
    pub capacity: SoulSize,
    pub linked_to: Option<u32>,
}

fn read_soul(reader: &mut SubRecordReader, tag: Tag) -> Result<SoulSize, Error> {
    let offset = reader.position();
    let [value] = reader.read_fixed::<1>(tag)?;
    SoulSize::from_u8(value).ok_or_else(|| Error::out_of_range(tag, offset))
}

impl RecordKind for SoulGem {
    type Header = Tes4Header;
    type Key = u32;

    const SCHEMA: Schema = Schema {
        record: Tag::SLGM,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::EDID, Length::Capped(MAX_STRING)),
            FieldSpec::required(Tag::OBND, Length::Fixed(12)),
            FieldSpec::optional(Tag::FULL, Length::Any),
            FieldSpec::required(Tag::MODL, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::MODT, Length::Any),
            FieldSpec::optional(Tag::KSIZ, Length::Fixed(4)),
            FieldSpec::required(Tag::DATA, Length::Fixed(8)),
            FieldSpec::required(Tag::SOUL, Length::Fixed(1)),
            FieldSpec::required(Tag::SLCP, Length::Fixed(1)),
            FieldSpec::optional(Tag::NAM0, Length::Fixed(4)),
        ],
        branches: &[],
    };

    fn key(record: &Record<Self>) -> Option<u32> {
        form_key(record)
    }

    fn visit_field(
        &mut self,
        tag: Tag,
        reader: &mut SubRecordReader,
        options: &DecodeOptions,
    ) -> Result<(), Error> {
        match tag {
            Tag::EDID => self.editor_id = reader.read_string(tag, MAX_STRING)?,
            Tag::OBND => self.bounds = ObjectBounds::read(reader)?,
            Tag::FULL => {
                self.name = LocalizedString::read(reader, tag, options.is_localized(), MAX_STRING)?
            }
            Tag::MODL => self.model_path = reader.read_string(tag, MAX_STRING)?,
            Tag::MODT => self.model_hashes = Some(Blob::read(reader, tag, MAX_TEXT)?),
            Tag::KSIZ => self.keywords = Keywords::read(reader)?,
            Tag::DATA => {
                let mut data = reader.read_struct(tag, 8)?;
                self.value = data.read_u32()?;
                self.weight = data.read_f32()?;
            }
            Tag::SOUL => self.soul = read_soul(reader, tag)?,
            Tag::SLCP => self.capacity = read_soul(reader, tag)?,
            Tag::NAM0 => self.linked_to = Some(reader.read_form_id(tag)?),
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_string(Tag::EDID, &self.editor_id)?;
        self.bounds.write(writer)?;
        self.name.write(Tag::FULL, writer)?;
        writer.write_string(Tag::MODL, &self.model_path)?;
        write_opt_blob(writer, Tag::MODT, &self.model_hashes)?;
        self.keywords.write(writer)?;
        writer.write_field_header(Tag::DATA, 8)?;
        writer.write_u32(self.value)?;
        writer.write_f32(self.weight)?;
        writer.write_value(Tag::SOUL, &[self.soul.as_u8()])?;
        writer.write_value(Tag::SLCP, &[self.capacity.as_u8()])?;
        write_opt_u32(writer, Tag::NAM0, self.linked_to)
    }
}
