use crate::{
    fields::{LocalizedString, ObjectBounds},
    record::{DecodeOptions, Record, RecordKind, Tes4Header},
    records::{tes4::form_key, unhandled},
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_STRING, MAX_TEXT},
    Error, Tag,
};
use std::io::Write;

/// An alchemy apparatus (`APPA`)
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Apparatus {
    pub editor_id: String,
    pub bounds: ObjectBounds,
    pub name: LocalizedString,
    pub quality: u32,
    pub description: LocalizedString,
    pub value: u32,
    pub weight: f32,
}

impl RecordKind for Apparatus {
    type Header = Tes4Header;
    type Key = u32;

    const SCHEMA: Schema = Schema {
        record: Tag::APPA,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::EDID, Length::Capped(MAX_STRING)),
            FieldSpec::required(Tag::OBND, Length::Fixed(12)),
            FieldSpec::optional(Tag::FULL, Length::Any),
            FieldSpec::required(Tag::QUAL, Length::Fixed(4)),
            FieldSpec::optional(Tag::DESC, Length::Any),
            FieldSpec::required(Tag::DATA, Length::Fixed(8)),
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
        let localized = options.is_localized();
        match tag {
            Tag::EDID => self.editor_id = reader.read_string(tag, MAX_STRING)?,
            Tag::OBND => self.bounds = ObjectBounds::read(reader)?,
            Tag::FULL => self.name = LocalizedString::read(reader, tag, localized, MAX_STRING)?,
            Tag::QUAL => self.quality = reader.read_u32_value(tag)?,
            Tag::DESC => {
                self.description = LocalizedString::read(reader, tag, localized, MAX_TEXT)?
            }
            Tag::DATA => {
                let mut data = reader.read_struct(tag, 8)?;
                self.value = data.read_u32()?;
                self.weight = data.read_f32()?;
            }
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_string(Tag::EDID, &self.editor_id)?;
        self.bounds.write(writer)?;
        self.name.write(Tag::FULL, writer)?;
        writer.write_u32_value(Tag::QUAL, self.quality)?;
        self.description.write(Tag::DESC, writer)?;
        writer.write_field_header(Tag::DATA, 8)?;
        writer.write_u32(self.value)?;
        writer.write_f32(self.weight)
    }
}
