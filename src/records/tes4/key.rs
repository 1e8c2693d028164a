use crate::{
    fields::{Blob, Keywords, LocalizedString, ObjectBounds},
    record::{DecodeOptions, Record, RecordKind, Tes4Header},
    records::{tes4::form_key, unhandled, write_opt_blob, write_opt_string, write_opt_u32},
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_STRING, MAX_TEXT},
    Error, Tag,
};
use std::io::Write;

/// A key that opens some door or container (`KEYM`)
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Key {
    pub editor_id: String,
    pub script_data: Option<Blob>,
    pub bounds: ObjectBounds,
    pub name: LocalizedString,
    pub model_path: Option<String>,
    pub model_hashes: Option<Blob>,
    pub pickup_sound: Option<u32>,
    pub putdown_sound: Option<u32>,
    pub keywords: Keywords,
    pub value: u32,
    pub weight: f32,
}

impl RecordKind for Key {
    type Header = Tes4Header;
    type Key = u32;

    const SCHEMA: Schema = Schema {
        record: Tag::KEYM,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::EDID, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::VMAD, Length::Any),
            FieldSpec::required(Tag::OBND, Length::Fixed(12)),
            FieldSpec::required(Tag::FULL, Length::Any),
            FieldSpec::optional(Tag::MODL, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::MODT, Length::Any),
            FieldSpec::optional(Tag::YNAM, Length::Fixed(4)),
            FieldSpec::optional(Tag::ZNAM, Length::Fixed(4)),
            FieldSpec::optional(Tag::KSIZ, Length::Fixed(4)),
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
        match tag {
            Tag::EDID => self.editor_id = reader.read_string(tag, MAX_STRING)?,
            Tag::VMAD => self.script_data = Some(Blob::read(reader, tag, MAX_TEXT)?),
            Tag::OBND => self.bounds = ObjectBounds::read(reader)?,
            Tag::FULL => {
                self.name = LocalizedString::read(reader, tag, options.is_localized(), MAX_STRING)?
            }
            Tag::MODL => self.model_path = Some(reader.read_string(tag, MAX_STRING)?),
            Tag::MODT => self.model_hashes = Some(Blob::read(reader, tag, MAX_TEXT)?),
            Tag::YNAM => self.pickup_sound = Some(reader.read_form_id(tag)?),
            Tag::ZNAM => self.putdown_sound = Some(reader.read_form_id(tag)?),
            Tag::KSIZ => self.keywords = Keywords::read(reader)?,
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
        write_opt_blob(writer, Tag::VMAD, &self.script_data)?;
        self.bounds.write(writer)?;
        self.name.write(Tag::FULL, writer)?;
        write_opt_string(writer, Tag::MODL, &self.model_path)?;
        write_opt_blob(writer, Tag::MODT, &self.model_hashes)?;
        write_opt_u32(writer, Tag::YNAM, self.pickup_sound)?;
        write_opt_u32(writer, Tag::ZNAM, self.putdown_sound)?;
        self.keywords.write(writer)?;
        writer.write_field_header(Tag::DATA, 8)?;
        writer.write_u32(self.value)?;
        writer.write_f32(self.weight)
    }
}
