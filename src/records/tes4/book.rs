use crate::{
    fields::{Blob, Keywords, LocalizedString, ObjectBounds},
    record::{DecodeOptions, Record, RecordKind, Tes4Header},
    records::{tes4::form_key, unhandled, write_opt_blob, write_opt_u32},
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_STRING, MAX_TEXT},
    Error, Tag,
};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BookData {
    pub flags: u32,
    /// A spell form id or an actor value, depending on `flags`
    pub spell_or_skill: u32,
    pub value: u32,
    pub weight: f32,
}

impl BookData {
    pub const FLAG_TEACHES_SKILL: u32 = 0x01;
    pub const FLAG_CANT_TAKE: u32 = 0x02;
    pub const FLAG_TEACHES_SPELL: u32 = 0x04;
}

/// A book, note, or scroll of text (`BOOK`)
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Book {
    pub editor_id: String,
    pub script_data: Option<Blob>,
    pub bounds: ObjectBounds,
    pub title: LocalizedString,
    pub model_path: String,
    pub model_hashes: Option<Blob>,
    pub text: LocalizedString,
    pub keywords: Keywords,
    pub data: BookData,
    pub inventory_art: Option<u32>,
    pub unknown_cnam: u32,
    pub pickup_sound: Option<u32>,
    pub putdown_sound: Option<u32>,
}

impl RecordKind for Book {
    type Header = Tes4Header;
    type Key = u32;

    const SCHEMA: Schema = Schema {
        record: Tag::BOOK,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::EDID, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::VMAD, Length::Any),
            FieldSpec::required(Tag::OBND, Length::Fixed(12)),
            FieldSpec::optional(Tag::FULL, Length::Any),
            FieldSpec::required(Tag::MODL, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::MODT, Length::Any),
            FieldSpec::required(Tag::DESC, Length::Any),
            FieldSpec::optional(Tag::KSIZ, Length::Fixed(4)),
            FieldSpec::required(Tag::DATA, Length::Fixed(16)),
            FieldSpec::optional(Tag::INAM, Length::Fixed(4)),
            FieldSpec::required(Tag::CNAM, Length::Fixed(4)),
            FieldSpec::optional(Tag::YNAM, Length::Fixed(4)),
            FieldSpec::optional(Tag::ZNAM, Length::Fixed(4)),
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
            Tag::VMAD => self.script_data = Some(Blob::read(reader, tag, MAX_TEXT)?),
            Tag::OBND => self.bounds = ObjectBounds::read(reader)?,
            Tag::FULL => self.title = LocalizedString::read(reader, tag, localized, MAX_STRING)?,
            Tag::MODL => self.model_path = reader.read_string(tag, MAX_STRING)?,
            Tag::MODT => self.model_hashes = Some(Blob::read(reader, tag, MAX_TEXT)?),
            Tag::DESC => self.text = LocalizedString::read(reader, tag, localized, MAX_TEXT)?,
            Tag::KSIZ => self.keywords = Keywords::read(reader)?,
            Tag::DATA => {
                let mut data = reader.read_struct(tag, 16)?;
                self.data = BookData {
                    flags: data.read_u32()?,
                    spell_or_skill: data.read_u32()?,
                    value: data.read_u32()?,
                    weight: data.read_f32()?,
                };
            }
            Tag::INAM => self.inventory_art = Some(reader.read_u32_value(tag)?),
            Tag::CNAM => self.unknown_cnam = reader.read_u32_value(tag)?,
            Tag::YNAM => self.pickup_sound = Some(reader.read_form_id(tag)?),
            Tag::ZNAM => self.putdown_sound = Some(reader.read_form_id(tag)?),
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_string(Tag::EDID, &self.editor_id)?;
        write_opt_blob(writer, Tag::VMAD, &self.script_data)?;
        self.bounds.write(writer)?;
        self.title.write(Tag::FULL, writer)?;
        writer.write_string(Tag::MODL, &self.model_path)?;
        write_opt_blob(writer, Tag::MODT, &self.model_hashes)?;
        self.text.write(Tag::DESC, writer)?;
        self.keywords.write(writer)?;

        writer.write_field_header(Tag::DATA, 16)?;
        writer.write_u32(self.data.flags)?;
        writer.write_u32(self.data.spell_or_skill)?;
        writer.write_u32(self.data.value)?;
        writer.write_f32(self.data.weight)?;

        write_opt_u32(writer, Tag::INAM, self.inventory_art)?;
        writer.write_u32_value(Tag::CNAM, self.unknown_cnam)?;
        write_opt_u32(writer, Tag::YNAM, self.pickup_sound)?;
        write_opt_u32(writer, Tag::ZNAM, self.putdown_sound)
    }
}
