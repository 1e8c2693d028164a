use crate::{
    fields::{Blob, EffectBlock, Keywords, LocalizedString, ObjectBounds},
    record::{DecodeOptions, Record, RecordKind, Tes4Header},
    records::{tes4::form_key, unhandled, write_opt_blob, write_opt_string, write_opt_u32},
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_STRING, MAX_TEXT},
    Error, Tag,
};
use std::io::Write;

/// An alchemy ingredient (`INGR`)
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Ingredient {
    pub editor_id: String,
    pub script_data: Option<Blob>,
    pub bounds: ObjectBounds,
    pub name: LocalizedString,
    pub keywords: Keywords,
    pub model_path: Option<String>,
    pub model_hashes: Option<Blob>,
    pub alternate_textures: Option<Blob>,
    pub pickup_sound: Option<u32>,
    pub putdown_sound: Option<u32>,
    pub value: u32,
    pub weight: f32,
    pub base_cost: u32,
    pub flags: u32,
    pub effects: Vec<EffectBlock>,
}

impl Ingredient {
    pub const FLAG_NO_AUTO_CALC: u32 = 0x0001;
    pub const FLAG_FOOD: u32 = 0x0002;
    pub const FLAG_REFERENCES_PERSIST: u32 = 0x0100;
}

impl RecordKind for Ingredient {
    type Header = Tes4Header;
    type Key = u32;

    const SCHEMA: Schema = Schema {
        record: Tag::INGR,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::EDID, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::VMAD, Length::Any),
            FieldSpec::required(Tag::OBND, Length::Fixed(12)),
            FieldSpec::required(Tag::FULL, Length::Any),
            FieldSpec::optional(Tag::KSIZ, Length::Fixed(4)),
            FieldSpec::optional(Tag::MODL, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::MODT, Length::Any),
            FieldSpec::optional(Tag::MODS, Length::Any),
            FieldSpec::optional(Tag::YNAM, Length::Fixed(4)),
            FieldSpec::optional(Tag::ZNAM, Length::Fixed(4)),
            FieldSpec::required(Tag::DATA, Length::Fixed(8)),
            FieldSpec::required(Tag::ENIT, Length::Fixed(8)),
            FieldSpec::repeatable(Tag::EFID, Length::Fixed(4)),
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
            Tag::KSIZ => self.keywords = Keywords::read(reader)?,
            Tag::MODL => self.model_path = Some(reader.read_string(tag, MAX_STRING)?),
            Tag::MODT => self.model_hashes = Some(Blob::read(reader, tag, MAX_TEXT)?),
            Tag::MODS => self.alternate_textures = Some(Blob::read(reader, tag, MAX_TEXT)?),
            Tag::YNAM => self.pickup_sound = Some(reader.read_form_id(tag)?),
            Tag::ZNAM => self.putdown_sound = Some(reader.read_form_id(tag)?),
            Tag::DATA => {
                let mut data = reader.read_struct(tag, 8)?;
                self.value = data.read_u32()?;
                self.weight = data.read_f32()?;
            }
            Tag::ENIT => {
                let mut data = reader.read_struct(tag, 8)?;
                self.base_cost = data.read_u32()?;
                self.flags = data.read_u32()?;
            }
            Tag::EFID => self.effects.push(EffectBlock::read(reader)?),
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_string(Tag::EDID, &self.editor_id)?;
        write_opt_blob(writer, Tag::VMAD, &self.script_data)?;
        self.bounds.write(writer)?;
        self.name.write(Tag::FULL, writer)?;
        self.keywords.write(writer)?;
        write_opt_string(writer, Tag::MODL, &self.model_path)?;
        write_opt_blob(writer, Tag::MODT, &self.model_hashes)?;
        write_opt_blob(writer, Tag::MODS, &self.alternate_textures)?;
        write_opt_u32(writer, Tag::YNAM, self.pickup_sound)?;
        write_opt_u32(writer, Tag::ZNAM, self.putdown_sound)?;

        writer.write_field_header(Tag::DATA, 8)?;
        writer.write_u32(self.value)?;
        writer.write_f32(self.weight)?;
        writer.write_field_header(Tag::ENIT, 8)?;
        writer.write_u32(self.base_cost)?;
        writer.write_u32(self.flags)?;

        for effect in &self.effects {
            effect.write(writer)?;
        }
        Ok(())
    }
}
