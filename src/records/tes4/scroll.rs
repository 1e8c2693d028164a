use crate::{
    fields::{Blob, EffectBlock, Keywords, LocalizedString, ObjectBounds},
    record::{DecodeOptions, Record, RecordKind, Tes4Header},
    records::{
        tes4::{form_key, SpellData},
        unhandled, write_opt_blob,
    },
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_STRING, MAX_TEXT},
    Error, Tag,
};
use std::io::Write;

/// A single use spell scroll (`SCRL`)
///
/// The casting data has the same layout as a spell's.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Scroll {
    pub editor_id: String,
    pub bounds: ObjectBounds,
    pub name: LocalizedString,
    pub keywords: Keywords,
    pub menu_display: u32,
    pub equip_type: u32,
    pub description: LocalizedString,
    pub model_path: String,
    pub model_hashes: Option<Blob>,
    pub value: u32,
    pub weight: f32,
    pub data: SpellData,
    pub effects: Vec<EffectBlock>,
}

impl RecordKind for Scroll {
    type Header = Tes4Header;
    type Key = u32;

    const SCHEMA: Schema = Schema {
        record: Tag::SCRL,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::EDID, Length::Capped(MAX_STRING)),
            FieldSpec::required(Tag::OBND, Length::Fixed(12)),
            FieldSpec::required(Tag::FULL, Length::Any),
            FieldSpec::optional(Tag::KSIZ, Length::Fixed(4)),
            FieldSpec::required(Tag::MDOB, Length::Fixed(4)),
            FieldSpec::required(Tag::ETYP, Length::Fixed(4)),
            FieldSpec::required(Tag::DESC, Length::Any),
            FieldSpec::required(Tag::MODL, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::MODT, Length::Any),
            FieldSpec::required(Tag::DATA, Length::Fixed(8)),
            FieldSpec::required(Tag::SPIT, Length::Fixed(36)),
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
        let localized = options.is_localized();
        match tag {
            Tag::EDID => self.editor_id = reader.read_string(tag, MAX_STRING)?,
            Tag::OBND => self.bounds = ObjectBounds::read(reader)?,
            Tag::FULL => self.name = LocalizedString::read(reader, tag, localized, MAX_STRING)?,
            Tag::KSIZ => self.keywords = Keywords::read(reader)?,
            Tag::MDOB => self.menu_display = reader.read_form_id(tag)?,
            Tag::ETYP => self.equip_type = reader.read_form_id(tag)?,
            Tag::DESC => {
                self.description = LocalizedString::read(reader, tag, localized, MAX_TEXT)?
            }
            Tag::MODL => {
                let offset = reader.position();
                let path = reader.read_string(tag, MAX_STRING)?;
                if path.is_empty() {
                    return Err(Error::invalid_length(tag, 1, offset));
                }
                self.model_path = path;
            }
            Tag::MODT => self.model_hashes = Some(Blob::read(reader, tag, MAX_TEXT)?),
            Tag::DATA => {
                let mut data = reader.read_struct(tag, 8)?;
                self.value = data.read_u32()?;
                self.weight = data.read_f32()?;
            }
            Tag::SPIT => self.data = SpellData::read(reader)?,
            Tag::EFID => self.effects.push(EffectBlock::read(reader)?),
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_string(Tag::EDID, &self.editor_id)?;
        self.bounds.write(writer)?;
        self.name.write(Tag::FULL, writer)?;
        self.keywords.write(writer)?;
        writer.write_u32_value(Tag::MDOB, self.menu_display)?;
        writer.write_u32_value(Tag::ETYP, self.equip_type)?;
        self.description.write(Tag::DESC, writer)?;
        writer.write_string(Tag::MODL, &self.model_path)?;
        write_opt_blob(writer, Tag::MODT, &self.model_hashes)?;
        writer.write_field_header(Tag::DATA, 8)?;
        writer.write_u32(self.value)?;
        writer.write_f32(self.weight)?;
        self.data.write(writer)?;
        for effect in &self.effects {
            effect.write(writer)?;
        }
        Ok(())
    }
}
