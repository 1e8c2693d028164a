use crate::{
    fields::{EffectBlock, LocalizedString, ObjectBounds},
    record::{DecodeOptions, Record, RecordKind, Tes4Header},
    records::{tes4::form_key, unhandled, write_opt_u32},
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_STRING, MAX_TEXT},
    Error, Tag,
};
use std::io::Write;

/// The `SPIT` block of a spell
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SpellData {
    pub cost: u32,
    pub flags: u32,
    pub spell_type: u32,
    pub charge_time: f32,
    pub cast_type: u32,
    pub delivery: u32,
    pub cast_duration: f32,
    pub range: f32,
    pub perk: u32,
}

impl SpellData {
    pub(crate) const LEN: usize = 36;

    /// Decode after the `SPIT` tag has been consumed
    pub(crate) fn read(reader: &mut SubRecordReader) -> Result<Self, Error> {
        let mut data = reader.read_struct(Tag::SPIT, Self::LEN)?;
        Ok(SpellData {
            cost: data.read_u32()?,
            flags: data.read_u32()?,
            spell_type: data.read_u32()?,
            charge_time: data.read_f32()?,
            cast_type: data.read_u32()?,
            delivery: data.read_u32()?,
            cast_duration: data.read_f32()?,
            range: data.read_f32()?,
            perk: data.read_u32()?,
        })
    }

    pub(crate) fn write<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_field_header(Tag::SPIT, Self::LEN)?;
        writer.write_u32(self.cost)?;
        writer.write_u32(self.flags)?;
        writer.write_u32(self.spell_type)?;
        writer.write_f32(self.charge_time)?;
        writer.write_u32(self.cast_type)?;
        writer.write_u32(self.delivery)?;
        writer.write_f32(self.cast_duration)?;
        writer.write_f32(self.range)?;
        writer.write_u32(self.perk)
    }
}

/// A spell, power, or ability (`SPEL`)
///
/// Spells without any payload at all count as deleted.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Spell {
    pub editor_id: String,
    pub bounds: Option<ObjectBounds>,
    pub name: LocalizedString,
    pub menu_display: Option<u32>,
    pub equip_type: u32,
    pub description: LocalizedString,
    pub data: SpellData,
    pub effects: Vec<EffectBlock>,
}

impl RecordKind for Spell {
    type Header = Tes4Header;
    type Key = u32;

    const SCHEMA: Schema = Schema {
        record: Tag::SPEL,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::EDID, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::OBND, Length::Fixed(12)),
            FieldSpec::optional(Tag::FULL, Length::Any),
            FieldSpec::optional(Tag::MDOB, Length::Fixed(4)),
            FieldSpec::required(Tag::ETYP, Length::Fixed(4)),
            FieldSpec::required(Tag::DESC, Length::Any),
            FieldSpec::required(Tag::SPIT, Length::Fixed(36)),
            FieldSpec::repeatable(Tag::EFID, Length::Fixed(4)),
        ],
        branches: &[],
    };

    const EMPTY_IS_DELETED: bool = true;

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
            Tag::OBND => self.bounds = Some(ObjectBounds::read(reader)?),
            Tag::FULL => self.name = LocalizedString::read(reader, tag, localized, MAX_STRING)?,
            Tag::MDOB => self.menu_display = Some(reader.read_form_id(tag)?),
            Tag::ETYP => self.equip_type = reader.read_form_id(tag)?,
            Tag::DESC => {
                self.description = LocalizedString::read(reader, tag, localized, MAX_TEXT)?
            }
            Tag::SPIT => self.data = SpellData::read(reader)?,
            Tag::EFID => self.effects.push(EffectBlock::read(reader)?),
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_string(Tag::EDID, &self.editor_id)?;
        if let Some(bounds) = &self.bounds {
            bounds.write(writer)?;
        }
        self.name.write(Tag::FULL, writer)?;
        write_opt_u32(writer, Tag::MDOB, self.menu_display)?;
        writer.write_u32_value(Tag::ETYP, self.equip_type)?;
        self.description.write(Tag::DESC, writer)?;

        self.data.write(writer)?;
        for effect in &self.effects {
            effect.write(writer)?;
        }
        Ok(())
    }
}
