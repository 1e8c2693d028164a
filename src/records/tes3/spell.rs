use crate::{
    record::{DecodeOptions, Record, RecordKind, Tes3Header},
    records::{
        tes3::{
            name_key, read_legacy_string, write_legacy_string, write_opt_legacy_string,
            LegacyString,
        },
        unhandled,
    },
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_LEGACY_STRING},
    Error, Tag,
};
use std::io::Write;

/// The `SPDT` block of a legacy spell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tes3SpellData {
    pub spell_type: u32,
    pub cost: u32,
    pub flags: u32,
}

impl Tes3SpellData {
    pub const TYPE_SPELL: u32 = 0;
    pub const TYPE_ABILITY: u32 = 1;
    pub const TYPE_BLIGHT: u32 = 2;
    pub const TYPE_DISEASE: u32 = 3;
    pub const TYPE_CURSE: u32 = 4;
    pub const TYPE_POWER: u32 = 5;

    pub const FLAG_AUTO_CALC: u32 = 0x1;
    pub const FLAG_PC_START: u32 = 0x2;
    pub const FLAG_ALWAYS_SUCCEEDS: u32 = 0x4;
}

/// One `ENAM` effect entry of a spell or enchantment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SpellEffect {
    pub effect: u16,
    pub skill: i8,
    pub attribute: i8,
    pub range: u32,
    pub area: u32,
    pub duration: u32,
    pub magnitude_min: u32,
    pub magnitude_max: u32,
}

impl SpellEffect {
    pub(crate) const LEN: usize = 24;

    pub(crate) fn read(reader: &mut SubRecordReader) -> Result<Self, Error> {
        let mut data = reader.read_struct(Tag::ENAM, Self::LEN)?;
        Ok(SpellEffect {
            effect: data.read_u16()?,
            skill: data.read_i8()?,
            attribute: data.read_i8()?,
            range: data.read_u32()?,
            area: data.read_u32()?,
            duration: data.read_u32()?,
            magnitude_min: data.read_u32()?,
            magnitude_max: data.read_u32()?,
        })
    }

    pub(crate) fn write<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_field_header(Tag::ENAM, Self::LEN)?;
        writer.write_u16(self.effect)?;
        writer.write_u8(self.skill as u8)?;
        writer.write_u8(self.attribute as u8)?;
        writer.write_u32(self.range)?;
        writer.write_u32(self.area)?;
        writer.write_u32(self.duration)?;
        writer.write_u32(self.magnitude_min)?;
        writer.write_u32(self.magnitude_max)
    }
}

/// A legacy spell, ability, or disease (`SPEL`)
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tes3Spell {
    pub name: LegacyString,
    pub full_name: Option<LegacyString>,
    pub data: Tes3SpellData,
    pub effects: Vec<SpellEffect>,
}

impl RecordKind for Tes3Spell {
    type Header = Tes3Header;
    type Key = String;

    const SCHEMA: Schema = Schema {
        record: Tag::SPEL,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::NAME, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::optional(Tag::FNAM, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::required(Tag::SPDT, Length::Fixed(12)),
            FieldSpec::repeatable(Tag::ENAM, Length::Fixed(SpellEffect::LEN as u32)),
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
            Tag::FNAM => self.full_name = Some(read_legacy_string(reader, tag)?),
            Tag::SPDT => {
                let mut data = reader.read_struct(tag, 12)?;
                self.data = Tes3SpellData {
                    spell_type: data.read_u32()?,
                    cost: data.read_u32()?,
                    flags: data.read_u32()?,
                };
            }
            Tag::ENAM => self.effects.push(SpellEffect::read(reader)?),
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        write_legacy_string(writer, Tag::NAME, &self.name)?;
        write_opt_legacy_string(writer, Tag::FNAM, &self.full_name)?;

        writer.write_field_header(Tag::SPDT, 12)?;
        writer.write_u32(self.data.spell_type)?;
        writer.write_u32(self.data.cost)?;
        writer.write_u32(self.data.flags)?;

        for effect in &self.effects {
            effect.write(writer)?;
        }
        Ok(())
    }
}
