use crate::{
    fields::{Blob, Condition, ExtraName, Keywords, LocalizedString},
    record::{DecodeOptions, Record, RecordKind, Tes4Header},
    records::{tes4::form_key, unhandled, write_opt_blob, write_opt_u32},
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_STRING, MAX_TEXT},
    Error, Tag,
};
use std::io::Write;

/// The 152 byte `DATA` block of a magic effect
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MagicEffectData {
    pub flags: u32,
    pub base_cost: f32,
    pub related_id: u32,
    pub magic_skill: i32,
    pub resist_value: i32,
    pub counter_effect_count: u32,
    pub light: u32,
    pub taper_weight: f32,
    pub hit_shader: u32,
    pub enchant_shader: u32,
    pub skill_level: u32,
    pub area: u32,
    pub casting_time: f32,
    pub taper_curve: f32,
    pub taper_duration: f32,
    pub second_value_weight: f32,
    pub archetype: u32,
    pub primary_value: i32,
    pub projectile: u32,
    pub explosion: u32,
    pub casting_type: u32,
    pub delivery: u32,
    pub second_value: i32,
    pub casting_art: u32,
    pub hit_effect_art: u32,
    pub impact_data_set: u32,
    pub skill_usage_mult: f32,
    pub dual_casting_art: u32,
    pub dual_casting_scale: f32,
    pub enchant_art: u32,
    pub unknown: [u32; 2],
    pub equip_ability: u32,
    pub image_space_modifier: u32,
    pub perk: u32,
    pub casting_sound_level: u32,
    pub ai_score: f32,
    pub ai_delay_time: f32,
}

impl MagicEffectData {
    pub const LEN: usize = 152;

    fn read(reader: &mut SubRecordReader) -> Result<Self, Error> {
        let mut data = reader.read_struct(Tag::DATA, Self::LEN)?;
        let d = &mut data;
        Ok(MagicEffectData {
            flags: d.read_u32()?,
            base_cost: d.read_f32()?,
            related_id: d.read_u32()?,
            magic_skill: d.read_i32()?,
            resist_value: d.read_i32()?,
            counter_effect_count: d.read_u32()?,
            light: d.read_u32()?,
            taper_weight: d.read_f32()?,
            hit_shader: d.read_u32()?,
            enchant_shader: d.read_u32()?,
            skill_level: d.read_u32()?,
            area: d.read_u32()?,
            casting_time: d.read_f32()?,
            taper_curve: d.read_f32()?,
            taper_duration: d.read_f32()?,
            second_value_weight: d.read_f32()?,
            archetype: d.read_u32()?,
            primary_value: d.read_i32()?,
            projectile: d.read_u32()?,
            explosion: d.read_u32()?,
            casting_type: d.read_u32()?,
            delivery: d.read_u32()?,
            second_value: d.read_i32()?,
            casting_art: d.read_u32()?,
            hit_effect_art: d.read_u32()?,
            impact_data_set: d.read_u32()?,
            skill_usage_mult: d.read_f32()?,
            dual_casting_art: d.read_u32()?,
            dual_casting_scale: d.read_f32()?,
            enchant_art: d.read_u32()?,
            unknown: [d.read_u32()?, d.read_u32()?],
            equip_ability: d.read_u32()?,
            image_space_modifier: d.read_u32()?,
            perk: d.read_u32()?,
            casting_sound_level: d.read_u32()?,
            ai_score: d.read_f32()?,
            ai_delay_time: d.read_f32()?,
        })
    }

    fn write<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_field_header(Tag::DATA, Self::LEN)?;
        writer.write_u32(self.flags)?;
        writer.write_f32(self.base_cost)?;
        writer.write_u32(self.related_id)?;
        writer.write_i32(self.magic_skill)?;
        writer.write_i32(self.resist_value)?;
        writer.write_u32(self.counter_effect_count)?;
        writer.write_u32(self.light)?;
        writer.write_f32(self.taper_weight)?;
        writer.write_u32(self.hit_shader)?;
        writer.write_u32(self.enchant_shader)?;
        writer.write_u32(self.skill_level)?;
        writer.write_u32(self.area)?;
        writer.write_f32(self.casting_time)?;
        writer.write_f32(self.taper_curve)?;
        writer.write_f32(self.taper_duration)?;
        writer.write_f32(self.second_value_weight)?;
        writer.write_u32(self.archetype)?;
        writer.write_i32(self.primary_value)?;
        writer.write_u32(self.projectile)?;
        writer.write_u32(self.explosion)?;
        writer.write_u32(self.casting_type)?;
        writer.write_u32(self.delivery)?;
        writer.write_i32(self.second_value)?;
        writer.write_u32(self.casting_art)?;
        writer.write_u32(self.hit_effect_art)?;
        writer.write_u32(self.impact_data_set)?;
        writer.write_f32(self.skill_usage_mult)?;
        writer.write_u32(self.dual_casting_art)?;
        writer.write_f32(self.dual_casting_scale)?;
        writer.write_u32(self.enchant_art)?;
        writer.write_u32(self.unknown[0])?;
        writer.write_u32(self.unknown[1])?;
        writer.write_u32(self.equip_ability)?;
        writer.write_u32(self.image_space_modifier)?;
        writer.write_u32(self.perk)?;
        writer.write_u32(self.casting_sound_level)?;
        writer.write_f32(self.ai_score)?;
        writer.write_f32(self.ai_delay_time)
    }
}

/// A sound played at one stage of an effect (`SNDD` entry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SoundPair {
    pub sound_type: u32,
    pub sound: u32,
}

/// A magic effect (`MGEF`)
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MagicEffect {
    pub editor_id: String,
    pub script_data: Option<Blob>,
    pub name: LocalizedString,
    pub menu_display: Option<u32>,
    pub keywords: Keywords,
    pub data: MagicEffectData,
    pub sounds: Vec<SoundPair>,
    pub description: LocalizedString,
    pub conditions: Vec<Condition>,
}

impl MagicEffect {
    fn read_sounds(&mut self, reader: &mut SubRecordReader) -> Result<(), Error> {
        let len = reader.read_length()? as usize;
        let mut data = reader.take(len)?;
        for _ in 0..len / 8 {
            let offset = data.position();
            let pair = SoundPair {
                sound_type: data.read_u32()?,
                sound: data.read_u32()?,
            };

            let repeated = self.sounds.iter().any(|x| x.sound_type == pair.sound_type);
            if pair.sound == 0 || repeated {
                return Err(Error::out_of_range(Tag::SNDD, offset));
            }
            self.sounds.push(pair);
        }
        Ok(())
    }
}

impl RecordKind for MagicEffect {
    type Header = Tes4Header;
    type Key = u32;

    const SCHEMA: Schema = Schema {
        record: Tag::MGEF,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::EDID, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::VMAD, Length::Any),
            FieldSpec::optional(Tag::FULL, Length::Any),
            FieldSpec::optional(Tag::MDOB, Length::Fixed(4)),
            FieldSpec::optional(Tag::KSIZ, Length::Fixed(4)),
            FieldSpec::required(Tag::DATA, Length::Fixed(MagicEffectData::LEN as u32)),
            FieldSpec::optional(Tag::SNDD, Length::MultipleOf(8)),
            FieldSpec::required(Tag::DNAM, Length::Any),
            FieldSpec::repeatable(Tag::CTDA, Length::Fixed(32)),
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
            Tag::FULL => self.name = LocalizedString::read(reader, tag, localized, MAX_STRING)?,
            Tag::MDOB => self.menu_display = Some(reader.read_form_id(tag)?),
            Tag::KSIZ => self.keywords = Keywords::read(reader)?,
            Tag::DATA => self.data = MagicEffectData::read(reader)?,
            Tag::SNDD => self.read_sounds(reader)?,
            Tag::DNAM => {
                self.description = LocalizedString::read(reader, tag, localized, MAX_TEXT)?
            }
            Tag::CTDA => self
                .conditions
                .push(Condition::read(reader, ExtraName::Cis1)?),
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_string(Tag::EDID, &self.editor_id)?;
        write_opt_blob(writer, Tag::VMAD, &self.script_data)?;
        self.name.write(Tag::FULL, writer)?;
        write_opt_u32(writer, Tag::MDOB, self.menu_display)?;
        self.keywords.write(writer)?;
        self.data.write(writer)?;

        if !self.sounds.is_empty() {
            writer.write_field_header(Tag::SNDD, self.sounds.len() * 8)?;
            for pair in &self.sounds {
                writer.write_u32(pair.sound_type)?;
                writer.write_u32(pair.sound)?;
            }
        }

        self.description.write(Tag::DNAM, writer)?;
        for condition in &self.conditions {
            condition.write(ExtraName::Cis1, writer)?;
        }
        Ok(())
    }
}
