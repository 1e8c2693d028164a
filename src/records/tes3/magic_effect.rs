use crate::{
    record::{DecodeOptions, Record, RecordKind, Tes3Header},
    records::{
        tes3::{read_legacy_string, write_legacy_string, LegacyString},
        unhandled,
    },
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_LEGACY_STRING, MAX_TEXT},
    Error, Tag,
};
use std::io::Write;

/// The `MEDT` block of a legacy magic effect
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tes3EffectData {
    pub school: u32,
    pub base_cost: f32,
    pub flags: u32,
    pub red: u32,
    pub blue: u32,
    pub green: u32,
    pub speed: f32,
    pub size: f32,
    pub size_cap: f32,
}

/// One of the optional visual, sound, or description sub-records. A `DESC`
/// value is always unterminated.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EffectAsset {
    pub tag: Tag,
    pub value: LegacyString,
}

/// A legacy magic effect (`MGEF`), keyed by its effect index
///
/// The optional assets keep the order they were read in.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tes3MagicEffect {
    pub index: i32,
    pub data: Tes3EffectData,
    pub icon: LegacyString,
    pub particle_texture: LegacyString,
    pub assets: Vec<EffectAsset>,
}

impl Tes3MagicEffect {
    /// The value of an optional asset such as `CSND` or `DESC`
    pub fn asset(&self, tag: Tag) -> Option<&str> {
        self.assets
            .iter()
            .find(|x| x.tag == tag)
            .map(|x| x.value.as_str())
    }
}

impl RecordKind for Tes3MagicEffect {
    type Header = Tes3Header;
    type Key = i32;

    const SCHEMA: Schema = Schema {
        record: Tag::MGEF,
        discipline: Discipline::SentinelBounded,
        fields: &[
            FieldSpec::required(Tag::INDX, Length::Fixed(4)),
            FieldSpec::required(Tag::MEDT, Length::Fixed(36)),
            FieldSpec::required(Tag::ITEX, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::required(Tag::PTEX, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::optional(Tag::CVFX, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::optional(Tag::BVFX, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::optional(Tag::HVFX, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::optional(Tag::AVFX, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::optional(Tag::DESC, Length::Capped(MAX_TEXT)),
            FieldSpec::optional(Tag::CSND, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::optional(Tag::BSND, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::optional(Tag::HSND, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::optional(Tag::ASND, Length::Capped(MAX_LEGACY_STRING)),
        ],
        branches: &[],
    };

    fn key(record: &Record<Self>) -> Option<i32> {
        record.payload.as_ref().map(|x| x.index)
    }

    fn visit_field(
        &mut self,
        tag: Tag,
        reader: &mut SubRecordReader,
        _options: &DecodeOptions,
    ) -> Result<(), Error> {
        match tag {
            Tag::INDX => self.index = reader.read_i32_value(tag)?,
            Tag::MEDT => {
                let mut data = reader.read_struct(tag, 36)?;
                self.data = Tes3EffectData {
                    school: data.read_u32()?,
                    base_cost: data.read_f32()?,
                    flags: data.read_u32()?,
                    red: data.read_u32()?,
                    blue: data.read_u32()?,
                    green: data.read_u32()?,
                    speed: data.read_f32()?,
                    size: data.read_f32()?,
                    size_cap: data.read_f32()?,
                };
            }
            Tag::ITEX => self.icon = read_legacy_string(reader, tag)?,
            Tag::PTEX => self.particle_texture = read_legacy_string(reader, tag)?,
            Tag::DESC => {
                let value = reader.read_unterminated_string(tag, MAX_TEXT)?;
                self.assets.push(EffectAsset {
                    tag,
                    value: LegacyString::unterminated(value),
                });
            }
            Tag::CVFX | Tag::BVFX | Tag::HVFX | Tag::AVFX => {
                let value = read_legacy_string(reader, tag)?;
                self.assets.push(EffectAsset { tag, value });
            }
            Tag::CSND | Tag::BSND | Tag::HSND | Tag::ASND => {
                let value = read_legacy_string(reader, tag)?;
                self.assets.push(EffectAsset { tag, value });
            }
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_i32_value(Tag::INDX, self.index)?;

        let data = &self.data;
        writer.write_field_header(Tag::MEDT, 36)?;
        writer.write_u32(data.school)?;
        writer.write_f32(data.base_cost)?;
        writer.write_u32(data.flags)?;
        writer.write_u32(data.red)?;
        writer.write_u32(data.blue)?;
        writer.write_u32(data.green)?;
        writer.write_f32(data.speed)?;
        writer.write_f32(data.size)?;
        writer.write_f32(data.size_cap)?;

        write_legacy_string(writer, Tag::ITEX, &self.icon)?;
        write_legacy_string(writer, Tag::PTEX, &self.particle_texture)?;
        for asset in &self.assets {
            if asset.tag == Tag::DESC {
                writer.write_unterminated_string(asset.tag, &asset.value.text)?;
            } else {
                write_legacy_string(writer, asset.tag, &asset.value)?;
            }
        }
        Ok(())
    }
}
