use crate::{
    fields::Blob,
    record::{DecodeOptions, Record, RecordKind, Tes4Header},
    records::{tes4::form_key, unhandled, write_opt_blob, write_opt_string, write_opt_u32},
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_STRING, MAX_TEXT},
    Error, Tag,
};
use std::{io::Write, ops::RangeInclusive};

/// The `DATA` block of a camera shot. The near target distance is only
/// present in the 44 byte form.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CameraShotData {
    pub action: u32,
    pub location: u32,
    pub target: u32,
    pub flags: u32,
    pub time_mult_player: f32,
    pub time_mult_target: f32,
    pub time_mult_global: f32,
    pub max_time: f32,
    pub min_time: f32,
    pub target_percent_between_actors: f32,
    pub near_target_distance: Option<f32>,
}

impl CameraShotData {
    pub const ACTION_SHOOT: u32 = 0;
    pub const ACTION_FLY: u32 = 1;
    pub const ACTION_HIT: u32 = 2;
    pub const ACTION_ZOOM: u32 = 3;

    pub const LOCATION_ATTACKER: u32 = 0;
    pub const LOCATION_PROJECTILE: u32 = 1;
    pub const LOCATION_TARGET: u32 = 2;
    pub const LOCATION_LEAD_ACTOR: u32 = 3;

    const MAX_FLAGS: u32 = 0x3F;
    const TIME_MULT: RangeInclusive<f32> = 0.0..=20.0;
    const GLOBAL_MULT: RangeInclusive<f32> = 0.0..=1.0;
    const TIME: RangeInclusive<f32> = 0.0..=120.0;
    const PERCENT: RangeInclusive<f32> = 0.0..=100.0;
    const NEAR_DISTANCE: RangeInclusive<f32> = 0.0..=2000.0;

    fn encoded_len(&self) -> usize {
        if self.near_target_distance.is_some() {
            44
        } else {
            40
        }
    }

    fn is_valid(&self) -> bool {
        self.action <= Self::ACTION_ZOOM
            && self.location <= Self::LOCATION_LEAD_ACTOR
            && self.target <= Self::LOCATION_LEAD_ACTOR
            && self.flags <= Self::MAX_FLAGS
            && Self::TIME_MULT.contains(&self.time_mult_player)
            && Self::TIME_MULT.contains(&self.time_mult_target)
            && Self::GLOBAL_MULT.contains(&self.time_mult_global)
            && Self::TIME.contains(&self.max_time)
            && Self::TIME.contains(&self.min_time)
            && Self::PERCENT.contains(&self.target_percent_between_actors)
            && self
                .near_target_distance
                .map_or(true, |x| Self::NEAR_DISTANCE.contains(&x))
    }
}

impl Default for CameraShotData {
    fn default() -> Self {
        CameraShotData {
            action: Self::ACTION_SHOOT,
            location: Self::LOCATION_ATTACKER,
            target: Self::LOCATION_TARGET,
            flags: 0,
            time_mult_player: 1.0,
            time_mult_target: 1.0,
            time_mult_global: 1.0,
            max_time: 20.0,
            min_time: 0.0,
            target_percent_between_actors: 0.0,
            near_target_distance: None,
        }
    }
}

/// A kill cam or other scripted camera shot (`CAMS`)
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CameraShot {
    pub editor_id: String,
    pub model_path: Option<String>,
    pub model_hashes: Option<Blob>,
    pub data: CameraShotData,
    pub image_space_modifier: Option<u32>,
}

impl RecordKind for CameraShot {
    type Header = Tes4Header;
    type Key = u32;

    const SCHEMA: Schema = Schema {
        record: Tag::CAMS,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::EDID, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::MODL, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::MODT, Length::Any),
            FieldSpec::required(Tag::DATA, Length::OneOf(&[40, 44])),
            FieldSpec::optional(Tag::MNAM, Length::Fixed(4)),
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
        _options: &DecodeOptions,
    ) -> Result<(), Error> {
        match tag {
            Tag::EDID => self.editor_id = reader.read_string(tag, MAX_STRING)?,
            Tag::MODL => self.model_path = Some(reader.read_string(tag, MAX_STRING)?),
            Tag::MODT => self.model_hashes = Some(Blob::read(reader, tag, MAX_TEXT)?),
            Tag::DATA => {
                let offset = reader.position();
                let len = reader.read_length()? as usize;
                let mut data = reader.take(len)?;
                let shot = CameraShotData {
                    action: data.read_u32()?,
                    location: data.read_u32()?,
                    target: data.read_u32()?,
                    flags: data.read_u32()?,
                    time_mult_player: data.read_f32()?,
                    time_mult_target: data.read_f32()?,
                    time_mult_global: data.read_f32()?,
                    max_time: data.read_f32()?,
                    min_time: data.read_f32()?,
                    target_percent_between_actors: data.read_f32()?,
                    near_target_distance: if data.is_empty() {
                        None
                    } else {
                        Some(data.read_f32()?)
                    },
                };

                if !shot.is_valid() {
                    return Err(Error::out_of_range(tag, offset));
                }
                self.data = shot;
            }
            Tag::MNAM => self.image_space_modifier = Some(reader.read_form_id(tag)?),
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_string(Tag::EDID, &self.editor_id)?;
        write_opt_string(writer, Tag::MODL, &self.model_path)?;
        write_opt_blob(writer, Tag::MODT, &self.model_hashes)?;

        let data = &self.data;
        writer.write_field_header(Tag::DATA, data.encoded_len())?;
        writer.write_u32(data.action)?;
        writer.write_u32(data.location)?;
        writer.write_u32(data.target)?;
        writer.write_u32(data.flags)?;
        writer.write_f32(data.time_mult_player)?;
        writer.write_f32(data.time_mult_target)?;
        writer.write_f32(data.time_mult_global)?;
        writer.write_f32(data.max_time)?;
        writer.write_f32(data.min_time)?;
        writer.write_f32(data.target_percent_between_actors)?;
        if let Some(distance) = data.near_target_distance {
            writer.write_f32(distance)?;
        }

        write_opt_u32(writer, Tag::MNAM, self.image_space_modifier)
    }
}
