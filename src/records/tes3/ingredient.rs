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

/// The `IRDT` block of a legacy ingredient. Unused effect slots hold -1.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IngredientData {
    pub weight: f32,
    pub value: u32,
    pub effects: [i32; 4],
    pub skills: [i32; 4],
    pub attributes: [i32; 4],
}

impl IngredientData {
    const LEN: usize = 56;

    /// The effect ids of the slots that are in use
    pub fn active_effects(&self) -> impl Iterator<Item = i32> + '_ {
        self.effects.iter().copied().filter(|&x| x >= 0)
    }
}

impl Default for IngredientData {
    fn default() -> Self {
        IngredientData {
            weight: 0.0,
            value: 0,
            effects: [-1; 4],
            skills: [-1; 4],
            attributes: [-1; 4],
        }
    }
}

/// A legacy alchemy ingredient (`INGR`)
///
/// Ingredient fields end at the first foreign tag, which is left for the
/// next record.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tes3Ingredient {
    pub name: LegacyString,
    pub model: LegacyString,
    pub full_name: LegacyString,
    pub data: IngredientData,
    pub icon: Option<LegacyString>,
    pub script: Option<LegacyString>,
}

fn read_ids(reader: &mut SubRecordReader) -> Result<[i32; 4], Error> {
    Ok([
        reader.read_i32()?,
        reader.read_i32()?,
        reader.read_i32()?,
        reader.read_i32()?,
    ])
}

impl RecordKind for Tes3Ingredient {
    type Header = Tes3Header;
    type Key = String;

    const SCHEMA: Schema = Schema {
        record: Tag::INGR,
        discipline: Discipline::SentinelBounded,
        fields: &[
            FieldSpec::required(Tag::NAME, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::required(Tag::MODL, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::required(Tag::FNAM, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::required(Tag::IRDT, Length::Fixed(IngredientData::LEN as u32)),
            FieldSpec::optional(Tag::ITEX, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::optional(Tag::SCRI, Length::Capped(MAX_LEGACY_STRING)),
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
            Tag::MODL => self.model = read_legacy_string(reader, tag)?,
            Tag::FNAM => self.full_name = read_legacy_string(reader, tag)?,
            Tag::IRDT => {
                let mut data = reader.read_struct(tag, IngredientData::LEN)?;
                self.data = IngredientData {
                    weight: data.read_f32()?,
                    value: data.read_u32()?,
                    effects: read_ids(&mut data)?,
                    skills: read_ids(&mut data)?,
                    attributes: read_ids(&mut data)?,
                };
            }
            Tag::ITEX => self.icon = Some(read_legacy_string(reader, tag)?),
            Tag::SCRI => self.script = Some(read_legacy_string(reader, tag)?),
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        write_legacy_string(writer, Tag::NAME, &self.name)?;
        write_legacy_string(writer, Tag::MODL, &self.model)?;
        write_legacy_string(writer, Tag::FNAM, &self.full_name)?;

        let data = &self.data;
        writer.write_field_header(Tag::IRDT, IngredientData::LEN)?;
        writer.write_f32(data.weight)?;
        writer.write_u32(data.value)?;
        for id in data.effects.iter().chain(&data.skills).chain(&data.attributes) {
            writer.write_i32(*id)?;
        }

        write_opt_legacy_string(writer, Tag::ITEX, &self.icon)?;
        write_opt_legacy_string(writer, Tag::SCRI, &self.script)
    }
}
