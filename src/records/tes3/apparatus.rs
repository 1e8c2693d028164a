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

/// The `AADT` block of a legacy apparatus
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ApparatusData {
    pub apparatus_type: u32,
    pub quality: f32,
    pub weight: f32,
    pub value: u32,
}

impl ApparatusData {
    pub const MORTAR_PESTLE: u32 = 0;
    pub const ALEMBIC: u32 = 1;
    pub const CALCINATOR: u32 = 2;
    pub const RETORT: u32 = 3;
}

/// A legacy alchemy apparatus (`APPA`)
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tes3Apparatus {
    pub name: LegacyString,
    pub model: LegacyString,
    pub full_name: LegacyString,
    pub data: ApparatusData,
    pub icon: Option<LegacyString>,
    pub script: Option<LegacyString>,
}

impl RecordKind for Tes3Apparatus {
    type Header = Tes3Header;
    type Key = String;

    const SCHEMA: Schema = Schema {
        record: Tag::APPA,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::NAME, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::required(Tag::MODL, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::required(Tag::FNAM, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::required(Tag::AADT, Length::Fixed(16)),
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
            Tag::AADT => {
                let mut data = reader.read_struct(tag, 16)?;
                self.data = ApparatusData {
                    apparatus_type: data.read_u32()?,
                    quality: data.read_f32()?,
                    weight: data.read_f32()?,
                    value: data.read_u32()?,
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

        writer.write_field_header(Tag::AADT, 16)?;
        writer.write_u32(self.data.apparatus_type)?;
        writer.write_f32(self.data.quality)?;
        writer.write_f32(self.data.weight)?;
        writer.write_u32(self.data.value)?;

        write_opt_legacy_string(writer, Tag::ITEX, &self.icon)?;
        write_opt_legacy_string(writer, Tag::SCRI, &self.script)
    }
}
