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

/// The `PBDT` block of a lock probe
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProbeData {
    pub weight: f32,
    pub value: u32,
    pub quality: f32,
    pub uses: u32,
}

/// A legacy lock probe (`PROB`)
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tes3Probe {
    pub name: LegacyString,
    pub model: LegacyString,
    pub full_name: LegacyString,
    pub data: ProbeData,
    pub icon: LegacyString,
    pub script: Option<LegacyString>,
}

impl RecordKind for Tes3Probe {
    type Header = Tes3Header;
    type Key = String;

    const SCHEMA: Schema = Schema {
        record: Tag::PROB,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::NAME, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::required(Tag::MODL, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::required(Tag::FNAM, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::required(Tag::PBDT, Length::Fixed(16)),
            FieldSpec::required(Tag::ITEX, Length::Capped(MAX_LEGACY_STRING)),
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
            Tag::PBDT => {
                let mut data = reader.read_struct(tag, 16)?;
                self.data = ProbeData {
                    weight: data.read_f32()?,
                    value: data.read_u32()?,
                    quality: data.read_f32()?,
                    uses: data.read_u32()?,
                };
            }
            Tag::ITEX => self.icon = read_legacy_string(reader, tag)?,
            Tag::SCRI => self.script = Some(read_legacy_string(reader, tag)?),
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        write_legacy_string(writer, Tag::NAME, &self.name)?;
        write_legacy_string(writer, Tag::MODL, &self.model)?;
        write_legacy_string(writer, Tag::FNAM, &self.full_name)?;

        writer.write_field_header(Tag::PBDT, 16)?;
        writer.write_f32(self.data.weight)?;
        writer.write_u32(self.data.value)?;
        writer.write_f32(self.data.quality)?;
        writer.write_u32(self.data.uses)?;

        write_legacy_string(writer, Tag::ITEX, &self.icon)?;
        write_opt_legacy_string(writer, Tag::SCRI, &self.script)
    }
}
