use crate::{
    record::{DecodeOptions, Record, RecordKind, Tes4Header},
    records::{tes3::GlobalKind, tes4::form_key, unhandled},
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_STRING},
    Error, Tag,
};
use std::io::Write;

/// A global variable (`GLOB`). Same layout as the legacy record, but named
/// by editor id and keyed by form id.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Global {
    pub editor_id: String,
    pub kind: GlobalKind,
    pub value: f32,
}

impl RecordKind for Global {
    type Header = Tes4Header;
    type Key = u32;

    const SCHEMA: Schema = Schema {
        record: Tag::GLOB,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::EDID, Length::Capped(MAX_STRING)),
            FieldSpec::required(Tag::FNAM, Length::Fixed(1)),
            FieldSpec::required(Tag::FLTV, Length::Fixed(4)),
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
            Tag::FNAM => {
                let offset = reader.position();
                let [code] = reader.read_fixed::<1>(tag)?;
                self.kind =
                    GlobalKind::from_code(code).ok_or_else(|| Error::out_of_range(tag, offset))?;
            }
            Tag::FLTV => self.value = reader.read_f32_value(tag)?,
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_string(Tag::EDID, &self.editor_id)?;
        writer.write_value(Tag::FNAM, &[self.kind.code()])?;
        writer.write_f32_value(Tag::FLTV, self.value)
    }
}
