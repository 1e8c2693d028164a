use crate::{
    fields::LocalizedString,
    record::{DecodeOptions, Record, RecordKind, Tes4Header},
    records::{tes3::GameSettingKind, tes4::form_key, unhandled},
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter},
    Error, Tag,
};
use std::io::Write;

const MAX_SETTING: u32 = 511;

/// The `DATA` of a newer dialect game setting. Text may be localized.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum SettingValue {
    Float(f32),
    Int(i32),
    Text(LocalizedString),
}

impl Default for SettingValue {
    fn default() -> Self {
        SettingValue::Text(LocalizedString::Inline(String::new()))
    }
}

/// A named engine constant (`GMST`)
///
/// The first character of the editor id picks the value type, the same way
/// as in the legacy dialect.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GameSetting {
    pub editor_id: String,
    pub value: SettingValue,
}

impl GameSetting {
    pub fn kind(&self) -> GameSettingKind {
        GameSettingKind::classify(&self.editor_id)
    }
}

impl RecordKind for GameSetting {
    type Header = Tes4Header;
    type Key = u32;

    const SCHEMA: Schema = Schema {
        record: Tag::GMST,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::EDID, Length::Capped(MAX_SETTING)),
            FieldSpec::required(Tag::DATA, Length::Capped(MAX_SETTING)),
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
        match tag {
            Tag::EDID => {
                let offset = reader.position();
                let name = reader.read_string(tag, MAX_SETTING)?;
                if name.is_empty() {
                    return Err(Error::invalid_length(tag, 1, offset));
                }
                self.editor_id = name;
            }
            Tag::DATA => {
                self.value = match self.kind() {
                    GameSettingKind::Float => SettingValue::Float(reader.read_f32_value(tag)?),
                    GameSettingKind::Int => SettingValue::Int(reader.read_i32_value(tag)?),
                    GameSettingKind::Text => SettingValue::Text(LocalizedString::read(
                        reader,
                        tag,
                        options.is_localized(),
                        MAX_SETTING,
                    )?),
                }
            }
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_string(Tag::EDID, &self.editor_id)?;
        match &self.value {
            SettingValue::Float(x) => writer.write_f32_value(Tag::DATA, *x),
            SettingValue::Int(x) => writer.write_i32_value(Tag::DATA, *x),
            SettingValue::Text(LocalizedString::Absent) => writer.write_string(Tag::DATA, ""),
            SettingValue::Text(text) => text.write(Tag::DATA, writer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dialect, ErrorKind};
    use rstest::*;

    const JUMP_HEIGHT: &[u8] = b"GMST\x1F\0\0\0\0\0\0\0\x87\x0A\0\0\x1B\x69\x55\0\x28\0\x0C\0EDID\x0F\0fJumpHeightMin\0DATA\x04\0\0\0\x98\x42";
    const ACTIVATE: &[u8] = b"GMST\x1A\0\0\0\0\0\0\0\xE8\x0C\x03\0\x1B\x69\x55\0\x28\0\x0C\0EDID\x0A\0sActivate\0DATA\x04\0\x45\xBA\0\0";

    fn decode(data: &[u8], localized: bool) -> Result<Record<GameSetting>, Error> {
        let mut reader = SubRecordReader::new(data, Dialect::Tes4);
        let options = DecodeOptions::new().localized(localized);
        let record = Record::decode(&mut reader, &options)?;
        assert!(reader.is_empty());
        Ok(record)
    }

    #[rstest]
    #[case(JUMP_HEIGHT, SettingValue::Float(76.0))]
    #[case(ACTIVATE, SettingValue::Text(LocalizedString::Index(0xBA45)))]
    fn test_settings(#[case] data: &[u8], #[case] expected: SettingValue) {
        let record = decode(data, true).unwrap();
        assert_eq!(record.payload.as_ref().unwrap().value, expected);

        let mut out = Vec::new();
        record.write_to(&mut out).unwrap();
        assert_eq!(out.as_slice(), data);
    }

    #[test]
    fn test_inline_text() {
        let record = Record::new(
            Tes4Header::new(Tag::GMST, 0x800),
            GameSetting {
                editor_id: String::from("sGreeting"),
                value: SettingValue::Text(LocalizedString::Inline(String::from("Hail"))),
            },
        );
        let mut out = Vec::new();
        record.write_to(&mut out).unwrap();
        assert!(out.ends_with(b"DATA\x05\0Hail\0"));
        assert_eq!(decode(&out, false).unwrap().payload, record.payload);
    }

    #[test]
    fn test_int_needs_four_bytes() {
        let data = b"GMST\x15\0\0\0\0\0\0\0\x01\0\0\0\0\0\0\0\x28\0\x0C\0EDID\x06\0iMax1\0DATA\x03\0\x01\0\0";
        let err = decode(&data[..], false).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidLength {
                tag: Tag::DATA,
                length: 3,
                ..
            }
        ));
    }
}
