use crate::{
    record::{DecodeOptions, Record, RecordKind, Tes3Header},
    records::{tes3::name_key, unhandled},
    schema::{Branch, Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter},
    Error, Tag,
};
use std::io::Write;

/// Longest setting name or string value
const MAX_SETTING: u32 = 511;

/// The value shape a game setting's name calls for
///
/// ```
/// use tesfile::records::tes3::GameSettingKind;
/// use tesfile::Tag;
///
/// assert_eq!(GameSettingKind::classify("fCombatDistance"), GameSettingKind::Float);
/// assert_eq!(GameSettingKind::classify("iMaxLevel"), GameSettingKind::Int);
/// assert_eq!(GameSettingKind::classify("sOk").value_tag(), Tag::STRV);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameSettingKind {
    Float,
    Int,
    Text,
}

impl GameSettingKind {
    /// Classify by the first character of the setting name
    pub fn classify(name: &str) -> Self {
        match name.as_bytes().first() {
            Some(b'f') => GameSettingKind::Float,
            Some(b'i') => GameSettingKind::Int,
            _ => GameSettingKind::Text,
        }
    }

    /// The sub-record that holds a value of this kind
    pub const fn value_tag(self) -> Tag {
        match self {
            GameSettingKind::Float => Tag::FLTV,
            GameSettingKind::Int => Tag::INTV,
            GameSettingKind::Text => Tag::STRV,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum GameSettingValue {
    Float(f32),
    Int(i32),
    Text(String),
}

impl GameSettingValue {
    pub fn kind(&self) -> GameSettingKind {
        match self {
            GameSettingValue::Float(_) => GameSettingKind::Float,
            GameSettingValue::Int(_) => GameSettingKind::Int,
            GameSettingValue::Text(_) => GameSettingKind::Text,
        }
    }
}

/// A named engine constant (`GMST`)
///
/// A text setting may omit its value entirely, which reads as an empty
/// string. Float and integer settings always carry one.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GameSetting {
    pub name: String,
    pub value: Option<GameSettingValue>,
}

impl GameSetting {
    pub fn kind(&self) -> GameSettingKind {
        GameSettingKind::classify(&self.name)
    }
}

impl RecordKind for GameSetting {
    type Header = Tes3Header;
    type Key = String;

    const SCHEMA: Schema = Schema {
        record: Tag::GMST,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::NAME, Length::Capped(MAX_SETTING)),
            FieldSpec::optional(Tag::FLTV, Length::Fixed(4)),
            FieldSpec::optional(Tag::INTV, Length::Fixed(4)),
            FieldSpec::optional(Tag::STRV, Length::Capped(MAX_SETTING)),
        ],
        branches: &[Branch {
            after: Tag::NAME,
            choices: &[Tag::FLTV, Tag::INTV, Tag::STRV],
        }],
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
        if tag == Tag::NAME {
            let offset = reader.position();
            let name = reader.read_unterminated_string(tag, MAX_SETTING)?;
            if name.is_empty() {
                return Err(Error::invalid_length(tag, 0, offset));
            }
            self.name = name;
            return Ok(());
        }

        let expected = self.kind().value_tag();
        if tag != expected {
            let offset = reader.position().saturating_sub(4);
            return Err(Error::unexpected_tag(Some(expected), tag, offset));
        }

        let value = match tag {
            Tag::FLTV => GameSettingValue::Float(reader.read_f32_value(tag)?),
            Tag::INTV => GameSettingValue::Int(reader.read_i32_value(tag)?),
            Tag::STRV => {
                GameSettingValue::Text(reader.read_unterminated_string(tag, MAX_SETTING)?)
            }
            _ => return Err(unhandled(tag, reader)),
        };
        self.value = Some(value);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        match self.kind() {
            GameSettingKind::Text => Ok(()),
            kind if self.value.is_none() => Err(Error::missing_field(Tag::GMST, kind.value_tag())),
            _ => Ok(()),
        }
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_unterminated_string(Tag::NAME, &self.name)?;

        let value = match &self.value {
            Some(value) => value,
            None => return Ok(()),
        };

        let expected = self.kind().value_tag();
        if value.kind() != self.kind() {
            let found = value.kind().value_tag();
            return Err(Error::unexpected_tag(Some(expected), found, writer.position()));
        }

        match value {
            GameSettingValue::Float(x) => writer.write_f32_value(Tag::FLTV, *x),
            GameSettingValue::Int(x) => writer.write_i32_value(Tag::INTV, *x),
            GameSettingValue::Text(x) => writer.write_unterminated_string(Tag::STRV, x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dialect, ErrorKind};
    use rstest::*;

    fn decode(data: &[u8]) -> Result<Record<GameSetting>, Error> {
        let mut reader = SubRecordReader::new(data, Dialect::Tes3);
        let record = Record::decode(&mut reader, &DecodeOptions::new())?;
        assert!(reader.is_empty());
        Ok(record)
    }

    #[rstest]
    #[case(
        &b"GMST\x23\0\0\0\0\0\0\0\0\0\0\0NAME\x0F\0\0\0fCombatDistanceFLTV\x04\0\0\0\0\0\0\x43"[..],
        "fCombatDistance",
        Some(GameSettingValue::Float(128.0))
    )]
    #[case(
        &b"GMST\x1D\0\0\0\0\0\0\0\0\0\0\0NAME\x09\0\0\0iMaxLevelINTV\x04\0\0\0\x64\0\0\0"[..],
        "iMaxLevel",
        Some(GameSettingValue::Int(100))
    )]
    #[case(
        &b"GMST\x15\0\0\0\0\0\0\0\0\0\0\0NAME\x03\0\0\0sOkSTRV\x02\0\0\0Ok"[..],
        "sOk",
        Some(GameSettingValue::Text(String::from("Ok")))
    )]
    #[case(
        &b"GMST\x0E\0\0\0\0\0\0\0\0\0\0\0NAME\x06\0\0\0sEmpty"[..],
        "sEmpty",
        None
    )]
    fn test_game_setting(
        #[case] data: &[u8],
        #[case] name: &str,
        #[case] value: Option<GameSettingValue>,
    ) {
        let record = decode(data).unwrap();
        assert_eq!(record.key().as_deref(), Some(name));

        let setting = record.payload.as_ref().unwrap();
        assert_eq!(setting.name, name);
        assert_eq!(setting.value, value);

        let mut out = Vec::new();
        record
            .encode(&mut SubRecordWriter::new(&mut out, Dialect::Tes3))
            .unwrap();
        assert_eq!(out.as_slice(), data);
    }

    #[rstest]
    #[case("fCombatDistance", GameSettingKind::Float)]
    #[case("iMaxLevel", GameSettingKind::Int)]
    #[case("sOk", GameSettingKind::Text)]
    #[case("FUpper", GameSettingKind::Text)]
    #[case("", GameSettingKind::Text)]
    fn test_classify(#[case] name: &str, #[case] kind: GameSettingKind) {
        assert_eq!(GameSettingKind::classify(name), kind);
    }

    #[test]
    fn test_value_does_not_match_name() {
        let data = b"GMST\x16\0\0\0\0\0\0\0\0\0\0\0NAME\x02\0\0\0fXINTV\x04\0\0\0\x01\0\0\0";
        let err = decode(&data[..]).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnexpectedTag {
                expected: Some(Tag::FLTV),
                found: Tag::INTV,
                offset: 26,
            }
        ));
    }

    #[test]
    fn test_value_before_name() {
        let data = b"GMST\x16\0\0\0\0\0\0\0\0\0\0\0FLTV\x04\0\0\0\0\0\0\0NAME\x02\0\0\0fX";
        let err = decode(&data[..]).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnexpectedTag {
                expected: Some(Tag::NAME),
                found: Tag::FLTV,
                offset: 16,
            }
        ));
    }

    #[test]
    fn test_float_requires_value() {
        let data = b"GMST\x0A\0\0\0\0\0\0\0\0\0\0\0NAME\x02\0\0\0fX";
        let err = decode(&data[..]).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::MissingField {
                record: Tag::GMST,
                field: Tag::FLTV,
            }
        ));
    }

    #[test]
    fn test_empty_name() {
        let data = b"GMST\x08\0\0\0\0\0\0\0\0\0\0\0NAME\0\0\0\0";
        let err = decode(&data[..]).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidLength {
                tag: Tag::NAME,
                length: 0,
                offset: 20,
            }
        ));
    }

    #[test]
    fn test_encode_mismatched_value() {
        let record = Record::new(
            Tes3Header::new(Tag::GMST),
            GameSetting {
                name: String::from("iCount"),
                value: Some(GameSettingValue::Float(1.0)),
            },
        );
        let mut out = Vec::new();
        let err = record
            .encode(&mut SubRecordWriter::new(&mut out, Dialect::Tes3))
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnexpectedTag {
                expected: Some(Tag::INTV),
                found: Tag::FLTV,
                ..
            }
        ));
    }
}
