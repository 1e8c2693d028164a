use crate::{
    fields::{Blob, Keywords, LocalizedString, ObjectBounds},
    record::{DecodeOptions, Record, RecordKind, Tes4Header},
    records::{tes4::form_key, unhandled, write_opt_blob, write_opt_string, write_opt_u32},
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_STRING, MAX_TEXT},
    Error, Tag,
};
use std::io::Write;

/// The `DATA` block of an arrow or bolt
///
/// Later releases append the weight, growing the block from 16 to 20
/// bytes. Whichever length was read is written back.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AmmunitionData {
    pub projectile: u32,
    pub flags: u32,
    pub damage: f32,
    pub value: u32,
    pub weight: Option<f32>,
}

impl AmmunitionData {
    pub const FLAG_IGNORES_RESISTANCE: u32 = 0x01;
    pub const FLAG_NON_PLAYABLE: u32 = 0x02;
    pub const FLAG_NON_BOLT: u32 = 0x04;

    fn len(&self) -> usize {
        if self.weight.is_some() {
            20
        } else {
            16
        }
    }
}

/// Arrows and bolts (`AMMO`)
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Ammunition {
    pub editor_id: String,
    pub bounds: ObjectBounds,
    pub name: LocalizedString,
    pub model_path: Option<String>,
    pub model_hashes: Option<Blob>,
    pub pickup_sound: Option<u32>,
    pub putdown_sound: Option<u32>,
    pub description: LocalizedString,
    pub keywords: Keywords,
    pub data: AmmunitionData,
}

impl RecordKind for Ammunition {
    type Header = Tes4Header;
    type Key = u32;

    const SCHEMA: Schema = Schema {
        record: Tag::AMMO,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::EDID, Length::Capped(MAX_STRING)),
            FieldSpec::required(Tag::OBND, Length::Fixed(12)),
            FieldSpec::optional(Tag::FULL, Length::Any),
            FieldSpec::optional(Tag::MODL, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::MODT, Length::Any),
            FieldSpec::optional(Tag::YNAM, Length::Fixed(4)),
            FieldSpec::optional(Tag::ZNAM, Length::Fixed(4)),
            FieldSpec::required(Tag::DESC, Length::Any),
            FieldSpec::optional(Tag::KSIZ, Length::Fixed(4)),
            FieldSpec::required(Tag::DATA, Length::Capped(20)),
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
            Tag::OBND => self.bounds = ObjectBounds::read(reader)?,
            Tag::FULL => self.name = LocalizedString::read(reader, tag, localized, MAX_STRING)?,
            Tag::MODL => self.model_path = Some(reader.read_string(tag, MAX_STRING)?),
            Tag::MODT => self.model_hashes = Some(Blob::read(reader, tag, MAX_TEXT)?),
            Tag::YNAM => self.pickup_sound = Some(reader.read_form_id(tag)?),
            Tag::ZNAM => self.putdown_sound = Some(reader.read_form_id(tag)?),
            Tag::DESC => {
                self.description = LocalizedString::read(reader, tag, localized, MAX_TEXT)?
            }
            Tag::KSIZ => self.keywords = Keywords::read(reader)?,
            Tag::DATA => {
                let len = reader.peek_length()?;
                if len != 16 && len != 20 {
                    return Err(Error::invalid_length(tag, len, reader.position()));
                }

                let mut data = reader.read_struct(tag, len as usize)?;
                self.data = AmmunitionData {
                    projectile: data.read_u32()?,
                    flags: data.read_u32()?,
                    damage: data.read_f32()?,
                    value: data.read_u32()?,
                    weight: if len == 20 {
                        Some(data.read_f32()?)
                    } else {
                        None
                    },
                };
            }
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_string(Tag::EDID, &self.editor_id)?;
        self.bounds.write(writer)?;
        self.name.write(Tag::FULL, writer)?;
        write_opt_string(writer, Tag::MODL, &self.model_path)?;
        write_opt_blob(writer, Tag::MODT, &self.model_hashes)?;
        write_opt_u32(writer, Tag::YNAM, self.pickup_sound)?;
        write_opt_u32(writer, Tag::ZNAM, self.putdown_sound)?;
        self.description.write(Tag::DESC, writer)?;
        self.keywords.write(writer)?;

        let data = &self.data;
        writer.write_field_header(Tag::DATA, data.len())?;
        writer.write_u32(data.projectile)?;
        writer.write_u32(data.flags)?;
        writer.write_f32(data.damage)?;
        writer.write_u32(data.value)?;
        if let Some(weight) = data.weight {
            writer.write_f32(weight)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dialect, ErrorKind};
    use rstest::*;

    const IRON_ARROW: &[u8] = b"AMMO\x95\0\0\0\0\0\0\0\x7D\x39\x01\0\x1B\x69\x55\0\x28\0\x0C\0EDID\x0A\0IronArrow\0OBND\x0C\0\xFF\xFF\xE1\xFF\xFF\xFF\x01\0\x1F\0\x01\0FULL\x04\0\x8B\x3D\0\0MODL\x1B\0Weapons\\Iron\\IronArrow.nif\0YNAM\x04\0\xB7\xE7\x03\0ZNAM\x04\0\xB8\xE7\x03\0DESC\x04\0\0\0\0\0KSIZ\x04\0\x01\0\0\0KWDA\x04\0\xE7\x17\x09\0DATA\x10\0\x11\xBE\x03\0\0\0\0\0\0\0\0\x41\x01\0\0\0";

    fn decode(data: &[u8]) -> Result<Record<Ammunition>, Error> {
        let mut reader = SubRecordReader::new(data, Dialect::Tes4);
        let record = Record::decode(&mut reader, &DecodeOptions::new().localized(true))?;
        assert!(reader.is_empty());
        Ok(record)
    }

    fn encode(record: &Record<Ammunition>) -> Vec<u8> {
        let mut out = Vec::new();
        record.write_to(&mut out).unwrap();
        out
    }

    #[test]
    fn test_iron_arrow() {
        let record = decode(IRON_ARROW).unwrap();
        let arrow = record.payload.as_ref().unwrap();
        assert_eq!(arrow.editor_id, "IronArrow");
        assert_eq!(arrow.description, LocalizedString::Index(0));
        assert_eq!(
            arrow.data,
            AmmunitionData {
                projectile: 0x0003_BE11,
                flags: 0,
                damage: 8.0,
                value: 1,
                weight: None,
            }
        );
        assert_eq!(encode(&record).as_slice(), IRON_ARROW);
    }

    #[test]
    fn test_weight_grows_data() {
        let mut record = decode(IRON_ARROW).unwrap();
        record.payload.as_mut().unwrap().data.weight = Some(0.1);
        let data = encode(&record);
        assert_eq!(data.len(), IRON_ARROW.len() + 4);
        assert_eq!(&data[data.len() - 26..data.len() - 20], b"DATA\x14\0");

        let decoded = decode(&data).unwrap();
        assert_eq!(decoded.payload, record.payload);
    }

    #[rstest]
    #[case(12)]
    #[case(18)]
    fn test_data_lengths(#[case] len: u8) {
        let end = IRON_ARROW.len() - 22;
        let mut data = IRON_ARROW[..end].to_vec();
        data.extend_from_slice(b"DATA");
        data.extend_from_slice(&[len, 0]);
        data.extend(std::iter::repeat(0).take(usize::from(len)));
        let size = (data.len() - 24) as u32;
        data[4..8].copy_from_slice(&size.to_le_bytes());

        let err = decode(&data).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidLength {
                tag: Tag::DATA,
                ..
            }
        ));
    }

    #[test]
    fn test_description_is_required() {
        let mut record = decode(IRON_ARROW).unwrap();
        record.payload.as_mut().unwrap().description = LocalizedString::Absent;
        let err = decode(&encode(&record)).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::MissingField {
                record: Tag::AMMO,
                field: Tag::DESC
            }
        ));
    }
}
