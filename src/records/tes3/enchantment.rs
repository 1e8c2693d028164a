use crate::{
    record::{DecodeOptions, Record, RecordKind, Tes3Header},
    records::{
        tes3::{name_key, read_legacy_string, write_legacy_string, LegacyString, SpellEffect},
        unhandled,
    },
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_LEGACY_STRING},
    Error, Tag,
};
use std::io::Write;

/// Most effects one enchantment carries
pub const MAX_ENCHANTMENT_EFFECTS: usize = 8;

/// The `ENDT` block of an enchantment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EnchantmentData {
    pub enchant_type: i32,
    pub cost: i32,
    pub charge: i32,
    pub auto_calc: i32,
}

impl EnchantmentData {
    pub const CAST_ONCE: i32 = 0;
    pub const CAST_STRIKES: i32 = 1;
    pub const CAST_WHEN_USED: i32 = 2;
    pub const CONSTANT_EFFECT: i32 = 3;
}

impl Default for EnchantmentData {
    fn default() -> Self {
        EnchantmentData {
            enchant_type: -1,
            cost: -1,
            charge: 0,
            auto_calc: 0,
        }
    }
}

/// A legacy enchantment (`ENCH`) with up to eight effects
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tes3Enchantment {
    pub name: LegacyString,
    pub data: EnchantmentData,
    pub effects: Vec<SpellEffect>,
}

impl RecordKind for Tes3Enchantment {
    type Header = Tes3Header;
    type Key = String;

    const SCHEMA: Schema = Schema {
        record: Tag::ENCH,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::NAME, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::required(Tag::ENDT, Length::Fixed(16)),
            FieldSpec::repeatable(Tag::ENAM, Length::Fixed(SpellEffect::LEN as u32)),
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
            Tag::ENDT => {
                let mut data = reader.read_struct(tag, 16)?;
                self.data = EnchantmentData {
                    enchant_type: data.read_i32()?,
                    cost: data.read_i32()?,
                    charge: data.read_i32()?,
                    auto_calc: data.read_i32()?,
                };
            }
            Tag::ENAM => {
                if self.effects.len() >= MAX_ENCHANTMENT_EFFECTS {
                    let offset = reader.position().saturating_sub(4);
                    return Err(Error::out_of_range(tag, offset));
                }
                self.effects.push(SpellEffect::read(reader)?);
            }
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        if self.effects.len() > MAX_ENCHANTMENT_EFFECTS {
            return Err(Error::out_of_range(Tag::ENAM, writer.position()));
        }

        write_legacy_string(writer, Tag::NAME, &self.name)?;

        writer.write_field_header(Tag::ENDT, 16)?;
        writer.write_i32(self.data.enchant_type)?;
        writer.write_i32(self.data.cost)?;
        writer.write_i32(self.data.charge)?;
        writer.write_i32(self.data.auto_calc)?;

        for effect in &self.effects {
            effect.write(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dialect, ErrorKind};

    fn effect(effect: u16) -> SpellEffect {
        SpellEffect {
            effect,
            skill: -1,
            attribute: -1,
            range: 0,
            area: 0,
            duration: 30,
            magnitude_min: 5,
            magnitude_max: 10,
        }
    }

    fn enchantment(effects: usize) -> Record<Tes3Enchantment> {
        Record::new(
            Tes3Header::new(Tag::ENCH),
            Tes3Enchantment {
                name: LegacyString::from("feather_en"),
                data: EnchantmentData {
                    enchant_type: EnchantmentData::CONSTANT_EFFECT,
                    cost: 0,
                    charge: 0,
                    auto_calc: 1,
                },
                effects: (0..effects).map(|i| effect(8 + i as u16)).collect(),
            },
        )
    }

    fn decode(data: &[u8]) -> Result<Record<Tes3Enchantment>, Error> {
        let mut reader = SubRecordReader::new(data, Dialect::Tes3);
        let record = Record::decode(&mut reader, &DecodeOptions::new())?;
        assert!(reader.is_empty());
        Ok(record)
    }

    #[test]
    fn test_enchantment_round_trip() {
        let record = enchantment(2);
        let mut data = Vec::new();
        record.write_to(&mut data).unwrap();
        assert_eq!(data.len(), 16 + 19 + 24 + 2 * 32);
        assert_eq!(&data[35..43], b"ENDT\x10\0\0\0");
        assert_eq!(&data[43..47], b"\x03\0\0\0");

        let decoded = decode(&data).unwrap();
        assert_eq!(decoded.key().as_deref(), Some("feather_en"));
        assert_eq!(decoded.payload, record.payload);
    }

    #[test]
    fn test_no_effects() {
        let record = enchantment(0);
        let mut data = Vec::new();
        record.write_to(&mut data).unwrap();
        assert!(decode(&data).unwrap().payload.unwrap().effects.is_empty());
    }

    #[test]
    fn test_too_many_effects() {
        let record = enchantment(MAX_ENCHANTMENT_EFFECTS + 1);
        let err = record.write_to(&mut Vec::new()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::OutOfRange { tag: Tag::ENAM, .. }));

        // a file that carries a ninth effect anyway
        let mut data = Vec::new();
        enchantment(MAX_ENCHANTMENT_EFFECTS)
            .write_to(&mut data)
            .unwrap();
        let ninth = data[data.len() - 32..].to_vec();
        data.extend_from_slice(&ninth);
        let size = (data.len() - 16) as u32;
        data[4..8].copy_from_slice(&size.to_le_bytes());

        let err = decode(&data).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::OutOfRange { tag: Tag::ENAM, .. }));
    }
}
