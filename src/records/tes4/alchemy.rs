use crate::{
    fields::{Blob, EffectBlock, Keywords, LocalizedString, ObjectBounds},
    record::{DecodeOptions, Record, RecordKind, Tes4Header},
    records::{tes4::form_key, unhandled, write_opt_blob, write_opt_string, write_opt_u32},
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_STRING, MAX_TEXT},
    Error, Tag,
};
use std::io::Write;

/// The `ENIT` block of a potion
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PotionData {
    pub value: u32,
    pub flags: u32,
    pub addiction: u32,
    pub addiction_chance: f32,
    pub use_sound: u32,
}

/// A potion, poison, or food item (`ALCH`)
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AlchemyPotion {
    pub editor_id: String,
    pub bounds: ObjectBounds,
    pub name: LocalizedString,
    pub keywords: Keywords,
    pub model_path: Option<String>,
    pub model_hashes: Option<Blob>,
    pub alternate_textures: Option<Blob>,
    pub pickup_sound: Option<u32>,
    pub putdown_sound: Option<u32>,
    pub equip_type: Option<u32>,
    pub weight: f32,
    pub data: PotionData,
    pub effects: Vec<EffectBlock>,
}

impl PotionData {
    pub const FLAG_NO_AUTO_CALC: u32 = 0x0001;
    pub const FLAG_FOOD: u32 = 0x0002;
    pub const FLAG_MEDICINE: u32 = 0x0001_0000;
    pub const FLAG_POISON: u32 = 0x0002_0000;
}

impl RecordKind for AlchemyPotion {
    type Header = Tes4Header;
    type Key = u32;

    const SCHEMA: Schema = Schema {
        record: Tag::ALCH,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::EDID, Length::Capped(MAX_STRING)),
            FieldSpec::required(Tag::OBND, Length::Fixed(12)),
            FieldSpec::optional(Tag::FULL, Length::Any),
            FieldSpec::optional(Tag::KSIZ, Length::Fixed(4)),
            FieldSpec::optional(Tag::MODL, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::MODT, Length::Any),
            FieldSpec::optional(Tag::MODS, Length::Any),
            FieldSpec::optional(Tag::YNAM, Length::Fixed(4)),
            FieldSpec::optional(Tag::ZNAM, Length::Fixed(4)),
            FieldSpec::optional(Tag::ETYP, Length::Fixed(4)),
            FieldSpec::required(Tag::DATA, Length::Fixed(4)),
            FieldSpec::required(Tag::ENIT, Length::Fixed(20)),
            FieldSpec::repeatable(Tag::EFID, Length::Fixed(4)),
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
            Tag::EDID => self.editor_id = reader.read_string(tag, MAX_STRING)?,
            Tag::OBND => self.bounds = ObjectBounds::read(reader)?,
            Tag::FULL => {
                self.name = LocalizedString::read(reader, tag, options.is_localized(), MAX_STRING)?
            }
            Tag::KSIZ => self.keywords = Keywords::read(reader)?,
            Tag::MODL => {
                let offset = reader.position();
                let path = reader.read_string(tag, MAX_STRING)?;
                if path.is_empty() {
                    return Err(Error::invalid_length(tag, 1, offset));
                }
                self.model_path = Some(path);
            }
            Tag::MODT => self.model_hashes = Some(Blob::read(reader, tag, MAX_TEXT)?),
            Tag::MODS => self.alternate_textures = Some(Blob::read(reader, tag, MAX_TEXT)?),
            Tag::YNAM => self.pickup_sound = Some(reader.read_form_id(tag)?),
            Tag::ZNAM => self.putdown_sound = Some(reader.read_form_id(tag)?),
            Tag::ETYP => self.equip_type = Some(reader.read_form_id(tag)?),
            Tag::DATA => self.weight = reader.read_f32_value(tag)?,
            Tag::ENIT => {
                let mut data = reader.read_struct(tag, 20)?;
                self.data = PotionData {
                    value: data.read_u32()?,
                    flags: data.read_u32()?,
                    addiction: data.read_u32()?,
                    addiction_chance: data.read_f32()?,
                    use_sound: data.read_u32()?,
                };
            }
            Tag::EFID => self.effects.push(EffectBlock::read(reader)?),
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        if self.effects.is_empty() {
            return Err(Error::missing_field(Tag::ALCH, Tag::EFID));
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_string(Tag::EDID, &self.editor_id)?;
        self.bounds.write(writer)?;
        self.name.write(Tag::FULL, writer)?;
        self.keywords.write(writer)?;
        write_opt_string(writer, Tag::MODL, &self.model_path)?;
        write_opt_blob(writer, Tag::MODT, &self.model_hashes)?;
        write_opt_blob(writer, Tag::MODS, &self.alternate_textures)?;
        write_opt_u32(writer, Tag::YNAM, self.pickup_sound)?;
        write_opt_u32(writer, Tag::ZNAM, self.putdown_sound)?;
        write_opt_u32(writer, Tag::ETYP, self.equip_type)?;
        writer.write_f32_value(Tag::DATA, self.weight)?;

        writer.write_field_header(Tag::ENIT, 20)?;
        writer.write_u32(self.data.value)?;
        writer.write_u32(self.data.flags)?;
        writer.write_u32(self.data.addiction)?;
        writer.write_f32(self.data.addiction_chance)?;
        writer.write_u32(self.data.use_sound)?;

        for effect in &self.effects {
            effect.write(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fields::Condition, Dialect, ErrorKind};

    fn potion() -> Record<AlchemyPotion> {
        Record::new(
            Tes4Header::new(Tag::ALCH, 0x0003_EADD),
            AlchemyPotion {
                editor_id: String::from("RestoreHealth01"),
                name: LocalizedString::Inline(String::from("Potion of Minor Healing")),
                keywords: Keywords(vec![0x0008_CDEC]),
                model_path: Some(String::from("Clutter\\Potions\\HealthPotion01.nif")),
                pickup_sound: Some(0x0003_EDBD),
                weight: 0.5,
                data: PotionData {
                    value: 17,
                    flags: PotionData::FLAG_MEDICINE,
                    use_sound: 0x000B_6435,
                    ..PotionData::default()
                },
                effects: vec![EffectBlock {
                    effect_id: 0x0003_EB15,
                    magnitude: 25.0,
                    area: 0,
                    duration: 0,
                    conditions: vec![Condition {
                        data: [7; 32],
                        name: Some(String::from("Player")),
                    }],
                }],
                ..AlchemyPotion::default()
            },
        )
    }

    fn encode(record: &Record<AlchemyPotion>) -> Vec<u8> {
        let mut out = Vec::new();
        record
            .encode(&mut SubRecordWriter::new(&mut out, Dialect::Tes4))
            .unwrap();
        out
    }

    #[test]
    fn test_potion_round_trip() {
        let record = potion();
        let data = encode(&record);
        assert_eq!(data.len(), record.encoded_len().unwrap());

        let mut reader = SubRecordReader::new(&data, Dialect::Tes4);
        let decoded: Record<AlchemyPotion> =
            Record::decode(&mut reader, &DecodeOptions::new()).unwrap();
        assert_eq!(decoded.payload, record.payload);
        assert_eq!(decoded.key(), Some(0x0003_EADD));
        assert_eq!(encode(&decoded), data);
    }

    #[test]
    fn test_potion_without_effects() {
        let mut record = potion();
        record.payload.as_mut().unwrap().effects.clear();
        let data = encode(&record);

        let mut reader = SubRecordReader::new(&data, Dialect::Tes4);
        let err = Record::<AlchemyPotion>::decode(&mut reader, &DecodeOptions::new()).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::MissingField {
                record: Tag::ALCH,
                field: Tag::EFID
            }
        ));
    }

    #[test]
    fn test_empty_model_path() {
        let mut record = potion();
        record.payload.as_mut().unwrap().model_path = Some(String::new());
        let data = encode(&record);

        let mut reader = SubRecordReader::new(&data, Dialect::Tes4);
        let err = Record::<AlchemyPotion>::decode(&mut reader, &DecodeOptions::new()).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidLength {
                tag: Tag::MODL,
                length: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_compressed_potion() {
        let mut record = potion();
        record.header.flags |= Tes4Header::FLAG_COMPRESSED;
        let data = encode(&record);

        let mut reader = SubRecordReader::new(&data, Dialect::Tes4);
        let decoded: Record<AlchemyPotion> =
            Record::decode(&mut reader, &DecodeOptions::new()).unwrap();
        assert!(reader.is_empty());
        assert_eq!(decoded.payload, record.payload);
    }
}
