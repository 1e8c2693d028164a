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

/// The `RIDT` block of a repair item
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RepairData {
    pub weight: f32,
    pub value: u32,
    pub uses: u32,
    pub quality: f32,
}

/// A legacy repair hammer or tongs (`REPA`)
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tes3RepairItem {
    pub name: LegacyString,
    pub model: LegacyString,
    pub full_name: LegacyString,
    pub data: RepairData,
    pub icon: LegacyString,
    pub script: Option<LegacyString>,
}

impl RecordKind for Tes3RepairItem {
    type Header = Tes3Header;
    type Key = String;

    const SCHEMA: Schema = Schema {
        record: Tag::REPA,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::NAME, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::required(Tag::MODL, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::required(Tag::FNAM, Length::Capped(MAX_LEGACY_STRING)),
            FieldSpec::required(Tag::RIDT, Length::Fixed(16)),
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
            Tag::RIDT => {
                let mut data = reader.read_struct(tag, 16)?;
                self.data = RepairData {
                    weight: data.read_f32()?,
                    value: data.read_u32()?,
                    uses: data.read_u32()?,
                    quality: data.read_f32()?,
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

        writer.write_field_header(Tag::RIDT, 16)?;
        writer.write_f32(self.data.weight)?;
        writer.write_u32(self.data.value)?;
        writer.write_u32(self.data.uses)?;
        writer.write_f32(self.data.quality)?;

        write_legacy_string(writer, Tag::ITEX, &self.icon)?;
        write_opt_legacy_string(writer, Tag::SCRI, &self.script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dialect, ErrorKind};
    use rstest::*;

    fn hammer() -> Record<Tes3RepairItem> {
        Record::new(
            Tes3Header::new(Tag::REPA),
            Tes3RepairItem {
                name: LegacyString::from("hammer_repair"),
                model: LegacyString::from("m\\Repair_Hammer.nif"),
                full_name: LegacyString::from("Apprentice's Armorer's Hammer"),
                data: RepairData {
                    weight: 3.0,
                    value: 10,
                    uses: 20,
                    quality: 0.5,
                },
                icon: LegacyString::from("m\\Tx_Repair_Hammer.tga"),
                script: None,
            },
        )
    }

    fn decode(data: &[u8]) -> Result<Record<Tes3RepairItem>, Error> {
        let mut reader = SubRecordReader::new(data, Dialect::Tes3);
        let record = Record::decode(&mut reader, &DecodeOptions::new())?;
        assert!(reader.is_empty());
        Ok(record)
    }

    #[test]
    fn test_hammer_round_trip() {
        let record = hammer();
        let mut data = Vec::new();
        record.write_to(&mut data).unwrap();

        let at = data.windows(4).position(|x| x == b"RIDT").unwrap();
        assert_eq!(
            &data[at..at + 24],
            b"RIDT\x10\0\0\0\0\0\x40\x40\x0A\0\0\0\x14\0\0\0\0\0\0\x3F"
        );

        let decoded = decode(&data).unwrap();
        assert_eq!(decoded.key().as_deref(), Some("hammer_repair"));
        assert_eq!(decoded.payload, record.payload);
    }

    #[rstest]
    #[case(12)]
    #[case(20)]
    fn test_wrong_data_length(#[case] len: u8) {
        let mut data = Vec::new();
        hammer().write_to(&mut data).unwrap();
        let at = data.windows(4).position(|x| x == b"RIDT").unwrap();
        data[at + 4] = len;

        let err = decode(&data).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidLength { tag: Tag::RIDT, .. }
        ));
    }
}
