use crate::{
    errors::ErrorKind,
    fields::{Blob, Condition, ExtraName, LocalizedString},
    record::{DecodeOptions, Record, RecordKind, Tes4Header},
    records::{tes4::form_key, unhandled, write_opt_blob, write_opt_u32},
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_STRING},
    Error, Tag,
};
use std::io::Write;

/// How a faction regards another (`XNAM`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Relation {
    pub faction: u32,
    pub modifier: i32,
    pub combat_reaction: u32,
}

/// Crime gold values (`CRVA`). Later game versions appended the trailing
/// fields, so they are only present when the stored value is long enough.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CrimeGold {
    pub arrest: u8,
    pub attack_on_sight: u8,
    pub murder: u16,
    pub assault: u16,
    pub trespass: u16,
    pub pickpocket: u16,
    pub unknown: u16,
    pub steal_multiplier: Option<f32>,
    pub escape_and_werewolf: Option<(u16, u16)>,
}

impl CrimeGold {
    fn read(reader: &mut SubRecordReader) -> Result<Self, Error> {
        let len = reader.read_length()? as usize;
        let mut data = reader.take(len)?;
        let mut gold = CrimeGold {
            arrest: data.read_u8()?,
            attack_on_sight: data.read_u8()?,
            murder: data.read_u16()?,
            assault: data.read_u16()?,
            trespass: data.read_u16()?,
            pickpocket: data.read_u16()?,
            unknown: data.read_u16()?,
            ..CrimeGold::default()
        };

        if !data.is_empty() {
            gold.steal_multiplier = Some(data.read_f32()?);
        }

        if !data.is_empty() {
            gold.escape_and_werewolf = Some((data.read_u16()?, data.read_u16()?));
        }

        Ok(gold)
    }

    fn encoded_len(&self) -> usize {
        match (self.steal_multiplier, self.escape_and_werewolf) {
            (_, Some(_)) => 20,
            (Some(_), None) => 16,
            (None, None) => 12,
        }
    }

    fn write<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        let len = self.encoded_len();
        writer.write_field_header(Tag::CRVA, len)?;
        writer.write_u8(self.arrest)?;
        writer.write_u8(self.attack_on_sight)?;
        writer.write_u16(self.murder)?;
        writer.write_u16(self.assault)?;
        writer.write_u16(self.trespass)?;
        writer.write_u16(self.pickpocket)?;
        writer.write_u16(self.unknown)?;
        if len >= 16 {
            writer.write_f32(self.steal_multiplier.unwrap_or(1.0))?;
        }
        if let Some((escape, werewolf)) = self.escape_and_werewolf {
            writer.write_u16(escape)?;
            writer.write_u16(werewolf)?;
        }
        Ok(())
    }
}

/// One rank of a faction: `RNAM` followed by optional titles
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FactionRank {
    pub index: u32,
    pub male_title: LocalizedString,
    pub female_title: LocalizedString,
}

/// Vendor hours and behavior (`VENV`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VendorValues {
    pub start_hour: u16,
    pub end_hour: u16,
    pub radius: u32,
    pub flags: u32,
}

/// A faction (`FACT`)
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Faction {
    pub editor_id: String,
    pub name: LocalizedString,
    pub relations: Vec<Relation>,
    pub flags: u32,
    pub exterior_jail: Option<u32>,
    pub follower_wait_marker: Option<u32>,
    pub stolen_goods_container: Option<u32>,
    pub player_inventory_container: Option<u32>,
    pub shared_crime_factions: Option<u32>,
    pub jail_outfit: Option<u32>,
    pub crime_gold: Option<CrimeGold>,
    pub ranks: Vec<FactionRank>,
    pub vendor_list: Option<u32>,
    pub vendor_container: Option<u32>,
    pub vendor_values: Option<VendorValues>,
    pub vendor_location: Option<Blob>,
    pub vendor_conditions: Vec<Condition>,
}

impl Faction {
    pub const FLAG_HIDDEN_FROM_PC: u32 = 0x0001;
    pub const FLAG_SPECIAL_COMBAT: u32 = 0x0002;
    pub const FLAG_TRACK_CRIME: u32 = 0x0040;
    pub const FLAG_VENDOR: u32 = 0x4000;

    /// Attach a rank title to the most recent `RNAM`
    fn read_title(
        &mut self,
        tag: Tag,
        reader: &mut SubRecordReader,
        localized: bool,
    ) -> Result<(), Error> {
        let offset = reader.position().saturating_sub(4);
        let rank = match self.ranks.last_mut() {
            Some(rank) => rank,
            None => return Err(Error::unexpected_tag(Some(Tag::RNAM), tag, offset)),
        };

        let title = if tag == Tag::MNAM {
            &mut rank.male_title
        } else {
            &mut rank.female_title
        };

        if title.is_present() {
            return Err(Error::new(ErrorKind::DuplicateField {
                record: Tag::FACT,
                field: tag,
                offset,
            }));
        }

        *title = LocalizedString::read(reader, tag, localized, MAX_STRING)?;
        Ok(())
    }

    fn read_conditions(&mut self, reader: &mut SubRecordReader) -> Result<(), Error> {
        let offset = reader.position();
        let count = reader.read_u32_value(Tag::CITC)?;
        if count == 0 {
            return Err(Error::out_of_range(Tag::CITC, offset));
        }

        for _ in 0..count {
            reader.expect_tag(Tag::CTDA)?;
            let condition = Condition::read_named(reader, ExtraName::Cis2)?;
            self.vendor_conditions.push(condition);
        }
        Ok(())
    }
}

impl RecordKind for Faction {
    type Header = Tes4Header;
    type Key = u32;

    const SCHEMA: Schema = Schema {
        record: Tag::FACT,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::EDID, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::FULL, Length::Any),
            FieldSpec::repeatable(Tag::XNAM, Length::Fixed(12)),
            FieldSpec::required(Tag::DATA, Length::Fixed(4)),
            FieldSpec::optional(Tag::JAIL, Length::Fixed(4)),
            FieldSpec::optional(Tag::WAIT, Length::Fixed(4)),
            FieldSpec::optional(Tag::STOL, Length::Fixed(4)),
            FieldSpec::optional(Tag::PLCN, Length::Fixed(4)),
            FieldSpec::optional(Tag::CRGR, Length::Fixed(4)),
            FieldSpec::optional(Tag::JOUT, Length::Fixed(4)),
            FieldSpec::optional(Tag::CRVA, Length::OneOf(&[12, 16, 20])),
            FieldSpec::repeatable(Tag::RNAM, Length::Fixed(4)),
            FieldSpec::repeatable(Tag::MNAM, Length::Any),
            FieldSpec::repeatable(Tag::FNAM, Length::Any),
            FieldSpec::optional(Tag::VEND, Length::Fixed(4)),
            FieldSpec::optional(Tag::VENC, Length::Fixed(4)),
            FieldSpec::optional(Tag::VENV, Length::Fixed(12)),
            FieldSpec::optional(Tag::PLVD, Length::Fixed(12)),
            FieldSpec::optional(Tag::CITC, Length::Fixed(4)),
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
            Tag::FULL => self.name = LocalizedString::read(reader, tag, localized, MAX_STRING)?,
            Tag::XNAM => {
                let offset = reader.position();
                let mut data = reader.read_struct(tag, 12)?;
                let relation = Relation {
                    faction: data.read_u32()?,
                    modifier: data.read_i32()?,
                    combat_reaction: data.read_u32()?,
                };

                if relation.faction == 0 {
                    return Err(Error::out_of_range(tag, offset));
                }
                self.relations.push(relation);
            }
            Tag::DATA => self.flags = reader.read_u32_value(tag)?,
            Tag::JAIL => self.exterior_jail = Some(reader.read_form_id(tag)?),
            Tag::WAIT => self.follower_wait_marker = Some(reader.read_form_id(tag)?),
            Tag::STOL => self.stolen_goods_container = Some(reader.read_form_id(tag)?),
            Tag::PLCN => self.player_inventory_container = Some(reader.read_form_id(tag)?),
            Tag::CRGR => self.shared_crime_factions = Some(reader.read_form_id(tag)?),
            Tag::JOUT => self.jail_outfit = Some(reader.read_form_id(tag)?),
            Tag::CRVA => self.crime_gold = Some(CrimeGold::read(reader)?),
            Tag::RNAM => self.ranks.push(FactionRank {
                index: reader.read_u32_value(tag)?,
                ..FactionRank::default()
            }),
            Tag::MNAM | Tag::FNAM => self.read_title(tag, reader, localized)?,
            Tag::VEND => self.vendor_list = Some(reader.read_form_id(tag)?),
            Tag::VENC => self.vendor_container = Some(reader.read_form_id(tag)?),
            Tag::VENV => {
                let mut data = reader.read_struct(tag, 12)?;
                self.vendor_values = Some(VendorValues {
                    start_hour: data.read_u16()?,
                    end_hour: data.read_u16()?,
                    radius: data.read_u32()?,
                    flags: data.read_u32()?,
                });
            }
            Tag::PLVD => self.vendor_location = Some(Blob::read(reader, tag, 12)?),
            Tag::CITC => self.read_conditions(reader)?,
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_string(Tag::EDID, &self.editor_id)?;
        self.name.write(Tag::FULL, writer)?;
        for relation in &self.relations {
            writer.write_field_header(Tag::XNAM, 12)?;
            writer.write_u32(relation.faction)?;
            writer.write_i32(relation.modifier)?;
            writer.write_u32(relation.combat_reaction)?;
        }

        writer.write_u32_value(Tag::DATA, self.flags)?;
        write_opt_u32(writer, Tag::JAIL, self.exterior_jail)?;
        write_opt_u32(writer, Tag::WAIT, self.follower_wait_marker)?;
        write_opt_u32(writer, Tag::STOL, self.stolen_goods_container)?;
        write_opt_u32(writer, Tag::PLCN, self.player_inventory_container)?;
        write_opt_u32(writer, Tag::CRGR, self.shared_crime_factions)?;
        write_opt_u32(writer, Tag::JOUT, self.jail_outfit)?;
        if let Some(gold) = &self.crime_gold {
            gold.write(writer)?;
        }

        for rank in &self.ranks {
            writer.write_u32_value(Tag::RNAM, rank.index)?;
            rank.male_title.write(Tag::MNAM, writer)?;
            rank.female_title.write(Tag::FNAM, writer)?;
        }

        write_opt_u32(writer, Tag::VEND, self.vendor_list)?;
        write_opt_u32(writer, Tag::VENC, self.vendor_container)?;
        if let Some(values) = &self.vendor_values {
            writer.write_field_header(Tag::VENV, 12)?;
            writer.write_u16(values.start_hour)?;
            writer.write_u16(values.end_hour)?;
            writer.write_u32(values.radius)?;
            writer.write_u32(values.flags)?;
        }
        write_opt_blob(writer, Tag::PLVD, &self.vendor_location)?;

        if !self.vendor_conditions.is_empty() {
            writer.write_u32_value(Tag::CITC, self.vendor_conditions.len() as u32)?;
            for condition in &self.vendor_conditions {
                condition.write(ExtraName::Cis2, writer)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dialect;

    const EXCLUSION: &[u8] = b"FACT\x51\0\0\0\0\0\0\0\x44\x09\0\x01\x16\x6E\x32\0\x28\0\x01\0EDID\x15\0CR08ExclusionFaction\0DATA\x04\0\0\0\0\0CRVA\x14\0\x01\x01\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0VENV\x0C\0\0\0\0\0\0\0\0\0\0\0\0\0";

    fn decode(data: &[u8], localized: bool) -> Result<Record<Faction>, Error> {
        let mut reader = SubRecordReader::new(data, Dialect::Tes4);
        Record::decode(&mut reader, &DecodeOptions::new().localized(localized))
    }

    fn encode(record: &Record<Faction>) -> Vec<u8> {
        let mut out = Vec::new();
        record
            .encode(&mut SubRecordWriter::new(&mut out, Dialect::Tes4))
            .unwrap();
        out
    }

    #[test]
    fn test_exclusion_faction() {
        let record = decode(EXCLUSION, true).unwrap();
        assert_eq!(record.key(), Some(0x0100_0944));

        let faction = record.payload.as_ref().unwrap();
        assert_eq!(faction.editor_id, "CR08ExclusionFaction");
        assert_eq!(faction.flags, 0);
        let gold = faction.crime_gold.unwrap();
        assert_eq!(gold.arrest, 1);
        assert_eq!(gold.attack_on_sight, 1);
        assert_eq!(gold.steal_multiplier, Some(0.0));
        assert_eq!(gold.escape_and_werewolf, Some((0, 0)));
        assert_eq!(faction.vendor_values, Some(VendorValues::default()));

        assert_eq!(encode(&record).as_slice(), EXCLUSION);
    }

    fn ranked() -> Record<Faction> {
        Record::new(
            Tes4Header::new(Tag::FACT, 0x0001_BDB3),
            Faction {
                editor_id: String::from("CompanionsFaction"),
                name: LocalizedString::Index(0x0300),
                relations: vec![Relation {
                    faction: 0x0001_3794,
                    modifier: 0,
                    combat_reaction: 2,
                }],
                flags: Faction::FLAG_TRACK_CRIME,
                ranks: vec![
                    FactionRank {
                        index: 0,
                        male_title: LocalizedString::Index(0x0301),
                        female_title: LocalizedString::Index(0x0302),
                    },
                    FactionRank {
                        index: 1,
                        ..FactionRank::default()
                    },
                ],
                crime_gold: Some(CrimeGold {
                    murder: 1000,
                    ..CrimeGold::default()
                }),
                vendor_conditions: vec![
                    Condition {
                        data: [1; 32],
                        name: Some(String::from("Hours")),
                    },
                    Condition::default(),
                ],
                ..Faction::default()
            },
        )
    }

    #[test]
    fn test_ranked_faction_round_trip() {
        let record = ranked();
        let data = encode(&record);
        let decoded = decode(&data, true).unwrap();
        assert_eq!(decoded.payload, record.payload);
    }

    #[test]
    fn test_title_without_rank() {
        let data = b"FACT\x1C\0\0\0\0\0\0\0\x01\0\0\0\0\0\0\0\x28\0\0\0EDID\x02\0a\0DATA\x04\0\0\0\0\0MNAM\x04\0\x01\0\0\0";
        let err = decode(&data[..], true).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnexpectedTag {
                expected: Some(Tag::RNAM),
                found: Tag::MNAM,
                offset: 42,
            }
        ));
    }

    #[test]
    fn test_two_titles_for_one_rank() {
        let data = b"FACT\x30\0\0\0\0\0\0\0\x01\0\0\0\0\0\0\0\x28\0\0\0EDID\x02\0a\0DATA\x04\0\0\0\0\0RNAM\x04\0\0\0\0\0FNAM\x04\0\x01\0\0\0FNAM\x04\0\x02\0\0\0";
        let err = decode(&data[..], true).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::DuplicateField {
                record: Tag::FACT,
                field: Tag::FNAM,
                ..
            }
        ));
    }

    #[test]
    fn test_condition_count_mismatch() {
        let mut record = ranked();
        let mut data = encode(&record);

        // claim one more condition than was written
        let at = data.windows(4).position(|x| x == b"CITC").unwrap() + 6;
        data[at] = 3;
        let err = decode(&data, true).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Truncated { .. }));

        // and one fewer
        data[at] = 1;
        let err = decode(&data, true).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnexpectedTag {
                expected: None,
                found: Tag::CTDA,
                ..
            }
        ));

        record.payload.as_mut().unwrap().vendor_conditions[0].name = None;
        let data = encode(&record);
        assert!(decode(&data, true).is_ok());
    }

    #[test]
    fn test_empty_condition_name() {
        let data = b"FACT\x49\0\0\0\0\0\0\0\x01\0\0\0\0\0\0\0\x28\0\0\0EDID\x02\0a\0DATA\x04\0\0\0\0\0CITC\x04\0\x01\0\0\0CTDA\x20\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0CIS2\x01\0\0";
        let err = decode(&data[..], true).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidLength {
                tag: Tag::CIS2,
                length: 1,
                ..
            }
        ));
    }
}
