use crate::{
    fields::{Blob, Keywords, LocalizedString, ObjectBounds},
    record::{DecodeOptions, Record, RecordKind, Tes4Header},
    records::{tes4::form_key, unhandled, write_opt_blob, write_opt_string, write_opt_u32},
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_STRING, MAX_TEXT},
    Error, Tag,
};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WeaponData {
    pub value: u32,
    pub weight: f32,
    pub damage: u16,
}

/// A weapon (`WEAP`)
///
/// The 100 byte `DNAM` block and the critical data are kept opaque.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Weapon {
    pub editor_id: String,
    pub script_data: Option<Blob>,
    pub bounds: ObjectBounds,
    pub name: LocalizedString,
    pub model_path: Option<String>,
    pub model_hashes: Option<Blob>,
    pub alternate_textures: Option<Blob>,
    pub enchantment: Option<u32>,
    pub enchantment_amount: Option<u16>,
    pub equip_type: Option<u32>,
    pub block_bash_impact: Option<u32>,
    pub alternate_block_material: Option<u32>,
    pub keywords: Keywords,
    pub description: LocalizedString,
    pub unknown_nnam: Option<String>,
    pub impact_data_set: Option<u32>,
    pub first_person_model: Option<u32>,
    pub attack_sound: Option<u32>,
    pub attack_sound_2d: Option<u32>,
    pub attack_loop_sound: Option<u32>,
    pub attack_fail_sound: Option<u32>,
    pub idle_sound: Option<u32>,
    pub equip_sound: Option<u32>,
    pub unequip_sound: Option<u32>,
    pub data: WeaponData,
    pub details: Blob,
    pub critical: Option<Blob>,
    pub detection_sound_level: u32,
    pub template: Option<u32>,
}

/// Optional form id fields, in the order they are written
const FORM_FIELDS: [Tag; 9] = [
    Tag::INAM,
    Tag::WNAM,
    Tag::SNAM,
    Tag::XNAM,
    Tag::NAM7,
    Tag::TNAM,
    Tag::UNAM,
    Tag::NAM9,
    Tag::NAM8,
];

impl Weapon {
    fn form_field(&mut self, tag: Tag) -> Option<&mut Option<u32>> {
        let field = match tag {
            Tag::INAM => &mut self.impact_data_set,
            Tag::WNAM => &mut self.first_person_model,
            Tag::SNAM => &mut self.attack_sound,
            Tag::XNAM => &mut self.attack_sound_2d,
            Tag::NAM7 => &mut self.attack_loop_sound,
            Tag::TNAM => &mut self.attack_fail_sound,
            Tag::UNAM => &mut self.idle_sound,
            Tag::NAM9 => &mut self.equip_sound,
            Tag::NAM8 => &mut self.unequip_sound,
            _ => return None,
        };
        Some(field)
    }

    fn form_values(&self) -> [Option<u32>; 9] {
        [
            self.impact_data_set,
            self.first_person_model,
            self.attack_sound,
            self.attack_sound_2d,
            self.attack_loop_sound,
            self.attack_fail_sound,
            self.idle_sound,
            self.equip_sound,
            self.unequip_sound,
        ]
    }
}

impl RecordKind for Weapon {
    type Header = Tes4Header;
    type Key = u32;

    const SCHEMA: Schema = Schema {
        record: Tag::WEAP,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::EDID, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::VMAD, Length::Any),
            FieldSpec::required(Tag::OBND, Length::Fixed(12)),
            FieldSpec::optional(Tag::FULL, Length::Any),
            FieldSpec::optional(Tag::MODL, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::MODT, Length::Any),
            FieldSpec::optional(Tag::MODS, Length::Any),
            FieldSpec::optional(Tag::EITM, Length::Fixed(4)),
            FieldSpec::optional(Tag::EAMT, Length::Fixed(2)),
            FieldSpec::optional(Tag::ETYP, Length::Fixed(4)),
            FieldSpec::optional(Tag::BIDS, Length::Fixed(4)),
            FieldSpec::optional(Tag::BAMT, Length::Fixed(4)),
            FieldSpec::optional(Tag::KSIZ, Length::Fixed(4)),
            FieldSpec::required(Tag::DESC, Length::Any),
            FieldSpec::optional(Tag::NNAM, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::INAM, Length::Fixed(4)),
            FieldSpec::optional(Tag::WNAM, Length::Fixed(4)),
            FieldSpec::optional(Tag::SNAM, Length::Fixed(4)),
            FieldSpec::optional(Tag::XNAM, Length::Fixed(4)),
            FieldSpec::optional(Tag::NAM7, Length::Fixed(4)),
            FieldSpec::optional(Tag::TNAM, Length::Fixed(4)),
            FieldSpec::optional(Tag::UNAM, Length::Fixed(4)),
            FieldSpec::optional(Tag::NAM9, Length::Fixed(4)),
            FieldSpec::optional(Tag::NAM8, Length::Fixed(4)),
            FieldSpec::required(Tag::DATA, Length::Fixed(10)),
            FieldSpec::required(Tag::DNAM, Length::Fixed(100)),
            FieldSpec::optional(Tag::CRDT, Length::Any),
            FieldSpec::required(Tag::VNAM, Length::Fixed(4)),
            FieldSpec::optional(Tag::CNAM, Length::Fixed(4)),
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
            Tag::VMAD => self.script_data = Some(Blob::read(reader, tag, MAX_TEXT)?),
            Tag::OBND => self.bounds = ObjectBounds::read(reader)?,
            Tag::FULL => self.name = LocalizedString::read(reader, tag, localized, MAX_STRING)?,
            Tag::MODL => self.model_path = Some(reader.read_string(tag, MAX_STRING)?),
            Tag::MODT => self.model_hashes = Some(Blob::read(reader, tag, MAX_TEXT)?),
            Tag::MODS => self.alternate_textures = Some(Blob::read(reader, tag, MAX_TEXT)?),
            Tag::EITM => self.enchantment = Some(reader.read_form_id(tag)?),
            Tag::EAMT => self.enchantment_amount = Some(reader.read_u16_value(tag)?),
            Tag::ETYP => self.equip_type = Some(reader.read_form_id(tag)?),
            Tag::BIDS => self.block_bash_impact = Some(reader.read_form_id(tag)?),
            Tag::BAMT => self.alternate_block_material = Some(reader.read_form_id(tag)?),
            Tag::KSIZ => self.keywords = Keywords::read(reader)?,
            Tag::DESC => {
                self.description = LocalizedString::read(reader, tag, localized, MAX_TEXT)?
            }
            Tag::NNAM => self.unknown_nnam = Some(reader.read_string(tag, MAX_STRING)?),
            Tag::DATA => {
                let mut data = reader.read_struct(tag, 10)?;
                self.data = WeaponData {
                    value: data.read_u32()?,
                    weight: data.read_f32()?,
                    damage: data.read_u16()?,
                };
            }
            Tag::DNAM => self.details = Blob::read(reader, tag, 100)?,
            Tag::CRDT => self.critical = Some(Blob::read(reader, tag, MAX_TEXT)?),
            Tag::VNAM => self.detection_sound_level = reader.read_u32_value(tag)?,
            Tag::CNAM => self.template = Some(reader.read_u32_value(tag)?),
            _ => match self.form_field(tag) {
                Some(field) => *field = Some(reader.read_form_id(tag)?),
                None => return Err(unhandled(tag, reader)),
            },
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_string(Tag::EDID, &self.editor_id)?;
        write_opt_blob(writer, Tag::VMAD, &self.script_data)?;
        self.bounds.write(writer)?;
        self.name.write(Tag::FULL, writer)?;
        write_opt_string(writer, Tag::MODL, &self.model_path)?;
        write_opt_blob(writer, Tag::MODT, &self.model_hashes)?;
        write_opt_blob(writer, Tag::MODS, &self.alternate_textures)?;
        write_opt_u32(writer, Tag::EITM, self.enchantment)?;
        if let Some(amount) = self.enchantment_amount {
            writer.write_u16_value(Tag::EAMT, amount)?;
        }
        write_opt_u32(writer, Tag::ETYP, self.equip_type)?;
        write_opt_u32(writer, Tag::BIDS, self.block_bash_impact)?;
        write_opt_u32(writer, Tag::BAMT, self.alternate_block_material)?;
        self.keywords.write(writer)?;
        self.description.write(Tag::DESC, writer)?;
        write_opt_string(writer, Tag::NNAM, &self.unknown_nnam)?;
        for (tag, value) in FORM_FIELDS.iter().zip(self.form_values()) {
            write_opt_u32(writer, *tag, value)?;
        }

        writer.write_field_header(Tag::DATA, 10)?;
        writer.write_u32(self.data.value)?;
        writer.write_f32(self.data.weight)?;
        writer.write_u16(self.data.damage)?;

        self.details.write(Tag::DNAM, writer)?;
        write_opt_blob(writer, Tag::CRDT, &self.critical)?;
        writer.write_u32_value(Tag::VNAM, self.detection_sound_level)?;
        write_opt_u32(writer, Tag::CNAM, self.template)
    }
}
