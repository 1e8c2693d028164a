use crate::{
    fields::{Blob, LocalizedString, ObjectBounds},
    record::{DecodeOptions, Record, RecordKind, Tes4Header},
    records::{tes4::form_key, unhandled, write_opt_blob, write_opt_string, write_opt_u32},
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_STRING, MAX_TEXT},
    Error, Tag,
};
use std::io::Write;

/// A harvestable plant (`FLOR`)
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Flora {
    pub editor_id: String,
    pub script_data: Option<Blob>,
    pub bounds: ObjectBounds,
    pub name: LocalizedString,
    pub model_path: Option<String>,
    pub model_hashes: Option<Blob>,
    pub alternate_textures: Option<Blob>,
    pub unknown_pnam: u32,
    pub activate_text: LocalizedString,
    pub unknown_fnam: u16,
    pub ingredient: Option<u32>,
    pub harvest_sound: Option<u32>,
    /// Production chance for each season, one byte apiece
    pub seasons: [u8; 4],
}

impl RecordKind for Flora {
    type Header = Tes4Header;
    type Key = u32;

    const SCHEMA: Schema = Schema {
        record: Tag::FLOR,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::EDID, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::VMAD, Length::Any),
            FieldSpec::required(Tag::OBND, Length::Fixed(12)),
            FieldSpec::required(Tag::FULL, Length::Any),
            FieldSpec::optional(Tag::MODL, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::MODT, Length::Any),
            FieldSpec::optional(Tag::MODS, Length::Any),
            FieldSpec::required(Tag::PNAM, Length::Fixed(4)),
            FieldSpec::optional(Tag::RNAM, Length::Any),
            FieldSpec::required(Tag::FNAM, Length::Fixed(2)),
            FieldSpec::optional(Tag::PFIG, Length::Fixed(4)),
            FieldSpec::optional(Tag::SNAM, Length::Fixed(4)),
            FieldSpec::required(Tag::PFPC, Length::Fixed(4)),
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
            Tag::PNAM => self.unknown_pnam = reader.read_u32_value(tag)?,
            Tag::RNAM => {
                self.activate_text = LocalizedString::read(reader, tag, localized, MAX_STRING)?
            }
            Tag::FNAM => self.unknown_fnam = reader.read_u16_value(tag)?,
            Tag::PFIG => self.ingredient = Some(reader.read_form_id(tag)?),
            Tag::SNAM => self.harvest_sound = Some(reader.read_form_id(tag)?),
            Tag::PFPC => self.seasons = reader.read_fixed::<4>(tag)?,
            _ => return Err(unhandled(tag, reader)),
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
        writer.write_u32_value(Tag::PNAM, self.unknown_pnam)?;
        self.activate_text.write(Tag::RNAM, writer)?;
        writer.write_u16_value(Tag::FNAM, self.unknown_fnam)?;
        write_opt_u32(writer, Tag::PFIG, self.ingredient)?;
        write_opt_u32(writer, Tag::SNAM, self.harvest_sound)?;
        writer.write_value(Tag::PFPC, &self.seasons)
    }
}
