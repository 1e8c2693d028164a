use crate::{
    record::{DecodeOptions, Record, RecordKind, Tes4Header},
    records::{unhandled, MasterFile},
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_STRING},
    Error, Tag,
};
use std::io::Write;

/// The `TES4` record that opens every newer dialect file
///
/// ```
/// use tesfile::{record::{DecodeOptions, Record}, records::tes4::Tes4FileHeader};
/// use tesfile::{subrecord::SubRecordReader, Dialect};
///
/// let data = b"TES4\x2C\0\0\0\x81\0\0\0\0\0\0\0\0\0\0\0\x28\0\0\0\
/// HEDR\x0C\0\xD7\xA3\x70\x3F\x78\x0A\x0E\x00\x92\x0F\0\0\
/// CNAM\x0A\0mcarofano\0\
/// INTV\x04\0\xC5\x26\x01\x00";
///
/// let mut reader = SubRecordReader::new(&data[..], Dialect::Tes4);
/// let header: Record<Tes4FileHeader> = Record::decode(&mut reader, &DecodeOptions::new())?;
/// assert!(header.is_localized());
/// assert!(header.is_master());
///
/// let file = header.payload.as_ref().unwrap();
/// assert_eq!(file.author, "mcarofano");
/// assert_eq!(file.record_count, 0x000E_0A78);
/// # Ok::<(), tesfile::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tes4FileHeader {
    pub version: f32,
    pub record_count: u32,
    pub next_object_id: u32,
    pub author: String,
    pub summary: Option<String>,
    pub masters: Vec<MasterFile>,
    pub overridden_forms: Vec<u32>,
    pub internal_version: u32,
    pub incc: Option<u32>,
}

impl Tes4FileHeader {
    pub const FLAG_MASTER: u32 = 0x0000_0001;
    pub const FLAG_LOCALIZED: u32 = 0x0000_0080;
}

impl Record<Tes4FileHeader> {
    /// Whether the file's localizable fields are string table indices
    pub fn is_localized(&self) -> bool {
        self.header.flags & Tes4FileHeader::FLAG_LOCALIZED != 0
    }

    pub fn is_master(&self) -> bool {
        self.header.flags & Tes4FileHeader::FLAG_MASTER != 0
    }
}

impl RecordKind for Tes4FileHeader {
    type Header = Tes4Header;
    type Key = ();

    const SCHEMA: Schema = Schema {
        record: Tag::TES4,
        discipline: Discipline::SizeBounded,
        fields: &[
            FieldSpec::required(Tag::HEDR, Length::Fixed(12)),
            FieldSpec::required(Tag::CNAM, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::SNAM, Length::Capped(MAX_STRING)),
            FieldSpec::repeatable(Tag::MAST, Length::Capped(MAX_STRING)),
            FieldSpec::optional(Tag::ONAM, Length::MultipleOf(4)),
            FieldSpec::required(Tag::INTV, Length::Fixed(4)),
            FieldSpec::optional(Tag::INCC, Length::Fixed(4)),
        ],
        branches: &[],
    };

    /// File headers are never stored in a registry
    fn key(_record: &Record<Self>) -> Option<()> {
        None
    }

    fn visit_field(
        &mut self,
        tag: Tag,
        reader: &mut SubRecordReader,
        _options: &DecodeOptions,
    ) -> Result<(), Error> {
        match tag {
            Tag::HEDR => {
                let mut data = reader.read_struct(tag, 12)?;
                self.version = data.read_f32()?;
                self.record_count = data.read_u32()?;
                self.next_object_id = data.read_u32()?;
            }
            Tag::CNAM => self.author = reader.read_string(tag, MAX_STRING)?,
            Tag::SNAM => {
                let offset = reader.position();
                let summary = reader.read_string(tag, MAX_STRING)?;
                if summary.is_empty() {
                    return Err(Error::invalid_length(tag, 1, offset));
                }
                self.summary = Some(summary);
            }
            Tag::MAST => {
                let name = reader.read_string(tag, MAX_STRING)?;
                reader.expect_tag(Tag::DATA)?;
                let data = reader.read_u64_value(Tag::DATA)?;
                tracing::trace!(master = %name, "master file declared");
                self.masters.push(MasterFile { name, data });
            }
            Tag::ONAM => {
                let len = reader.read_length()? as usize;
                let mut data = reader.take(len)?;
                self.overridden_forms = (0..len / 4)
                    .map(|_| data.read_u32())
                    .collect::<Result<Vec<_>, _>>()?;
            }
            Tag::INTV => self.internal_version = reader.read_u32_value(tag)?,
            Tag::INCC => self.incc = Some(reader.read_u32_value(tag)?),
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_field_header(Tag::HEDR, 12)?;
        writer.write_f32(self.version)?;
        writer.write_u32(self.record_count)?;
        writer.write_u32(self.next_object_id)?;
        writer.write_string(Tag::CNAM, &self.author)?;
        if let Some(summary) = &self.summary {
            writer.write_string(Tag::SNAM, summary)?;
        }

        for master in &self.masters {
            writer.write_string(Tag::MAST, &master.name)?;
            writer.write_u64_value(Tag::DATA, master.data)?;
        }

        if !self.overridden_forms.is_empty() {
            writer.write_field_header(Tag::ONAM, self.overridden_forms.len() * 4)?;
            for form in &self.overridden_forms {
                writer.write_u32(*form)?;
            }
        }

        writer.write_u32_value(Tag::INTV, self.internal_version)?;
        if let Some(incc) = self.incc {
            writer.write_u32_value(Tag::INCC, incc)?;
        }
        Ok(())
    }
}
