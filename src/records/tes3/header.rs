use crate::{
    encoding::{decode_windows1252, encode_windows1252},
    errors::ErrorKind,
    record::{DecodeOptions, Record, RecordKind, Tes3Header},
    records::{
        tes3::{read_legacy_string, write_legacy_string, LegacyString},
        unhandled, MasterFile,
    },
    schema::{Discipline, FieldSpec, Length, Schema},
    subrecord::{SubRecordReader, SubRecordWriter, MAX_LEGACY_STRING},
    util::nul_position,
    Error, Tag,
};
use std::io::Write;

const COMPANY_LEN: usize = 32;
const DESCRIPTION_LEN: usize = 256;
const HEDR_LEN: usize = 4 + 4 + COMPANY_LEN + DESCRIPTION_LEN + 4;

/// The `TES3` record that opens every legacy dialect file
///
/// The master list ends at the first tag that isn't `MAST`, so the header can
/// be decoded straight from the start of a file.
///
/// ```
/// use tesfile::{record::{DecodeOptions, Record, Tes3Header}, records::tes3::Tes3FileHeader};
/// use tesfile::{subrecord::{SubRecordReader, SubRecordWriter}, Dialect, Tag};
///
/// let header = Tes3FileHeader {
///     version: 1.3,
///     company: String::from("Bethesda Softworks"),
///     record_count: 1,
///     ..Tes3FileHeader::default()
/// };
///
/// let mut out = Vec::new();
/// Record::new(Tes3Header::new(Tag::TES3), header.clone())
///     .encode(&mut SubRecordWriter::new(&mut out, Dialect::Tes3))?;
/// assert_eq!(out.len(), 16 + 8 + 300);
///
/// let mut reader = SubRecordReader::new(&out, Dialect::Tes3);
/// let decoded: Record<Tes3FileHeader> = Record::decode(&mut reader, &DecodeOptions::new())?;
/// assert_eq!(decoded.payload, Some(header));
/// # Ok::<(), tesfile::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tes3FileHeader {
    pub version: f32,
    pub flags: u32,
    pub company: String,
    pub description: String,
    pub record_count: u32,
    pub masters: Vec<MasterFile<LegacyString>>,

    /// Bytes after the company text, from its NUL on. Kept only when some of
    /// them are not zero.
    pub company_padding: Vec<u8>,
    pub description_padding: Vec<u8>,
}

impl Tes3FileHeader {
    pub const FLAG_MASTER: u32 = 0x0000_0001;

    pub fn is_master(&self) -> bool {
        self.flags & Self::FLAG_MASTER != 0
    }
}

fn read_padded(reader: &mut SubRecordReader, len: usize) -> Result<(String, Vec<u8>), Error> {
    let data = reader.read_bytes(len)?;
    let (text, tail) = data.split_at(nul_position(data));
    let padding = if tail.iter().all(|&x| x == 0) {
        Vec::new()
    } else {
        tail.to_vec()
    };
    Ok((decode_windows1252(text).into_owned(), padding))
}

/// Write text in a fixed width field. The padding is reused when it still
/// starts with a NUL and fills the field exactly, else the field is zero
/// filled.
fn write_padded<W: Write>(
    writer: &mut SubRecordWriter<W>,
    text: &str,
    padding: &[u8],
    len: usize,
) -> Result<(), Error> {
    let bytes = encode_windows1252(text)
        .ok_or_else(|| Error::new(ErrorKind::Unencodable { tag: Tag::HEDR }))?;
    if bytes.len() > len {
        return Err(Error::new(ErrorKind::LengthTooLarge {
            tag: Tag::HEDR,
            length: bytes.len() as u64,
            max: len as u64,
            offset: writer.position(),
        }));
    }

    writer.write_bytes(&bytes)?;
    if padding.first() == Some(&0) && bytes.len() + padding.len() == len {
        writer.write_bytes(padding)
    } else {
        writer.write_bytes(&[0u8; DESCRIPTION_LEN][..len - bytes.len()])
    }
}

impl RecordKind for Tes3FileHeader {
    type Header = Tes3Header;
    type Key = ();

    const SCHEMA: Schema = Schema {
        record: Tag::TES3,
        discipline: Discipline::SentinelBounded,
        fields: &[
            FieldSpec::required(Tag::HEDR, Length::Fixed(HEDR_LEN as u32)),
            FieldSpec::repeatable(Tag::MAST, Length::Capped(MAX_LEGACY_STRING)),
        ],
        branches: &[],
    };

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
                let mut data = reader.read_struct(tag, HEDR_LEN)?;
                self.version = data.read_f32()?;
                self.flags = data.read_u32()?;
                let (company, padding) = read_padded(&mut data, COMPANY_LEN)?;
                self.company = company;
                self.company_padding = padding;
                let (description, padding) = read_padded(&mut data, DESCRIPTION_LEN)?;
                self.description = description;
                self.description_padding = padding;
                self.record_count = data.read_u32()?;
            }
            Tag::MAST => {
                let name = read_legacy_string(reader, tag)?;
                reader.expect_tag(Tag::DATA)?;
                let data = reader.read_u64_value(Tag::DATA)?;
                tracing::trace!(master = %name, "master file declared");
                self.masters.push(MasterFile { name, data });
            }
            _ => return Err(unhandled(tag, reader)),
        }
        Ok(())
    }

    fn encode_fields<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_field_header(Tag::HEDR, HEDR_LEN)?;
        writer.write_f32(self.version)?;
        writer.write_u32(self.flags)?;
        write_padded(writer, &self.company, &self.company_padding, COMPANY_LEN)?;
        write_padded(
            writer,
            &self.description,
            &self.description_padding,
            DESCRIPTION_LEN,
        )?;
        writer.write_u32(self.record_count)?;

        for master in &self.masters {
            write_legacy_string(writer, Tag::MAST, &master.name)?;
            writer.write_u64_value(Tag::DATA, master.data)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dialect;

    fn tribunal() -> Record<Tes3FileHeader> {
        Record::new(
            Tes3Header::new(Tag::TES3),
            Tes3FileHeader {
                version: 1.3,
                flags: Tes3FileHeader::FLAG_MASTER,
                company: String::from("Bethesda Softworks"),
                description: String::from("The main data file for the Tribunal expansion."),
                record_count: 2,
                masters: vec![MasterFile {
                    name: LegacyString::from("Morrowind.esm"),
                    data: 79_837_557,
                }],
                ..Tes3FileHeader::default()
            },
        )
    }

    fn encode(record: &Record<Tes3FileHeader>) -> Vec<u8> {
        let mut out = Vec::new();
        record
            .encode(&mut SubRecordWriter::new(&mut out, Dialect::Tes3))
            .unwrap();
        out
    }

    fn decode(data: &[u8]) -> (Result<Record<Tes3FileHeader>, Error>, usize) {
        let mut reader = SubRecordReader::new(data, Dialect::Tes3);
        let result = Record::decode(&mut reader, &DecodeOptions::new());
        (result, reader.position())
    }

    #[test]
    fn test_tribunal_header() {
        let record = tribunal();
        let data = encode(&record);
        assert_eq!(data.len(), 16 + 308 + 22 + 16);
        assert_eq!(&data[..8], b"TES3\x5A\x01\0\0");
        assert_eq!(&data[24..32], b"\x66\x66\xA6\x3F\x01\0\0\0");
        assert_eq!(&data[32..50], b"Bethesda Softworks");
        assert_eq!(data[50], 0);

        let (decoded, position) = decode(&data);
        let decoded = decoded.unwrap();
        assert_eq!(position, data.len());
        assert_eq!(decoded.payload, record.payload);
        assert!(decoded.payload.as_ref().unwrap().is_master());
        assert_eq!(decoded.key(), None);
    }

    #[test]
    fn test_master_list_ends_at_foreign_tag() {
        let mut data = encode(&tribunal());
        data[4] += 0x10;
        data.extend_from_slice(b"GMST\x0A\0\0\0\0\0\0\0\0\0\0\0NAME\x02\0\0\0sX");

        let (decoded, position) = decode(&data);
        assert_eq!(decoded.unwrap().payload, tribunal().payload);
        assert_eq!(&data[position..position + 4], b"GMST");
    }

    #[test]
    fn test_bytes_after_company_are_kept() {
        let mut data = encode(&tribunal());
        data[32..50].fill(0);
        data[32..34].copy_from_slice(b"ab");
        data[35] = b'X';

        let (decoded, _) = decode(&data);
        let decoded = decoded.unwrap();
        let header = decoded.payload.as_ref().unwrap();
        assert_eq!(header.company, "ab");
        assert_eq!(header.company_padding.len(), 30);
        assert_eq!(header.company_padding[1], b'X');
        assert!(header.description_padding.is_empty());
        assert_eq!(encode(&decoded), data);
    }

    #[test]
    fn test_padding_dropped_when_text_changes() {
        let mut record = tribunal();
        let header = record.payload.as_mut().unwrap();
        header.company = String::from("ab");
        header.company_padding = vec![0, b'X'];

        let data = encode(&record);
        assert_eq!(&data[32..34], b"ab");
        assert!(data[34..64].iter().all(|&x| x == 0));
    }

    #[test]
    fn test_unterminated_master_name() {
        let mut record = tribunal();
        let header = record.payload.as_mut().unwrap();
        header.masters[0].name = LegacyString::unterminated("Morrowind.esm");

        let data = encode(&record);
        assert_eq!(data.len(), 16 + 308 + 21 + 16);
        let (decoded, position) = decode(&data);
        assert_eq!(position, data.len());
        assert_eq!(decoded.unwrap().payload, record.payload);
    }

    #[test]
    fn test_overlong_company() {
        let mut record = tribunal();
        record.payload.as_mut().unwrap().company = "x".repeat(33);
        let mut out = Vec::new();
        let err = record
            .encode(&mut SubRecordWriter::new(&mut out, Dialect::Tes3))
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::LengthTooLarge {
                tag: Tag::HEDR,
                length: 33,
                max: 32,
                ..
            }
        ));
    }

    #[test]
    fn test_short_hedr() {
        let mut data = b"TES3\x33\x01\0\0\0\0\0\0\0\0\0\0HEDR\x2B\x01\0\0".to_vec();
        data.resize(data.len() + 299, 0);
        let (decoded, _) = decode(&data);
        assert!(matches!(
            decoded.unwrap_err().kind(),
            ErrorKind::InvalidLength {
                tag: Tag::HEDR,
                length: 299,
                offset: 20,
            }
        ));
    }
}
