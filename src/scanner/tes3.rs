use super::{check_magic, next_tag, ScanOptions, ScanState, ScanSummary};
use crate::{
    record::{skip_record, DecodeOptions, Record},
    records::tes3::Tes3FileHeader,
    registry::{RegistrySet, Tes3Registries},
    subrecord::SubRecordReader,
    Dialect, Error, Tag,
};

/// Every record type a legacy file may contain
pub const TES3_RECORD_TYPES: &[Tag] = &[
    Tag::new(b"ACTI"),
    Tag::ALCH,
    Tag::APPA,
    Tag::new(b"ARMO"),
    Tag::new(b"BODY"),
    Tag::BOOK,
    Tag::new(b"BSGN"),
    Tag::new(b"CELL"),
    Tag::new(b"CLAS"),
    Tag::new(b"CLOT"),
    Tag::new(b"CONT"),
    Tag::new(b"CREA"),
    Tag::new(b"DIAL"),
    Tag::new(b"DOOR"),
    Tag::ENCH,
    Tag::FACT,
    Tag::GLOB,
    Tag::GMST,
    Tag::new(b"INFO"),
    Tag::INGR,
    Tag::new(b"LAND"),
    Tag::new(b"LEVC"),
    Tag::new(b"LEVI"),
    Tag::new(b"LIGH"),
    Tag::new(b"LOCK"),
    Tag::new(b"LTEX"),
    Tag::MGEF,
    Tag::MISC,
    Tag::new(b"NPC_"),
    Tag::new(b"PGRD"),
    Tag::PROB,
    Tag::new(b"RACE"),
    Tag::new(b"REGN"),
    Tag::REPA,
    Tag::new(b"SCPT"),
    Tag::new(b"SKIL"),
    Tag::new(b"SNDG"),
    Tag::new(b"SOUN"),
    Tag::SPEL,
    Tag::new(b"SSCR"),
    Tag::new(b"STAT"),
    Tag::WEAP,
];

/// Scans a legacy dialect file into [`Tes3Registries`]
#[derive(Debug, Clone)]
pub struct Tes3Scanner<'a> {
    reader: SubRecordReader<'a>,
    options: ScanOptions,
    state: ScanState,
    header: Option<Record<Tes3FileHeader>>,
}

impl<'a> Tes3Scanner<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Tes3Scanner::with_options(data, ScanOptions::default())
    }

    pub fn with_options(data: &'a [u8], options: ScanOptions) -> Self {
        Tes3Scanner {
            reader: SubRecordReader::new(data, Dialect::Tes3),
            options,
            state: ScanState::Start,
            header: None,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Offset of the next unread byte
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    /// The file header, once it has been read
    pub fn header(&self) -> Option<&Record<Tes3FileHeader>> {
        self.header.as_ref()
    }

    /// Validate the magic tag and read the file header with its master list
    pub fn read_header(&mut self) -> Result<&Record<Tes3FileHeader>, Error> {
        if self.header.is_none() {
            check_magic(&mut self.reader, Tag::TES3)?;
            let header = Record::<Tes3FileHeader>::decode(&mut self.reader, &DecodeOptions::new())?;
            self.state = ScanState::HeaderRead;

            let masters = header.payload.as_ref().map_or(0, |x| x.masters.len());
            tracing::debug!(masters, "read legacy file header");
            self.state = ScanState::MasterListRead;
            self.header = Some(header);
        }

        self.header
            .as_ref()
            .ok_or_else(|| Error::malformed_header(Tag::TES3, 0, "missing file header"))
    }

    /// Read every remaining record, filling the registries
    pub fn scan(&mut self, registries: &mut Tes3Registries) -> Result<ScanSummary, Error> {
        self.read_header()?;
        self.state = ScanState::RecordDispatch;

        let options = DecodeOptions::new();
        let mut summary = ScanSummary::default();
        while !self.reader.is_empty() {
            let offset = self.reader.position();
            let tag = next_tag(&mut self.reader)?;
            if let Some(route) = Tes3Registries::route(tag) {
                summary.record((route.decode)(registries, &mut self.reader, &options)?);
                continue;
            }

            if TES3_RECORD_TYPES.contains(&tag) {
                summary.skipped += 1;
            } else if self.options.is_stop_on_unknown() {
                return Err(Error::unexpected_tag(None, tag, offset));
            } else {
                tracing::warn!(%tag, offset, "unknown record type");
                summary.unknown += 1;
            }
            skip_record(&mut self.reader)?;
        }

        self.state = ScanState::End;
        tracing::debug!(?summary, "finished legacy scan");
        Ok(summary)
    }
}
