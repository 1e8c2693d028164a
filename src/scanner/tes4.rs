use super::{check_magic, next_tag, ScanOptions, ScanState, ScanSummary};
use crate::{
    record::{skip_record, DecodeOptions, GroupHeader, Record},
    records::tes4::Tes4FileHeader,
    registry::{RegistrySet, Tes4Registries},
    subrecord::SubRecordReader,
    Dialect, Error, Tag,
};

/// Deepest group nesting that is followed
const MAX_GROUP_DEPTH: usize = 16;

/// Scans a newer dialect file into [`Tes4Registries`]
///
/// Top level groups of a registered record type are walked, nested groups
/// included. Every other group is skipped whole.
#[derive(Debug, Clone)]
pub struct Tes4Scanner<'a> {
    reader: SubRecordReader<'a>,
    options: ScanOptions,
    state: ScanState,
    header: Option<Record<Tes4FileHeader>>,
    decode: DecodeOptions,
}

impl<'a> Tes4Scanner<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Tes4Scanner::with_options(data, ScanOptions::default())
    }

    pub fn with_options(data: &'a [u8], options: ScanOptions) -> Self {
        Tes4Scanner {
            reader: SubRecordReader::new(data, Dialect::Tes4),
            options,
            state: ScanState::Start,
            header: None,
            decode: DecodeOptions::new(),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn position(&self) -> usize {
        self.reader.position()
    }

    pub fn header(&self) -> Option<&Record<Tes4FileHeader>> {
        self.header.as_ref()
    }

    /// Whether localizable fields are being read as string table indices
    pub fn is_localized(&self) -> bool {
        self.decode.is_localized()
    }

    /// Validate the magic tag and read the `TES4` record
    ///
    /// The header's localized flag decides how the rest of the file is
    /// decoded unless the scan options override it.
    pub fn read_header(&mut self) -> Result<&Record<Tes4FileHeader>, Error> {
        if self.header.is_none() {
            check_magic(&mut self.reader, Tag::TES4)?;
            let header = Record::<Tes4FileHeader>::decode(&mut self.reader, &DecodeOptions::new())?;
            self.state = ScanState::HeaderRead;

            let localized = self
                .options
                .localized_override()
                .unwrap_or_else(|| header.is_localized());
            self.decode = DecodeOptions::new().localized(localized);

            let masters = header.payload.as_ref().map_or(0, |x| x.masters.len());
            tracing::debug!(masters, localized, "read file header");
            self.state = ScanState::MasterListRead;
            self.header = Some(header);
        }

        self.header
            .as_ref()
            .ok_or_else(|| Error::malformed_header(Tag::TES4, 0, "missing file header"))
    }

    /// Read every remaining group and record, filling the registries
    pub fn scan(&mut self, registries: &mut Tes4Registries) -> Result<ScanSummary, Error> {
        self.read_header()?;
        self.state = ScanState::RecordDispatch;

        let mut summary = ScanSummary::default();
        let mut reader = self.reader.clone();
        while !reader.is_empty() {
            let offset = reader.position();
            let tag = next_tag(&mut reader)?;
            if tag == Tag::GRUP {
                self.top_group(&mut reader, registries, &mut summary)?;
                continue;
            }

            if let Some(route) = Tes4Registries::route(tag) {
                summary.record((route.decode)(registries, &mut reader, &self.decode)?);
                continue;
            }

            self.unknown(tag, offset, &mut summary)?;
            skip_record(&mut reader)?;
        }

        self.reader = reader;
        self.state = ScanState::End;
        tracing::debug!(?summary, "finished scan");
        Ok(summary)
    }

    fn top_group(
        &self,
        reader: &mut SubRecordReader<'a>,
        registries: &mut Tes4Registries,
        summary: &mut ScanSummary,
    ) -> Result<(), Error> {
        let offset = reader.position();
        let group = GroupHeader::read(reader)?;
        let mut content = reader.take(group.content_len())?;
        summary.groups += 1;

        match group.record_type() {
            Some(tag) if Tes4Registries::accepts(tag) => {
                tracing::debug!(%tag, offset, size = group.size, "walking group");
                self.walk_group(&mut content, tag, registries, summary, 1)
            }
            _ => {
                tracing::debug!(offset, size = group.size, "skipped group");
                summary.skipped_groups += 1;
                Ok(())
            }
        }
    }

    fn walk_group(
        &self,
        reader: &mut SubRecordReader<'a>,
        record_type: Tag,
        registries: &mut Tes4Registries,
        summary: &mut ScanSummary,
        depth: usize,
    ) -> Result<(), Error> {
        while !reader.is_empty() {
            let offset = reader.position();
            let tag = next_tag(reader)?;
            if tag == Tag::GRUP {
                if depth >= MAX_GROUP_DEPTH {
                    return Err(Error::malformed_header(
                        Tag::GRUP,
                        offset,
                        "groups are nested too deeply",
                    ));
                }

                let group = GroupHeader::read(reader)?;
                let mut content = reader.take(group.content_len())?;
                summary.groups += 1;
                self.walk_group(&mut content, record_type, registries, summary, depth + 1)?;
                continue;
            }

            if tag == record_type {
                if let Some(route) = Tes4Registries::route(tag) {
                    summary.record((route.decode)(registries, reader, &self.decode)?);
                    continue;
                }
            }

            summary.skipped += 1;
            skip_record(reader)?;
        }
        Ok(())
    }

    fn unknown(&self, tag: Tag, offset: usize, summary: &mut ScanSummary) -> Result<(), Error> {
        if self.options.is_stop_on_unknown() {
            return Err(Error::unexpected_tag(None, tag, offset));
        }

        tracing::warn!(%tag, offset, "unregistered top level record");
        summary.unknown += 1;
        Ok(())
    }
}
