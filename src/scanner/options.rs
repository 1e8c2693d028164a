use crate::registry::Upsert;

/// Knobs for a scan
///
/// ```
/// use tesfile::scanner::ScanOptions;
///
/// let options = ScanOptions::new().localized(true).stop_on_unknown(true);
/// assert_eq!(options.localized_override(), Some(true));
/// assert!(options.is_stop_on_unknown());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    localized: Option<bool>,
    stop_on_unknown: bool,
}

impl ScanOptions {
    pub fn new() -> Self {
        ScanOptions::default()
    }

    /// Decode localizable fields as string table indices (or not) regardless
    /// of what the file header says
    pub fn localized(mut self, localized: bool) -> Self {
        self.localized = Some(localized);
        self
    }

    /// Fail on the first tag that isn't a known record type instead of
    /// counting and skipping it
    pub fn stop_on_unknown(mut self, stop: bool) -> Self {
        self.stop_on_unknown = stop;
        self
    }

    pub fn localized_override(&self) -> Option<bool> {
        self.localized
    }

    pub fn is_stop_on_unknown(&self) -> bool {
        self.stop_on_unknown
    }
}

/// Where a scanner is in a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Start,
    HeaderRead,
    MasterListRead,
    RecordDispatch,
    End,
}

/// What a scan did with the records it met
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScanSummary {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,

    /// Known record types that no registry wanted. Records inside a group
    /// that was skipped whole are not counted one by one.
    pub skipped: usize,

    /// Top level groups skipped whole because no registry takes their
    /// record type
    pub skipped_groups: usize,

    /// Tags that aren't a known record type
    pub unknown: usize,

    pub groups: usize,
}

impl ScanSummary {
    pub(crate) fn record(&mut self, result: Upsert) {
        match result {
            Upsert::Inserted => self.inserted += 1,
            Upsert::Updated => self.updated += 1,
            Upsert::Unchanged => self.unchanged += 1,
        }
    }

    /// Records that were decoded into a registry
    pub fn decoded(&self) -> usize {
        self.inserted + self.updated + self.unchanged
    }

    /// Records that changed a registry
    pub fn changed(&self) -> usize {
        self.inserted + self.updated
    }
}
