//! Whole-file scanners that fill registries.
//!
//! A scan is a small state machine: validate the magic tag, read the file
//! header and its master list, then dispatch every top-level record to the
//! registry for its tag. Records nobody registered for are skipped by their
//! declared size, and tags that aren't known record types at all are counted
//! as unknown without aborting the scan.
//!
//! ```
//! use tesfile::record::{Record, Tes3Header};
//! use tesfile::records::tes3::{GameSetting, GameSettingValue, Tes3FileHeader};
//! use tesfile::registry::Tes3Registries;
//! use tesfile::scanner::Tes3Scanner;
//! use tesfile::Tag;
//!
//! let mut file = Vec::new();
//! Record::new(Tes3Header::new(Tag::TES3), Tes3FileHeader::default()).write_to(&mut file)?;
//! let setting = GameSetting {
//!     name: String::from("iMaxLevel"),
//!     value: Some(GameSettingValue::Int(100)),
//! };
//! Record::new(Tes3Header::new(Tag::GMST), setting).write_to(&mut file)?;
//!
//! let mut registries = Tes3Registries::new();
//! let mut scanner = Tes3Scanner::new(&file);
//! let summary = scanner.scan(&mut registries)?;
//! assert_eq!(summary.inserted, 1);
//! assert!(registries.game_settings.contains(&String::from("iMaxLevel")));
//! # Ok::<(), tesfile::Error>(())
//! ```

mod options;
mod tes3;
mod tes4;

pub use options::{ScanOptions, ScanState, ScanSummary};
pub use tes3::{Tes3Scanner, TES3_RECORD_TYPES};
pub use tes4::Tes4Scanner;

use crate::{subrecord::SubRecordReader, Error, Tag};

/// The next tag without consuming it. Fewer than four bytes left is a
/// truncation.
fn next_tag(reader: &mut SubRecordReader) -> Result<Tag, Error> {
    let tag = reader.read_tag()?;
    reader.rewind_tag();
    Ok(tag)
}

fn check_magic(reader: &mut SubRecordReader, magic: Tag) -> Result<(), Error> {
    let tag = next_tag(reader)?;
    if tag != magic {
        return Err(Error::malformed_header(
            tag,
            reader.position(),
            "file does not start with the expected magic tag",
        ));
    }
    Ok(())
}
