//! Records of the legacy dialect, keyed by their `NAME` string.
//!
//! Legacy strings are usually NUL terminated but some tools omit the
//! terminator. A [`LegacyString`] remembers which form it was read in and
//! is written back the same way.

mod apparatus;
mod enchantment;
mod game_setting;
mod global;
mod header;
mod ingredient;
mod magic_effect;
mod misc;
mod probe;
mod repair_item;
mod spell;

pub use apparatus::{ApparatusData, Tes3Apparatus};
pub use enchantment::{EnchantmentData, Tes3Enchantment, MAX_ENCHANTMENT_EFFECTS};
pub use game_setting::{GameSetting, GameSettingKind, GameSettingValue};
pub use global::{GlobalKind, Tes3Global};
pub use header::Tes3FileHeader;
pub use ingredient::{IngredientData, Tes3Ingredient};
pub use magic_effect::{EffectAsset, Tes3EffectData, Tes3MagicEffect};
pub use misc::{MiscItemData, Tes3MiscItem};
pub use probe::{ProbeData, Tes3Probe};
pub use repair_item::{RepairData, Tes3RepairItem};
pub use spell::{SpellEffect, Tes3Spell, Tes3SpellData};

use crate::{
    errors::ErrorKind,
    subrecord::{SubRecordReader, SubRecordWriter, MAX_LEGACY_STRING},
    Error, Tag,
};
use std::{fmt, io::Write, ops::Deref};

/// Text of a legacy string field and whether it ended with a NUL
///
/// New strings are terminated.
///
/// ```
/// use tesfile::records::tes3::LegacyString;
///
/// let name = LegacyString::from("Misc_Quill");
/// assert!(name.terminated);
/// assert_eq!(name, "Misc_Quill");
/// assert!(name.starts_with("Misc"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LegacyString {
    pub text: String,
    pub terminated: bool,
}

impl LegacyString {
    pub fn new(text: impl Into<String>) -> Self {
        LegacyString {
            text: text.into(),
            terminated: true,
        }
    }

    /// A string written without its NUL
    pub fn unterminated(text: impl Into<String>) -> Self {
        LegacyString {
            text: text.into(),
            terminated: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Bytes the value takes on disk
    pub fn encoded_len(&self) -> usize {
        // windows-1252 is one byte per character
        self.text.chars().count() + usize::from(self.terminated)
    }
}

impl Default for LegacyString {
    fn default() -> Self {
        LegacyString::new(String::new())
    }
}

impl From<&str> for LegacyString {
    fn from(text: &str) -> Self {
        LegacyString::new(text)
    }
}

impl From<String> for LegacyString {
    fn from(text: String) -> Self {
        LegacyString::new(text)
    }
}

impl Deref for LegacyString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl AsRef<str> for LegacyString {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl PartialEq<str> for LegacyString {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for LegacyString {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

impl fmt::Display for LegacyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A non-empty name as a registry key
pub(crate) fn name_key<S: AsRef<str>>(name: Option<&S>) -> Option<String> {
    name.map(AsRef::as_ref)
        .filter(|x| !x.is_empty())
        .map(String::from)
}

pub(crate) fn read_legacy_string(
    reader: &mut SubRecordReader,
    tag: Tag,
) -> Result<LegacyString, Error> {
    let (text, terminated) = reader.read_text(tag, MAX_LEGACY_STRING)?;
    Ok(LegacyString { text, terminated })
}

/// Write a string in the form it was read, failing when it does not fit the
/// legacy cap
pub(crate) fn write_legacy_string<W: Write>(
    writer: &mut SubRecordWriter<W>,
    tag: Tag,
    value: &LegacyString,
) -> Result<(), Error> {
    let len = value.encoded_len();
    if len > MAX_LEGACY_STRING as usize {
        return Err(Error::new(ErrorKind::LengthTooLarge {
            tag,
            length: len as u64,
            max: u64::from(MAX_LEGACY_STRING),
            offset: writer.position(),
        }));
    }

    writer.write_text(tag, &value.text, value.terminated)
}

pub(crate) fn write_opt_legacy_string<W: Write>(
    writer: &mut SubRecordWriter<W>,
    tag: Tag,
    value: &Option<LegacyString>,
) -> Result<(), Error> {
    match value {
        Some(value) => write_legacy_string(writer, tag, value),
        None => Ok(()),
    }
}
