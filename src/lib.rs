/*!

A reader and writer for the plugin and master files of
[Morrowind](https://en.wikipedia.org/wiki/The_Elder_Scrolls_III:_Morrowind) (`TES3`) and
[Skyrim](https://en.wikipedia.org/wiki/The_Elder_Scrolls_V:_Skyrim) (`TES4`) era titles.

Both dialects store a file as a sequence of records, each a header followed by
sub-records of the form tag, length, value. They differ in the width of the
length (four bytes for `TES3`, two for `TES4`), in the record header, and in
that `TES4` files wrap records in `GRUP` groups and may keep display text in
external string tables.

## Features

- ✔ Strict: every field length and count is checked before it is trusted
- ✔ Symmetric: a decoded record encodes back to the bytes it came from
- ✔ Bounded: nothing is allocated from an unchecked length
- ✔ Tolerant: unknown record types are counted and skipped rather than fatal

## Quick Start

Scan a file into registries keyed by each record's identifier, then write the
records back out.

```rust
use tesfile::{
    record::{Record, Tes4Header},
    records::tes4::{MiscObject, Tes4FileHeader},
    registry::Tes4Registries,
    scanner::Tes4Scanner,
    LocalizedString, Tag,
};

let mut data = Vec::new();
let header = Tes4FileHeader {
    version: 1.7,
    author: String::from("mcarofano"),
    ..Tes4FileHeader::default()
};
Record::new(Tes4Header::new(Tag::TES4, 0), header).write_to(&mut data)?;

let gold = MiscObject {
    editor_id: String::from("Gold001"),
    name: LocalizedString::Inline(String::from("Gold")),
    value: 1,
    ..MiscObject::default()
};
Record::new(Tes4Header::new(Tag::MISC, 0xF), gold).write_to(&mut data)?;

let mut registries = Tes4Registries::new();
let summary = Tes4Scanner::new(&data).scan(&mut registries)?;
assert_eq!(summary.inserted, 1);

let record = registries.misc.get(&0xF).unwrap();
assert_eq!(record.payload.as_ref().unwrap().name.as_inline(), Some("Gold"));

let mut out = Vec::new();
registries.misc.save_all_to_stream(&mut out)?;
assert_eq!(&out[..], &data[data.len() - out.len()..]);
# Ok::<(), tesfile::Error>(())
```

## One Level Lower

Individual records can be decoded straight from a [`SubRecordReader`], and
the reader's primitives can be used for record types this crate does not
model.

```rust
use tesfile::{subrecord::SubRecordReader, Dialect, Tag};

let data = b"NAME\x05\0\0\0fire\0";
let mut reader = SubRecordReader::new(&data[..], Dialect::Tes3);
reader.expect_tag(Tag::NAME)?;
assert_eq!(reader.read_string(Tag::NAME, 256)?, "fire");
assert!(reader.is_empty());
# Ok::<(), tesfile::Error>(())
```

## Caveats

Caller is responsible for:

- Loading the string tables a localized file refers to
- Deciding which record types are worth decoding. Records without a registry
  are skipped whole.
*/

mod data;
mod dialect;
mod encoding;
mod errors;
pub mod fields;
pub mod record;
pub mod records;
pub mod registry;
pub mod scanner;
pub mod schema;
mod strings;
pub mod subrecord;
mod tag;
pub(crate) mod util;

pub use self::dialect::Dialect;
pub use self::encoding::Windows1252Encoding;
pub use self::errors::*;
pub use self::fields::LocalizedString;
pub use self::strings::StringTable;
pub use self::subrecord::{SubRecordReader, SubRecordWriter};
pub use self::tag::Tag;
