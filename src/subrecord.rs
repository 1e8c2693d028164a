//! Primitive tag, length and value I/O shared by every record type.
//!
//! A sub-record is a 4 byte tag, a length (2 or 4 bytes depending on the
//! [`Dialect`](crate::Dialect)), and exactly that many bytes of value. The
//! [`SubRecordReader`] consumes these from a byte slice and never reads past
//! it: running out of data is always reported as
//! [`ErrorKind::Truncated`](crate::ErrorKind::Truncated). The
//! [`SubRecordWriter`] is its exact inverse.
//!
//! ```
//! use tesfile::{Dialect, Tag, subrecord::{SubRecordReader, SubRecordWriter}};
//!
//! let data = b"EDID\x08\0Gold001\0";
//! let mut reader = SubRecordReader::new(&data[..], Dialect::Tes4);
//! assert_eq!(reader.read_tag()?, Tag::EDID);
//! let id = reader.read_string(Tag::EDID, 512)?;
//! assert_eq!(id, "Gold001");
//! assert!(reader.is_empty());
//!
//! let mut out = Vec::new();
//! SubRecordWriter::new(&mut out, Dialect::Tes4).write_string(Tag::EDID, &id)?;
//! assert_eq!(&out[..], &data[..]);
//! # Ok::<(), tesfile::Error>(())
//! ```

mod reader;
mod writer;

pub use reader::*;
pub use writer::*;

/// Cap for the editor ids and paths in newer dialect records
pub const MAX_STRING: u32 = 512;

/// Cap for record ids and names in legacy dialect records
pub const MAX_LEGACY_STRING: u32 = 256;

/// Cap for long descriptive text such as book contents
pub const MAX_TEXT: u32 = u16::MAX as u32;
