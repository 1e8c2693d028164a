//! Sub-structures shared between record types.
//!
//! These delegate to the [`SubRecordReader`](crate::subrecord::SubRecordReader)
//! and [`SubRecordWriter`](crate::subrecord::SubRecordWriter) primitives and are
//! what record schemas are assembled from: opaque blobs, condition compounds,
//! localized strings, object bounds, keyword arrays, and magic effect blocks.

mod blob;
mod common;
mod condition;
mod localized;

pub use blob::Blob;
pub use common::{EffectBlock, Keywords, ObjectBounds};
pub use condition::{Condition, ExtraName};
pub use localized::LocalizedString;
