use crate::Tag;
use std::fmt;

/// An error that can occur when decoding or encoding records
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Consume the error and return the specific type of error
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns the byte offset that the error occurs (if available)
    pub fn offset(&self) -> Option<usize> {
        self.0.offset()
    }

    pub(crate) fn truncated(offset: usize, needed: usize) -> Error {
        Error::new(ErrorKind::Truncated { offset, needed })
    }

    pub(crate) fn unexpected_tag(expected: Option<Tag>, found: Tag, offset: usize) -> Error {
        Error::new(ErrorKind::UnexpectedTag {
            expected,
            found,
            offset,
        })
    }

    pub(crate) fn invalid_length(tag: Tag, length: u32, offset: usize) -> Error {
        Error::new(ErrorKind::InvalidLength {
            tag,
            length,
            offset,
        })
    }

    pub(crate) fn out_of_range(tag: Tag, offset: usize) -> Error {
        Error::new(ErrorKind::OutOfRange { tag, offset })
    }

    pub(crate) fn missing_field(record: Tag, field: Tag) -> Error {
        Error::new(ErrorKind::MissingField { record, field })
    }

    pub(crate) fn malformed_header(tag: Tag, offset: usize, reason: &'static str) -> Error {
        Error::new(ErrorKind::MalformedHeader {
            tag,
            offset,
            reason,
        })
    }
}

/// Specific type of error
#[derive(Debug)]
pub enum ErrorKind {
    /// The input ended before a declared length could be satisfied
    Truncated { offset: usize, needed: usize },

    /// A tag appeared where a different tag was required. When `expected` is
    /// `None` the tag is simply not legal at this position.
    UnexpectedTag {
        expected: Option<Tag>,
        found: Tag,
        offset: usize,
    },

    /// A sub-record declared a length its schema does not allow
    InvalidLength { tag: Tag, length: u32, offset: usize },

    /// A variable length sub-record exceeded its cap
    LengthTooLarge {
        tag: Tag,
        length: u64,
        max: u64,
        offset: usize,
    },

    /// A non-repeatable sub-record appeared more than once
    DuplicateField {
        record: Tag,
        field: Tag,
        offset: usize,
    },

    /// A required sub-record never appeared
    MissingField { record: Tag, field: Tag },

    /// A numeric value fell outside its documented range
    OutOfRange { tag: Tag, offset: usize },

    /// Container level magic or size checks failed
    MalformedHeader {
        tag: Tag,
        offset: usize,
        reason: &'static str,
    },

    /// A compressed record could not be inflated to its declared size
    Compression { tag: Tag, offset: usize },

    /// A registry was handed a record without an identifier
    EmptyIdentifier { record: Tag },

    /// Text that has no windows-1252 representation
    Unencodable { tag: Tag },

    /// An error occurred when writing data
    Io(std::io::Error),
}

impl ErrorKind {
    pub fn offset(&self) -> Option<usize> {
        match *self {
            ErrorKind::Truncated { offset, .. } => Some(offset),
            ErrorKind::UnexpectedTag { offset, .. } => Some(offset),
            ErrorKind::InvalidLength { offset, .. } => Some(offset),
            ErrorKind::LengthTooLarge { offset, .. } => Some(offset),
            ErrorKind::DuplicateField { offset, .. } => Some(offset),
            ErrorKind::OutOfRange { offset, .. } => Some(offset),
            ErrorKind::MalformedHeader { offset, .. } => Some(offset),
            ErrorKind::Compression { offset, .. } => Some(offset),
            _ => None,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self.0 {
            ErrorKind::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Truncated { offset, needed } => write!(
                f,
                "unexpected end of data, needed {} more bytes (offset: {})",
                needed, offset
            ),
            ErrorKind::UnexpectedTag {
                expected: Some(expected),
                found,
                offset,
            } => write!(
                f,
                "expected {} but found {} (offset: {})",
                expected, found, offset
            ),
            ErrorKind::UnexpectedTag {
                expected: None,
                found,
                offset,
            } => write!(f, "unexpected sub-record {} (offset: {})", found, offset),
            ErrorKind::InvalidLength {
                tag,
                length,
                offset,
            } => write!(
                f,
                "sub-record {} has invalid length of {} bytes (offset: {})",
                tag, length, offset
            ),
            ErrorKind::LengthTooLarge {
                tag,
                length,
                max,
                offset,
            } => write!(
                f,
                "sub-record {} is {} bytes long, but at most {} are allowed (offset: {})",
                tag, length, max, offset
            ),
            ErrorKind::DuplicateField {
                record,
                field,
                offset,
            } => write!(
                f,
                "{} has more than one {} sub-record (offset: {})",
                record, field, offset
            ),
            ErrorKind::MissingField { record, field } => {
                write!(f, "{} is missing required sub-record {}", record, field)
            }
            ErrorKind::OutOfRange { tag, offset } => write!(
                f,
                "sub-record {} holds a value out of range (offset: {})",
                tag, offset
            ),
            ErrorKind::MalformedHeader {
                tag,
                offset,
                reason,
            } => write!(f, "malformed {} header: {} (offset: {})", tag, reason, offset),
            ErrorKind::Compression { tag, offset } => write!(
                f,
                "unable to decompress {} record (offset: {})",
                tag, offset
            ),
            ErrorKind::EmptyIdentifier { record } => {
                write!(f, "{} record has an empty identifier", record)
            }
            ErrorKind::Unencodable { tag } => write!(
                f,
                "text in sub-record {} is not representable as windows-1252",
                tag
            ),
            ErrorKind::Io(ref err) => write!(f, "io error: {}", err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::new(ErrorKind::Io(error))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_size() {
        assert_eq!(std::mem::size_of::<Error>(), std::mem::size_of::<usize>());
    }

    #[test]
    fn test_error_display() {
        let err = Error::invalid_length(Tag::OBND, 11, 34);
        assert_eq!(
            err.to_string(),
            "sub-record OBND has invalid length of 11 bytes (offset: 34)"
        );
        assert_eq!(err.offset(), Some(34));

        let err = Error::missing_field(Tag::MISC, Tag::DATA);
        assert_eq!(err.to_string(), "MISC is missing required sub-record DATA");
        assert_eq!(err.offset(), None);
    }
}
