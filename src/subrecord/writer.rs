use crate::{
    encoding::encode_windows1252,
    errors::{Error, ErrorKind},
    Dialect, Tag,
};
use std::{borrow::Cow, io::Write};

/// Writes tags, lengths, and values in a dialect's wire format
///
/// The writer remembers how many bytes it has emitted so that errors can
/// point at the offending sub-record within the output.
#[derive(Debug)]
pub struct SubRecordWriter<W> {
    writer: W,
    dialect: Dialect,
    written: usize,
}

impl<W: Write> SubRecordWriter<W> {
    pub fn new(writer: W, dialect: Dialect) -> Self {
        SubRecordWriter {
            writer,
            dialect,
            written: 0,
        }
    }

    #[inline]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Number of bytes written so far
    #[inline]
    pub fn position(&self) -> usize {
        self.written
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    #[inline]
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), Error> {
        self.writer.write_all(data)?;
        self.written += data.len();
        Ok(())
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) -> Result<(), Error> {
        self.write_bytes(&[value])
    }

    #[inline]
    pub fn write_u16(&mut self, value: u16) -> Result<(), Error> {
        self.write_bytes(&value.to_le_bytes())
    }

    #[inline]
    pub fn write_i16(&mut self, value: i16) -> Result<(), Error> {
        self.write_bytes(&value.to_le_bytes())
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) -> Result<(), Error> {
        self.write_bytes(&value.to_le_bytes())
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) -> Result<(), Error> {
        self.write_bytes(&value.to_le_bytes())
    }

    #[inline]
    pub fn write_u64(&mut self, value: u64) -> Result<(), Error> {
        self.write_bytes(&value.to_le_bytes())
    }

    #[inline]
    pub fn write_f32(&mut self, value: f32) -> Result<(), Error> {
        self.write_bytes(&value.to_le_bytes())
    }

    #[inline]
    pub fn write_tag(&mut self, tag: Tag) -> Result<(), Error> {
        self.write_bytes(tag.as_bytes())
    }

    /// Write a value length, failing when the dialect's length field can't
    /// hold it
    pub fn write_length(&mut self, tag: Tag, len: usize) -> Result<(), Error> {
        let max = self.dialect.max_length();
        if len as u64 > u64::from(max) {
            return Err(Error::new(ErrorKind::LengthTooLarge {
                tag,
                length: len as u64,
                max: u64::from(max),
                offset: self.written,
            }));
        }

        match self.dialect {
            Dialect::Tes3 => self.write_u32(len as u32),
            Dialect::Tes4 => self.write_u16(len as u16),
        }
    }

    /// Write a tag and length, leaving the value to the caller
    pub fn write_field_header(&mut self, tag: Tag, len: usize) -> Result<(), Error> {
        self.write_tag(tag)?;
        self.write_length(tag, len)
    }

    /// Write a complete sub-record: tag, length, and value
    pub fn write_value(&mut self, tag: Tag, value: &[u8]) -> Result<(), Error> {
        self.write_field_header(tag, value.len())?;
        self.write_bytes(value)
    }

    pub fn write_u16_value(&mut self, tag: Tag, value: u16) -> Result<(), Error> {
        self.write_value(tag, &value.to_le_bytes())
    }

    pub fn write_u32_value(&mut self, tag: Tag, value: u32) -> Result<(), Error> {
        self.write_value(tag, &value.to_le_bytes())
    }

    pub fn write_i32_value(&mut self, tag: Tag, value: i32) -> Result<(), Error> {
        self.write_value(tag, &value.to_le_bytes())
    }

    pub fn write_f32_value(&mut self, tag: Tag, value: f32) -> Result<(), Error> {
        self.write_value(tag, &value.to_le_bytes())
    }

    pub fn write_u64_value(&mut self, tag: Tag, value: u64) -> Result<(), Error> {
        self.write_value(tag, &value.to_le_bytes())
    }

    /// Write text as windows-1252 followed by a NUL terminator
    pub fn write_string(&mut self, tag: Tag, text: &str) -> Result<(), Error> {
        self.write_text(tag, text, true)
    }

    /// Write text as windows-1252 without a terminator
    pub fn write_unterminated_string(&mut self, tag: Tag, text: &str) -> Result<(), Error> {
        self.write_text(tag, text, false)
    }

    pub fn write_text(&mut self, tag: Tag, text: &str, terminated: bool) -> Result<(), Error> {
        let bytes = encode_text(tag, text)?;
        self.write_field_header(tag, bytes.len() + usize::from(terminated))?;
        self.write_bytes(&bytes)?;
        if terminated {
            self.write_u8(0)?;
        }
        Ok(())
    }
}

fn encode_text(tag: Tag, text: &str) -> Result<Cow<'_, [u8]>, Error> {
    encode_windows1252(text).ok_or_else(|| Error::new(ErrorKind::Unencodable { tag }))
}

/// A sink that only counts the bytes written to it
///
/// ```
/// use std::io::Write;
/// use tesfile::subrecord::SizeCounter;
///
/// let mut counter = SizeCounter::new();
/// counter.write_all(b"EDID\x08\0Gold001\0")?;
/// assert_eq!(counter.count(), 14);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct SizeCounter {
    count: usize,
}

impl SizeCounter {
    pub fn new() -> Self {
        SizeCounter::default()
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl Write for SizeCounter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.count += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
