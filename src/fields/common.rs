use super::condition::{Condition, ExtraName};
use crate::{
    errors::Error,
    subrecord::{SubRecordReader, SubRecordWriter},
    Tag,
};
use std::io::Write;

/// The `OBND` bounding box of a placeable object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ObjectBounds {
    pub x1: i16,
    pub y1: i16,
    pub z1: i16,
    pub x2: i16,
    pub y2: i16,
    pub z2: i16,
}

impl ObjectBounds {
    pub fn read(reader: &mut SubRecordReader) -> Result<Self, Error> {
        let data = reader.read_fixed::<12>(Tag::OBND)?;
        let at = |i: usize| i16::from_le_bytes([data[i], data[i + 1]]);
        Ok(ObjectBounds {
            x1: at(0),
            y1: at(2),
            z1: at(4),
            x2: at(6),
            y2: at(8),
            z2: at(10),
        })
    }

    pub fn write<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        let mut data = [0u8; 12];
        let values = [self.x1, self.y1, self.z1, self.x2, self.y2, self.z2];
        for (chunk, value) in data.chunks_exact_mut(2).zip(values) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        writer.write_value(Tag::OBND, &data)
    }
}

/// Keyword form ids stored as a `KSIZ` count followed by a `KWDA` array
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Keywords(pub Vec<u32>);

impl Keywords {
    /// Decode after the `KSIZ` tag has been consumed. The `KWDA` sub-record
    /// must follow immediately.
    pub fn read(reader: &mut SubRecordReader) -> Result<Self, Error> {
        let offset = reader.position();
        let count = reader.read_u32_value(Tag::KSIZ)?;
        if count == 0 {
            return Err(Error::out_of_range(Tag::KSIZ, offset));
        }

        reader.expect_tag(Tag::KWDA)?;
        let offset = reader.position();
        let len = reader.read_length()?;
        if u64::from(len) != u64::from(count) * 4 {
            return Err(Error::invalid_length(Tag::KWDA, len, offset));
        }

        let keywords = (0..count)
            .map(|_| reader.read_u32())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Keywords(keywords))
    }

    /// Writes nothing when there are no keywords
    pub fn write<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        if self.0.is_empty() {
            return Ok(());
        }

        writer.write_u32_value(Tag::KSIZ, self.0.len() as u32)?;
        writer.write_tag(Tag::KWDA)?;
        writer.write_length(Tag::KWDA, self.0.len() * 4)?;
        for keyword in &self.0 {
            writer.write_u32(*keyword)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One magic effect of a spell or potion: `EFID`, `EFIT`, and any conditions
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EffectBlock {
    pub effect_id: u32,
    pub magnitude: f32,
    pub area: u32,
    pub duration: u32,
    pub conditions: Vec<Condition>,
}

impl EffectBlock {
    /// Decode after the `EFID` tag has been consumed
    pub fn read(reader: &mut SubRecordReader) -> Result<Self, Error> {
        let effect_id = reader.read_form_id(Tag::EFID)?;
        reader.expect_tag(Tag::EFIT)?;
        let data = reader.read_fixed::<12>(Tag::EFIT)?;

        let mut conditions = Vec::new();
        while reader.peek_tag() == Some(Tag::CTDA) {
            reader.read_tag()?;
            conditions.push(Condition::read(reader, ExtraName::Cis2)?);
        }

        Ok(EffectBlock {
            effect_id,
            magnitude: f32::from_le_bytes([data[0], data[1], data[2], data[3]]),
            area: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
            duration: u32::from_le_bytes([data[8], data[9], data[10], data[11]]),
            conditions,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut SubRecordWriter<W>) -> Result<(), Error> {
        writer.write_u32_value(Tag::EFID, self.effect_id)?;
        let mut data = [0u8; 12];
        data[..4].copy_from_slice(&self.magnitude.to_le_bytes());
        data[4..8].copy_from_slice(&self.area.to_le_bytes());
        data[8..].copy_from_slice(&self.duration.to_le_bytes());
        writer.write_value(Tag::EFIT, &data)?;
        for condition in &self.conditions {
            condition.write(ExtraName::Cis2, writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dialect, ErrorKind};
    use rstest::*;

    fn reader(data: &[u8]) -> SubRecordReader<'_> {
        SubRecordReader::new(data, Dialect::Tes4)
    }

    fn written(f: impl FnOnce(&mut SubRecordWriter<&mut Vec<u8>>) -> Result<(), Error>) -> Vec<u8> {
        let mut out = Vec::new();
        f(&mut SubRecordWriter::new(&mut out, Dialect::Tes4)).unwrap();
        out
    }

    #[test]
    fn test_object_bounds() {
        let data = b"OBND\x0C\0\xFE\xFF\xFE\xFF\0\0\x02\0\x02\0\0\0";
        let mut r = reader(data);
        r.expect_tag(Tag::OBND).unwrap();
        let bounds = ObjectBounds::read(&mut r).unwrap();
        assert_eq!(bounds.x1, -2);
        assert_eq!(bounds.y1, -2);
        assert_eq!(bounds.z1, 0);
        assert_eq!(bounds.x2, 2);
        assert_eq!(bounds.y2, 2);
        assert_eq!(bounds.z2, 0);
        assert_eq!(written(|w| bounds.write(w)).as_slice(), &data[..]);
    }

    #[test]
    fn test_keywords() {
        let data = b"KSIZ\x04\0\x02\0\0\0KWDA\x08\0\xE9\x14\x09\0\x0A\0\0\0";
        let mut r = reader(data);
        r.expect_tag(Tag::KSIZ).unwrap();
        let keywords = Keywords::read(&mut r).unwrap();
        assert_eq!(keywords.0, vec![0x0009_14E9, 0x0A]);
        assert!(r.is_empty());
        assert_eq!(written(|w| keywords.write(w)).as_slice(), &data[..]);
        assert!(written(|w| Keywords::default().write(w)).is_empty());
    }

    #[rstest]
    #[case(&b"\x04\0\0\0\0\0KWDA\0\0"[..])]
    #[case(&b"\x04\0\x01\0\0\0KWDA\x08\0\0\0\0\0\0\0\0\0"[..])]
    #[case(&b"\x04\0\x01\0\0\0EDID\x04\0\0\0\0\0"[..])]
    fn test_keywords_malformed(#[case] data: &[u8]) {
        assert!(Keywords::read(&mut reader(data)).is_err());
    }

    #[test]
    fn test_keyword_count_mismatch() {
        let mut r = reader(b"\x04\0\x02\0\0\0KWDA\x04\0\x01\0\0\0");
        let err = Keywords::read(&mut r).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidLength {
                tag: Tag::KWDA,
                length: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_effect_block() {
        let data = b"EFID\x04\0\xA9\x3C\x01\0EFIT\x0C\0\0\0\0\x41\0\0\0\0\x01\0\0\0EFID";
        let mut r = reader(data);
        r.expect_tag(Tag::EFID).unwrap();
        let effect = EffectBlock::read(&mut r).unwrap();
        assert_eq!(effect.effect_id, 0x0001_3CA9);
        assert_eq!(effect.magnitude, 8.0);
        assert_eq!(effect.area, 0);
        assert_eq!(effect.duration, 1);
        assert!(effect.conditions.is_empty());
        assert_eq!(r.peek_tag(), Some(Tag::EFID));
        assert_eq!(written(|w| effect.write(w)).as_slice(), &data[..data.len() - 4]);
    }

    #[test]
    fn test_effect_block_with_conditions() {
        let mut data = b"EFID\x04\0\x2F\x39\x0F\0EFIT\x0C\0\0\0\xC6\x42\0\0\0\0\x0F\0\0\0".to_vec();
        data.extend_from_slice(b"CTDA\x20\0");
        data.extend_from_slice(&[7u8; 32]);
        data.extend_from_slice(b"CIS2\x04\0abc\0CTDA\x20\0");
        data.extend_from_slice(&[8u8; 32]);

        let mut r = reader(&data);
        r.expect_tag(Tag::EFID).unwrap();
        let effect = EffectBlock::read(&mut r).unwrap();
        assert_eq!(effect.magnitude, 99.0);
        assert_eq!(effect.duration, 15);
        assert_eq!(effect.conditions.len(), 2);
        assert_eq!(effect.conditions[0].name.as_deref(), Some("abc"));
        assert_eq!(effect.conditions[1].data, [8u8; 32]);
        assert!(r.is_empty());
        assert_eq!(written(|w| effect.write(w)), data);
    }

    #[test]
    fn test_effect_requires_efit() {
        let mut r = reader(b"\x04\0\x01\0\0\0CTDA");
        let err = EffectBlock::read(&mut r).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnexpectedTag {
                expected: Some(Tag::EFIT),
                ..
            }
        ));
    }
}
