use std::fmt;

/// A four character code that names a record or sub-record kind
///
/// Tags compare by exact byte equality and are displayed as their four
/// characters.
///
/// ```
/// use tesfile::Tag;
///
/// let tag = Tag::new(b"MISC");
/// assert_eq!(tag, Tag::MISC);
/// assert_eq!(tag.to_string(), "MISC");
/// assert_eq!(Tag::from_u32(0x4353_494d), Tag::MISC);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    // container level
    pub const TES3: Tag = Tag::new(b"TES3");
    pub const TES4: Tag = Tag::new(b"TES4");
    pub const GRUP: Tag = Tag::new(b"GRUP");

    // record types
    pub const ALCH: Tag = Tag::new(b"ALCH");
    pub const AMMO: Tag = Tag::new(b"AMMO");
    pub const APPA: Tag = Tag::new(b"APPA");
    pub const BOOK: Tag = Tag::new(b"BOOK");
    pub const CAMS: Tag = Tag::new(b"CAMS");
    pub const ENCH: Tag = Tag::new(b"ENCH");
    pub const FACT: Tag = Tag::new(b"FACT");
    pub const FLOR: Tag = Tag::new(b"FLOR");
    pub const GLOB: Tag = Tag::new(b"GLOB");
    pub const GMST: Tag = Tag::new(b"GMST");
    pub const INGR: Tag = Tag::new(b"INGR");
    pub const KEYM: Tag = Tag::new(b"KEYM");
    pub const MGEF: Tag = Tag::new(b"MGEF");
    pub const MISC: Tag = Tag::new(b"MISC");
    pub const PROB: Tag = Tag::new(b"PROB");
    pub const REPA: Tag = Tag::new(b"REPA");
    pub const SCRL: Tag = Tag::new(b"SCRL");
    pub const SLGM: Tag = Tag::new(b"SLGM");
    pub const SPEL: Tag = Tag::new(b"SPEL");
    pub const WEAP: Tag = Tag::new(b"WEAP");

    // sub-records shared by both dialects
    pub const CNAM: Tag = Tag::new(b"CNAM");
    pub const DATA: Tag = Tag::new(b"DATA");
    pub const DESC: Tag = Tag::new(b"DESC");
    pub const FNAM: Tag = Tag::new(b"FNAM");
    pub const HEDR: Tag = Tag::new(b"HEDR");
    pub const INAM: Tag = Tag::new(b"INAM");
    pub const MAST: Tag = Tag::new(b"MAST");
    pub const MODL: Tag = Tag::new(b"MODL");
    pub const SNAM: Tag = Tag::new(b"SNAM");

    // newer dialect sub-records
    pub const BAMT: Tag = Tag::new(b"BAMT");
    pub const BIDS: Tag = Tag::new(b"BIDS");
    pub const CIS1: Tag = Tag::new(b"CIS1");
    pub const CIS2: Tag = Tag::new(b"CIS2");
    pub const CITC: Tag = Tag::new(b"CITC");
    pub const CRDT: Tag = Tag::new(b"CRDT");
    pub const CRGR: Tag = Tag::new(b"CRGR");
    pub const CRVA: Tag = Tag::new(b"CRVA");
    pub const CTDA: Tag = Tag::new(b"CTDA");
    pub const DNAM: Tag = Tag::new(b"DNAM");
    pub const EAMT: Tag = Tag::new(b"EAMT");
    pub const EDID: Tag = Tag::new(b"EDID");
    pub const EFID: Tag = Tag::new(b"EFID");
    pub const EFIT: Tag = Tag::new(b"EFIT");
    pub const EITM: Tag = Tag::new(b"EITM");
    pub const ENIT: Tag = Tag::new(b"ENIT");
    pub const ETYP: Tag = Tag::new(b"ETYP");
    pub const FULL: Tag = Tag::new(b"FULL");
    pub const ICON: Tag = Tag::new(b"ICON");
    pub const INCC: Tag = Tag::new(b"INCC");
    pub const INTV: Tag = Tag::new(b"INTV");
    pub const JAIL: Tag = Tag::new(b"JAIL");
    pub const JOUT: Tag = Tag::new(b"JOUT");
    pub const KSIZ: Tag = Tag::new(b"KSIZ");
    pub const KWDA: Tag = Tag::new(b"KWDA");
    pub const MDOB: Tag = Tag::new(b"MDOB");
    pub const MNAM: Tag = Tag::new(b"MNAM");
    pub const MODS: Tag = Tag::new(b"MODS");
    pub const MODT: Tag = Tag::new(b"MODT");
    pub const NAM0: Tag = Tag::new(b"NAM0");
    pub const NAM7: Tag = Tag::new(b"NAM7");
    pub const NAM8: Tag = Tag::new(b"NAM8");
    pub const NAM9: Tag = Tag::new(b"NAM9");
    pub const NNAM: Tag = Tag::new(b"NNAM");
    pub const OBND: Tag = Tag::new(b"OBND");
    pub const ONAM: Tag = Tag::new(b"ONAM");
    pub const PFIG: Tag = Tag::new(b"PFIG");
    pub const PFPC: Tag = Tag::new(b"PFPC");
    pub const PLCN: Tag = Tag::new(b"PLCN");
    pub const PLVD: Tag = Tag::new(b"PLVD");
    pub const PNAM: Tag = Tag::new(b"PNAM");
    pub const QUAL: Tag = Tag::new(b"QUAL");
    pub const RNAM: Tag = Tag::new(b"RNAM");
    pub const SLCP: Tag = Tag::new(b"SLCP");
    pub const SNDD: Tag = Tag::new(b"SNDD");
    pub const SOUL: Tag = Tag::new(b"SOUL");
    pub const SPIT: Tag = Tag::new(b"SPIT");
    pub const STOL: Tag = Tag::new(b"STOL");
    pub const TNAM: Tag = Tag::new(b"TNAM");
    pub const UNAM: Tag = Tag::new(b"UNAM");
    pub const VENC: Tag = Tag::new(b"VENC");
    pub const VEND: Tag = Tag::new(b"VEND");
    pub const VENV: Tag = Tag::new(b"VENV");
    pub const VMAD: Tag = Tag::new(b"VMAD");
    pub const VNAM: Tag = Tag::new(b"VNAM");
    pub const WAIT: Tag = Tag::new(b"WAIT");
    pub const WNAM: Tag = Tag::new(b"WNAM");
    pub const XNAM: Tag = Tag::new(b"XNAM");
    pub const YNAM: Tag = Tag::new(b"YNAM");
    pub const ZNAM: Tag = Tag::new(b"ZNAM");

    // legacy dialect sub-records
    pub const AADT: Tag = Tag::new(b"AADT");
    pub const ASND: Tag = Tag::new(b"ASND");
    pub const AVFX: Tag = Tag::new(b"AVFX");
    pub const BSND: Tag = Tag::new(b"BSND");
    pub const BVFX: Tag = Tag::new(b"BVFX");
    pub const CSND: Tag = Tag::new(b"CSND");
    pub const CVFX: Tag = Tag::new(b"CVFX");
    pub const ENAM: Tag = Tag::new(b"ENAM");
    pub const ENDT: Tag = Tag::new(b"ENDT");
    pub const FLTV: Tag = Tag::new(b"FLTV");
    pub const HSND: Tag = Tag::new(b"HSND");
    pub const HVFX: Tag = Tag::new(b"HVFX");
    pub const INDX: Tag = Tag::new(b"INDX");
    pub const IRDT: Tag = Tag::new(b"IRDT");
    pub const ITEX: Tag = Tag::new(b"ITEX");
    pub const MCDT: Tag = Tag::new(b"MCDT");
    pub const MEDT: Tag = Tag::new(b"MEDT");
    pub const NAME: Tag = Tag::new(b"NAME");
    pub const PBDT: Tag = Tag::new(b"PBDT");
    pub const PTEX: Tag = Tag::new(b"PTEX");
    pub const RIDT: Tag = Tag::new(b"RIDT");
    pub const SCRI: Tag = Tag::new(b"SCRI");
    pub const SPDT: Tag = Tag::new(b"SPDT");
    pub const STRV: Tag = Tag::new(b"STRV");

    /// Creates a tag from its four character code
    #[inline]
    pub const fn new(code: &[u8; 4]) -> Self {
        Tag(*code)
    }

    /// Creates a tag from its little endian integer form
    #[inline]
    pub const fn from_u32(value: u32) -> Self {
        Tag(value.to_le_bytes())
    }

    /// Returns the little endian integer form of the tag
    #[inline]
    pub const fn to_u32(self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    /// Returns the raw bytes of the tag
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<[u8; 4]> for Tag {
    fn from(code: [u8; 4]) -> Self {
        Tag(code)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Tag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(Tag::EDID, "EDID")]
    #[case(Tag::NAM7, "NAM7")]
    #[case(Tag::new(b"NPC_"), "NPC_")]
    #[case(Tag::new(b"\0\x01AB"), "\\x00\\x01AB")]
    fn test_tag_display(#[case] tag: Tag, #[case] expected: &str) {
        assert_eq!(tag.to_string(), expected);
    }

    #[test]
    fn test_tag_integer_form() {
        assert_eq!(Tag::TES4.to_u32(), u32::from_le_bytes(*b"TES4"));
        assert_eq!(Tag::from_u32(Tag::GRUP.to_u32()), Tag::GRUP);
    }
}
