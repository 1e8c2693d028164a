/// Characters for bytes `0x80..=0x9f`. The five bytes the code page leaves
/// undefined map to the matching C1 control character.
const HIGH_BLOCK: [char; 32] = [
    '€', '\u{81}', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', '\u{8d}', 'Ž', '\u{8f}',
    '\u{90}', '‘', '’', '“', '”', '•', '–', '—', '˜', '™', 'š', '›', 'œ', '\u{9d}', 'ž', 'Ÿ',
];

const fn build_table() -> [char; 256] {
    let mut table = ['\0'; 256];
    let mut byte = 0;
    while byte < 256 {
        table[byte] = if byte >= 0x80 && byte < 0xa0 {
            HIGH_BLOCK[byte - 0x80]
        } else {
            byte as u8 as char
        };
        byte += 1;
    }
    table
}

/// Every byte maps to exactly one character, so the table is reversible
pub(crate) static WINDOWS_1252: [char; 256] = build_table();

/// The byte that decodes to the given character, if any
#[inline]
pub(crate) fn windows_1252_byte(c: char) -> Option<u8> {
    let code = u32::from(c);
    if code < 0x80 || (0xa0..=0xff).contains(&code) {
        return Some(code as u8);
    }

    HIGH_BLOCK
        .iter()
        .position(|&x| x == c)
        .map(|i| (i + 0x80) as u8)
}
