#[inline]
pub(crate) fn get_split<const N: usize>(data: &[u8]) -> Option<([u8; N], &[u8])> {
    data.split_first_chunk::<N>().map(|(head, rest)| (*head, rest))
}

#[inline]
pub(crate) fn le_u16(data: [u8; 2]) -> u16 {
    u16::from_le_bytes(data)
}

#[inline]
pub(crate) fn le_u32(data: [u8; 4]) -> u32 {
    u32::from_le_bytes(data)
}

/// Position of the first NUL byte, or the whole length when there is none
#[inline]
pub(crate) fn nul_position(data: &[u8]) -> usize {
    data.iter().position(|&x| x == 0).unwrap_or(data.len())
}
