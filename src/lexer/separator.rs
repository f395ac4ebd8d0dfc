//! Packed separator encoding shared by the byte-indexer lexer.
//!
//! Grounded on the teacher's `src/simd/scanner.rs`, which packed a
//! `memchr`-found offset and a separator-type tag into one `u32` so the
//! index pass could hand the assembly pass a flat `Vec<u32>` instead of a
//! `Vec<enum>`. The low 2 bits hold the type, the rest holds the offset;
//! that caps a single chunk at `2^30` bytes between flushes, far above
//! `max_buffer_size`'s default.

pub const SEP_FIELD_DELIMITER: u32 = 0;
pub const SEP_RECORD_LF: u32 = 1;
pub const SEP_RECORD_CRLF: u32 = 2;
pub const SEP_QUOTE: u32 = 3;

const TYPE_BITS: u32 = 2;
const TYPE_MASK: u32 = (1 << TYPE_BITS) - 1;

/// Packs a byte offset and separator type into one `u32`.
///
/// Panics if `offset` does not fit in the remaining bits; callers are
/// expected to flush well before a chunk grows that large.
pub fn pack_separator(offset: usize, kind: u32) -> u32 {
    debug_assert!(kind <= TYPE_MASK);
    let offset = u32::try_from(offset).expect("chunk offset exceeds u32 range");
    assert!(
        offset <= (u32::MAX >> TYPE_BITS),
        "chunk offset {offset} too large to pack"
    );
    (offset << TYPE_BITS) | kind
}

pub fn unpack_offset(packed: u32) -> usize {
    (packed >> TYPE_BITS) as usize
}

pub fn unpack_type(packed: u32) -> u32 {
    packed & TYPE_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_offset_and_type() {
        for offset in [0usize, 1, 255, 65536, 10_000_000] {
            for kind in [SEP_FIELD_DELIMITER, SEP_RECORD_LF, SEP_RECORD_CRLF, SEP_QUOTE] {
                let packed = pack_separator(offset, kind);
                assert_eq!(unpack_offset(packed), offset);
                assert_eq!(unpack_type(packed), kind);
            }
        }
    }
}
