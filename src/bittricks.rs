//! Alignment arithmetic for buffer sizes and copies.

/// Rounds `value` up to the next multiple of `alignment`.
///
/// An `alignment` of 0 or 1 returns `value` unchanged.
pub fn round_up_to(value: u64, alignment: u64) -> u64 {
    if alignment <= 1 {
        return value;
    }
    value.div_ceil(alignment) * alignment
}

/// Backends reject buffer writes whose length is not a multiple of this.
pub const COPY_ALIGNMENT: usize = 4;

/// Length of `len` bytes padded out to [COPY_ALIGNMENT].
pub fn align_copy_len(len: usize) -> usize {
    len.next_multiple_of(COPY_ALIGNMENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_alignment() {
        assert_eq!(round_up_to(0, 64), 0);
        assert_eq!(round_up_to(1, 64), 64);
        assert_eq!(round_up_to(64, 64), 64);
        assert_eq!(round_up_to(65, 64), 128);
        assert_eq!(round_up_to(150, 64), 192);
    }

    #[test]
    fn degenerate_alignment() {
        assert_eq!(round_up_to(37, 0), 37);
        assert_eq!(round_up_to(37, 1), 37);
    }

    #[test]
    fn copy_len() {
        assert_eq!(align_copy_len(0), 0);
        assert_eq!(align_copy_len(6), 8);
        assert_eq!(align_copy_len(12), 12);
    }
}
