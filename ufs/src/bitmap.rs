//! Allocation bitmaps are stored LSB-first: bit `i` lives in byte `i / 8` at position `i % 8`.
//! A set bit means the inode or data block with that index is allocated.

/// Returns whether the bit at `index` is set.
pub fn get_bit(bitmap: &[u8], index: usize) -> bool {
    let (byte, bit) = (index / 8, index % 8);

    return (bitmap[byte] >> bit) & 1 == 1;
}

pub fn set_bit(bitmap: &mut [u8], index: usize) {
    let (byte, bit) = (index / 8, index % 8);

    bitmap[byte] |= 1 << bit;
}

pub fn clear_bit(bitmap: &mut [u8], index: usize) {
    let (byte, bit) = (index / 8, index % 8);

    bitmap[byte] &= !(1 << bit);
}

/// Counts the clear bits among the first `total_bits` bits.
pub fn count_available(bitmap: &[u8], total_bits: usize) -> usize {
    let total_bits = total_bits.min(bitmap.len() * 8);
    let full_bytes = total_bits / 8;

    let mut sum: usize = bitmap[..full_bytes]
        .iter()
        .map(|b| b.count_zeros() as usize)
        .sum();

    for i in full_bytes * 8..total_bits {
        if !get_bit(bitmap, i) {
            sum += 1;
        }
    }

    return sum;
}

/// Find the lowest clear bit below `total_bits`.
pub fn first_available(bitmap: &[u8], total_bits: usize) -> Option<usize> {
    let total_bits = total_bits.min(bitmap.len() * 8);

    for (i, byte) in bitmap.iter().enumerate() {
        if *byte == u8::MAX {
            continue;
        }

        let index = i * 8 + byte.trailing_ones() as usize;
        if index >= total_bits {
            return None;
        }

        return Some(index);
    }

    return None;
}
