use crate::{ByteSerializable, BLOCK_SIZE};
use byteorder::{ByteOrder, LittleEndian};

/// Describes where every region of the image lives. Addresses are block numbers, lengths are
/// block counts. Encoded as ten little-endian `i32`s in declaration order (40 bytes).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct SuperBlock {
    pub inode_bitmap_addr: i32,
    pub inode_bitmap_len: i32,
    pub data_bitmap_addr: i32,
    pub data_bitmap_len: i32,
    pub inode_region_addr: i32,
    pub inode_region_len: i32,
    pub data_region_addr: i32,
    pub data_region_len: i32,
    pub num_inodes: i32,
    pub num_data: i32,
}

impl SuperBlock {
    /// Lays out an image holding `num_inodes` inodes and `num_data` data blocks, with the inode
    /// bitmap immediately after the super block and every other region packed behind it.
    pub fn with_capacity(num_inodes: u32, num_data: u32) -> Self {
        let bits_per_block = (BLOCK_SIZE * 8) as u32;
        let inodes_per_block = (BLOCK_SIZE / crate::Inode::size()) as u32;

        let inode_bitmap_len = ceil_div(num_inodes, bits_per_block);
        let data_bitmap_len = ceil_div(num_data, bits_per_block);
        let inode_region_len = ceil_div(num_inodes, inodes_per_block);

        let inode_bitmap_addr = 1;
        let data_bitmap_addr = inode_bitmap_addr + inode_bitmap_len;
        let inode_region_addr = data_bitmap_addr + data_bitmap_len;
        let data_region_addr = inode_region_addr + inode_region_len;

        return Self {
            inode_bitmap_addr: inode_bitmap_addr as i32,
            inode_bitmap_len: inode_bitmap_len as i32,
            data_bitmap_addr: data_bitmap_addr as i32,
            data_bitmap_len: data_bitmap_len as i32,
            inode_region_addr: inode_region_addr as i32,
            inode_region_len: inode_region_len as i32,
            data_region_addr: data_region_addr as i32,
            data_region_len: num_data as i32,
            num_inodes: num_inodes as i32,
            num_data: num_data as i32,
        };
    }

    /// The number of blocks an image with this layout occupies.
    pub fn total_blocks(&self) -> u32 {
        let end = self.data_region_addr as i64 + self.data_region_len as i64;

        return end.max(0).min(u32::MAX as i64) as u32;
    }

    /// Checks the regions are ordered, non-overlapping and large enough for the counts they
    /// claim to hold.
    pub fn is_consistent(&self) -> bool {
        let bits_per_block = (BLOCK_SIZE * 8) as i64;
        let inodes_per_block = (BLOCK_SIZE / crate::Inode::size()) as i64;

        let fields = [
            self.inode_bitmap_addr,
            self.inode_bitmap_len,
            self.data_bitmap_addr,
            self.data_bitmap_len,
            self.inode_region_addr,
            self.inode_region_len,
            self.data_region_addr,
            self.data_region_len,
            self.num_inodes,
            self.num_data,
        ];

        if fields.iter().any(|f| *f < 0) || self.num_inodes == 0 || self.inode_bitmap_addr < 1 {
            return false;
        }

        let regions = [
            (self.inode_bitmap_addr, self.inode_bitmap_len),
            (self.data_bitmap_addr, self.data_bitmap_len),
            (self.inode_region_addr, self.inode_region_len),
            (self.data_region_addr, self.data_region_len),
        ];

        for pair in regions.windows(2) {
            let (addr, len) = pair[0];
            if (addr as i64) + (len as i64) > pair[1].0 as i64 {
                return false;
            }
        }

        return (self.inode_bitmap_len as i64) * bits_per_block >= self.num_inodes as i64
            && (self.data_bitmap_len as i64) * bits_per_block >= self.num_data as i64
            && (self.inode_region_len as i64) * inodes_per_block >= self.num_inodes as i64
            && self.data_region_len >= self.num_data;
    }
}

fn ceil_div(n: u32, d: u32) -> u32 {
    return n / d + (n % d != 0) as u32;
}

impl ByteSerializable for SuperBlock {
    type BytesArrayType = [u8; 40];

    fn to_bytes(&self) -> Self::BytesArrayType {
        let mut bytes = [0u8; 40];

        let fields = [
            self.inode_bitmap_addr,
            self.inode_bitmap_len,
            self.data_bitmap_addr,
            self.data_bitmap_len,
            self.inode_region_addr,
            self.inode_region_len,
            self.data_region_addr,
            self.data_region_len,
            self.num_inodes,
            self.num_data,
        ];

        LittleEndian::write_i32_into(&fields, &mut bytes);

        return bytes;
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self>
    where
        Self: std::marker::Sized,
    {
        if bytes.len() < Self::size() {
            return None;
        }

        let mut fields = [0i32; 10];
        LittleEndian::read_i32_into(&bytes[..Self::size()], &mut fields);

        return Some(Self {
            inode_bitmap_addr: fields[0],
            inode_bitmap_len: fields[1],
            data_bitmap_addr: fields[2],
            data_bitmap_len: fields[3],
            inode_region_addr: fields[4],
            inode_region_len: fields[5],
            data_region_addr: fields[6],
            data_region_len: fields[7],
            num_inodes: fields[8],
            num_data: fields[9],
        });
    }

    fn generic_bytes_rep(bytes: &Self::BytesArrayType) -> &[u8] {
        return bytes;
    }

    fn size() -> usize {
        return 40;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_new() {
        let block = SuperBlock::with_capacity(32, 32);

        assert_eq!(
            block,
            SuperBlock {
                inode_bitmap_addr: 1,
                inode_bitmap_len: 1,
                data_bitmap_addr: 2,
                data_bitmap_len: 1,
                inode_region_addr: 3,
                inode_region_len: 1,
                data_region_addr: 4,
                data_region_len: 32,
                num_inodes: 32,
                num_data: 32,
            }
        );

        assert_eq!(block.total_blocks(), 36);
        assert!(block.is_consistent());
    }

    #[test]
    fn create_new_multi_block_regions() {
        let block = SuperBlock::with_capacity(40_000, 100);

        assert_eq!(block.inode_bitmap_len, 2);
        assert_eq!(block.data_bitmap_addr, 3);
        assert_eq!(block.inode_region_addr, 4);
        assert_eq!(block.inode_region_len, 1250);
        assert_eq!(block.data_region_addr, 1254);
        assert!(block.is_consistent());
    }

    #[test]
    fn test_to_bytes() {
        let block = SuperBlock::with_capacity(32, 32);

        let bytes = {
            let mut res = [0u8; 40];

            res[0] = 1; // inode_bitmap_addr
            res[4] = 1; // inode_bitmap_len
            res[8] = 2; // data_bitmap_addr
            res[12] = 1; // data_bitmap_len
            res[16] = 3; // inode_region_addr
            res[20] = 1; // inode_region_len
            res[24] = 4; // data_region_addr
            res[28] = 32; // data_region_len
            res[32] = 32; // num_inodes
            res[36] = 32; // num_data

            res
        };

        assert_eq!(block.to_bytes().to_vec(), bytes.to_vec());
        assert_eq!(SuperBlock::from_bytes(&bytes).unwrap(), block);
    }

    #[test]
    fn test_from_short_buffer() {
        assert!(SuperBlock::from_bytes(&[0u8; 39]).is_none());
    }

    #[test]
    fn test_large_counts() {
        let block = SuperBlock::with_capacity(1, i32::MAX as u32);

        assert_eq!(block.data_bitmap_len, 65536);
        assert_eq!(block.data_region_addr, 65539);
        assert!(block.num_data > 0);
        assert_eq!(block.total_blocks(), 65539 + i32::MAX as u32);

        let mut corrupted = block;
        corrupted.data_region_addr = i32::MAX;
        assert_eq!(corrupted.total_blocks(), i32::MAX as u32 * 2);
    }

    #[test]
    fn test_overlapping_regions_are_inconsistent() {
        let mut block = SuperBlock::with_capacity(32, 32);
        block.inode_region_addr = 2;

        assert!(!block.is_consistent());
        assert!(!SuperBlock::default().is_consistent());
    }
}
