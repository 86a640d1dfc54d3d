use crate::{ByteSerializable, UfsError, BLOCK_SIZE, DIRECT_PTRS};
use byteorder::{ByteOrder, LittleEndian};
use std::convert::TryFrom;

/// Marks a direct pointer slot that does not name a block (`-1` on disk).
pub const UNUSED_BLOCK: u32 = u32::MAX;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InodeType {
    Directory,
    RegularFile,
}

impl InodeType {
    pub fn code(&self) -> i32 {
        return match self {
            InodeType::Directory => 0,
            InodeType::RegularFile => 1,
        };
    }
}

impl TryFrom<i32> for InodeType {
    type Error = UfsError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        return match code {
            0 => Ok(InodeType::Directory),
            1 => Ok(InodeType::RegularFile),
            _ => Err(UfsError::InvalidType),
        };
    }
}

/// Describes one file or directory. It is of length 128 bytes:
///
/// | offset | field |
/// |---|---|
/// | 0 | type, `i32` |
/// | 4 | size in bytes, `i32` |
/// | 8 | 30 direct block pointers, `u32` each |
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Inode {
    file_type: InodeType,
    size: u32,
    /// Absolute block numbers of the data blocks, in file order. Unused slots hold `UNUSED_BLOCK`.
    direct: [u32; DIRECT_PTRS],
}

impl Inode {
    pub fn new(file_type: InodeType) -> Self {
        return Self {
            file_type,
            size: 0,
            direct: [UNUSED_BLOCK; DIRECT_PTRS],
        };
    }

    #[inline]
    pub fn file_type(&self) -> InodeType {
        return self.file_type;
    }

    #[inline]
    pub fn is_directory(&self) -> bool {
        return self.file_type == InodeType::Directory;
    }

    #[inline]
    pub fn file_size(&self) -> usize {
        return self.size as usize;
    }

    pub fn set_file_size(&mut self, size: usize) {
        self.size = size as u32;
    }

    /// The number of data blocks the current size spans.
    pub fn block_count(&self) -> usize {
        return blocks_for(self.file_size());
    }

    /// The data blocks backing the current size, in order.
    pub fn blocks(&self) -> &[u32] {
        return &self.direct[..self.block_count().min(DIRECT_PTRS)];
    }

    pub fn direct(&self, index: usize) -> u32 {
        return self.direct[index];
    }

    pub fn set_direct(&mut self, index: usize, block: u32) {
        self.direct[index] = block;
    }
}

/// Number of blocks needed to hold `size` bytes.
pub(crate) fn blocks_for(size: usize) -> usize {
    return (size + BLOCK_SIZE - 1) / BLOCK_SIZE;
}

impl ByteSerializable for Inode {
    type BytesArrayType = [u8; 128];

    fn to_bytes(&self) -> Self::BytesArrayType {
        let mut bytes = [0u8; 128];

        LittleEndian::write_i32(&mut bytes[0..], self.file_type.code());
        LittleEndian::write_i32(&mut bytes[4..], self.size as i32);
        LittleEndian::write_u32_into(&self.direct, &mut bytes[8..]);

        return bytes;
    }

    /// Fails for unknown type codes, negative sizes or sizes beyond what the direct pointers can
    /// address, all of which indicate a free or corrupted slot.
    fn from_bytes(bytes: &[u8]) -> Option<Self>
    where
        Self: std::marker::Sized,
    {
        if bytes.len() < Self::size() {
            return None;
        }

        let file_type = InodeType::try_from(LittleEndian::read_i32(&bytes[0..])).ok()?;

        let size = LittleEndian::read_i32(&bytes[4..]);
        if size < 0 || blocks_for(size as usize) > DIRECT_PTRS {
            return None;
        }

        let mut direct = [0u32; DIRECT_PTRS];
        LittleEndian::read_u32_into(&bytes[8..Self::size()], &mut direct);

        return Some(Self {
            file_type,
            size: size as u32,
            direct,
        });
    }

    fn generic_bytes_rep(bytes: &Self::BytesArrayType) -> &[u8] {
        return bytes;
    }

    fn size() -> usize {
        return 128;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bytes() {
        let mut inode = Inode::new(InodeType::RegularFile);
        inode.set_file_size(5000);
        inode.set_direct(0, 7);
        inode.set_direct(1, 0x0102);

        let bytes = inode.to_bytes();

        assert_eq!(&bytes[0..4], &[1, 0, 0, 0]);
        assert_eq!(&bytes[4..8], &[0x88, 0x13, 0, 0]);
        assert_eq!(&bytes[8..12], &[7, 0, 0, 0]);
        assert_eq!(&bytes[12..16], &[0x02, 0x01, 0, 0]);
        assert_eq!(&bytes[16..20], &[0xff; 4]);
        assert_eq!(&bytes[124..128], &[0xff; 4]);

        assert_eq!(Inode::from_bytes(&bytes).unwrap(), inode);
    }

    #[test]
    fn test_blocks() {
        let mut inode = Inode::new(InodeType::RegularFile);
        assert_eq!(inode.block_count(), 0);
        assert!(inode.blocks().is_empty());

        inode.set_file_size(BLOCK_SIZE);
        inode.set_direct(0, 12);
        assert_eq!(inode.blocks(), &[12]);

        inode.set_file_size(BLOCK_SIZE + 1);
        inode.set_direct(1, 40);
        assert_eq!(inode.blocks(), &[12, 40]);
    }

    #[test]
    fn test_zeroed_slot_is_empty_directory() {
        let inode = Inode::from_bytes(&[0u8; 128]).unwrap();

        assert!(inode.is_directory());
        assert_eq!(inode.file_size(), 0);
    }

    #[test]
    fn test_invalid_slots() {
        let mut bytes = Inode::new(InodeType::Directory).to_bytes();
        bytes[0] = 7;
        assert!(Inode::from_bytes(&bytes).is_none());

        let mut bytes = Inode::new(InodeType::Directory).to_bytes();
        LittleEndian::write_i32(&mut bytes[4..], -1);
        assert!(Inode::from_bytes(&bytes).is_none());

        let mut bytes = Inode::new(InodeType::RegularFile).to_bytes();
        LittleEndian::write_i32(&mut bytes[4..], (crate::MAX_FILE_SIZE + 1) as i32);
        assert!(Inode::from_bytes(&bytes).is_none());
    }

    #[test]
    fn test_type_codes() {
        assert_eq!(InodeType::try_from(0).unwrap(), InodeType::Directory);
        assert_eq!(InodeType::try_from(1).unwrap(), InodeType::RegularFile);
        assert!(InodeType::try_from(2).is_err());
    }
}
