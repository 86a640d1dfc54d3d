use super::{encode_entries, Changeset, LocalFileSystem};
use crate::{
    set_bit, ByteSerializable, DirEntry, DiskHandler, Inode, InodeType, SuperBlock, UfsError,
    UfsResult, BLOCK_SIZE, ROOT_INODE,
};
use log::{debug, info};

impl<D: DiskHandler> LocalFileSystem<D> {
    /// Lay out an empty file system with room for `num_inodes` inodes and `num_data` data blocks,
    /// holding only the root directory. Everything the device held before in the described
    /// regions is overwritten.
    pub fn format(mut disk: D, num_inodes: u32, num_data: u32) -> UfsResult<Self> {
        let limit = i32::MAX as u32;

        if num_inodes == 0 || num_data == 0 || num_inodes > limit || num_data > limit {
            return Err(UfsError::InvalidSize);
        }

        let sb = SuperBlock::with_capacity(num_inodes, num_data);

        if sb.total_blocks() > disk.block_count() {
            debug!(
                "device holds {} blocks, layout needs {}",
                disk.block_count(),
                sb.total_blocks()
            );
            return Err(UfsError::InvalidSize);
        }

        let root_block = sb.data_region_addr as u32;
        let dots = [
            DirEntry::new(".", ROOT_INODE)?,
            DirEntry::new("..", ROOT_INODE)?,
        ];

        let mut root = Inode::new(InodeType::Directory);
        root.set_direct(0, root_block);
        root.set_file_size(dots.len() * DirEntry::size());

        let mut changes = Changeset::new();
        changes.stage(0, sb.to_bytes().to_vec());

        for (addr, len) in [
            (sb.inode_bitmap_addr, sb.inode_bitmap_len),
            (sb.data_bitmap_addr, sb.data_bitmap_len),
            (sb.inode_region_addr, sb.inode_region_len),
        ]
        .iter()
        {
            for block in *addr..*addr + *len {
                changes.stage(block as u32, vec![0u8; BLOCK_SIZE]);
            }
        }

        // Root inode and its first data block are the first bits of each bitmap.
        let mut first_bitmap_block = vec![0u8; BLOCK_SIZE];
        set_bit(&mut first_bitmap_block, 0);
        changes.stage(sb.inode_bitmap_addr as u32, first_bitmap_block.clone());
        changes.stage(sb.data_bitmap_addr as u32, first_bitmap_block);

        let mut inode_block = vec![0u8; BLOCK_SIZE];
        root.write_to(&mut inode_block, 0);
        changes.stage(sb.inode_region_addr as u32, inode_block);

        changes.stage(root_block, encode_entries(&dots, 1));

        changes.commit(&mut disk)?;

        info!(
            "formatted {} blocks: {} inodes, {} data blocks starting at {}",
            sb.total_blocks(),
            num_inodes,
            num_data,
            sb.data_region_addr
        );

        return Ok(Self::new(disk));
    }
}
