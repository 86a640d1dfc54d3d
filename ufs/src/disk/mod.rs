// Disk layout:
// super block (block 0), inode bitmap, data bitmap, inode region, data region.
// Each region starts on a block boundary and is described by the super block.

mod disk_blocks;
pub mod disk_handler;

pub use disk_blocks::{DirEntry, Inode, InodeType, SuperBlock, UNUSED_BLOCK, UNUSED_INODE};
pub use disk_handler::DiskHandler;

pub(crate) use disk_blocks::blocks_for;
